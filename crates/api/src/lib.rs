//! HTTP API: server wiring, request gate, routing, and request/response mapping.

pub mod app;
pub mod context;
pub mod middleware;
