//! Entity trait: identity that survives state changes.

/// Anything the stores persist under a store-assigned id.
pub trait Entity {
    type Id: Copy + Eq + Ord + core::hash::Hash + core::fmt::Debug + Send + Sync;

    fn id(&self) -> Self::Id;
}
