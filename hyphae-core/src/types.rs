/// Identifier for a node in a [`crate::node::NodeStore`].
///
/// This is an index into the store's backing array, and is only
/// meaningful within the lifetime of a given store instance. Indices
/// are assigned monotonically and never reused.
pub type NodeIndex = usize;
