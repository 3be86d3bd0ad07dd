/// Identifier for a branch in a [`crate::tree::BranchTree`].
///
/// This is an index into the tree's branch arena, and is only meaningful
/// within the lifetime of a given `BranchTree` instance.
pub type BranchId = usize;
