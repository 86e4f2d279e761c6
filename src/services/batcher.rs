//! Splits the query corpus into fixed-size batches.

/// Default number of queries fetched concurrently per phase.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Partition `items` into contiguous groups of at most `size`, preserving order.
///
/// A `size` of zero is treated as one.
pub fn partition<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut batches = Vec::with_capacity(items.len().div_ceil(size));
    let mut iter = items.into_iter().peekable();
    while iter.peek().is_some() {
        batches.push(iter.by_ref().take(size).collect());
    }
    batches
}
