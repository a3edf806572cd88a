/// Clamp a requested worker count into `[1, item_count]`.
///
/// An empty input still reports one worker so callers never divide by zero.
pub fn clamp_workers(requested: usize, item_count: usize) -> usize {
    requested.max(1).min(item_count.max(1))
}

/// Split `values` into at most `chunk_count` contiguous windows.
///
/// Every window has `ceil(len / chunk_count)` elements except the last, which
/// holds whatever remains. The windows are never rebalanced, so
/// `partition(&[1, 2, 3, 4, 5, 6, 7], 3)` yields `[[1, 2, 3], [4, 5, 6], [7]]`.
/// A `chunk_count` of zero is treated as one.
pub fn partition<T>(values: &[T], chunk_count: usize) -> Vec<&[T]> {
    if values.is_empty() {
        return Vec::new();
    }

    let window = values.len().div_ceil(chunk_count.max(1));
    values.chunks(window).collect()
}
