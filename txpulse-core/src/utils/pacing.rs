use std::time::Duration;

/// Whether the submission at 0-based `index` closes a batch of `batch_size`.
///
/// A `batch_size` of 0 disables pacing.
pub fn is_batch_boundary(index: usize, batch_size: usize) -> bool {
    batch_size != 0 && (index + 1) % batch_size == 0
}

/// Default pause between batches: two minimum block periods, which gives
/// the node time to drain its pool into at least one block.
pub fn default_batch_delay(minimum_period: Duration) -> Duration {
    minimum_period * 2
}

/// Whole milliseconds in `duration`, for log fields. Saturates at `u64::MAX`.
pub fn as_millis_u64(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_boundary() {
        let boundaries: Vec<usize> = (0..10).filter(|i| is_batch_boundary(*i, 3)).collect();
        assert_eq!(boundaries, vec![2, 5, 8]);

        assert!((0..5).all(|i| is_batch_boundary(i, 1)));
        assert!((0..5).all(|i| !is_batch_boundary(i, 0)));
    }

    #[test]
    fn test_as_millis_u64_saturates() {
        assert_eq!(as_millis_u64(Duration::from_millis(6000)), 6000);
        assert_eq!(as_millis_u64(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_default_batch_delay() {
        assert_eq!(
            default_batch_delay(Duration::from_millis(3000)),
            Duration::from_secs(6)
        );
    }
}
