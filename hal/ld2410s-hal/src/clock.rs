//! Monotonic time source

/// Millisecond clock used for report throttling, the inter-command settling
/// delay and the acknowledgement timeout.
///
/// The counter is allowed to wrap; callers compare instants with
/// [`elapsed_ms`], never with `<`.
pub trait MonotonicClock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u32;
}

/// Milliseconds from `since` to `now`, correct across one counter wrap
pub fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_simple() {
        assert_eq!(elapsed_ms(1500, 1000), 500);
        assert_eq!(elapsed_ms(1000, 1000), 0);
    }

    #[test]
    fn test_elapsed_across_wrap() {
        assert_eq!(elapsed_ms(10, u32::MAX - 9), 20);
    }
}
