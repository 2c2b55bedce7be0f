use std::time::Duration;

/// Delay before retry number `retry_count` (0 = first retry): `base * 2^retry_count`.
///
/// Saturates instead of overflowing.
///
/// ```
/// use std::time::Duration;
/// use digestline_fetch::retry_delay;
///
/// assert_eq!(retry_delay(0, Duration::from_millis(100)), Duration::from_millis(100));
/// assert_eq!(retry_delay(2, Duration::from_millis(100)), Duration::from_millis(400));
/// ```
pub fn retry_delay(retry_count: u32, base: Duration) -> Duration {
    let multiplier = 2_u32.saturating_pow(retry_count);
    base.saturating_mul(multiplier)
}
