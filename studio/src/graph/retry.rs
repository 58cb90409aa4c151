//! Retry policy for transient node failures.
//!
//! The runner consults the policy only when a node fails with a transient error
//! (`AgentError::is_transient`): LLM timeouts and provider errors. Missing inputs and
//! other failures are never retried.

use std::time::Duration;

/// How many times, and with what delay, a failed node is re-run.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RetryPolicy {
    /// Fail on the first error.
    #[default]
    None,
    /// Constant delay between attempts.
    Fixed {
        max_retries: usize,
        interval: Duration,
    },
    /// Delay grows by `multiplier` per attempt, capped at `max_interval`.
    Exponential {
        max_retries: usize,
        initial_interval: Duration,
        max_interval: Duration,
        multiplier: f64,
    },
}

impl RetryPolicy {
    pub fn fixed(max_retries: usize, interval: Duration) -> Self {
        RetryPolicy::Fixed {
            max_retries,
            interval,
        }
    }

    pub fn exponential(
        max_retries: usize,
        initial_interval: Duration,
        max_interval: Duration,
        multiplier: f64,
    ) -> Self {
        RetryPolicy::Exponential {
            max_retries,
            initial_interval,
            max_interval,
            multiplier,
        }
    }

    /// Doubling backoff from `initial_interval`, capped at 8 seconds.
    pub fn backoff(max_retries: usize, initial_interval: Duration) -> Self {
        if max_retries == 0 {
            return RetryPolicy::None;
        }
        Self::exponential(max_retries, initial_interval, Duration::from_secs(8), 2.0)
    }

    /// `attempt` is the number of retries already made (0 after the first failure).
    pub fn should_retry(&self, attempt: usize) -> bool {
        attempt < self.max_retries()
    }

    /// Delay before retry number `attempt + 1`.
    pub fn delay(&self, attempt: usize) -> Duration {
        match self {
            RetryPolicy::None => Duration::ZERO,
            RetryPolicy::Fixed { interval, .. } => *interval,
            RetryPolicy::Exponential {
                initial_interval,
                max_interval,
                multiplier,
                ..
            } => {
                let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
                let secs = initial_interval.as_secs_f64() * multiplier.powi(exp);
                if !secs.is_finite() || secs >= max_interval.as_secs_f64() {
                    *max_interval
                } else {
                    Duration::from_secs_f64(secs)
                }
            }
        }
    }

    pub fn max_retries(&self) -> usize {
        match self {
            RetryPolicy::None => 0,
            RetryPolicy::Fixed { max_retries, .. } | RetryPolicy::Exponential { max_retries, .. } => {
                *max_retries
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_never_retries() {
        let p = RetryPolicy::default();
        assert_eq!(p, RetryPolicy::None);
        assert!(!p.should_retry(0));
        assert_eq!(p.delay(3), Duration::ZERO);
    }

    #[test]
    fn fixed_retries_up_to_limit_with_constant_delay() {
        let p = RetryPolicy::fixed(2, Duration::from_millis(50));
        assert!(p.should_retry(0));
        assert!(p.should_retry(1));
        assert!(!p.should_retry(2));
        assert_eq!(p.delay(0), p.delay(1));
    }

    /// **Scenario**: exponential delays double and stop at the cap.
    #[test]
    fn exponential_doubles_then_caps() {
        let p = RetryPolicy::exponential(6, Duration::from_secs(1), Duration::from_secs(5), 2.0);
        assert_eq!(p.delay(0), Duration::from_secs(1));
        assert_eq!(p.delay(1), Duration::from_secs(2));
        assert_eq!(p.delay(2), Duration::from_secs(4));
        assert_eq!(p.delay(3), Duration::from_secs(5));
        assert_eq!(p.delay(60), Duration::from_secs(5));
    }

    #[test]
    fn backoff_with_zero_retries_is_none() {
        assert_eq!(RetryPolicy::backoff(0, Duration::from_millis(10)), RetryPolicy::None);
        assert_eq!(RetryPolicy::backoff(2, Duration::from_millis(10)).max_retries(), 2);
    }
}
