//! Session configuration: transport settings plus reconnect policy.

use std::time::Duration;

use crate::transport::TransportConfig;

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub transport: TransportConfig,
    pub reconnect: ReconnectPolicy,
}

/// Exponential backoff after an unexpected transport loss.
///
/// Never applied after an authentication rejection, an explicit disconnect
/// or a revocation.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// 0 retries forever.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Whether attempt number `attempt` (1-based) may run.
    pub fn allows(&self, attempt: u32) -> bool {
        self.enabled && attempt > 0 && (self.max_attempts == 0 || attempt <= self.max_attempts)
    }

    /// Delay before attempt number `attempt` (1-based): the base delay doubled
    /// per previous attempt, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << doublings)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ReconnectPolicy {
        ReconnectPolicy {
            enabled: true,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            max_attempts: 3,
        }
    }

    #[test]
    fn delay_doubles_until_capped() {
        let p = policy();
        assert_eq!(p.delay_for(1), Duration::from_millis(500));
        assert_eq!(p.delay_for(2), Duration::from_millis(1000));
        assert_eq!(p.delay_for(4), Duration::from_millis(4000));
        assert_eq!(p.delay_for(5), Duration::from_secs(5));
        assert_eq!(p.delay_for(200), Duration::from_secs(5));
    }

    #[test]
    fn attempts_are_bounded() {
        let p = policy();
        assert!(p.allows(1));
        assert!(p.allows(3));
        assert!(!p.allows(4));

        let unlimited = ReconnectPolicy {
            max_attempts: 0,
            ..policy()
        };
        assert!(unlimited.allows(10_000));
    }

    #[test]
    fn disabled_policy_never_allows() {
        assert!(!ReconnectPolicy::default().allows(1));
    }
}
