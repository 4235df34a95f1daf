use rand::Rng;

use crate::config::ReconnectConfig;

/// Randomized exponential reconnect delay.
///
/// The n-th delay is `delay_ms * factor^n`, shifted up or down by at most
/// `randomization` of itself and clamped to `[delay_ms, delay_max_ms]`.
#[derive(Debug, Clone)]
pub struct Backoff {
    min_ms: u64,
    max_ms: u64,
    factor: f64,
    randomization: f64,
    attempts: u32,
}

impl Backoff {
    pub fn new(config: &ReconnectConfig) -> Self {
        let min_ms = config.delay_ms;
        Self {
            min_ms,
            max_ms: config.delay_max_ms.max(min_ms),
            factor: config.factor.max(1.0),
            randomization: config.randomization.clamp(0.0, 1.0),
            attempts: 0,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn next_delay_ms<R: Rng>(&mut self, rng: &mut R) -> u64 {
        let delay = self.delay_for(self.attempts, rng.r#gen::<f64>());
        self.attempts = self.attempts.saturating_add(1);
        delay
    }

    /// Delay for attempt `attempt` given a uniform sample `r` in `[0, 1)`.
    ///
    /// The low decimal digit of `r` picks the direction of the jitter, the
    /// whole of `r` its size.
    pub fn delay_for(&self, attempt: u32, r: f64) -> u64 {
        let base = self.min_ms as f64 * self.factor.powi(attempt.min(i32::MAX as u32) as i32);
        let mut ms = base;
        if self.randomization > 0.0 {
            let deviation = (r * self.randomization * base).floor();
            ms = if ((r * 10.0).floor() as u64) & 1 == 0 {
                base - deviation
            } else {
                base + deviation
            };
        }
        let ms = ms.clamp(self.min_ms as f64, self.max_ms as f64);
        ms as u64
    }

    /// Called once a connection is established.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::Backoff;
    use crate::config::ReconnectConfig;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn grows_until_capped_without_jitter() {
        let cfg = ReconnectConfig {
            randomization: 0.0,
            ..ReconnectConfig::default()
        };
        let mut backoff = Backoff::new(&cfg);
        let mut rng = StdRng::seed_from_u64(3);
        let delays: Vec<u64> = (0..6).map(|_| backoff.next_delay_ms(&mut rng)).collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 5000, 5000, 5000]);
        assert_eq!(backoff.attempts(), 6);
    }

    #[test]
    fn jitter_direction_follows_low_digit() {
        let backoff = Backoff::new(&ReconnectConfig::default());
        // 0.25 -> digit 2 (even), shrink by 0.25 * 0.5 * 2000 = 250
        assert_eq!(backoff.delay_for(1, 0.25), 1750);
        // 0.375 -> digit 3 (odd), grow by 375
        assert_eq!(backoff.delay_for(1, 0.375), 2375);
    }

    #[test]
    fn stays_within_bounds_for_many_attempts() {
        let cfg = ReconnectConfig::default();
        let mut backoff = Backoff::new(&cfg);
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..200 {
            let d = backoff.next_delay_ms(&mut rng);
            assert!((cfg.delay_ms..=cfg.delay_max_ms).contains(&d), "delay {d} out of range");
        }
    }

    #[test]
    fn reset_restarts_the_schedule() {
        let cfg = ReconnectConfig {
            randomization: 0.0,
            ..ReconnectConfig::default()
        };
        let mut backoff = Backoff::new(&cfg);
        let mut rng = StdRng::seed_from_u64(0);
        backoff.next_delay_ms(&mut rng);
        backoff.next_delay_ms(&mut rng);
        backoff.reset();
        assert_eq!(backoff.attempts(), 0);
        assert_eq!(backoff.next_delay_ms(&mut rng), 1000);
    }
}
