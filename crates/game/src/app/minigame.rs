//! Pieces shared by the mini-game scenes: lives, per-question timers and
//! screen shake.

use engine::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Lives {
    remaining: u32,
}

impl Lives {
    pub(crate) fn new(count: u32) -> Self {
        Self { remaining: count }
    }

    pub(crate) fn remaining(self) -> u32 {
        self.remaining
    }

    pub(crate) fn is_empty(self) -> bool {
        self.remaining == 0
    }

    /// Saturates at zero.
    pub(crate) fn lose_one(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerEvent {
    Running,
    /// Reported on the single tick that reaches zero.
    Expired,
}

/// Counts down from `limit` seconds. After expiring it stays at zero and
/// reports `Running` until reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CountdownTimer {
    limit: f32,
    remaining: f32,
}

impl CountdownTimer {
    pub(crate) fn new(limit_seconds: f32) -> Self {
        Self {
            limit: limit_seconds,
            remaining: limit_seconds,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.remaining = self.limit;
    }

    pub(crate) fn tick(&mut self, dt_seconds: f32) -> TimerEvent {
        if self.remaining <= 0.0 {
            return TimerEvent::Running;
        }
        self.remaining = (self.remaining - dt_seconds).max(0.0);
        if self.remaining <= 0.0 {
            TimerEvent::Expired
        } else {
            TimerEvent::Running
        }
    }

    #[cfg(test)]
    pub(crate) fn remaining_seconds(&self) -> f32 {
        self.remaining
    }

    #[cfg(test)]
    pub(crate) fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Whole seconds left, rounded up, as shown on screen.
    pub(crate) fn display_seconds(&self) -> u32 {
        self.remaining.ceil() as u32
    }
}

/// Random per-tick screen offset for a short burst.
#[derive(Debug, Clone)]
pub(crate) struct Shake {
    rng: StdRng,
    magnitude: f32,
    remaining: f32,
    offset: Vec2,
}

impl Shake {
    pub(crate) fn new(magnitude: f32) -> Self {
        Self::with_rng(magnitude, StdRng::from_entropy())
    }

    pub(crate) fn with_rng(magnitude: f32, rng: StdRng) -> Self {
        Self {
            rng,
            magnitude,
            remaining: 0.0,
            offset: Vec2::ZERO,
        }
    }

    pub(crate) fn start(&mut self, duration_seconds: f32) {
        self.remaining = duration_seconds;
    }

    #[cfg(test)]
    pub(crate) fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    pub(crate) fn tick(&mut self, dt_seconds: f32) {
        if self.remaining <= 0.0 {
            self.offset = Vec2::ZERO;
            return;
        }
        self.remaining -= dt_seconds;
        self.offset = if self.remaining > 0.0 {
            Vec2::new(
                self.rng.gen_range(-self.magnitude..=self.magnitude),
                self.rng.gen_range(-self.magnitude..=self.magnitude),
            )
        } else {
            Vec2::ZERO
        };
    }

    pub(crate) fn offset(&self) -> Vec2 {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lives_run_out_at_zero() {
        let mut lives = Lives::new(2);
        lives.lose_one();
        assert!(!lives.is_empty());
        lives.lose_one();
        assert!(lives.is_empty());
        lives.lose_one();
        assert_eq!(lives.remaining(), 0);
    }

    #[test]
    fn timer_expires_exactly_once() {
        let mut timer = CountdownTimer::new(1.0);
        assert_eq!(timer.tick(0.6), TimerEvent::Running);
        assert_eq!(timer.display_seconds(), 1);
        assert_eq!(timer.tick(0.6), TimerEvent::Expired);
        assert!(timer.is_expired());
        assert_eq!(timer.tick(0.6), TimerEvent::Running);

        timer.reset();
        assert_eq!(timer.remaining_seconds(), 1.0);
    }

    #[test]
    fn shake_stays_within_magnitude_and_settles() {
        let mut shake = Shake::with_rng(10.0, StdRng::seed_from_u64(7));
        shake.start(0.5);
        for _ in 0..20 {
            shake.tick(0.02);
            let offset = shake.offset();
            assert!(offset.x.abs() <= 10.0 && offset.y.abs() <= 10.0);
        }
        assert!(shake.is_active());

        for _ in 0..20 {
            shake.tick(0.02);
        }
        assert!(!shake.is_active());
        assert_eq!(shake.offset(), Vec2::ZERO);
    }
}
