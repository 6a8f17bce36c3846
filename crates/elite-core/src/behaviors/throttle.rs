//! Repath throttling.

use glam::Vec3;

/// Limits how often a behavior asks the navigator for a fresh path.
///
/// A repath is allowed once the countdown expires and the goal has moved at
/// least a block since the last request. The first request always passes.
#[derive(Debug, Clone, PartialEq)]
pub struct PathingThrottle {
    interval: u32,
    countdown: u32,
    last_goal: Option<Vec3>,
}

impl PathingThrottle {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            countdown: 0,
            last_goal: None,
        }
    }

    pub fn reset(&mut self) {
        self.countdown = 0;
        self.last_goal = None;
    }

    pub fn should_repath(&mut self, goal: Vec3) -> bool {
        if self.countdown > 0 {
            self.countdown -= 1;
            return false;
        }
        let moved = self
            .last_goal
            .map_or(true, |last| last.distance_squared(goal) >= 1.0);
        if moved {
            self.countdown = self.interval;
            self.last_goal = Some(goal);
        }
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_passes_then_waits() {
        let mut throttle = PathingThrottle::new(3);
        assert!(throttle.should_repath(Vec3::ZERO));
        let far = Vec3::new(5.0, 0.0, 0.0);
        assert!(!throttle.should_repath(far));
        assert!(!throttle.should_repath(far));
        assert!(!throttle.should_repath(far));
        assert!(throttle.should_repath(far));
    }

    #[test]
    fn test_stationary_goal_is_not_repathed() {
        let mut throttle = PathingThrottle::new(1);
        assert!(throttle.should_repath(Vec3::ONE));
        assert!(!throttle.should_repath(Vec3::ONE));
        assert!(!throttle.should_repath(Vec3::ONE));

        throttle.reset();
        assert!(throttle.should_repath(Vec3::ONE));
    }
}
