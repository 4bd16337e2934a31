/// The simulated-annealing temperature schedule.
///
/// A pure function of the sweep index: `T(i) = T0 * alpha^i` with a 0-based
/// index. For `alpha` in `(0, 1]` the schedule is monotonically non-increasing;
/// `alpha = 1` is a constant-temperature run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnealScheduler {
    t0: f64,
    alpha: f64,
}

impl AnnealScheduler {
    /// Creates a schedule from the initial temperature and decay factor.
    ///
    /// Parameter validity (`t0 > 0`, `alpha` in `(0, 1]`) is enforced by the
    /// run configuration, not here.
    pub fn new(t0: f64, alpha: f64) -> Self {
        Self { t0, alpha }
    }

    /// Returns the sampling temperature for the given 0-based sweep index.
    pub fn temperature(&self, sweep_index: usize) -> f64 {
        self.t0 * self.alpha.powi(sweep_index as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn geometric_decay_matches_closed_form() {
        let schedule = AnnealScheduler::new(1.0, 0.9);
        assert_relative_eq!(schedule.temperature(0), 1.0, epsilon = 1e-9);
        assert_relative_eq!(schedule.temperature(5), 0.9_f64.powi(5), epsilon = 1e-9);
    }

    #[test]
    fn unit_alpha_is_constant_temperature() {
        let schedule = AnnealScheduler::new(2.5, 1.0);
        assert_relative_eq!(schedule.temperature(100), 2.5, epsilon = 1e-12);
    }

    #[test]
    fn schedule_is_non_increasing() {
        let schedule = AnnealScheduler::new(3.0, 0.75);
        let mut prev = f64::INFINITY;
        for sweep in 0..20 {
            let t = schedule.temperature(sweep);
            assert!(t <= prev);
            assert!(t > 0.0);
            prev = t;
        }
    }
}
