/// Turns variable frame times into a whole number of fixed physics steps.
///
/// Leftover time carries into the next frame. `alpha` is how far the current
/// frame sits between the last step and the next one.
#[derive(Clone, Copy, Debug)]
pub struct FixedStep {
    pub dt: f32,
    accumulator: f32,
    /// Caps the steps taken per frame so one long frame cannot stall the loop.
    pub max_steps: usize,
}

impl FixedStep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: 8,
        }
    }

    /// Adds `frame_dt` and returns how many fixed steps are now due.
    pub fn advance(&mut self, frame_dt: f32) -> usize {
        if self.dt <= 0.0 {
            return 0;
        }
        self.accumulator += frame_dt.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.dt && steps < self.max_steps {
            self.accumulator -= self.dt;
            steps += 1;
        }
        if steps == self.max_steps && self.accumulator >= self.dt {
            log::warn!(
                "dropping {:.3}s of simulation time after {steps} steps",
                self.accumulator
            );
            self.accumulator %= self.dt;
        }
        steps
    }

    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_leftover_time() {
        let mut stepper = FixedStep::new(0.1);
        assert_eq!(stepper.advance(0.25), 2);
        assert!((stepper.alpha() - 0.5).abs() < 1e-4);
        assert_eq!(stepper.advance(0.1), 1);
    }

    #[test]
    fn caps_steps_per_frame() {
        let mut stepper = FixedStep::new(0.1);
        stepper.max_steps = 3;
        assert_eq!(stepper.advance(5.0), 3);
        assert!(stepper.alpha() < 1.0);
    }

    #[test]
    fn ignores_negative_frames() {
        let mut stepper = FixedStep::new(0.1);
        assert_eq!(stepper.advance(-1.0), 0);
        assert_eq!(stepper.alpha(), 0.0);
    }
}
