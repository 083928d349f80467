use instant::Duration;

/// Length of one simulation step.
pub const STEP: Duration = Duration::from_nanos(16_666_667);

/// Accumulates frame time and hands out whole simulation steps.
///
/// A long stall (debugger, hidden tab) would otherwise be replayed as
/// hundreds of steps at once. At most `max_steps` are returned per frame and
/// any backlog beyond that is dropped.
#[derive(Debug, Clone)]
pub struct FixedStep {
    accumulator: Duration,
    max_steps: u32,
}

impl FixedStep {
    pub fn new(max_steps: u32) -> Self {
        Self {
            accumulator: Duration::ZERO,
            max_steps: max_steps.max(1),
        }
    }

    pub fn advance(&mut self, dt: Duration) -> u32 {
        self.accumulator += dt;
        let mut steps = 0;
        while self.accumulator >= STEP && steps < self.max_steps {
            self.accumulator -= STEP;
            steps += 1;
        }
        if self.accumulator >= STEP {
            log::warn!(
                "Simulation fell behind by {:?}, skipping ahead.",
                self.accumulator
            );
            self.accumulator = Duration::ZERO;
        }
        steps
    }

    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }

    pub fn step_secs() -> f32 {
        STEP.as_secs_f32()
    }
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_frames_map_to_steps() {
        let mut clock = FixedStep::default();
        assert_eq!(clock.advance(STEP), 1);
        assert_eq!(clock.advance(STEP * 2), 2);
    }

    #[test]
    fn short_frames_accumulate() {
        let mut clock = FixedStep::default();
        assert_eq!(clock.advance(Duration::from_millis(10)), 0);
        assert_eq!(clock.advance(Duration::from_millis(10)), 1);
    }

    #[test]
    fn long_stalls_are_capped_and_dropped() {
        let mut clock = FixedStep::new(3);
        assert_eq!(clock.advance(Duration::from_secs(2)), 3);
        assert_eq!(clock.advance(Duration::ZERO), 0);
    }
}
