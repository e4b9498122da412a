//! Fixed-duration redirect progress sequence.

use std::time::Duration;

/// Progress from 0 to 100 in `step` increments spread evenly over `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressPlan {
    pub duration: Duration,
    pub step: u8,
}

impl ProgressPlan {
    pub fn new(duration: Duration, step: u8) -> Self {
        Self {
            duration,
            step: step.clamp(1, 100),
        }
    }

    /// Every value that will be reported, starting at 0 and ending at 100.
    pub fn percentages(&self) -> Vec<u8> {
        let mut values: Vec<u8> = (0..100u16)
            .step_by(usize::from(self.step))
            .map(|p| p as u8)
            .collect();
        values.push(100);
        values
    }

    /// Delay between consecutive reports.
    pub fn tick_interval(&self) -> Duration {
        let ticks = (self.percentages().len() - 1) as u32;
        self.duration / ticks.max(1)
    }

    /// Report each percentage to `on_tick`, pacing them by [`Self::tick_interval`].
    pub async fn run(&self, mut on_tick: impl FnMut(u8) + Send) {
        // interval() panics on a zero period
        let period = self.tick_interval().max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval(period);
        for percent in self.percentages() {
            ticker.tick().await;
            on_tick(percent);
        }
    }
}
