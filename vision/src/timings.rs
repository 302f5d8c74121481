use std::time::Duration;

/// Durations of repeated runs, in seconds.
#[derive(Debug, Clone, Default)]
pub struct Timings {
    min: f64,
    max: f64,
    sum: f64,
    count: usize,
}

impl Timings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(self, elapsed: Duration) -> Self {
        let value = elapsed.as_secs_f64();
        if self.count == 0 {
            return Self {
                min: value,
                max: value,
                sum: value,
                count: 1,
            };
        }
        Self {
            min: self.min.min(value),
            max: self.max.max(value),
            sum: self.sum + value,
            count: self.count + 1,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }

    pub fn sum(&self) -> Option<f64> {
        (self.count > 0).then_some(self.sum)
    }

    pub fn avg(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}
