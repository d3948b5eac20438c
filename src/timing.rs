//! Build timing utilities.

use std::time::{Duration, Instant};

/// Measures how long a build step takes.
pub struct Timer {
    name: String,
    start: Instant,
}

impl Timer {
    /// Start a new timer with the given step name.
    pub fn start(name: &str) -> Self {
        Self {
            name: name.to_string(),
            start: Instant::now(),
        }
    }

    /// Stop the timer and return the elapsed time.
    pub fn finish(self) -> Duration {
        let elapsed = self.start.elapsed();
        tracing::debug!("{} took {}", self.name, format_duration(elapsed));
        elapsed
    }
}

/// Human-readable duration: seconds below a minute, minutes above.
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 60.0 {
        format!("{:.1}m", secs / 60.0)
    } else {
        format!("{:.1}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }
}
