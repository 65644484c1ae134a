use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Cooldown gate for the image-generation endpoint.
///
/// Generation calls are expensive; at most one is admitted per cooldown
/// window. The first call always passes.
pub struct RateLimiter {
    last_action: Mutex<Option<Instant>>,
    cooldown: Duration,
}

impl RateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            last_action: Mutex::new(None),
            cooldown,
        }
    }

    /// Admit the action and start a new window, or report how long remains.
    pub fn check_and_update(&self) -> Result<(), Duration> {
        let mut last = match self.last_action.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = Instant::now();

        if let Some(last_time) = *last {
            let elapsed = now.duration_since(last_time);
            if elapsed < self.cooldown {
                return Err(self.cooldown - elapsed);
            }
        }

        *last = Some(now);
        Ok(())
    }
}
