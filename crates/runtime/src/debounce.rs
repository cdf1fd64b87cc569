use foundation::time::Millis;

/// Trailing-edge debounce driven by host timestamps.
///
/// - `arm` (re)starts the quiet period; an arm during a pending period
///   cancels the earlier deadline, so a burst collapses into one firing.
/// - `poll` fires at most once per armed period.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Debouncer {
    delay_ms: u64,
    deadline: Option<Millis>,
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            deadline: None,
        }
    }

    pub fn deadline(&self) -> Option<Millis> {
        self.deadline
    }

    pub fn arm(&mut self, now: Millis) {
        self.deadline = Some(now.after(self.delay_ms));
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns `true` exactly once when the quiet period has elapsed.
    pub fn poll(&mut self, now: Millis) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
