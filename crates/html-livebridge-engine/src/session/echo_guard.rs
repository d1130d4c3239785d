use std::time::{Duration, Instant};

/// How long a selection coming from the rendered view suppresses the echo
/// back from the host.
pub const ECHO_WINDOW: Duration = Duration::from_millis(100);

/// One-shot suppression of host → preview selection sync.
///
/// Armed when the preview reports a selection, so the resulting host
/// selection change is not sent straight back. Clears itself after
/// [`ECHO_WINDOW`] whether or not that change ever arrives.
#[derive(Debug, Default, Clone)]
pub struct EchoGuard {
    until: Option<Instant>,
}

impl EchoGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, now: Instant) {
        self.until = Some(now + ECHO_WINDOW);
    }

    /// True while the guard is armed and has not yet expired.
    pub fn is_suppressed(&mut self, now: Instant) -> bool {
        match self.until {
            Some(until) if now < until => true,
            Some(_) => {
                self.until = None;
                false
            }
            None => false,
        }
    }
}
