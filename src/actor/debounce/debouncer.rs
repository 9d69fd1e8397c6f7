use std::time::Duration;

use tokio::time::Instant;

/// Pure debouncer: timing plus distinct-until-changed, no I/O.
pub(super) struct Debouncer {
    pub(super) quiet: Duration,
    /// Latest unsettled text
    pub(super) pending: Option<String>,
    pub(super) last_event: Option<Instant>,
    /// Last value handed downstream
    pub(super) last_settled: Option<String>,
}

impl Debouncer {
    pub(super) fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            last_event: None,
            last_settled: None,
        }
    }

    /// Record an edit. Later edits replace earlier ones and restart the quiet interval.
    pub(super) fn push(&mut self, text: String) {
        self.pending = Some(text);
        self.last_event = Some(Instant::now());
    }

    /// Take the settled text if the quiet interval has elapsed.
    ///
    /// A settled text equal to the previous one is consumed without being
    /// returned.
    pub(super) fn take_if_ready(&mut self) -> Option<String> {
        if !self.is_ready() {
            return None;
        }

        let text = self.pending.take()?;
        self.last_event = None;

        if self.last_settled.as_deref() == Some(text.as_str()) {
            crate::debug!("debounce"; "unchanged after settle, suppressed");
            return None;
        }

        self.last_settled = Some(text.clone());
        Some(text)
    }

    pub(super) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };

        last_event.elapsed() >= self.quiet && self.pending.is_some()
    }

    /// Precise sleep duration until next possible ready time.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return Duration::from_secs(86400);
        };

        self.quiet
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}
