//! Elapsed-time tracking for an active recording.

/// One-second-granularity counter behind the recording display.
///
/// The timer does not schedule its own ticks; the owner drives it from
/// whatever clock it has (an interval task in the app, plain calls in tests).
#[derive(Debug, Default)]
pub struct TickTimer {
    elapsed: u32,
    running: bool,
}

impl TickTimer {
    /// Zero the counter and begin accepting ticks.
    pub fn start(&mut self) {
        self.elapsed = 0;
        self.running = true;
    }

    /// Advance by one second. Ignored when the timer is not running.
    pub fn tick(&mut self) {
        if self.running {
            self.elapsed += 1;
        }
    }

    /// Stop counting. Safe to call on an already-cancelled timer.
    pub fn cancel(&mut self) {
        self.running = false;
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Format elapsed seconds as zero-padded `MM:SS` for display.
pub fn format_elapsed(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_count_only_while_running() {
        let mut timer = TickTimer::default();
        timer.tick();
        assert_eq!(timer.elapsed_secs(), 0);

        timer.start();
        timer.tick();
        timer.tick();
        assert_eq!(timer.elapsed_secs(), 2);

        timer.cancel();
        timer.tick();
        assert_eq!(timer.elapsed_secs(), 2);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut timer = TickTimer::default();
        timer.start();
        timer.tick();
        timer.cancel();
        timer.cancel();
        assert_eq!(timer.elapsed_secs(), 1);
        assert!(!timer.is_running());
    }

    #[test]
    fn test_start_resets_elapsed() {
        let mut timer = TickTimer::default();
        timer.start();
        timer.tick();
        timer.start();
        assert_eq!(timer.elapsed_secs(), 0);
    }

    #[test]
    fn test_format_elapsed_pads_both_fields() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(3), "00:03");
        assert_eq!(format_elapsed(65), "01:05");
        assert_eq!(format_elapsed(3599), "59:59");
    }
}
