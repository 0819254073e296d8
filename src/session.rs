use std::time::Instant;

/// One start/stop measurement of perceived elapsed time.
///
/// Uses `Instant` so the measurement is monotonic: wall-clock adjustments
/// during a run cannot produce a negative or skewed reading. Wall-clock time
/// is only attached later, when the result is recorded.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimingSession {
    started_at: Option<Instant>,
}

impl TimingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin measuring from now. Starting an already-running session
    /// restarts it from the new instant; measurements never stack.
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// End the measurement and return the elapsed seconds.
    ///
    /// Stopping a session that was never started is not an error: it yields
    /// exactly `0.0` so the caller's flow degrades to a zero measurement.
    pub fn stop(&mut self) -> f64 {
        self.started_at
            .take()
            .map(|started| started.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn stop_without_start_is_zero() {
        let mut session = TimingSession::new();
        assert!(!session.is_running());
        assert_eq!(session.stop(), 0.0);
    }

    #[test]
    fn stop_returns_elapsed_seconds() {
        let mut session = TimingSession::new();
        session.start();
        assert!(session.is_running());

        thread::sleep(Duration::from_millis(50));

        let elapsed = session.stop();
        assert!(elapsed >= 0.05);
        assert!(elapsed < 1.0, "50ms sleep measured as {elapsed}s");
        assert!(!session.is_running());
    }

    #[test]
    fn stop_clears_the_session() {
        let mut session = TimingSession::new();
        session.start();
        let _ = session.stop();

        // A second stop sees no start instant and degrades to zero.
        assert_eq!(session.stop(), 0.0);
    }

    #[test]
    fn restart_replaces_the_start_instant() {
        let mut session = TimingSession::new();
        session.start();
        thread::sleep(Duration::from_millis(50));

        // Starting again must measure from the new instant, not the first.
        session.start();
        let elapsed = session.stop();
        assert!(
            elapsed < 0.05,
            "restart did not reset measurement: {elapsed}s"
        );
    }

    #[test]
    fn elapsed_is_never_negative() {
        let mut session = TimingSession::new();
        session.start();
        assert!(session.stop() >= 0.0);
    }
}
