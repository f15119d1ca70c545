use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Armed,
    Cooling { remaining: Duration },
}

/// Minimum spacing between delivered signals.
///
/// The clock only moves on `record_delivery`; a detected signal that no
/// sink accepted leaves the gate armed. Expiry is checked lazily against
/// the `now` each caller passes in.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    cooldown: Duration,
    last_signal: Option<DateTime<Utc>>,
}

impl CooldownGate {
    pub fn new(cooldown_secs: u64) -> Self {
        // chrono caps durations at i64::MAX milliseconds
        let secs = i64::try_from(cooldown_secs).unwrap_or(i64::MAX).min(i64::MAX / 1_000);
        Self {
            cooldown: Duration::seconds(secs),
            last_signal: None,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn state(&self, now: DateTime<Utc>) -> GateState {
        match self.last_signal {
            Some(last) => {
                let elapsed = now - last;
                if elapsed >= self.cooldown {
                    GateState::Armed
                } else {
                    GateState::Cooling {
                        remaining: self.cooldown - elapsed,
                    }
                }
            }
            None => GateState::Armed,
        }
    }

    pub fn is_armed(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == GateState::Armed
    }

    /// Start a new cooldown window at `at`.
    pub fn record_delivery(&mut self, at: DateTime<Utc>) {
        self.last_signal = Some(at);
    }

    pub fn last_signal(&self) -> Option<DateTime<Utc>> {
        self.last_signal
    }
}
