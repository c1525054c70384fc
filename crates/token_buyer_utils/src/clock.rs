use chrono::Utc;

/// Source of the wall-clock time used for router deadlines.
pub trait Clock: Send + Sync {
    /// Seconds since the unix epoch.
    fn now_timestamp(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_timestamp(&self) -> u64 {
        Utc::now().timestamp().max(0) as u64
    }
}
