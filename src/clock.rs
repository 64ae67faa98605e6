use chrono::{DateTime, Local, TimeZone, Utc};

/// Source of "now" and of the zone the calendar is laid out in.
pub trait Clock: Send + Sync + 'static {
    type Zone: TimeZone;

    fn now(&self) -> DateTime<Self::Zone>;

    fn zone(&self) -> Self::Zone {
        self.now().timezone()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Zone = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock frozen at a given UTC instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    type Zone = Utc;

    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
