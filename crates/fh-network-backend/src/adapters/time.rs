//! System clock adapter.

use crate::ports::outbound::TimeSource;
use chrono::{DateTime, Utc};

/// Wall-clock time source.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
