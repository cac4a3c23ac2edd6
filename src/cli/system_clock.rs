use std::{env, sync::Arc};

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, Utc};

use cuotas_config::Config;
use cuotas_core::{Clock, FixedClock, OffsetClock};

/// Pins "today" for reproducible sessions and tests (`YYYY-MM-DD`).
pub const TODAY_ENV: &str = "CUOTAS_TODAY";

/// Real-time clock observed from the host time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&Local).naive_local()
    }
}

/// Picks the clock for a session: a pinned date wins, then the configured
/// fixed offset, then the host zone. A pinned date is observed from the
/// configured offset (UTC when none is set).
pub fn clock_for(config: &Config) -> Arc<dyn Clock> {
    let pinned = env::var(TODAY_ENV)
        .ok()
        .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok());
    clock_with(config, pinned)
}

fn clock_with(config: &Config, pinned: Option<NaiveDate>) -> Arc<dyn Clock> {
    let offset = config
        .utc_offset_minutes
        .and_then(|minutes| minutes.checked_mul(60))
        .and_then(FixedOffset::east_opt);
    match (pinned, offset) {
        (Some(date), offset) => Arc::new(FixedClock::at_local_noon(
            date,
            offset.unwrap_or_else(|| Utc.fix()),
        )),
        (None, Some(offset)) => Arc::new(OffsetClock::new(offset)),
        (None, None) => Arc::new(SystemClock),
    }
}
