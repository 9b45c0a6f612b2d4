use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// Source of "now" in the client's timezone. Calendar-day checks use it.
pub type Clock = Arc<dyn Fn() -> DateTime<FixedOffset> + Send + Sync>;

/// Wall clock at a fixed UTC offset in hours. Offsets outside ±23h fall back
/// to UTC.
pub fn system_clock(offset_hours: i32) -> Clock {
    let offset = FixedOffset::east_opt(offset_hours * 3600).unwrap_or_else(|| {
        tracing::warn!(offset_hours, "invalid timezone offset, using UTC");
        Utc.fix()
    });
    Arc::new(move || Utc::now().with_timezone(&offset))
}

/// Clock frozen at `at`.
pub fn fixed_clock(at: DateTime<FixedOffset>) -> Clock {
    Arc::new(move || at)
}
