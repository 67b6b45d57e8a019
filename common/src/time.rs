use chrono::{DateTime, Utc};

/// Wall-clock "now" used for upstream query windows.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}
