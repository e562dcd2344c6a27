use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::{Error, Result};

/// Day-first calendar format accepted on the wire.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse a `DD/MM/YYYY` date into midnight of that day.
pub fn parse_event_date(field: &str, raw: &str) -> Result<NaiveDateTime> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| {
            Error::validation(format!(
                "Invalid {} '{}': expected DD/MM/YYYY.",
                field, raw
            ))
        })
}
