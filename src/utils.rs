use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::parsing::error::{PResult, ParsingError};

pub const MINUTES_PER_HALF_DAY: u32 = 12 * 60;

pub fn create_time(hour: u32, minute: u32) -> PResult<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| ParsingError::UnparseableTimeToken(format!("{hour}:{minute:02}")))
}

/// Whole days from `start` to `date`; negative when `date` comes first.
pub fn days_since(start: NaiveDate, date: NaiveDate) -> i64 {
    (date - start).num_days()
}

pub fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}
