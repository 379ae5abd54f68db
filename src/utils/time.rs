use crate::error::AacgmError;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use std::fmt;

/// A UTC date and time with one-second resolution, as the engine consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Wraps `datetime`, dropping anything finer than a second.
    pub fn new(datetime: NaiveDateTime) -> Timestamp {
        Timestamp(datetime.with_nanosecond(0).unwrap_or(datetime))
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn second(&self) -> u32 {
        self.0.second()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Anything a caller may hand over as the time of a conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeInput {
    /// A bare date, taken as midnight UTC
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Raw calendar fields, not yet known to form a real date
    Calendar {
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    },
}

impl From<NaiveDate> for TimeInput {
    fn from(value: NaiveDate) -> Self {
        TimeInput::Date(value)
    }
}

impl From<NaiveDateTime> for TimeInput {
    fn from(value: NaiveDateTime) -> Self {
        TimeInput::DateTime(value)
    }
}

impl From<DateTime<Utc>> for TimeInput {
    fn from(value: DateTime<Utc>) -> Self {
        TimeInput::DateTime(value.naive_utc())
    }
}

impl From<Timestamp> for TimeInput {
    fn from(value: Timestamp) -> Self {
        TimeInput::DateTime(value.0)
    }
}

/// Promotes a time input to a fully specified [`Timestamp`].
///
/// # Errors
/// Will return `Err` if calendar fields do not describe a real date and time.
pub fn normalize_time(input: impl Into<TimeInput>) -> Result<Timestamp, AacgmError> {
    let input: TimeInput = input.into();
    match input {
        TimeInput::Date(date) => Ok(Timestamp::new(date.and_hms_opt(0, 0, 0).ok_or_else(
            || AacgmError::InvalidInput(format!("unable to promote {date} to a datetime")),
        )?)),
        TimeInput::DateTime(datetime) => Ok(Timestamp::new(datetime)),
        TimeInput::Calendar {
            year,
            month,
            day,
            hour,
            minute,
            second,
        } => NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, second))
            .map(Timestamp::new)
            .ok_or_else(|| {
                AacgmError::InvalidInput(format!(
                    "time variable (dtime) must be a valid datetime, got \
                     {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
                ))
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_is_promoted_to_midnight() {
        let date = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let stamp = normalize_time(date).unwrap();
        assert_eq!(stamp.datetime(), date.and_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn subseconds_are_dropped() {
        let dt = NaiveDate::from_ymd_opt(2015, 3, 17)
            .unwrap()
            .and_hms_milli_opt(4, 5, 6, 789)
            .unwrap();
        let stamp = normalize_time(dt).unwrap();
        assert_eq!(
            (stamp.hour(), stamp.minute(), stamp.second()),
            (4, 5, 6)
        );
        assert_eq!(stamp.to_string(), "2015-03-17 04:05:06");
    }

    #[test]
    fn impossible_calendar_is_rejected() {
        let res = normalize_time(TimeInput::Calendar {
            year: 2015,
            month: 2,
            day: 30,
            hour: 0,
            minute: 0,
            second: 0,
        });
        assert!(matches!(res, Err(AacgmError::InvalidInput(_))));
    }

    #[test]
    fn calendar_fields_pass_through() {
        let stamp = normalize_time(TimeInput::Calendar {
            year: 2010,
            month: 12,
            day: 31,
            hour: 23,
            minute: 59,
            second: 59,
        })
        .unwrap();
        assert_eq!(stamp.year(), 2010);
        assert_eq!(stamp.month(), 12);
        assert_eq!(stamp.day(), 31);
    }
}
