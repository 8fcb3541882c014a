//! Conversion between spreadsheet serial dates and labeled civil datetimes.
//!
//! The serial encoding counts `01/01/1900` as day 1 and, like the spreadsheet
//! software that produced it, believes `29/02/1900` existed (serial 60). Serials
//! up to 59 are therefore offset by one day from the epoch and serials from 60
//! on by two. The quirk is part of the on-disk format and is reproduced exactly
//! in both directions.
//!
//! Arithmetic runs on a naive (UTC-equivalent) clock and the resulting digits
//! are then labeled with the target timezone, see [`CivilDateTime`].

use crate::clock::error::SerialClockError;
use crate::types::civil::CivilDateTime;
use crate::types::serial_date::SerialDate;
use bon::bon;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use chrono_tz::Tz;

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Paris;
/// `DD/MM/YYYY`
pub const DATE_FORMAT: &str = "%d/%m/%Y";
/// `HH:mm:ss`
pub const HOUR_FORMAT: &str = "%H:%M:%S";
/// `DD/MM/YYYY HH:mm:ss`
pub const DATETIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

const MILLIS_PER_DAY: f64 = 86_400_000.0;
// 29/02/1900, a day that never existed.
const PHANTOM_LEAP_DAY_SERIAL: f64 = 60.0;
// Fractional digits kept by `to_serial`.
const SERIAL_PRECISION: f64 = 1e11;

const SERIAL_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(1900, 1, 1) {
    Some(date) => date,
    None => panic!("invalid serial epoch"),
};

fn serial_epoch() -> NaiveDateTime {
    SERIAL_EPOCH.and_time(NaiveTime::MIN)
}

/// Immutable conversion settings: the timezone label attached to civil
/// values and the patterns used to parse and render them.
#[derive(Debug, Clone, PartialEq)]
pub struct SerialClock {
    timezone: Tz,
    date_format: String,
    hour_format: String,
    datetime_format: String,
}

#[bon]
impl SerialClock {
    /// Builds a clock; every setting is optional.
    ///
    /// ```
    /// use meteo_backfill::SerialClock;
    ///
    /// let clock = SerialClock::builder()
    ///     .timezone(chrono_tz::Europe::Paris)
    ///     .build();
    /// let civil = clock.to_civil(45505.33472222222.into()).unwrap();
    /// assert_eq!(clock.format(&civil), "01/08/2024 08:02:00");
    /// ```
    #[builder]
    pub fn new(
        timezone: Option<Tz>,
        #[builder(into)] date_format: Option<String>,
        #[builder(into)] hour_format: Option<String>,
        #[builder(into)] datetime_format: Option<String>,
    ) -> Self {
        Self {
            timezone: timezone.unwrap_or(DEFAULT_TIMEZONE),
            date_format: date_format.unwrap_or_else(|| DATE_FORMAT.to_string()),
            hour_format: hour_format.unwrap_or_else(|| HOUR_FORMAT.to_string()),
            datetime_format: datetime_format.unwrap_or_else(|| DATETIME_FORMAT.to_string()),
        }
    }
}

impl Default for SerialClock {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SerialClock {
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Converts a serial into a civil datetime labeled with the clock's timezone.
    pub fn to_civil(&self, serial: SerialDate) -> Result<CivilDateTime, SerialClockError> {
        self.to_civil_in(serial, self.timezone)
    }

    /// Converts a serial into a civil datetime labeled with `timezone`.
    ///
    /// The label is attached without shifting the digits: serial
    /// `45505.33472222222` is `01/08/2024 08:02:00` whatever the zone.
    pub fn to_civil_in(
        &self,
        serial: SerialDate,
        timezone: Tz,
    ) -> Result<CivilDateTime, SerialClockError> {
        let value = serial.get();
        if !serial.is_addressable() {
            return Err(SerialClockError::InvalidDate(value));
        }

        let days_offset = if value >= PHANTOM_LEAP_DAY_SERIAL {
            value - 2.0
        } else {
            value - 1.0
        };
        // Rounding to the millisecond absorbs the binary noise of the fraction.
        let millis = (days_offset * MILLIS_PER_DAY).round();
        let naive = TimeDelta::try_milliseconds(millis as i64)
            .and_then(|delta| serial_epoch().checked_add_signed(delta))
            .ok_or(SerialClockError::OutOfRange(value))?;

        Ok(CivilDateTime::new(naive, timezone))
    }

    /// Parses a civil string with the clock's datetime pattern into a serial.
    pub fn to_serial(&self, text: &str) -> Result<SerialDate, SerialClockError> {
        self.to_serial_with(text, &self.datetime_format)
    }

    /// Parses `text` strictly against `pattern` and converts it into a serial.
    ///
    /// The parsed digits are read as if they were UTC, mirroring
    /// [`SerialClock::to_civil_in`]. The result is truncated to 11 fractional
    /// digits.
    pub fn to_serial_with(&self, text: &str, pattern: &str) -> Result<SerialDate, SerialClockError> {
        let invalid = || SerialClockError::InvalidFormat {
            input: text.to_string(),
            format: pattern.to_string(),
        };

        let naive = NaiveDateTime::parse_from_str(text, pattern).map_err(|_| invalid())?;
        // Strict: "1/3/1900 0:00:00" parses but is not in canonical form.
        if naive.format(pattern).to_string() != text {
            return Err(invalid());
        }

        let millis = naive.signed_duration_since(serial_epoch()).num_milliseconds();
        let days_offset = millis as f64 / MILLIS_PER_DAY;
        let serial = if days_offset >= PHANTOM_LEAP_DAY_SERIAL - 1.0 {
            days_offset + 2.0
        } else {
            days_offset + 1.0
        };

        Ok(SerialDate((serial * SERIAL_PRECISION).floor() / SERIAL_PRECISION))
    }

    /// Renders with the datetime pattern (`DD/MM/YYYY HH:mm:ss` by default).
    pub fn format(&self, civil: &CivilDateTime) -> String {
        civil.format(&self.datetime_format)
    }

    /// Renders the calendar day only (`DD/MM/YYYY` by default).
    pub fn format_date(&self, civil: &CivilDateTime) -> String {
        civil.format(&self.date_format)
    }

    /// Renders the time of day only (`HH:mm:ss` by default).
    pub fn format_hour_of_day(&self, civil: &CivilDateTime) -> String {
        civil.format(&self.hour_format)
    }

    /// Formats a serial for messages, e.g. `01/08/2024 08:02:00`.
    pub fn serial_to_string(&self, serial: SerialDate) -> Result<String, SerialClockError> {
        self.to_civil(serial).map(|civil| self.format(&civil))
    }

    /// Builds the datetime of a scraped row: the calendar day of `day`, at
    /// the normalized `HH:MM` hour. `24:MM` rolls over into the next day.
    pub fn civil_at(
        &self,
        day: &CivilDateTime,
        hour: &str,
    ) -> Result<CivilDateTime, SerialClockError> {
        let invalid = |reason| SerialClockError::InvalidHour {
            token: hour.to_string(),
            reason,
        };

        let (hours, minutes) = hour.split_once(':').ok_or_else(|| invalid("expected HH:MM"))?;
        let hours: i64 = hours.parse().map_err(|_| invalid("hour is not a number"))?;
        let minutes: u32 = minutes
            .parse()
            .map_err(|_| invalid("minute is not a number"))?;

        let naive = NaiveTime::from_hms_opt(0, minutes, 0)
            .map(|time| day.date().and_time(time))
            .zip(TimeDelta::try_hours(hours))
            .and_then(|(start, delta)| start.checked_add_signed(delta))
            .ok_or_else(|| invalid("hour or minute out of range"))?;

        Ok(CivilDateTime::new(naive, day.timezone()))
    }
}

/// Normalizes an hour token as printed by the observation site (`9h05`,
/// ` 14 h 30 `) into zero-padded `HH:MM`.
///
/// The first ASCII letter (or a `:`) separates hours from minutes. Hours must
/// be in `[0, 24]` and minutes in `[0, 59]`.
pub fn format_hour(token: Option<&str>) -> Result<String, SerialClockError> {
    let raw = token.ok_or(SerialClockError::MissingHour)?;
    let invalid = |reason| SerialClockError::InvalidHour {
        token: raw.to_string(),
        reason,
    };

    let (hours, minutes) = raw
        .split_once(|c: char| c.is_ascii_alphabetic() || c == ':')
        .ok_or_else(|| invalid("hour value format is incorrect"))?;

    let hours: u32 = hours
        .trim()
        .parse()
        .map_err(|_| invalid("hour value format is incorrect"))?;
    let minutes: u32 = minutes
        .trim()
        .parse()
        .map_err(|_| invalid("hour value format is incorrect"))?;

    if hours > 24 || minutes > 59 {
        return Err(invalid("hour or minute values are invalid"));
    }

    Ok(format!("{:02}:{:02}", hours, minutes))
}
