use crate::types::serial_date::SerialDate;

/// One spreadsheet row: a meter reading date and, for rows that were
/// already summarized, their known minimum and maximum temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeterReading {
    pub date: Option<SerialDate>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl MeterReading {
    /// A bare meter reading, with no precomputed range.
    pub fn bare(date: f64) -> Self {
        Self {
            date: Some(SerialDate(date)),
            min: None,
            max: None,
        }
    }

    /// A row that already carries its min/max.
    pub fn with_range(date: f64, min: f64, max: f64) -> Self {
        Self {
            date: Some(SerialDate(date)),
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn has_known_range(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

/// A `[begin, end]` window of serial dates that needs a temperature summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub begin: SerialDate,
    pub end: SerialDate,
}

impl Interval {
    pub fn new(begin: SerialDate, end: SerialDate) -> Self {
        Self { begin, end }
    }

    pub fn is_zero_width(&self) -> bool {
        self.end.get() - self.begin.get() == 0.0
    }
}
