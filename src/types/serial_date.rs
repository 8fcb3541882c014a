use std::fmt;
use std::fmt::{Display, Formatter};

/// A spreadsheet serial date: whole days since the 1900 epoch, with the
/// fraction encoding the time of day (`fraction * 86_400` seconds).
///
/// Serial `1` is `01/01/1900 00:00:00`. Values below `1` are not addressable.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct SerialDate(pub f64);

impl SerialDate {
    pub fn get(self) -> f64 {
        self.0
    }

    pub fn is_addressable(self) -> bool {
        self.0.is_finite() && self.0 >= 1.0
    }
}

impl From<f64> for SerialDate {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl Display for SerialDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
