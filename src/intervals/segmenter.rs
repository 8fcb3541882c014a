use crate::intervals::error::SegmentError;
use crate::types::interval::{Interval, MeterReading};
use crate::types::serial_date::SerialDate;

/// Turns an ordered list of meter readings into the intervals that need a
/// weather backfill.
///
/// An interval `{previous, current}` is emitted for every row that is a bare
/// meter reading (no known min/max) and follows another row. The first row
/// only serves as the baseline. Rows must be in non-decreasing date order.
///
/// ```
/// use meteo_backfill::{segment, MeterReading};
///
/// let rows = [
///     MeterReading::with_range(45658.0, 5.0, 15.0),
///     MeterReading::bare(45659.0),
///     MeterReading::with_range(45660.0, 10.0, 20.0),
/// ];
/// let intervals = segment(&rows).unwrap();
/// assert_eq!(intervals.len(), 1);
/// assert_eq!(intervals[0].begin.get(), 45658.0);
/// assert_eq!(intervals[0].end.get(), 45659.0);
/// ```
pub fn segment(readings: &[MeterReading]) -> Result<Vec<Interval>, SegmentError> {
    let mut previous: Option<SerialDate> = None;
    let mut intervals = Vec::new();

    for (index, reading) in readings.iter().enumerate() {
        let current = reading.date.ok_or(SegmentError::MissingDate { index })?;

        if let Some(previous) = previous {
            if current < previous {
                return Err(SegmentError::OutOfOrderDate {
                    index,
                    previous,
                    current,
                });
            }
            if !reading.has_known_range() {
                intervals.push(Interval::new(previous, current));
            }
        }

        previous = Some(current);
    }

    Ok(intervals)
}
