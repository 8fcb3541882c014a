use crate::clock::serial_clock::SerialClock;
use crate::sheet::error::SheetError;
use crate::types::summary::IntervalSummary;
use log::info;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

/// Serialized shape of one summary, shared by both formats.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryRecord<T> {
    weather_station_id: String,
    start_date: String,
    end_date: String,
    min_temperature: Option<T>,
    max_temperature: Option<T>,
    average_temperature: Option<T>,
    median_temperature: Option<T>,
}

impl<T> SummaryRecord<T> {
    fn new(summary: &IntervalSummary, clock: &SerialClock, temperature: impl Fn(f64) -> T) -> Self {
        Self {
            weather_station_id: summary.station_id.clone(),
            start_date: clock.format(&summary.start_date),
            end_date: clock.format(&summary.end_date),
            min_temperature: summary.min_temperature.map(&temperature),
            max_temperature: summary.max_temperature.map(&temperature),
            average_temperature: summary.average_temperature.map(&temperature),
            median_temperature: summary.median_temperature.map(&temperature),
        }
    }
}

/// Writes the summaries to `path`, or to stdout when no path is given.
pub fn write_summaries(
    path: Option<&Path>,
    format: OutputFormat,
    summaries: &[IntervalSummary],
    clock: &SerialClock,
) -> Result<(), SheetError> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| SheetError::Write(path.to_path_buf(), e))?;
            let mut writer = BufWriter::new(file);
            write_to(&mut writer, format, summaries, clock)?;
            writer
                .flush()
                .map_err(|e| SheetError::Write(path.to_path_buf(), e))?;
            info!("Wrote {} summaries to {}", summaries.len(), path.display());
            Ok(())
        }
        None => write_to(std::io::stdout().lock(), format, summaries, clock),
    }
}

/// CSV temperatures carry exactly two decimals and are blank when absent.
/// JSON temperatures are numbers, `null` when absent.
pub fn write_to<W: Write>(
    writer: W,
    format: OutputFormat,
    summaries: &[IntervalSummary],
    clock: &SerialClock,
) -> Result<(), SheetError> {
    match format {
        OutputFormat::Csv => {
            let mut csv = csv::Writer::from_writer(writer);
            for summary in summaries {
                csv.serialize(SummaryRecord::new(summary, clock, |t| format!("{:.2}", t)))?;
            }
            if summaries.is_empty() {
                csv.write_record(HEADER)?;
            }
            csv.flush().map_err(csv::Error::from)?;
            Ok(())
        }
        OutputFormat::Json => {
            let records: Vec<SummaryRecord<f64>> = summaries
                .iter()
                .map(|summary| SummaryRecord::new(summary, clock, |t| t))
                .collect();
            let mut writer = writer;
            serde_json::to_writer_pretty(&mut writer, &records)?;
            writeln!(writer).map_err(serde_json::Error::io)?;
            Ok(())
        }
    }
}

const HEADER: [&str; 7] = [
    "weatherStationId",
    "startDate",
    "endDate",
    "minTemperature",
    "maxTemperature",
    "averageTemperature",
    "medianTemperature",
];
