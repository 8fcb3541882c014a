use chrono_tz::Tz;
use clap::Parser;
use log::{error, info};
use meteo_backfill::{
    read_meter_readings, write_summaries, Backfill, BackfillError, OutputFormat, ScraperConfig,
    SerialClock, DEFAULT_HEADER_ROW, DEFAULT_SHEET,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

/// Fill in the temperature statistics of spreadsheet meter readings.
#[derive(Debug, Parser)]
#[command(name = "meteo-backfill", version, about)]
struct Args {
    /// Workbook holding the meter readings (.xlsx, .xls, .ods).
    input: PathBuf,

    /// Sheet holding the readings.
    #[arg(long, default_value = DEFAULT_SHEET)]
    sheet: String,

    /// Zero-based index of the header row.
    #[arg(long, default_value_t = DEFAULT_HEADER_ROW)]
    header_row: usize,

    /// Weather station name, as known by the observation site.
    #[arg(long, default_value = "Bressuire")]
    station: String,

    /// Timezone label of the spreadsheet dates.
    #[arg(long, default_value = "Europe/Paris", value_parser = parse_timezone)]
    timezone: Tz,

    /// Station lookup endpoint.
    #[arg(long, env = "METEO_API_BASE_URL")]
    lookup_url: Option<String>,

    /// Day-scoped observation page.
    #[arg(long, env = "METEO_OBSERVATION_URL")]
    observation_url: Option<String>,

    #[arg(long, env = "USER_AGENT")]
    user_agent: Option<String>,

    /// Station lookup attempts before giving up.
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Output file; summaries go to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
}

fn parse_timezone(name: &str) -> Result<Tz, String> {
    name.parse::<Tz>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&filters)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{} ({:?})", e, e.kind());
            let mut source = e.source();
            while let Some(cause) = source {
                error!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), BackfillError> {
    let config = ScraperConfig::builder()
        .maybe_station_lookup_url(args.lookup_url)
        .maybe_observation_url(args.observation_url)
        .maybe_user_agent(args.user_agent)
        .maybe_max_attempts(args.max_attempts)
        .build();
    let clock = SerialClock::builder().timezone(args.timezone).build();

    let readings = read_meter_readings(&args.input, &args.sheet, args.header_row)?;
    let backfill = Backfill::new(config, clock)?;
    let summaries = backfill.run(&args.station, &readings).await?;

    let gaps = summaries.iter().filter(|s| s.is_gap()).count();
    info!("{} intervals summarized, {} without data", summaries.len(), gaps);

    write_summaries(
        args.output.as_deref(),
        args.format,
        &summaries,
        backfill.clock(),
    )?;
    Ok(())
}
