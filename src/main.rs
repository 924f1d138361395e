//! CLI entry point for the toll rater.
//!
//! Loads the vehicle-count, timestamp and distance datasets from CSV, runs
//! one analysis per subcommand and writes tables back to CSV or logs scalar
//! results as JSON.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::ffi::OsStr;
use std::path::Path;
use toll_rater::analyzers::distance::{
    DistanceMatrix, find_ids_within_ten_percentage_threshold, unroll_pairs,
};
use toll_rater::analyzers::tolls::{calculate_time_based_toll_rates, calculate_toll_rate_with};
use toll_rater::analyzers::types::{DistanceRow, NodeId, TimestampRow, VehicleCountRow};
use toll_rater::analyzers::vehicles::{
    filter_routes, generate_car_matrix, get_bus_indexes, get_type_count, multiply_matrix,
    time_check,
};
use toll_rater::config::RateSchedule;
use toll_rater::loader::read_records;
use toll_rater::output::{print_json, print_pretty, write_matrix, write_records};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "toll_rater")]
#[command(about = "Vehicle-count and toll-distance analytics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pivot car counts into an id_1 x id_2 matrix
    CarMatrix {
        /// Vehicle-count CSV (id_1,id_2,route,moto,car,rv,bus,truck)
        #[arg(short, long, default_value = "datasets/dataset-1.csv")]
        input: String,

        /// CSV file to write the matrix to
        #[arg(short, long, default_value = "car_matrix.csv")]
        output: String,

        /// Apply the >20 / <=20 multipliers before writing
        #[arg(long, default_value_t = false)]
        multiply: bool,
    },
    /// Count rows per car type (low, medium, high)
    TypeCount {
        #[arg(short, long, default_value = "datasets/dataset-1.csv")]
        input: String,
    },
    /// List row positions whose bus count exceeds twice the mean
    BusIndexes {
        #[arg(short, long, default_value = "datasets/dataset-1.csv")]
        input: String,
    },
    /// List routes whose average truck count exceeds 7
    FilterRoutes {
        #[arg(short, long, default_value = "datasets/dataset-1.csv")]
        input: String,
    },
    /// Check whether each (id, id_2) pair has records for all seven days
    TimeCheck {
        /// Timestamp CSV (id,id_2,startDay,...)
        #[arg(short, long, default_value = "datasets/dataset-2.csv")]
        input: String,

        /// Optional: CSV file to write the results to instead of logging them
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Build the symmetric cumulative distance matrix
    DistanceMatrix {
        /// Distance CSV (id_start,id_end,distance)
        #[arg(short, long, default_value = "datasets/dataset-3.csv")]
        input: String,

        #[arg(short, long, default_value = "distance_matrix.csv")]
        output: String,
    },
    /// Expand distances into one row per ordered pair of identifiers
    Unroll {
        #[arg(short, long, default_value = "datasets/dataset-3.csv")]
        input: String,

        #[arg(short, long, default_value = "unrolled.csv")]
        output: String,

        /// Take distances from the directed input rows instead of the
        /// symmetric matrix
        #[arg(long, default_value_t = false)]
        directed: bool,
    },
    /// Find ids with a distance within 10% of a reference id's average
    Threshold {
        #[arg(short, long, default_value = "datasets/dataset-3.csv")]
        input: String,

        /// Reference id_start
        #[arg(short, long)]
        reference: NodeId,
    },
    /// Add a toll rate per vehicle class to the unrolled distances
    TollRates {
        #[arg(short, long, default_value = "datasets/dataset-3.csv")]
        input: String,

        #[arg(short, long, default_value = "toll_rates.csv")]
        output: String,

        /// Optional: JSON rate schedule overriding the default coefficients
        #[arg(short, long)]
        schedule: Option<String>,
    },
    /// Price the unrolled distances for every time band of the week
    TimeTolls {
        #[arg(short, long, default_value = "datasets/dataset-3.csv")]
        input: String,

        #[arg(short, long, default_value = "time_based_toll_rates.csv")]
        output: String,

        /// Optional: JSON rate schedule overriding the default bands
        #[arg(short, long)]
        schedule: Option<String>,
    },
}

/// One completeness result, flattened for CSV and JSON output.
#[derive(Debug, Serialize)]
struct CompletenessRow {
    id: NodeId,
    id_2: NodeId,
    complete: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/toll_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("toll_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::CarMatrix {
            input,
            output,
            multiply,
        } => car_matrix(&input, &output, multiply)?,
        Commands::TypeCount { input } => {
            let rows: Vec<VehicleCountRow> = read_records(&input)?;
            print_json(&get_type_count(&rows)?)?;
        }
        Commands::BusIndexes { input } => {
            let rows: Vec<VehicleCountRow> = read_records(&input)?;
            print_json(&get_bus_indexes(&rows)?)?;
        }
        Commands::FilterRoutes { input } => {
            let rows: Vec<VehicleCountRow> = read_records(&input)?;
            print_json(&filter_routes(&rows)?)?;
        }
        Commands::TimeCheck { input, output } => completeness(&input, output.as_deref())?,
        Commands::DistanceMatrix { input, output } => {
            let rows: Vec<DistanceRow> = read_records(&input)?;
            let matrix = DistanceMatrix::from_rows(&rows)?;
            info!(ids = matrix.size(), "Distance matrix built");
            print_pretty(matrix.as_matrix());
            write_matrix(&output, matrix.as_matrix())?;
        }
        Commands::Unroll {
            input,
            output,
            directed,
        } => {
            let rows: Vec<DistanceRow> = read_records(&input)?;
            let unrolled = if directed {
                unroll_pairs(&rows)?
            } else {
                DistanceMatrix::from_rows(&rows)?.unroll()
            };
            info!(rows = unrolled.len(), directed, "Distances unrolled");
            write_records(&output, &unrolled)?;
        }
        Commands::Threshold { input, reference } => {
            let unrolled = load_unrolled(&input)?;
            let ids = find_ids_within_ten_percentage_threshold(&unrolled, reference)?;
            info!(reference, matches = ids.len(), "Threshold search complete");
            print_json(&ids)?;
        }
        Commands::TollRates {
            input,
            output,
            schedule,
        } => {
            let schedule = load_schedule(schedule.as_deref())?;
            let unrolled = load_unrolled(&input)?;
            let tolls = calculate_toll_rate_with(&unrolled, &schedule.coefficients)?;
            write_records(&output, &tolls)?;
        }
        Commands::TimeTolls {
            input,
            output,
            schedule,
        } => {
            let schedule = load_schedule(schedule.as_deref())?;
            let unrolled = load_unrolled(&input)?;
            let timed = calculate_time_based_toll_rates(&unrolled, &schedule)?;
            info!(rows = timed.len(), "Time-based toll rates computed");
            write_records(&output, &timed)?;
        }
    }

    Ok(())
}

#[tracing::instrument]
fn car_matrix(input: &str, output: &str, multiply: bool) -> Result<()> {
    let rows: Vec<VehicleCountRow> = read_records(input)?;
    let matrix = generate_car_matrix(&rows)?;
    let matrix = if multiply {
        multiply_matrix(&matrix)
    } else {
        matrix
    };
    let (r, c) = matrix.shape();
    info!(rows = r, cols = c, "Car matrix built");
    write_matrix(output, &matrix)?;
    Ok(())
}

#[tracing::instrument]
fn completeness(input: &str, output: Option<&str>) -> Result<()> {
    let rows: Vec<TimestampRow> = read_records(input)?;
    let results: Vec<CompletenessRow> = time_check(&rows)?
        .into_iter()
        .map(|((id, id_2), complete)| CompletenessRow { id, id_2, complete })
        .collect();

    let incomplete = results.iter().filter(|r| !r.complete).count();
    info!(pairs = results.len(), incomplete, "Completeness check done");

    match output {
        Some(path) => write_records(path, &results)?,
        None => print_json(&results)?,
    }
    Ok(())
}

/// Loads the distance dataset and expands it through the symmetric matrix.
fn load_unrolled(input: &str) -> Result<Vec<DistanceRow>> {
    let rows: Vec<DistanceRow> = read_records(input)?;
    Ok(DistanceMatrix::from_rows(&rows)?.unroll())
}

fn load_schedule(path: Option<&str>) -> Result<RateSchedule> {
    Ok(match path {
        Some(path) => {
            info!(path, "Loading rate schedule");
            RateSchedule::load(path)?
        }
        None => RateSchedule::default(),
    })
}
