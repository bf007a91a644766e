use super::plot::parse_years;
use super::{ChartOptions, Metric, PlotError, Result, SimSeries, VERSION};
use clap::{App, Arg};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub chart: ChartOptions,
    pub verbose: bool,
}

/// What could not be plotted, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub item: String,
    pub reason: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub failed: Vec<Failure>,
}

/// Takes the CLI arguments for plotting every simulation file in a folder.
pub fn parse_cli() -> std::result::Result<BatchConfig, String> {
    let years = ChartOptions::default().max_years.to_string();
    let arg_input = Arg::with_name("input_dir")
        .help("folder with the simulation .txt files")
        .short("i")
        .long("input")
        .takes_value(true)
        .default_value("input");
    let arg_output = Arg::with_name("output_dir")
        .help("folder for the graphs, created if missing")
        .short("o")
        .long("output")
        .takes_value(true)
        .default_value("output");
    let arg_years = Arg::with_name("years")
        .help("number of years spanned by the simulations")
        .long("years")
        .takes_value(true)
        .default_value(&years);
    let arg_verbose = Arg::with_name("verbose")
        .help("debug logging")
        .short("v")
        .long("verbose");
    let cli_args = App::new("tubesim_batch")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to plot all the tube simulations in a folder")
        .arg(arg_input)
        .arg(arg_output)
        .arg(arg_years)
        .arg(arg_verbose)
        .get_matches();

    let chart = ChartOptions {
        max_years: parse_years(&cli_args)?,
        ..ChartOptions::default()
    };
    Ok(BatchConfig {
        input_dir: PathBuf::from(cli_args.value_of("input_dir").unwrap_or_default()),
        output_dir: PathBuf::from(cli_args.value_of("output_dir").unwrap_or_default()),
        chart,
        verbose: cli_args.is_present("verbose"),
    })
}

/// all the .txt files directly under dir, sorted
pub fn list_input_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PlotError::MissingInput(dir.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| PlotError::io(dir, e))? {
        let path = entry.map_err(|e| PlotError::io(dir, e))?.path();
        if path.is_file() && path.extension().map_or(false, |e| e == "txt") {
            files.push(path);
        }
    }
    if files.is_empty() {
        return Err(PlotError::NoInputFiles(dir.to_path_buf()));
    }
    files.sort();
    Ok(files)
}

pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{}_graph.png", stem))
}

/// Plots every input file; a failing file is logged and the batch goes on.
pub fn run_batch(config: &BatchConfig) -> Result<BatchReport> {
    let files = list_input_files(&config.input_dir)?;
    fs::create_dir_all(&config.output_dir).map_err(|e| PlotError::io(&config.output_dir, e))?;
    info!("found {} files to process", files.len());

    let mut report = BatchReport::default();
    for (i, file) in files.iter().enumerate() {
        let name = file.file_name().unwrap_or_default().to_string_lossy();
        info!("[{}/{}] processing: {}", i + 1, files.len(), name);
        let fout = output_path_for(file, &config.output_dir);
        match process_file(file, &fout, &config.chart) {
            Ok(()) => {
                info!("plot saved to: {}", fout.display());
                report.processed += 1;
            }
            Err(e) => {
                error!("{}", e);
                report.failed.push(Failure {
                    item: file.display().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(report)
}

fn process_file(fin: &Path, fout: &Path, chart: &ChartOptions) -> Result<()> {
    let series = SimSeries::from_file(fin)?;
    log_ranges(&series);
    series.plot_metrics(fout, chart)
}

/// data points and the range of each metric, counts without decimals
pub fn log_ranges(series: &SimSeries) {
    info!("  data points: {}", series.len());
    for &metric in Metric::ALL.iter() {
        if let Some(s) = series.summary(metric) {
            let decimals = match metric {
                Metric::LostObjects | Metric::FailedReads => 0,
                Metric::LostPercent | Metric::FailedPercent => 2,
            };
            info!(
                "  {} range: {:.*} - {:.*}",
                metric.label(),
                decimals,
                s.min,
                decimals,
                s.max
            );
        }
    }
}
