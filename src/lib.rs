use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
pub mod batch;
pub mod compare;
pub mod error;
pub mod plot;

pub use error::{PlotError, Result};

pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

/// lines before the first data row in a simulation output file
pub const HEADER_LINES: usize = 4;
/// rows with fewer fields are ignored
pub const MIN_FIELDS: usize = 12;
pub const COL_TIME: usize = 0;

/// the simulations span this many years, whatever their time unit
pub const MAX_YEARS: f64 = 10.0;

pub const CHART_FONT: &str = "sans-serif";

/// The metrics tracked by the simulation, in the order they are plotted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    LostObjects,
    LostPercent,
    FailedReads,
    FailedPercent,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::LostObjects,
        Metric::LostPercent,
        Metric::FailedReads,
        Metric::FailedPercent,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::LostObjects => "Lost Objects",
            Metric::LostPercent => "Lost Percent (%)",
            Metric::FailedReads => "Failed Reads",
            Metric::FailedPercent => "Failed Percent (%)",
        }
    }

    /// column of the metric in the simulation output
    pub fn column(self) -> usize {
        match self {
            Metric::LostObjects => 8,
            Metric::LostPercent => 9,
            Metric::FailedReads => 10,
            Metric::FailedPercent => 11,
        }
    }

    pub fn color(self) -> RGBColor {
        match self {
            Metric::LostObjects => RGBColor(230, 57, 70),
            Metric::LostPercent => RGBColor(69, 123, 157),
            Metric::FailedReads => RGBColor(42, 157, 143),
            Metric::FailedPercent => RGBColor(233, 196, 106),
        }
    }

    fn index(self) -> usize {
        match self {
            Metric::LostObjects => 0,
            Metric::LostPercent => 1,
            Metric::FailedReads => 2,
            Metric::FailedPercent => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSummary {
    pub min: f64,
    pub max: f64,
    pub last: f64,
}

/// Size and horizon of a rendered chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    pub max_years: f64,
}

impl Default for ChartOptions {
    /// 14x10 inches at 150 dpi
    fn default() -> Self {
        ChartOptions {
            width: 2100,
            height: 1500,
            max_years: MAX_YEARS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Bitmap,
}

impl OutputFormat {
    /// svg for a .svg extension (any case), bitmap otherwise
    pub fn from_path(p: &Path) -> OutputFormat {
        match p.extension().and_then(|e| e.to_str()) {
            Some(e) if e.eq_ignore_ascii_case("svg") => OutputFormat::Svg,
            _ => OutputFormat::Bitmap,
        }
    }
}

/// The main struct for the simulation time series
#[derive(Debug, Clone)]
pub struct SimSeries {
    pub source_name: String,
    pub time: Vec<f64>,
    metrics: [Vec<f64>; 4],
    pub skipped: usize,
}

impl SimSeries {
    pub fn new(source_name: &str, capacity: usize) -> SimSeries {
        SimSeries {
            source_name: source_name.to_string(),
            time: Vec::with_capacity(capacity),
            metrics: [
                Vec::with_capacity(capacity),
                Vec::with_capacity(capacity),
                Vec::with_capacity(capacity),
                Vec::with_capacity(capacity),
            ],
            skipped: 0,
        }
    }

    /// Init a SimSeries from a simulation output file.
    /// Rows that are too short or not numeric are skipped and counted,
    /// but a file without a single valid row is an error.
    pub fn from_file(fin: &Path) -> Result<SimSeries> {
        if !fin.exists() {
            return Err(PlotError::MissingInput(fin.to_path_buf()));
        }
        let file = File::open(fin).map_err(|e| PlotError::io(fin, e))?;
        let source_name = fin
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| fin.display().to_string());
        SimSeries::from_reader(BufReader::new(file), &source_name)
    }

    pub fn from_reader<R: BufRead>(reader: R, source_name: &str) -> Result<SimSeries> {
        let mut series = SimSeries::new(source_name, 10000);
        for (n, l) in reader.lines().enumerate().skip(HEADER_LINES) {
            let line = l.map_err(|e| PlotError::io(source_name, e))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match parse_row(line) {
                Some((t, values)) => series.push(t, values),
                None => {
                    debug!("{}: skipping malformed line {}", source_name, n + 1);
                    series.skipped += 1;
                }
            }
        }
        if series.is_empty() {
            return Err(PlotError::NoData {
                source_name: source_name.to_string(),
                skipped: series.skipped,
            });
        }
        if series.skipped > 0 {
            warn!(
                "{}: skipped {} malformed rows, kept {}",
                source_name,
                series.skipped,
                series.len()
            );
        }
        Ok(series)
    }

    pub fn push(&mut self, t: f64, values: [f64; 4]) {
        self.time.push(t);
        for (m, v) in self.metrics.iter_mut().zip(values.iter()) {
            m.push(*v);
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn values(&self, metric: Metric) -> &[f64] {
        &self.metrics[metric.index()]
    }

    /// timestamps rescaled so that the latest simulated instant is max_years
    pub fn years(&self, max_years: f64) -> Vec<f64> {
        scale_to_years(&self.time, max_years)
    }

    pub fn summary(&self, metric: Metric) -> Option<MetricSummary> {
        let values = self.values(metric);
        let (min, max) = min_and_max(values)?;
        let last = *values.last()?;
        Some(MetricSummary { min, max, last })
    }

    /// plots the four metrics as a 2x2 grid, svg or bitmap depending on the extension
    pub fn plot_metrics(&self, fout: &Path, opts: &ChartOptions) -> Result<()> {
        let title = format!("Simulation Metrics Over Time - {}", self.source_name);
        let size = (opts.width, opts.height);
        match OutputFormat::from_path(fout) {
            OutputFormat::Svg => {
                let root = SVGBackend::new(fout, size).into_drawing_area();
                self.draw_metrics(&root, &title, opts.max_years)
                    .map_err(|e| PlotError::render(fout, e))?;
                root.present().map_err(|e| PlotError::render(fout, e))?;
            }
            OutputFormat::Bitmap => {
                let root = BitMapBackend::new(fout, size).into_drawing_area();
                self.draw_metrics(&root, &title, opts.max_years)
                    .map_err(|e| PlotError::render(fout, e))?;
                root.present().map_err(|e| PlotError::render(fout, e))?;
            }
        }
        Ok(())
    }

    fn draw_metrics<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        title: &str,
        max_years: f64,
    ) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&WHITE)?;
        let area = root.titled(title, (CHART_FONT, 36))?;
        let panels = area.split_evenly((2, 2));
        let years = self.years(max_years);
        let every = marker_step(years.len(), 50);

        for (panel, &metric) in panels.iter().zip(Metric::ALL.iter()) {
            let values = self.values(metric);
            let color = metric.color();
            let (ymin, ymax) = padded_range(values);
            let mut chart = ChartBuilder::on(panel)
                .caption(metric.label(), (CHART_FONT, 26).into_font())
                .margin(20)
                .x_label_area_size(60)
                .y_label_area_size(110)
                .build_cartesian_2d(0f64..max_years, ymin..ymax)?;
            chart
                .configure_mesh()
                .light_line_style(&RGBColor(235, 235, 235))
                .bold_line_style(RGBColor(200, 200, 200).stroke_width(1))
                .label_style((CHART_FONT, 18))
                .x_desc("Time (Years)")
                .y_desc(metric.label())
                .x_label_formatter(&|x: &f64| format!("{:.0}", x))
                .y_label_formatter(&|y: &f64| format_thousands(*y, 1))
                .draw()?;

            let points = years.iter().copied().zip(values.iter().copied());
            chart.draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?;
            chart.draw_series(
                points
                    .step_by(every)
                    .map(|(x, y)| Circle::new((x, y), 3, color.filled())),
            )?;

            if let Some(s) = self.summary(metric) {
                let yspan = ymax - ymin;
                let xpos = max_years * 0.02;
                let stats = [
                    format!("Max: {}", format_thousands(s.max, 2)),
                    format!("Final: {}", format_thousands(s.last, 2)),
                ];
                chart.draw_series(stats.iter().enumerate().map(|(i, text)| {
                    Text::new(
                        text.clone(),
                        (xpos, ymax - yspan * (0.03 + 0.08 * i as f64)),
                        (CHART_FONT, 20).into_font(),
                    )
                }))?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for SimSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "time, m_lost_objects, m_lost_percent, m_failed_reads, m_failed_percent"
        )?;
        for i in 0..self.len() {
            write!(f, "{}", self.time[i])?;
            for m in self.metrics.iter() {
                write!(f, ",{}", m[i])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Installs the stderr log subscriber; RUST_LOG overrides the verbosity flag.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Parses one data row into the timestamp and the four metrics.
fn parse_row(line: &str) -> Option<(f64, [f64; 4])> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }
    let t = fields[COL_TIME].parse().ok()?;
    let mut values = [0f64; 4];
    for (v, metric) in values.iter_mut().zip(Metric::ALL.iter()) {
        *v = fields[metric.column()].parse().ok()?;
    }
    Some((t, values))
}

/// Scale timestamps so that the maximum timestamp maps to max_years.
/// Empty input and an all-zero maximum are returned unchanged.
pub fn scale_to_years(timestamps: &[f64], max_years: f64) -> Vec<f64> {
    let tmax = match min_and_max(timestamps) {
        Some((_, tmax)) if tmax != 0. => tmax,
        _ => return timestamps.to_vec(),
    };
    let scale = max_years / tmax;
    timestamps.iter().map(|t| t * scale).collect()
}

pub fn min_and_max<T: std::cmp::PartialOrd + Copy>(s: &[T]) -> Option<(T, T)> {
    let mut self_iter = s.iter();
    let (mut min, mut max) = match self_iter.next() {
        Some(v) => (*v, *v),
        None => return None,
    };
    for es in self_iter {
        if *es > max {
            max = *es
        }
        if *es < min {
            min = *es
        }
    }
    Some((min, max))
}

/// draw a marker every n points, at least one
pub fn marker_step(len: usize, markers: usize) -> usize {
    std::cmp::max(1, len / markers)
}

/// y range with a 10% margin on both sides; flat series get a unit margin
pub fn padded_range(values: &[f64]) -> (f64, f64) {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (ymin, ymax) = match min_and_max(&finite[..]) {
        Some(mm) => mm,
        None => return (0., 1.),
    };
    let yspan = ymax - ymin;
    if yspan == 0. {
        (ymin - 1., ymax + 1.)
    } else {
        (ymin - yspan / 10., ymax + yspan / 10.)
    }
}

/// fixed decimals with comma thousands separators, e.g. 1234567.891 -> 1,234,567.89
pub fn format_thousands(v: f64, decimals: usize) -> String {
    if !v.is_finite() {
        return format!("{}", v);
    }
    let s = format!("{:.*}", decimals, v.abs());
    let (int_part, frac_part) = match s.find('.') {
        Some(i) => s.split_at(i),
        None => (&s[..], ""),
    };
    let mut grouped = String::with_capacity(s.len() + int_part.len() / 3 + 1);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if v < 0. && s.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    format!("{}{}{}", sign, grouped, frac_part)
}
