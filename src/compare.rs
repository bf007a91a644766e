use super::batch::{BatchReport, Failure};
use super::plot::{parse_positive, parse_years};
use super::{
    marker_step, min_and_max, ChartOptions, Metric, OutputFormat, PlotError, Result, SimSeries,
    CHART_FONT, VERSION,
};
use clap::{App, Arg};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// 14x8 inches at 150 dpi
pub const COMPARE_WIDTH: u32 = 2100;
pub const COMPARE_HEIGHT: u32 = 1200;

pub const STATS_FONT: &str = "monospace";

pub const BLACK_CURVE: RGBColor = RGBColor(0, 0, 0);
pub const BLUE_CURVE: RGBColor = RGBColor(37, 99, 235);
pub const GREEN_CURVE: RGBColor = RGBColor(22, 163, 74);
pub const RED_CURVE: RGBColor = RGBColor(220, 38, 38);
pub const ORANGE_CURVE: RGBColor = RGBColor(249, 115, 22);
pub const YELLOW_CURVE: RGBColor = RGBColor(234, 179, 8);

/// colours handed out in order to explicitly listed files
pub const PALETTE: [RGBColor; 6] = [
    BLACK_CURVE,
    BLUE_CURVE,
    GREEN_CURVE,
    RED_CURVE,
    ORANGE_CURVE,
    YELLOW_CURVE,
];

/// pixel offset of the key point labels, per curve
const LABEL_OFFSETS: [(i32, i32); 6] = [(12, -30), (12, 14), (12, -46), (12, 30), (12, -62), (12, 46)];

/// One curve of a comparison: files named <prefix><suffix>.txt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSpec {
    pub prefix: &'static str,
    pub label: &'static str,
    pub color: RGBColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStyle {
    /// first loss, maximum, largest jumps, final value
    Detailed,
    /// first loss and final value, labelled with the curve name
    Endpoints,
}

/// Files sharing a suffix, one per curve, compared on one chart.
/// The first curve's prefix anchors the search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupPattern {
    pub tag: &'static str,
    pub curves: &'static [CurveSpec],
    pub key_style: KeyStyle,
    pub max_key_points: usize,
}

pub const DEFAULT_PATTERNS: [GroupPattern; 3] = [
    GroupPattern {
        tag: "copyset_vs_random",
        curves: &[
            CurveSpec {
                prefix: "copyset_",
                label: "Copysets",
                color: BLACK_CURVE,
            },
            CurveSpec {
                prefix: "random_",
                label: "Random",
                color: BLUE_CURVE,
            },
        ],
        key_style: KeyStyle::Detailed,
        max_key_points: 6,
    },
    GroupPattern {
        tag: "copysets2_vs_random2",
        curves: &[
            CurveSpec {
                prefix: "copysets_2_",
                label: "Copysets",
                color: BLACK_CURVE,
            },
            CurveSpec {
                prefix: "random_2_",
                label: "Random",
                color: BLUE_CURVE,
            },
        ],
        key_style: KeyStyle::Detailed,
        max_key_points: 6,
    },
    GroupPattern {
        tag: "6way",
        curves: &[
            CurveSpec {
                prefix: "copysets_2_",
                label: "Copysets_2",
                color: BLACK_CURVE,
            },
            CurveSpec {
                prefix: "copysets_224_",
                label: "Copysets_224",
                color: GREEN_CURVE,
            },
            CurveSpec {
                prefix: "copysets_248_",
                label: "Copysets_248",
                color: RED_CURVE,
            },
            CurveSpec {
                prefix: "copysets_296_",
                label: "Copysets_296",
                color: ORANGE_CURVE,
            },
            CurveSpec {
                prefix: "copysets_2384_",
                label: "Copysets_2384",
                color: YELLOW_CURVE,
            },
            CurveSpec {
                prefix: "random_2_",
                label: "Random_2",
                color: BLUE_CURVE,
            },
        ],
        key_style: KeyStyle::Endpoints,
        max_key_points: 2,
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct GroupMember {
    pub path: PathBuf,
    pub label: String,
    pub color: RGBColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileGroup {
    pub members: Vec<GroupMember>,
    pub tag: String,
    pub suffix: String,
    pub key_style: KeyStyle,
    pub max_key_points: usize,
}

impl FileGroup {
    /// A group of explicitly listed files, coloured from the palette in order.
    pub fn from_files(files: Vec<(PathBuf, String)>) -> FileGroup {
        let members = files
            .into_iter()
            .enumerate()
            .map(|(i, (path, label))| GroupMember {
                path,
                label,
                color: PALETTE[i % PALETTE.len()],
            })
            .collect::<Vec<_>>();
        let (key_style, max_key_points) = if members.len() > 2 {
            (KeyStyle::Endpoints, 2)
        } else {
            (KeyStyle::Detailed, 6)
        };
        FileGroup {
            members,
            tag: String::new(),
            suffix: String::new(),
            key_style,
            max_key_points,
        }
    }

    /// comparison_<tag>_<suffix>.png in output_dir
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("comparison_{}_{}.png", self.tag, self.suffix))
    }

    pub fn title(&self) -> String {
        let what = if self.members.len() == 2 {
            format!("{} vs {}", self.members[0].label, self.members[1].label)
        } else {
            format!("{}-Way Comparison", self.members.len())
        };
        if self.suffix.is_empty() {
            format!("Lost Objects Percentage: {}", what)
        } else {
            format!("Lost Objects Percentage: {} ({})", what, self.suffix)
        }
    }

    /// all member paths, for failure reports
    pub fn describe(&self) -> String {
        self.members
            .iter()
            .map(|m| m.path.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn key_points(&self, years: &[f64], values: &[f64]) -> Vec<KeyPoint> {
        let mut points = match self.key_style {
            KeyStyle::Detailed => key_points(years, values),
            KeyStyle::Endpoints => endpoint_points(years, values),
        };
        points.truncate(self.max_key_points);
        points
    }

    fn annotation(&self, label: &str, kp: &KeyPoint) -> String {
        match self.key_style {
            KeyStyle::Detailed => format!("{} ({:.1}y, {:.1}%)", kp.kind.label(), kp.x, kp.y),
            KeyStyle::Endpoints => format!("{} {}: {:.1}%", label, kp.kind.label(), kp.y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Start,
    FirstLoss,
    Max,
    Jump,
    Final,
}

impl KeyKind {
    pub fn label(self) -> &'static str {
        match self {
            KeyKind::Start => "Start",
            KeyKind::FirstLoss => "First loss",
            KeyKind::Max => "Max",
            KeyKind::Jump => "Jump",
            KeyKind::Final => "Final",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPoint {
    pub x: f64,
    pub y: f64,
    pub kind: KeyKind,
}

/// Marker drawn on every n-th point, one shape per curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Square,
    Diamond,
    TriangleDown,
    Pentagon,
    TriangleUp,
}

impl MarkerShape {
    pub const ALL: [MarkerShape; 6] = [
        MarkerShape::Circle,
        MarkerShape::Square,
        MarkerShape::Diamond,
        MarkerShape::TriangleDown,
        MarkerShape::Pentagon,
        MarkerShape::TriangleUp,
    ];

    pub fn for_curve(i: usize) -> MarkerShape {
        MarkerShape::ALL[i % MarkerShape::ALL.len()]
    }

    /// polygon around the data point, in pixels, y pointing down
    pub fn outline(self, r: i32) -> Vec<(i32, i32)> {
        match self {
            MarkerShape::Circle => regular_polygon(8, r, 0.),
            MarkerShape::Square => vec![(-r, -r), (r, -r), (r, r), (-r, r)],
            MarkerShape::Diamond => vec![(0, -r), (r, 0), (0, r), (-r, 0)],
            MarkerShape::TriangleDown => vec![(-r, -r), (r, -r), (0, r)],
            MarkerShape::Pentagon => regular_polygon(5, r, -90.),
            MarkerShape::TriangleUp => vec![(0, -r), (r, r), (-r, r)],
        }
    }
}

fn regular_polygon(sides: usize, r: i32, start_deg: f64) -> Vec<(i32, i32)> {
    (0..sides)
        .map(|k| {
            let a = (start_deg + 360. * k as f64 / sides as f64).to_radians();
            (
                (r as f64 * a.cos()).round() as i32,
                (r as f64 * a.sin()).round() as i32,
            )
        })
        .collect()
}

pub fn label_offset(i: usize) -> (i32, i32) {
    LABEL_OFFSETS[i % LABEL_OFFSETS.len()]
}

pub enum CompareMode {
    Files {
        group: FileGroup,
        output: PathBuf,
    },
    Folder {
        input_dir: PathBuf,
        output_dir: PathBuf,
    },
}

pub struct CompareConfig {
    pub mode: CompareMode,
    pub chart: ChartOptions,
    pub verbose: bool,
}

/// Takes the CLI arguments for comparing simulations, listed explicitly or matched by name.
pub fn parse_cli() -> std::result::Result<CompareConfig, String> {
    let years = ChartOptions::default().max_years.to_string();
    let width = COMPARE_WIDTH.to_string();
    let height = COMPARE_HEIGHT.to_string();
    let arg_files = Arg::with_name("files")
        .help("simulation files drawn on one chart, at least two")
        .multiple(true)
        .conflicts_with("input_dir");
    let arg_labels = Arg::with_name("labels")
        .help("legend labels of the files, in order; default to the file stems")
        .short("l")
        .long("label")
        .takes_value(true)
        .multiple(true)
        .number_of_values(1);
    let arg_input = Arg::with_name("input_dir")
        .help("folder searched for copyset/random groups")
        .short("i")
        .long("input")
        .takes_value(true);
    let arg_output = Arg::with_name("output")
        .help("output image when files are listed, output folder otherwise")
        .short("o")
        .long("output")
        .takes_value(true);
    let arg_years = Arg::with_name("years")
        .help("number of years spanned by the simulations")
        .long("years")
        .takes_value(true)
        .default_value(&years);
    let arg_width = Arg::with_name("width")
        .help("image width in pixels")
        .long("width")
        .takes_value(true)
        .default_value(&width);
    let arg_height = Arg::with_name("height")
        .help("image height in pixels")
        .long("height")
        .takes_value(true)
        .default_value(&height);
    let arg_verbose = Arg::with_name("verbose")
        .help("debug logging")
        .short("v")
        .long("verbose");
    let cli_args = App::new("tubesim_compare")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to compare the lost objects percentage of several simulations")
        .arg(arg_files)
        .arg(arg_labels)
        .arg(arg_input)
        .arg(arg_output)
        .arg(arg_years)
        .arg(arg_width)
        .arg(arg_height)
        .arg(arg_verbose)
        .get_matches();

    let files: Vec<PathBuf> = cli_args
        .values_of("files")
        .map(|v| v.map(PathBuf::from).collect())
        .unwrap_or_default();
    let labels: Vec<String> = cli_args
        .values_of("labels")
        .map(|v| v.map(String::from).collect())
        .unwrap_or_default();

    let mode = if files.is_empty() {
        CompareMode::Folder {
            input_dir: PathBuf::from(cli_args.value_of("input_dir").unwrap_or("input")),
            output_dir: PathBuf::from(cli_args.value_of("output").unwrap_or("output")),
        }
    } else {
        CompareMode::Files {
            group: FileGroup::from_files(label_files(files, labels)?),
            output: PathBuf::from(cli_args.value_of("output").unwrap_or("comparison.png")),
        }
    };
    let chart = ChartOptions {
        width: parse_positive(&cli_args, "width")?,
        height: parse_positive(&cli_args, "height")?,
        max_years: parse_years(&cli_args)?,
    };
    Ok(CompareConfig {
        mode,
        chart,
        verbose: cli_args.is_present("verbose"),
    })
}

/// pairs every file with its label, the file stem when no labels are given
pub fn label_files(
    files: Vec<PathBuf>,
    labels: Vec<String>,
) -> std::result::Result<Vec<(PathBuf, String)>, String> {
    if files.len() < 2 {
        return Err(format!(
            "at least two files are needed for a comparison, got {}",
            files.len()
        ));
    }
    if labels.is_empty() {
        return Ok(files
            .into_iter()
            .map(|f| {
                let stem = file_stem(&f);
                (f, stem)
            })
            .collect());
    }
    if labels.len() != files.len() {
        return Err(format!(
            "{} labels given for {} files",
            labels.len(),
            files.len()
        ));
    }
    Ok(files.into_iter().zip(labels).collect())
}

fn file_stem(p: &Path) -> String {
    p.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Finds every suffix for which all the curves of a pattern have a
/// <prefix><suffix>.txt file; incomplete sets are ignored.
pub fn find_matching_groups(dir: &Path, patterns: &[GroupPattern]) -> Result<Vec<FileGroup>> {
    if !dir.is_dir() {
        return Err(PlotError::MissingInput(dir.to_path_buf()));
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| PlotError::io(dir, e))? {
        let entry = entry.map_err(|e| PlotError::io(dir, e))?;
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }

    let mut groups = Vec::new();
    for pattern in patterns {
        let anchor = match pattern.curves.first() {
            Some(a) => a,
            None => continue,
        };
        for name in names.iter() {
            let suffix = match name
                .strip_prefix(anchor.prefix)
                .and_then(|rest| rest.strip_suffix(".txt"))
            {
                Some(s) => s,
                None => continue,
            };
            let members: Vec<GroupMember> = pattern
                .curves
                .iter()
                .map(|c| GroupMember {
                    path: dir.join(format!("{}{}.txt", c.prefix, suffix)),
                    label: c.label.to_string(),
                    color: c.color,
                })
                .collect();
            if members.iter().all(|m| m.path.is_file()) {
                groups.push(FileGroup {
                    members,
                    tag: pattern.tag.to_string(),
                    suffix: suffix.to_string(),
                    key_style: pattern.key_style,
                    max_key_points: pattern.max_key_points,
                });
            }
        }
    }
    groups.sort_by(|a, b| (&a.tag, &a.suffix).cmp(&(&b.tag, &b.suffix)));
    Ok(groups)
}

/// Notable points of a loss curve: first loss, maximum, the three largest
/// jumps (over three times the mean non-zero step), and the final value.
pub fn key_points(years: &[f64], values: &[f64]) -> Vec<KeyPoint> {
    let n = years.len().min(values.len());
    let mut points = Vec::new();
    if n == 0 {
        return points;
    }
    let at = |i: usize, kind: KeyKind| KeyPoint {
        x: years[i],
        y: values[i],
        kind,
    };

    if let Some(i) = values[..n].iter().position(|&v| v > 0.) {
        points.push(at(i, KeyKind::FirstLoss));
    }

    let mut imax = 0;
    for i in 1..n {
        if values[i] > values[imax] {
            imax = i;
        }
    }
    if values[imax] > 0. {
        points.push(at(imax, KeyKind::Max));
    }

    if n > 10 {
        let diff: Vec<f64> = values[..n].windows(2).map(|w| w[1] - w[0]).collect();
        let steps: Vec<f64> = diff.iter().filter(|d| **d != 0.).map(|d| d.abs()).collect();
        if !steps.is_empty() {
            let avg = steps.iter().sum::<f64>() / steps.len() as f64;
            let threshold = avg * 3.;
            let mut jumps: Vec<usize> = (0..diff.len()).filter(|&i| diff[i] > threshold).collect();
            jumps.sort_by(|&a, &b| diff[a].partial_cmp(&diff[b]).unwrap_or(Ordering::Equal));
            let top = jumps.len().saturating_sub(3);
            for &i in jumps[top..].iter() {
                points.push(at(i + 1, KeyKind::Jump));
            }
        }
    }

    if values[n - 1] > 0. {
        points.push(at(n - 1, KeyKind::Final));
    }
    points
}

/// First loss as "Start" and the final value, when positive.
pub fn endpoint_points(years: &[f64], values: &[f64]) -> Vec<KeyPoint> {
    let n = years.len().min(values.len());
    let mut points = Vec::new();
    if n == 0 {
        return points;
    }
    if let Some(i) = values[..n].iter().position(|&v| v > 0.) {
        points.push(KeyPoint {
            x: years[i],
            y: values[i],
            kind: KeyKind::Start,
        });
    }
    if values[n - 1] > 0. {
        points.push(KeyPoint {
            x: years[n - 1],
            y: values[n - 1],
            kind: KeyKind::Final,
        });
    }
    points
}

/// "<label>:" padded to width, then final and max percentages
pub fn stats_line(label: &str, width: usize, values: &[f64]) -> Option<String> {
    let (_, max) = min_and_max(values)?;
    let last = *values.last()?;
    Some(format!(
        "{:<w$} Final={:6.2}%, Max={:6.2}%",
        format!("{}:", label),
        last,
        max,
        w = width
    ))
}

struct Curve<'a> {
    label: &'a str,
    years: Vec<f64>,
    lost: &'a [f64],
    color: RGBColor,
}

/// Plots the lost objects percentage of every file of the group on one chart.
pub fn plot_comparison(group: &FileGroup, fout: &Path, opts: &ChartOptions) -> Result<()> {
    let series = group
        .members
        .iter()
        .map(|m| SimSeries::from_file(&m.path))
        .collect::<Result<Vec<SimSeries>>>()?;
    let curves: Vec<Curve> = group
        .members
        .iter()
        .zip(series.iter())
        .map(|(m, s)| Curve {
            label: &m.label,
            years: s.years(opts.max_years),
            lost: s.values(Metric::LostPercent),
            color: m.color,
        })
        .collect();
    let title = group.title();
    let size = (opts.width, opts.height);
    match OutputFormat::from_path(fout) {
        OutputFormat::Svg => {
            let root = SVGBackend::new(fout, size).into_drawing_area();
            draw_comparison(&root, group, &title, &curves, opts.max_years)
                .map_err(|e| PlotError::render(fout, e))?;
            root.present().map_err(|e| PlotError::render(fout, e))?;
        }
        OutputFormat::Bitmap => {
            let root = BitMapBackend::new(fout, size).into_drawing_area();
            draw_comparison(&root, group, &title, &curves, opts.max_years)
                .map_err(|e| PlotError::render(fout, e))?;
            root.present().map_err(|e| PlotError::render(fout, e))?;
        }
    }
    Ok(())
}

fn draw_comparison<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    group: &FileGroup,
    title: &str,
    curves: &[Curve],
    max_years: f64,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(root)
        .caption(title, (CHART_FONT, 36).into_font())
        .margin(30)
        .x_label_area_size(70)
        .y_label_area_size(90)
        .build_cartesian_2d(0f64..max_years, 0f64..105f64)?;
    chart
        .configure_mesh()
        .light_line_style(&RGBColor(235, 235, 235))
        .bold_line_style(RGBColor(200, 200, 200).stroke_width(1))
        .label_style((CHART_FONT, 20))
        .x_desc("Time (Years)")
        .y_desc("Lost Objects (%)")
        .y_labels(22)
        .x_label_formatter(&|x: &f64| format!("{:.0}", x))
        .y_label_formatter(&|y: &f64| format!("{:.0}", y))
        .draw()?;

    for (i, curve) in curves.iter().enumerate() {
        let color = curve.color;
        let points = curve.years.iter().copied().zip(curve.lost.iter().copied());
        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(3)))?
            .label(curve.label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 30, y)], color.stroke_width(3))
            });

        let outline = MarkerShape::for_curve(i).outline(5);
        let every = marker_step(curve.years.len(), 30);
        chart.draw_series(points.step_by(every).map(|(x, y)| {
            EmptyElement::at((x, y)) + Polygon::new(outline.clone(), color.filled())
        }))?;

        let offset = label_offset(i);
        let font = (CHART_FONT, 16).into_font().color(&color);
        chart.draw_series(
            group
                .key_points(&curve.years, curve.lost)
                .into_iter()
                .filter(|kp| kp.y > 0.)
                .map(|kp| {
                    EmptyElement::at((kp.x, kp.y))
                        + Circle::new((0, 0), 6, color.stroke_width(2))
                        + Text::new(group.annotation(curve.label, &kp), offset, font.clone())
                }),
        )?;
    }

    // bottom right, one line per curve, first curve on top
    let width = curves.iter().map(|c| c.label.len()).max().unwrap_or(0) + 1;
    let style =
        TextStyle::from((STATS_FONT, 20).into_font()).pos(Pos::new(HPos::Right, VPos::Bottom));
    let n = curves.len();
    let stats = curves.iter().enumerate().filter_map(|(i, curve)| {
        let text = stats_line(curve.label, width, curve.lost)?;
        let y = 2. + 4.5 * (n - 1 - i) as f64;
        Some(Text::new(text, (max_years * 0.98, y), style.clone()))
    });
    chart.draw_series(stats)?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font((CHART_FONT, 22))
        .draw()?;
    Ok(())
}

/// Plots every complete group found in the input folder.
pub fn run_folder(input_dir: &Path, output_dir: &Path, opts: &ChartOptions) -> Result<BatchReport> {
    let groups = find_matching_groups(input_dir, &DEFAULT_PATTERNS)?;
    if groups.is_empty() {
        return Err(PlotError::NoGroups(input_dir.to_path_buf()));
    }
    fs::create_dir_all(output_dir).map_err(|e| PlotError::io(output_dir, e))?;
    info!("found {} matching groups to compare", groups.len());

    let mut report = BatchReport::default();
    let mut tag = "";
    for group in groups.iter() {
        if group.tag != tag {
            tag = group.tag.as_str();
            info!("=== {} ===", tag);
        }
        let fout = group.output_path(output_dir);
        match plot_comparison(group, &fout, opts) {
            Ok(()) => {
                info!("  {} saved to {}", group.suffix, fout.display());
                report.processed += 1;
            }
            Err(e) => {
                error!("  {}: {}", group.suffix, e);
                report.failed.push(Failure {
                    item: format!("{} [{}]", fout.display(), group.describe()),
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(points: &[KeyPoint]) -> Vec<KeyKind> {
        points.iter().map(|p| p.kind).collect()
    }

    fn group(n: usize, style: KeyStyle, max_key_points: usize) -> FileGroup {
        let members = (0..n)
            .map(|i| GroupMember {
                path: PathBuf::from(format!("input/sim_{}_r3.txt", i)),
                label: format!("Sim_{}", i),
                color: PALETTE[i],
            })
            .collect();
        FileGroup {
            members,
            tag: "test".into(),
            suffix: "r3".into(),
            key_style: style,
            max_key_points,
        }
    }

    #[test]
    fn flat_zero_curve_has_no_key_points() {
        let years = [0., 1., 2.];
        assert!(key_points(&years, &[0., 0., 0.]).is_empty());
        assert!(endpoint_points(&years, &[0., 0., 0.]).is_empty());
    }

    #[test]
    fn short_curve_has_first_max_final() {
        let years = [0., 1., 2., 3.];
        let values = [0., 2., 5., 4.];
        let points = key_points(&years, &values);
        assert_eq!(
            kinds(&points),
            vec![KeyKind::FirstLoss, KeyKind::Max, KeyKind::Final]
        );
        assert_eq!((points[0].x, points[0].y), (1., 2.));
        assert_eq!((points[1].x, points[1].y), (2., 5.));
        assert_eq!((points[2].x, points[2].y), (3., 4.));
    }

    #[test]
    fn max_is_first_occurrence() {
        let years = [0., 1., 2.];
        let points = key_points(&years, &[3., 3., 1.]);
        let max = points.iter().find(|p| p.kind == KeyKind::Max).unwrap();
        assert_eq!(max.x, 0.);
    }

    #[test]
    fn large_steps_are_jumps() {
        // steps of 1 with one step of 20 between index 5 and 6
        let values: Vec<f64> = vec![
            0., 1., 2., 3., 4., 5., 25., 26., 27., 28., 29., 30.,
        ];
        let years: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
        let points = key_points(&years, &values);
        let jumps: Vec<&KeyPoint> = points.iter().filter(|p| p.kind == KeyKind::Jump).collect();
        assert_eq!(jumps.len(), 1);
        assert_eq!((jumps[0].x, jumps[0].y), (6., 25.));
    }

    #[test]
    fn at_most_three_jumps_ascending() {
        let mut values = vec![0.; 40];
        let mut level = 0.;
        for (i, v) in values.iter_mut().enumerate() {
            level += match i {
                5 => 50.,
                10 => 60.,
                15 => 70.,
                20 => 80.,
                _ => 0.1,
            };
            *v = level;
        }
        let years: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
        let points = key_points(&years, &values);
        let jump_x: Vec<f64> = points
            .iter()
            .filter(|p| p.kind == KeyKind::Jump)
            .map(|p| p.x)
            .collect();
        assert_eq!(jump_x, vec![10., 15., 20.]);
    }

    #[test]
    fn endpoints_are_start_and_final() {
        let years = [0., 1., 2., 3.];
        let points = endpoint_points(&years, &[0., 2., 9., 4.]);
        assert_eq!(kinds(&points), vec![KeyKind::Start, KeyKind::Final]);
        assert_eq!((points[0].x, points[0].y), (1., 2.));
        assert_eq!((points[1].x, points[1].y), (3., 4.));
    }

    #[test]
    fn group_caps_key_points() {
        let years = [0., 1., 2., 3.];
        let values = [0., 2., 5., 4.];
        let capped = group(2, KeyStyle::Detailed, 2).key_points(&years, &values);
        assert_eq!(kinds(&capped), vec![KeyKind::FirstLoss, KeyKind::Max]);
        let ends = group(6, KeyStyle::Endpoints, 1).key_points(&years, &values);
        assert_eq!(kinds(&ends), vec![KeyKind::Start]);
    }

    #[test]
    fn annotation_depends_on_style() {
        let kp = KeyPoint {
            x: 2.5,
            y: 12.34,
            kind: KeyKind::Final,
        };
        assert_eq!(
            group(2, KeyStyle::Detailed, 6).annotation("Sim_0", &kp),
            "Final (2.5y, 12.3%)"
        );
        assert_eq!(
            group(6, KeyStyle::Endpoints, 2).annotation("Sim_0", &kp),
            "Sim_0 Final: 12.3%"
        );
    }

    #[test]
    fn group_output_name_and_title() {
        let mut g = group(6, KeyStyle::Endpoints, 2);
        g.tag = "6way".into();
        assert_eq!(
            g.output_path(Path::new("output")),
            PathBuf::from("output/comparison_6way_r3.png")
        );
        assert_eq!(g.title(), "Lost Objects Percentage: 6-Way Comparison (r3)");
        let pair = group(2, KeyStyle::Detailed, 6);
        assert_eq!(pair.title(), "Lost Objects Percentage: Sim_0 vs Sim_1 (r3)");
    }

    #[test]
    fn describe_lists_every_member() {
        let g = group(2, KeyStyle::Detailed, 6);
        assert_eq!(g.describe(), "input/sim_0_r3.txt, input/sim_1_r3.txt");
    }

    #[test]
    fn explicit_files_take_palette_colors() {
        let g = FileGroup::from_files(vec![
            (PathBuf::from("a.txt"), "A".into()),
            (PathBuf::from("b.txt"), "B".into()),
        ]);
        assert_eq!(g.members[0].color, BLACK_CURVE);
        assert_eq!(g.members[1].color, BLUE_CURVE);
        assert_eq!(g.key_style, KeyStyle::Detailed);
        let three = FileGroup::from_files(vec![
            (PathBuf::from("a.txt"), "A".into()),
            (PathBuf::from("b.txt"), "B".into()),
            (PathBuf::from("c.txt"), "C".into()),
        ]);
        assert_eq!(three.key_style, KeyStyle::Endpoints);
        assert_eq!(three.max_key_points, 2);
    }

    #[test]
    fn labels_default_to_stems_and_must_match() {
        let files = vec![PathBuf::from("in/copyset_r3.txt"), PathBuf::from("in/random_r3.txt")];
        let labelled = label_files(files.clone(), vec![]).unwrap();
        assert_eq!(labelled[0].1, "copyset_r3");
        assert_eq!(labelled[1].1, "random_r3");
        assert!(label_files(files.clone(), vec!["only one".into()]).is_err());
        assert!(label_files(vec![PathBuf::from("a.txt")], vec![]).is_err());
        let named = label_files(files, vec!["C".into(), "R".into()]).unwrap();
        assert_eq!(named[1].1, "R");
    }

    #[test]
    fn every_curve_gets_its_own_marker() {
        let shapes: Vec<MarkerShape> = (0..6).map(MarkerShape::for_curve).collect();
        for (i, a) in shapes.iter().enumerate() {
            for b in shapes[i + 1..].iter() {
                assert_ne!(a, b);
            }
        }
        assert_eq!(MarkerShape::for_curve(6), MarkerShape::Circle);
        assert_eq!(MarkerShape::Circle.outline(5).len(), 8);
        assert_eq!(MarkerShape::Pentagon.outline(5)[0], (0, -5));
        assert_eq!(MarkerShape::TriangleUp.outline(5)[0], (0, -5));
    }

    #[test]
    fn label_offsets_differ_between_curves() {
        assert_eq!(label_offset(0), (12, -30));
        assert_eq!(label_offset(1), (12, 14));
        assert_ne!(label_offset(2), label_offset(3));
        assert_eq!(label_offset(6), label_offset(0));
    }

    #[test]
    fn stats_lines_are_padded() {
        let line = stats_line("Random_2", 14, &[0., 12.5, 10.]).unwrap();
        assert_eq!(line, "Random_2:      Final= 10.00%, Max= 12.50%");
        assert!(stats_line("x", 2, &[]).is_none());
    }

    #[test]
    fn six_way_pattern_shape() {
        let six = DEFAULT_PATTERNS
            .iter()
            .find(|p| p.tag == "6way")
            .unwrap();
        assert_eq!(six.curves.len(), 6);
        assert_eq!(six.curves[0].prefix, "copysets_2_");
        assert_eq!(six.curves[5].color, BLUE_CURVE);
        assert_eq!(six.max_key_points, 2);
    }
}
