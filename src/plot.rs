use super::{ChartOptions, VERSION};
use clap::{App, Arg};
use std::path::{Path, PathBuf};

pub struct PlotConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub chart: ChartOptions,
    pub verbose: bool,
}

/// Takes the CLI arguments that control the plotting of one simulation file.
pub fn parse_cli() -> Result<PlotConfig, String> {
    let defaults = ChartOptions::default();
    let width = defaults.width.to_string();
    let height = defaults.height.to_string();
    let years = defaults.max_years.to_string();
    let arg_input = Arg::with_name("input_file")
        .help("simulation output file to plot")
        .short("f")
        .long("file")
        .takes_value(true)
        .required(true);
    let arg_output = Arg::with_name("output_file")
        .help("output image, .svg for svg and bitmap otherwise; defaults to <input>_graph.png")
        .short("o")
        .long("output")
        .takes_value(true);
    let arg_years = Arg::with_name("years")
        .help("number of years spanned by the simulation")
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
    let cli_args = App::new("tubesim_plot")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to plot the metrics of one tube simulation")
        .arg(arg_input)
        .arg(arg_output)
        .arg(arg_years)
        .arg(arg_width)
        .arg(arg_height)
        .arg(arg_verbose)
        .get_matches();

    let input = PathBuf::from(cli_args.value_of("input_file").unwrap_or_default());
    let output = match cli_args.value_of("output_file") {
        Some(p) => PathBuf::from(p),
        None => default_output(&input),
    };
    let chart = ChartOptions {
        width: parse_positive(&cli_args, "width")?,
        height: parse_positive(&cli_args, "height")?,
        max_years: parse_years(&cli_args)?,
    };
    Ok(PlotConfig {
        input,
        output,
        chart,
        verbose: cli_args.is_present("verbose"),
    })
}

/// <stem>_graph.png next to the input file
pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}_graph.png", stem))
}

/// parses a strictly positive number, e.g. a size or a time span
pub fn positive<T>(raw: &str, name: &str) -> Result<T, String>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let v = raw
        .parse::<T>()
        .map_err(|_| format!("invalid value '{}' for --{}", raw, name))?;
    if v > T::default() {
        Ok(v)
    } else {
        Err(format!("--{} must be positive, got '{}'", name, raw))
    }
}

/// a finite, positive number of years
pub fn years(raw: &str) -> Result<f64, String> {
    let y: f64 = positive(raw, "years")?;
    if y.is_finite() {
        Ok(y)
    } else {
        Err(format!("--years must be finite, got '{}'", raw))
    }
}

/// arguments read here always have a value, thanks to their default
pub(crate) fn parse_positive<T>(cli_args: &clap::ArgMatches, name: &str) -> Result<T, String>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    positive(cli_args.value_of(name).unwrap_or_default(), name)
}

pub(crate) fn parse_years(cli_args: &clap::ArgMatches) -> Result<f64, String> {
    years(cli_args.value_of("years").unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_sits_next_to_input() {
        assert_eq!(
            default_output(Path::new("input/random_r3.txt")),
            PathBuf::from("input/random_r3_graph.png")
        );
        assert_eq!(
            default_output(Path::new("sim")),
            PathBuf::from("sim_graph.png")
        );
    }

    #[test]
    fn years_must_be_positive_and_finite() {
        assert_eq!(years("2.5"), Ok(2.5));
        assert_eq!(years("10"), Ok(10.));
        assert!(years("0").unwrap_err().contains("must be positive"));
        assert!(years("-3").unwrap_err().contains("must be positive"));
        assert!(years("nan").is_err());
        assert!(years("inf").unwrap_err().contains("finite"));
        assert!(years("ten").unwrap_err().contains("invalid value 'ten'"));
    }

    #[test]
    fn image_size_must_be_positive() {
        assert_eq!(positive::<u32>("800", "width"), Ok(800));
        assert!(positive::<u32>("0", "width").is_err());
        assert!(positive::<u32>("-5", "height").is_err());
    }
}
