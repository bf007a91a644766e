use anyhow::{anyhow, Context, Result};
use tracing::info;
use tubesim_plot::batch::log_ranges;
use tubesim_plot::plot::parse_cli;
use tubesim_plot::{init_logging, SimSeries};

fn main() -> Result<()> {
    let config = parse_cli().map_err(|e| anyhow!(e))?;
    init_logging(config.verbose);
    info!(
        "read data from {} and plot to {}",
        config.input.display(),
        config.output.display()
    );
    let series = SimSeries::from_file(&config.input)?;
    log_ranges(&series);
    series
        .plot_metrics(&config.output, &config.chart)
        .with_context(|| format!("plotting {}", config.input.display()))?;
    info!("plot saved to: {}", config.output.display());
    Ok(())
}
