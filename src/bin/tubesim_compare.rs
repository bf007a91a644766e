use anyhow::{anyhow, bail, Result};
use tracing::{info, warn};
use tubesim_plot::compare::{parse_cli, plot_comparison, run_folder, CompareMode};
use tubesim_plot::init_logging;

fn main() -> Result<()> {
    let config = parse_cli().map_err(|e| anyhow!(e))?;
    init_logging(config.verbose);
    match config.mode {
        CompareMode::Files { group, output } => {
            info!("comparing {} into {}", group.describe(), output.display());
            plot_comparison(&group, &output, &config.chart)?;
            info!("saved: {}", output.display());
        }
        CompareMode::Folder {
            input_dir,
            output_dir,
        } => {
            let report = run_folder(&input_dir, &output_dir, &config.chart)?;
            info!(
                "done, generated {} comparison graphs in {}",
                report.processed,
                output_dir.display()
            );
            if !report.failed.is_empty() {
                for f in report.failed.iter() {
                    warn!("failed: {}: {}", f.item, f.reason);
                }
                bail!("{} comparisons failed", report.failed.len());
            }
        }
    }
    Ok(())
}
