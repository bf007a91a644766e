use anyhow::{anyhow, bail, Result};
use tracing::{info, warn};
use tubesim_plot::batch::{parse_cli, run_batch};
use tubesim_plot::init_logging;

fn main() -> Result<()> {
    let config = parse_cli().map_err(|e| anyhow!(e))?;
    init_logging(config.verbose);
    info!(
        "plotting {} into {}",
        config.input_dir.display(),
        config.output_dir.display()
    );
    let report = run_batch(&config)?;
    info!("done, {} graphs in {}", report.processed, config.output_dir.display());
    if !report.failed.is_empty() {
        for f in report.failed.iter() {
            warn!("failed: {}: {}", f.item, f.reason);
        }
        bail!("{} of {} files failed", report.failed.len(), report.processed + report.failed.len());
    }
    Ok(())
}
