use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use spaced_lib::bootstrap::{self, BootstrapSource, FileBootstrap, HttpBootstrap};
use spaced_lib::session::SeedOutcome;

use crate::app::App;
use crate::render::terminal::Color;
use crate::OutputFormat;

/// Download the initial card list into an empty store
pub fn run(
    app: App,
    url: Option<String>,
    file: Option<PathBuf>,
    timeout_secs: Option<u64>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let timeout = timeout_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| app.config.bootstrap_timeout());

    let source: Box<dyn BootstrapSource> = match (file, url.or_else(|| app.config.bootstrap.url.clone())) {
        (Some(path), _) => Box::new(FileBootstrap::new(path)),
        (None, Some(url)) => Box::new(
            HttpBootstrap::new(url, timeout).context("Failed to build HTTP client")?,
        ),
        (None, None) => bail!(
            "No card source given. Pass --url or --file, or set [bootstrap] url in the config."
        ),
    };

    let (_, data_dir, engine) = app.into_shared();
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let outcome = runtime
        .block_on(bootstrap::run(&engine, source.as_ref(), timeout))
        .with_context(|| format!("Failed to fetch cards from {}", source.describe()))?;

    match format {
        OutputFormat::Json => {
            let output = match outcome {
                SeedOutcome::Seeded(count) => serde_json::json!({ "seeded": count }),
                SeedOutcome::Discarded => serde_json::json!({ "seeded": 0, "discarded": true }),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => match outcome {
            SeedOutcome::Seeded(count) => {
                if use_color {
                    println!(
                        "{}Loaded {} cards{} into {}",
                        Color::GREEN,
                        count,
                        Color::RESET,
                        data_dir.display()
                    );
                } else {
                    println!("Loaded {} cards into {}", count, data_dir.display());
                }
            }
            SeedOutcome::Discarded => {
                println!("Cards already present; fetched list ignored.");
            }
        },
    }

    Ok(())
}
