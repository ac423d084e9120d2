use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use spaced_lib::api;

use crate::app::App;

/// Serve JSON requests from stdin, one per line, answering each on stdout
pub fn run(app: &mut App) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let default_target = app.config.target_size;

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read request")?;
        if line.trim().is_empty() {
            continue;
        }

        let response = api::handle_json(&mut app.engine, &line, default_target);
        if let Some(error) = &response.error {
            log::debug!("Request failed: {}", error);
        }
        serde_json::to_writer(&mut out, &response)?;
        writeln!(out)?;
        out.flush()?;
    }

    Ok(())
}
