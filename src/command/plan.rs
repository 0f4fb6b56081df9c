//! Release plan command implementation.
use log::*;
use std::path::Path;
use tokio::fs;

use crate::{Result, orchestrator::Orchestrator};

/// Computes the release plan and prints it as pretty JSON, or writes it to
/// `out_file`.
pub async fn execute(
    orchestrator: &Orchestrator,
    out_file: Option<String>,
) -> Result<()> {
    let plan = orchestrator.plan().await?;

    if !plan.has_changes() {
        info!("no changes: all manifests are up to date");
    }

    let content = serde_json::to_string_pretty(&plan)?;

    if let Some(out_file) = out_file {
        let file_path = Path::new(&out_file);

        if let Some(parent) = file_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await?;
        }

        info!("writing release plan to: {}", file_path.display());
        fs::write(file_path, &content).await?;
    } else {
        println!("{content}");
    }

    Ok(())
}
