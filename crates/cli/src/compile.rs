use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

/// Run `cargo build` in a generated crate directory.
pub async fn cargo_build(crate_dir: &Path) -> Result<(), String> {
    let cargo = std::env::var_os("CARGO").unwrap_or_else(|| "cargo".into());
    debug!(dir = %crate_dir.display(), "Running cargo build");

    let output = Command::new(&cargo)
        .arg("build")
        .arg("--quiet")
        .current_dir(crate_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|err| format!("Failed to run cargo build: {err}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let mut error_msg = format!(
            "cargo build failed with status {}",
            output.status.code().unwrap_or(1)
        );
        if !stderr.is_empty() {
            error_msg.push_str(&format!("\n\nError output:\n{}", stderr.trim()));
        }
        return Err(error_msg);
    }

    info!(dir = %crate_dir.display(), "Compiled");
    Ok(())
}
