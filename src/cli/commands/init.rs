//! Init command - create a project-local config

use crate::cli::args::InitArgs;
use crate::config::LOCAL_CONFIG_NAME;
use crate::error::{ShellkeepError, ShellkeepResult};
use crate::ui;
use std::env;
use tokio::fs;

const STARTER_CONFIG: &str = r#"# shellkeep configuration
# Bump [app] version on every deploy; stale stores are pruned on activate.

[app]
name = "app"
version = "v1"
# origin = "https://example.com"
navigation_root = "/"

[manifest]
resources = [
    "/",
    "/index.html",
]

[store]
# dir = "/var/lib/shellkeep/stores"
"#;

/// Execute the init command
pub async fn execute(args: InitArgs) -> ShellkeepResult<()> {
    let dir = match args.path {
        Some(path) => path,
        None => env::current_dir().map_err(|e| ShellkeepError::io("getting current directory", e))?,
    };

    let path = dir.join(LOCAL_CONFIG_NAME);
    if path.exists() && !args.force {
        return Err(ShellkeepError::PathInvalid {
            path,
            reason: "already exists (use --force to overwrite)".to_string(),
        });
    }

    fs::write(&path, STARTER_CONFIG)
        .await
        .map_err(|e| ShellkeepError::io(format!("writing {}", path.display()), e))?;

    ui::step_ok(&format!("Created {}", path.display()));
    ui::step_info("Edit the manifest, then run: shellkeep install");
    Ok(())
}
