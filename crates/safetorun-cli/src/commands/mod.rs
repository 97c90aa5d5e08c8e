pub mod apply;
pub mod destroy;
pub mod import;
pub mod plan;
pub mod refresh;
pub mod status;

use colored::Colorize;
use safetorun_config::{Manifest, PROJECT_DIR, Settings};
use safetorun_provider::{
    ActionType, ApplyResult, Engine, GlobalState, Plan, SafetorunProvider, StateManager,
};
use std::path::{Path, PathBuf};

/// Manifest plus the directory its state lives in
pub struct Project {
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
    pub root: PathBuf,
}

impl Project {
    /// Load the manifest given on the command line, or discover one
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let manifest_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => safetorun_config::find_manifest_file()?,
        };
        let manifest = Manifest::load(&manifest_path)?;
        tracing::debug!(
            "Loaded {} resources and {} data sources from {}",
            manifest.resources.len(),
            manifest.data.len(),
            manifest_path.display()
        );

        Ok(Self {
            root: project_root(&manifest_path),
            manifest_path,
            manifest,
        })
    }

    pub fn state_manager(&self) -> StateManager {
        StateManager::new(&self.root)
    }
}

/// Directory that holds `.safetorun/` for a manifest
///
/// A manifest inside `.safetorun/` belongs to the directory above it.
pub fn project_root(manifest_path: &Path) -> PathBuf {
    let dir = match manifest_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    if dir.file_name().is_some_and(|name| name == PROJECT_DIR) {
        let outer = dir.parent().map(Path::to_path_buf);
        return match outer {
            Some(outer) if !outer.as_os_str().is_empty() => outer,
            _ => PathBuf::from("."),
        };
    }
    dir
}

/// Build the provider from user settings; Ctrl-C cancels any wait in progress
pub fn build_provider() -> anyhow::Result<SafetorunProvider> {
    let settings = Settings::load()?;
    let provider = SafetorunProvider::from_settings(&settings)?;

    let cancel = provider.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{}", "Interrupted, stopping the current wait...".yellow());
            cancel.cancel();
        }
    });

    Ok(provider)
}

/// Look up the manifest's data blocks, printing each one read
pub async fn read_data(
    engine: &Engine<'_>,
    project: &Project,
    state: &mut GlobalState,
) -> anyhow::Result<()> {
    if project.manifest.data.is_empty() {
        return Ok(());
    }

    engine.read_data(&project.manifest, state).await?;
    for (key, data) in &state.data {
        println!("  {} {}", "<=".cyan(), format!("{} read", key).dimmed());
        tracing::debug!("{} = {:?}", key, data.attributes());
    }
    println!();
    Ok(())
}

pub fn print_plan(plan: &Plan) {
    for action in &plan.actions {
        let line = match action.action_type {
            ActionType::Create => format!("  + {}", action.description).green(),
            ActionType::Update => format!("  ~ {}", action.description).yellow(),
            ActionType::Delete => format!("  - {}", action.description).red(),
            ActionType::NoOp => format!("    {}", action.description).dimmed(),
        };
        println!("{}", line);
    }

    println!();
    println!("{} {}", "Plan:".bold(), plan.summary());
}

/// Print the outcome of an apply, failing when any action failed
pub fn report(result: &ApplyResult) -> anyhow::Result<()> {
    for success in &result.succeeded {
        println!("  ✓ {}", success.message);
    }
    for failure in &result.failed {
        eprintln!(
            "  ✗ {}: {}",
            failure.action_id.red(),
            failure.error.as_deref().unwrap_or("unknown error")
        );
    }

    println!();
    println!(
        "{} ({} succeeded, {} failed, {}ms)",
        "Done".bold(),
        result.succeeded.len(),
        result.failed.len(),
        result.duration_ms
    );

    if !result.is_success() {
        anyhow::bail!("{} action(s) failed", result.failed.len());
    }
    Ok(())
}
