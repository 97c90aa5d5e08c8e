use super::Project;
use colored::Colorize;
use safetorun_provider::{Engine, SafetorunProvider};

pub async fn handle(
    project: &Project,
    provider: &SafetorunProvider,
    resource_type: &str,
    name: &str,
    id: &str,
) -> anyhow::Result<()> {
    let manager = project.state_manager();
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;

    Engine::new(provider)
        .import(resource_type, name, id, &mut state)
        .await?;
    manager.save(&state).await?;
    lock.release().await?;

    println!(
        "  ✓ Imported {} as {}",
        id.cyan(),
        format!("{}.{}", resource_type, name).bold()
    );
    if project.manifest.get(&format!("{}.{}", resource_type, name)).is_none() {
        println!(
            "{}",
            "  The manifest has no block for it yet; the next apply will destroy it.".yellow()
        );
    }
    Ok(())
}
