use super::{Project, print_plan, read_data, report};
use colored::Colorize;
use safetorun_provider::{Engine, SafetorunProvider};

pub async fn handle(
    project: &Project,
    provider: &SafetorunProvider,
    yes: bool,
) -> anyhow::Result<()> {
    let manager = project.state_manager();
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;

    let engine = Engine::new(provider);
    let plan = engine.plan(&project.manifest, &state)?;
    read_data(&engine, project, &mut state).await?;
    print_plan(&plan);

    if !plan.has_changes {
        println!("{}", "No changes. Resources match the manifest.".green());
        if yes {
            manager.save(&state).await?;
        }
        lock.release().await?;
        return Ok(());
    }

    if !yes {
        println!();
        println!("Run with {} to apply these changes", "--yes".cyan());
        lock.release().await?;
        return Ok(());
    }

    println!();
    println!("{}", "Applying...".yellow());
    let result = engine.apply(&plan, &mut state).await;

    // Successful actions are recorded even when others failed
    manager.save(&state).await?;
    lock.release().await?;

    report(&result)
}
