use super::{Project, print_plan, report};
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
    let plan = engine.plan_destroy(&state);

    if !plan.has_changes {
        println!("{}", "Nothing to destroy.".green());
        lock.release().await?;
        return Ok(());
    }

    print_plan(&plan);
    if !yes {
        println!();
        println!("Run with {} to destroy these resources", "--yes".cyan());
        lock.release().await?;
        return Ok(());
    }

    println!();
    println!("{}", "Destroying...".red());
    let result = engine.apply(&plan, &mut state).await;

    manager.save(&state).await?;
    lock.release().await?;

    report(&result)
}
