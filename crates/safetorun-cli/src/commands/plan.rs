use super::{Project, print_plan, read_data};
use colored::Colorize;
use safetorun_provider::{Engine, SafetorunProvider};

pub async fn handle(project: &Project, provider: &SafetorunProvider) -> anyhow::Result<()> {
    println!("Manifest: {}", project.manifest_path.display().to_string().cyan());

    let mut state = project.state_manager().load().await?;
    let engine = Engine::new(provider);
    let plan = engine.plan(&project.manifest, &state)?;
    read_data(&engine, project, &mut state).await?;

    println!();
    print_plan(&plan);
    if !plan.has_changes {
        println!("{}", "No changes. Resources match the manifest.".green());
    }
    Ok(())
}
