use super::{Project, read_data, report};
use safetorun_provider::{Engine, SafetorunProvider};

pub async fn handle(project: &Project, provider: &SafetorunProvider) -> anyhow::Result<()> {
    let manager = project.state_manager();
    let lock = manager.acquire_lock().await?;
    let mut state = manager.load().await?;

    let engine = Engine::new(provider);
    read_data(&engine, project, &mut state).await?;
    let result = engine.refresh(&mut state).await;
    manager.save(&state).await?;
    lock.release().await?;

    report(&result)
}
