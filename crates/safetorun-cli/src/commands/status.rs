use colored::Colorize;
use safetorun::Status;
use safetorun_provider::SafetorunProvider;

pub async fn handle(provider: &SafetorunProvider, organisation_id: &str) -> anyhow::Result<()> {
    let response = provider.api().query_status(organisation_id).await?;

    let status = response.status.to_string();
    let status = match response.status {
        Status::InfrastructureCreated => status.green(),
        Status::ErrorDestroying | Status::AlreadyExists => status.red(),
        Status::DeleteComplete => status.dimmed(),
        Status::CreateInProgress => status.yellow(),
    };

    println!("{}: {}", response.organisation_id.cyan(), status);
    if !response.status.is_terminal() {
        println!("  Provisioning is still in progress");
    }
    Ok(())
}
