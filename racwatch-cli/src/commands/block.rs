use anyhow::{bail, Result};
use racwatch_common::rac::MAINTENANCE_MESSAGE;
use racwatch_common::{CommandRunner, MutationOutcome, RacClient};

pub async fn block<R: CommandRunner>(
    client: &RacClient<R>,
    cluster: &str,
    infobase: &str,
    message: Option<String>,
) -> Result<()> {
    let message = message.unwrap_or_else(|| MAINTENANCE_MESSAGE.to_string());

    println!("Blocking infobase {}...", infobase);

    match client.block_infobase(cluster, infobase, &message).await {
        MutationOutcome::Success => {
            println!("\n✓ Infobase blocked successfully!");
            println!("  Message: {}", message);
            Ok(())
        }
        MutationOutcome::Failure { reason } => bail!("Failed to block infobase {infobase}: {reason}"),
    }
}

pub async fn unblock<R: CommandRunner>(
    client: &RacClient<R>,
    cluster: &str,
    infobase: &str,
) -> Result<()> {
    println!("Unblocking infobase {}...", infobase);

    match client.unblock_infobase(cluster, infobase).await {
        MutationOutcome::Success => {
            println!("\n✓ Infobase unblocked successfully!");
            Ok(())
        }
        MutationOutcome::Failure { reason } => {
            bail!("Failed to unblock infobase {infobase}: {reason}")
        }
    }
}
