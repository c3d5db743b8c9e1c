use anyhow::{bail, Result};
use racwatch_common::{CommandRunner, MutationOutcome, RacClient};

pub async fn execute<R: CommandRunner>(
    client: &RacClient<R>,
    cluster: &str,
    session: &str,
) -> Result<()> {
    println!("Terminating session {}...", session);

    match client.terminate_session(cluster, session).await {
        MutationOutcome::Success => {
            println!("\n✓ Session terminated successfully!");
            Ok(())
        }
        MutationOutcome::Failure { reason } => {
            bail!("Failed to terminate session {session}: {reason}")
        }
    }
}
