use crate::model::InactiveInfobase;
use crate::rac::{CommandRunner, RacClient, MAINTENANCE_MESSAGE};
use tracing::info;

/// Decides which inactive infobases get blocked, and blocks them unless in
/// dry-run mode
pub struct InactivityPlanner<'a, R> {
    client: &'a RacClient<R>,
    message: String,
}

impl<'a, R: CommandRunner> InactivityPlanner<'a, R> {
    pub fn new(client: &'a RacClient<R>) -> Self {
        Self {
            client,
            message: MAINTENANCE_MESSAGE.to_string(),
        }
    }

    /// Override the denied message shown to users of a blocked infobase
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Names of the infobases acted upon, in input order.
    ///
    /// In dry-run mode every name is returned and `rac` is never called. In
    /// live mode each infobase is blocked in its own cluster and its name is
    /// returned only if the block succeeded.
    #[tracing::instrument(name = "planner.block_inactive", skip(self, inactive), fields(count = inactive.len()))]
    pub async fn plan_and_execute(
        &self,
        inactive: &[InactiveInfobase<'_>],
        dry_run: bool,
    ) -> Vec<String> {
        info!(
            "Blocking inactive infobases ({} mode)",
            if dry_run { "dry-run" } else { "LIVE" }
        );

        let mut acted = Vec::new();
        for entry in inactive {
            let infobase = entry.infobase;
            if dry_run {
                info!("[DRY RUN] Would block infobase: {}", infobase.name);
                acted.push(infobase.name.clone());
                continue;
            }

            let outcome = self
                .client
                .block_infobase(entry.cluster_id, &infobase.id, &self.message)
                .await;
            if outcome.is_success() {
                acted.push(infobase.name.clone());
            }
        }

        info!("{} of {} inactive infobase(s) handled", acted.len(), inactive.len());
        acted
    }
}
