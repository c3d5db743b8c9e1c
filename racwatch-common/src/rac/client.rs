use crate::config::RacConfig;
use crate::error::{RacError, Result};
use crate::model::{Cluster, Infobase, Server, Session};
use crate::rac::command::{CommandBuilder, RacCommand};
use crate::rac::mapper::{parse_entities, FromRecord};
use crate::rac::runner::{CommandRunner, ProcessRunner};
use tracing::{debug, error, info, warn};

/// Denied message used when an infobase is blocked for inactivity
pub const MAINTENANCE_MESSAGE: &str = "Infobase blocked automatically due to inactivity";

/// Entities returned by a list operation.
///
/// A failed call is not an error for the caller: `items` is empty and the
/// cause is kept in `failure` for whoever wants to report it.
#[derive(Debug)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub failure: Option<RacError>,
}

impl<T> Listing<T> {
    fn fetched(items: Vec<T>) -> Self {
        Self {
            items,
            failure: None,
        }
    }

    fn failed(failure: RacError) -> Self {
        Self {
            items: Vec::new(),
            failure: Some(failure),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.failure.is_none()
    }

    pub fn into_parts(self) -> (Vec<T>, Option<RacError>) {
        (self.items, self.failure)
    }
}

/// Outcome of a state-changing `rac` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Success,
    Failure { reason: String },
}

impl MutationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, MutationOutcome::Success)
    }

    /// Judge a completed call by its stdout.
    ///
    /// `rac` has no structured status for mutations; any mention of "error"
    /// (case-insensitive) counts as failure.
    pub fn from_stdout(stdout: &str) -> Self {
        if stdout.to_lowercase().contains("error") {
            let reason = stdout
                .lines()
                .map(str::trim)
                .find(|line| line.to_lowercase().contains("error"))
                .unwrap_or_else(|| stdout.trim())
                .to_string();
            MutationOutcome::Failure { reason }
        } else {
            MutationOutcome::Success
        }
    }
}

impl std::fmt::Display for MutationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MutationOutcome::Success => write!(f, "success"),
            MutationOutcome::Failure { reason } => write!(f, "failure: {reason}"),
        }
    }
}

/// Deny flags applied by `infobase update`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRequest {
    pub sessions_deny: bool,
    pub scheduled_jobs_deny: bool,
    pub denied_message: String,
}

impl BlockRequest {
    /// Deny both sessions and scheduled jobs
    pub fn block(message: impl Into<String>) -> Self {
        Self {
            sessions_deny: true,
            scheduled_jobs_deny: true,
            denied_message: message.into(),
        }
    }

    /// Lift both deny flags
    pub fn unblock() -> Self {
        Self {
            sessions_deny: false,
            scheduled_jobs_deny: false,
            denied_message: String::new(),
        }
    }
}

/// Typed access to the `rac` utility
pub struct RacClient<R> {
    runner: R,
    commands: CommandBuilder,
}

impl RacClient<ProcessRunner> {
    /// Client running the executable named in `config`
    pub fn from_config(config: &RacConfig) -> Self {
        Self::new(ProcessRunner::from_config(config), CommandBuilder::from_config(config))
    }
}

impl<R: CommandRunner> RacClient<R> {
    pub fn new(runner: R, commands: CommandBuilder) -> Self {
        Self { runner, commands }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run `command`, returning stdout of a zero-exit call
    async fn run(&self, command: &RacCommand) -> Result<String> {
        let args = self.commands.build(command);
        let output = self.runner.invoke(&args).await?;

        if !output.is_success() {
            error!(
                "rac {} failed (code {}): {}",
                command,
                output.exit_code,
                output.stderr.trim()
            );
            return Err(RacError::ExitStatus {
                code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        if output.stdout.trim().is_empty() {
            warn!("rac {} succeeded but printed nothing", command);
        }

        Ok(output.stdout)
    }

    #[tracing::instrument(name = "rac.list", skip(self), fields(command = %command))]
    async fn list<T: FromRecord>(&self, command: RacCommand) -> Listing<T> {
        match self.run(&command).await {
            Ok(stdout) => Listing::fetched(parse_entities(&stdout)),
            Err(e) => Listing::failed(e),
        }
    }

    pub async fn clusters(&self) -> Listing<Cluster> {
        let listing = self.list::<Cluster>(RacCommand::ClusterList).await;
        info!("Found {} cluster(s)", listing.items.len());
        listing
    }

    pub async fn servers(&self, cluster_id: &str) -> Listing<Server> {
        let listing = self
            .list::<Server>(RacCommand::ServerList {
                cluster: cluster_id.to_string(),
            })
            .await;
        info!("Found {} working server(s) in {}", listing.items.len(), cluster_id);
        listing
    }

    pub async fn infobases(&self, cluster_id: &str) -> Listing<Infobase> {
        let listing = self
            .list::<Infobase>(RacCommand::InfobaseSummaryList {
                cluster: cluster_id.to_string(),
            })
            .await;
        info!("Found {} infobase(s) in {}", listing.items.len(), cluster_id);
        listing
    }

    /// Sessions of a cluster, optionally narrowed to one infobase
    pub async fn sessions(&self, cluster_id: &str, infobase_id: Option<&str>) -> Listing<Session> {
        let listing = self
            .list::<Session>(RacCommand::SessionList {
                cluster: cluster_id.to_string(),
                infobase: infobase_id.map(ToString::to_string),
            })
            .await;
        info!("Found {} session(s) in {}", listing.items.len(), cluster_id);
        listing
    }

    #[tracing::instrument(name = "rac.mutate", skip(self), fields(command = %command))]
    async fn mutate(&self, command: RacCommand) -> MutationOutcome {
        match self.run(&command).await {
            Ok(stdout) if stdout.trim().is_empty() && command.requires_reply() => {
                MutationOutcome::Failure {
                    reason: "rac printed nothing".to_string(),
                }
            }
            Ok(stdout) => MutationOutcome::from_stdout(&stdout),
            Err(e) => MutationOutcome::Failure {
                reason: e.to_string(),
            },
        }
    }

    /// Apply deny flags to an infobase
    pub async fn update_infobase(
        &self,
        cluster_id: &str,
        infobase_id: &str,
        request: &BlockRequest,
    ) -> MutationOutcome {
        debug!("Updating infobase {} in {}: {:?}", infobase_id, cluster_id, request);
        self.mutate(RacCommand::InfobaseUpdate {
            cluster: cluster_id.to_string(),
            infobase: infobase_id.to_string(),
            sessions_deny: request.sessions_deny,
            scheduled_jobs_deny: request.scheduled_jobs_deny,
            denied_message: request.denied_message.clone(),
        })
        .await
    }

    /// Deny new sessions and scheduled jobs for an infobase
    pub async fn block_infobase(
        &self,
        cluster_id: &str,
        infobase_id: &str,
        message: &str,
    ) -> MutationOutcome {
        let outcome = self
            .update_infobase(cluster_id, infobase_id, &BlockRequest::block(message))
            .await;
        match &outcome {
            MutationOutcome::Success => info!("Infobase {} blocked", infobase_id),
            MutationOutcome::Failure { reason } => {
                error!("Failed to block infobase {}: {}", infobase_id, reason);
            }
        }
        outcome
    }

    /// Lift both deny flags
    pub async fn unblock_infobase(&self, cluster_id: &str, infobase_id: &str) -> MutationOutcome {
        let outcome = self
            .update_infobase(cluster_id, infobase_id, &BlockRequest::unblock())
            .await;
        match &outcome {
            MutationOutcome::Success => info!("Infobase {} unblocked", infobase_id),
            MutationOutcome::Failure { reason } => {
                error!("Failed to unblock infobase {}: {}", infobase_id, reason);
            }
        }
        outcome
    }

    pub async fn terminate_session(&self, cluster_id: &str, session_id: &str) -> MutationOutcome {
        let outcome = self
            .mutate(RacCommand::SessionTerminate {
                cluster: cluster_id.to_string(),
                session: session_id.to_string(),
            })
            .await;
        match &outcome {
            MutationOutcome::Success => info!("Session {} terminated", session_id),
            MutationOutcome::Failure { reason } => {
                error!("Failed to terminate session {}: {}", session_id, reason);
            }
        }
        outcome
    }
}
