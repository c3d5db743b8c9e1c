mod commands;
mod telemetry;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use racwatch_common::{Credentials, RacClient, RacConfig, DEFAULT_RAS_PORT, DEFAULT_TIMEOUT_SECS};
use std::path::PathBuf;
use std::time::Duration;
use tracing::error;

#[derive(Parser)]
#[command(name = "racwatch")]
#[command(version)]
#[command(about = "1C:Enterprise cluster inspector built on the rac utility", long_about = None)]
struct Cli {
    /// Path to the rac executable
    #[arg(
        long,
        env = "RACWATCH_RAC",
        default_value = "/opt/1cv8/x86_64/current/rac",
        global = true
    )]
    rac: PathBuf,

    /// RAS host
    #[arg(long, default_value = "localhost", global = true)]
    host: String,

    /// RAS port
    #[arg(long, default_value_t = DEFAULT_RAS_PORT, global = true)]
    port: u16,

    /// Cluster administrator name
    #[arg(long, env = "RACWATCH_CLUSTER_USER", default_value = "", global = true)]
    cluster_user: String,

    /// Cluster administrator password
    #[arg(
        long,
        env = "RACWATCH_CLUSTER_PWD",
        default_value = "",
        hide_env_values = true,
        hide_default_value = true,
        global = true
    )]
    cluster_pwd: String,

    /// Infobase administrator name
    #[arg(long, env = "RACWATCH_INFOBASE_USER", default_value = "", global = true)]
    infobase_user: String,

    /// Infobase administrator password
    #[arg(
        long,
        env = "RACWATCH_INFOBASE_PWD",
        default_value = "",
        hide_env_values = true,
        hide_default_value = true,
        global = true
    )]
    infobase_pwd: String,

    /// Seconds to wait for a single rac call
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    timeout_secs: u64,

    /// Inactivity threshold in hours
    #[arg(long, default_value_t = 24, global = true)]
    inactive_hours: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect cluster state, print and save the report, plan blocking
    Report {
        /// Directory for the saved reports
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Print the report without writing files
        #[arg(long)]
        no_save: bool,

        /// Actually block inactive infobases instead of a dry run
        #[arg(long)]
        execute: bool,

        /// Message shown to users of infobases blocked by --execute
        #[arg(long)]
        message: Option<String>,
    },

    /// List clusters
    Clusters,

    /// List infobases with their session counts
    Infobases,

    /// List sessions
    Sessions {
        /// Only sessions of this infobase
        #[arg(long)]
        infobase: Option<String>,
    },

    /// Deny sessions and scheduled jobs for an infobase
    Block {
        /// Cluster ID
        cluster: String,

        /// Infobase ID
        infobase: String,

        /// Message shown to users who try to connect
        #[arg(long)]
        message: Option<String>,
    },

    /// Lift the session and scheduled job denial of an infobase
    Unblock {
        /// Cluster ID
        cluster: String,

        /// Infobase ID
        infobase: String,
    },

    /// Terminate a session
    Terminate {
        /// Cluster ID
        cluster: String,

        /// Session ID
        session: String,
    },
}

impl Cli {
    fn config(&self) -> RacConfig {
        RacConfig::new(&self.rac)
            .with_ras(&self.host, self.port)
            .with_cluster_auth(Credentials::new(&self.cluster_user, &self.cluster_pwd))
            .with_infobase_auth(Credentials::new(&self.infobase_user, &self.infobase_pwd))
            .with_inactive_hours(self.inactive_hours)
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let tracer_provider = telemetry::init_telemetry().context("Failed to initialize telemetry")?;

    let result = run(cli).await;

    if let Some(provider) = tracer_provider {
        if let Err(e) = provider.shutdown() {
            error!("Failed to shut down tracer provider: {}", e);
        }
    }

    result
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.config();
    if let Err(e) = config.validate() {
        bail!("Invalid configuration: {e}");
    }

    let client = RacClient::from_config(&config);

    match cli.command {
        Commands::Report {
            output_dir,
            no_save,
            execute,
            message,
        } => {
            let options = commands::report::ReportOptions {
                output_dir,
                save: !no_save,
                dry_run: !execute,
                message,
            };
            commands::report::execute(&client, &config, &options).await?;
        }
        Commands::Clusters => {
            commands::list::clusters(&client).await?;
        }
        Commands::Infobases => {
            commands::list::infobases(&client, &config).await?;
        }
        Commands::Sessions { infobase } => {
            commands::list::sessions(&client, infobase.as_deref()).await?;
        }
        Commands::Block {
            cluster,
            infobase,
            message,
        } => {
            commands::block::block(&client, &cluster, &infobase, message).await?;
        }
        Commands::Unblock { cluster, infobase } => {
            commands::block::unblock(&client, &cluster, &infobase).await?;
        }
        Commands::Terminate { cluster, session } => {
            commands::terminate::execute(&client, &cluster, &session).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_defaults_to_dry_run_with_saving() {
        let cli = Cli::try_parse_from(["racwatch", "--rac", "/usr/bin/rac", "report"]).unwrap();

        match cli.command {
            Commands::Report {
                no_save,
                execute,
                message,
                ..
            } => {
                assert!(!no_save);
                assert!(!execute);
                assert!(message.is_none());
            }
            _ => panic!("expected report subcommand"),
        }
        assert_eq!(cli.port, 1545);
        assert_eq!(cli.inactive_hours, 24);
    }

    #[test]
    fn test_global_options_map_onto_config() {
        let cli = Cli::try_parse_from([
            "racwatch",
            "infobases",
            "--rac",
            "/usr/bin/rac",
            "--host",
            "srv1",
            "--port",
            "2545",
            "--cluster-user",
            "admin",
            "--cluster-pwd",
            "secret",
            "--timeout-secs",
            "5",
            "--inactive-hours",
            "48",
        ])
        .unwrap();

        let config = cli.config();
        assert_eq!(config.endpoint(), "srv1:2545");
        assert_eq!(config.cluster_auth, Credentials::new("admin", "secret"));
        assert!(config.infobase_auth.is_empty());
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.inactive_hours, 48);
    }

    #[test]
    fn test_block_takes_positional_ids() {
        let cli = Cli::try_parse_from(["racwatch", "block", "c1", "ib1", "--message", "Maintenance"])
            .unwrap();

        match cli.command {
            Commands::Block {
                cluster,
                infobase,
                message,
            } => {
                assert_eq!(cluster, "c1");
                assert_eq!(infobase, "ib1");
                assert_eq!(message.as_deref(), Some("Maintenance"));
            }
            _ => panic!("expected block subcommand"),
        }
    }

    #[test]
    fn test_report_accepts_block_message() {
        let cli = Cli::try_parse_from([
            "racwatch",
            "report",
            "--execute",
            "--message",
            "Archived",
        ])
        .unwrap();

        match cli.command {
            Commands::Report {
                execute, message, ..
            } => {
                assert!(execute);
                assert_eq!(message.as_deref(), Some("Archived"));
            }
            _ => panic!("expected report subcommand"),
        }
    }

    #[test]
    fn test_terminate_requires_session() {
        assert!(Cli::try_parse_from(["racwatch", "terminate", "c1"]).is_err());
    }
}
