use crate::config::{Credentials, RacConfig};

/// Operations understood by the `rac` utility
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RacCommand {
    ClusterList,
    ServerList {
        cluster: String,
    },
    InfobaseSummaryList {
        cluster: String,
    },
    SessionList {
        cluster: String,
        infobase: Option<String>,
    },
    InfobaseUpdate {
        cluster: String,
        infobase: String,
        sessions_deny: bool,
        scheduled_jobs_deny: bool,
        denied_message: String,
    },
    SessionTerminate {
        cluster: String,
        session: String,
    },
}

impl RacCommand {
    /// Verb tokens following the endpoint, e.g. `infobase summary list`
    pub fn verb(&self) -> &'static [&'static str] {
        match self {
            RacCommand::ClusterList => &["cluster", "list"],
            RacCommand::ServerList { .. } => &["server", "list"],
            RacCommand::InfobaseSummaryList { .. } => &["infobase", "summary", "list"],
            RacCommand::SessionList { .. } => &["session", "list"],
            RacCommand::InfobaseUpdate { .. } => &["infobase", "update"],
            RacCommand::SessionTerminate { .. } => &["session", "terminate"],
        }
    }

    /// Whether a zero exit with empty stdout still counts as failure.
    ///
    /// `infobase update` is only trusted when `rac` printed a reply;
    /// `session terminate` is silent on success.
    pub fn requires_reply(&self) -> bool {
        matches!(self, RacCommand::InfobaseUpdate { .. })
    }

    fn uses_cluster_auth(&self) -> bool {
        !matches!(self, RacCommand::ClusterList)
    }

    fn uses_infobase_auth(&self) -> bool {
        matches!(self, RacCommand::InfobaseUpdate { .. })
    }
}

impl std::fmt::Display for RacCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.verb().join(" "))
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

/// Assembles `rac` argument lists.
///
/// Order is fixed: endpoint, verb, required parameters, optional filters,
/// then credentials. The utility path itself is not part of the list.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    endpoint: String,
    cluster_auth: Credentials,
    infobase_auth: Credentials,
}

impl CommandBuilder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            cluster_auth: Credentials::default(),
            infobase_auth: Credentials::default(),
        }
    }

    pub fn from_config(config: &RacConfig) -> Self {
        Self::new(config.endpoint())
            .with_cluster_auth(config.cluster_auth.clone())
            .with_infobase_auth(config.infobase_auth.clone())
    }

    #[must_use]
    pub fn with_cluster_auth(mut self, credentials: Credentials) -> Self {
        self.cluster_auth = credentials;
        self
    }

    #[must_use]
    pub fn with_infobase_auth(mut self, credentials: Credentials) -> Self {
        self.infobase_auth = credentials;
        self
    }

    pub fn build(&self, command: &RacCommand) -> Vec<String> {
        let mut args = vec![self.endpoint.clone()];
        args.extend(command.verb().iter().map(ToString::to_string));

        match command {
            RacCommand::ClusterList => {}
            RacCommand::ServerList { cluster } | RacCommand::InfobaseSummaryList { cluster } => {
                args.push(format!("--cluster={cluster}"));
            }
            RacCommand::SessionList { cluster, infobase } => {
                args.push(format!("--cluster={cluster}"));
                if let Some(infobase) = infobase.as_deref().filter(|id| !id.is_empty()) {
                    args.push(format!("--infobase={infobase}"));
                }
            }
            RacCommand::InfobaseUpdate {
                cluster,
                infobase,
                sessions_deny,
                scheduled_jobs_deny,
                denied_message,
            } => {
                args.push(format!("--cluster={cluster}"));
                args.push(format!("--infobase={infobase}"));
                args.push(format!("--sessions-deny={}", on_off(*sessions_deny)));
                args.push(format!(
                    "--scheduled-jobs-deny={}",
                    on_off(*scheduled_jobs_deny)
                ));
                args.push(format!("--denied-message={denied_message}"));
            }
            RacCommand::SessionTerminate { cluster, session } => {
                args.push(format!("--cluster={cluster}"));
                args.push(format!("--session={session}"));
            }
        }

        if command.uses_cluster_auth() {
            push_credentials(&mut args, &self.cluster_auth, "--cluster-user", "--cluster-pwd");
        }
        if command.uses_infobase_auth() {
            push_credentials(
                &mut args,
                &self.infobase_auth,
                "--infobase-user",
                "--infobase-pwd",
            );
        }

        args
    }
}

/// Each flag is emitted only when its value is non-empty
fn push_credentials(args: &mut Vec<String>, credentials: &Credentials, user_flag: &str, pwd_flag: &str) {
    if !credentials.user.is_empty() {
        args.push(user_flag.to_string());
        args.push(credentials.user.clone());
    }
    if !credentials.password.is_empty() {
        args.push(pwd_flag.to_string());
        args.push(credentials.password.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> CommandBuilder {
        CommandBuilder::new("localhost:1545")
    }

    #[test]
    fn test_cluster_list_has_no_credentials() {
        let args = builder()
            .with_cluster_auth(Credentials::new("admin", "secret"))
            .build(&RacCommand::ClusterList);
        assert_eq!(args, ["localhost:1545", "cluster", "list"]);
    }

    #[test]
    fn test_server_list_with_cluster_auth() {
        let args = builder()
            .with_cluster_auth(Credentials::new("admin", "secret"))
            .build(&RacCommand::ServerList {
                cluster: "c1".to_string(),
            });
        assert_eq!(
            args,
            [
                "localhost:1545",
                "server",
                "list",
                "--cluster=c1",
                "--cluster-user",
                "admin",
                "--cluster-pwd",
                "secret"
            ]
        );
    }

    #[test]
    fn test_infobase_summary_list() {
        let args = builder().build(&RacCommand::InfobaseSummaryList {
            cluster: "c1".to_string(),
        });
        assert_eq!(
            args,
            ["localhost:1545", "infobase", "summary", "list", "--cluster=c1"]
        );
    }

    #[test]
    fn test_session_list_filter_precedes_credentials() {
        let args = builder()
            .with_cluster_auth(Credentials::new("admin", ""))
            .build(&RacCommand::SessionList {
                cluster: "c1".to_string(),
                infobase: Some("ib1".to_string()),
            });
        assert_eq!(
            args,
            [
                "localhost:1545",
                "session",
                "list",
                "--cluster=c1",
                "--infobase=ib1",
                "--cluster-user",
                "admin"
            ]
        );
    }

    #[test]
    fn test_session_list_without_filter() {
        let args = builder().build(&RacCommand::SessionList {
            cluster: "c1".to_string(),
            infobase: None,
        });
        assert_eq!(args, ["localhost:1545", "session", "list", "--cluster=c1"]);
    }

    #[test]
    fn test_password_only_credentials() {
        let args = builder()
            .with_cluster_auth(Credentials::new("", "secret"))
            .build(&RacCommand::ServerList {
                cluster: "c1".to_string(),
            });
        assert_eq!(&args[4..], ["--cluster-pwd", "secret"]);
    }

    #[test]
    fn test_infobase_update_carries_both_credential_sets() {
        let args = builder()
            .with_cluster_auth(Credentials::new("admin", "secret"))
            .with_infobase_auth(Credentials::new("Administrator", ""))
            .build(&RacCommand::InfobaseUpdate {
                cluster: "c1".to_string(),
                infobase: "ib1".to_string(),
                sessions_deny: true,
                scheduled_jobs_deny: false,
                denied_message: "Maintenance".to_string(),
            });
        assert_eq!(
            args,
            [
                "localhost:1545",
                "infobase",
                "update",
                "--cluster=c1",
                "--infobase=ib1",
                "--sessions-deny=on",
                "--scheduled-jobs-deny=off",
                "--denied-message=Maintenance",
                "--cluster-user",
                "admin",
                "--cluster-pwd",
                "secret",
                "--infobase-user",
                "Administrator"
            ]
        );
    }

    #[test]
    fn test_session_terminate_ignores_infobase_auth() {
        let args = builder()
            .with_infobase_auth(Credentials::new("Administrator", "pwd"))
            .build(&RacCommand::SessionTerminate {
                cluster: "c1".to_string(),
                session: "s1".to_string(),
            });
        assert_eq!(
            args,
            ["localhost:1545", "session", "terminate", "--cluster=c1", "--session=s1"]
        );
    }

    #[test]
    fn test_display_and_reply_rule() {
        let update = RacCommand::InfobaseUpdate {
            cluster: String::new(),
            infobase: String::new(),
            sessions_deny: false,
            scheduled_jobs_deny: false,
            denied_message: String::new(),
        };
        assert_eq!(update.to_string(), "infobase update");
        assert!(update.requires_reply());
        assert!(!RacCommand::SessionTerminate {
            cluster: String::new(),
            session: String::new(),
        }
        .requires_reply());
    }
}
