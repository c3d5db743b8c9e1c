use crate::config::RacConfig;
use crate::error::{RacError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

/// Raw result of one `rac` invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Something that can run `rac` with an argument list.
///
/// Implementations must bound the wait; a call that does not finish in time
/// returns [`RacError::Timeout`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn invoke(&self, args: &[String]) -> Result<CommandOutput>;
}

/// Runs the real `rac` executable as a child process
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn from_config(config: &RacConfig) -> Self {
        Self::new(&config.rac_path, config.timeout)
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    #[tracing::instrument(name = "rac.invoke", skip_all, fields(program = %self.program.display()))]
    async fn invoke(&self, args: &[String]) -> Result<CommandOutput> {
        debug!("Executing: {:?}", redact_args(args));
        let started = Instant::now();

        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!("Failed to execute {}: {}", self.program.display(), e);
                return Err(RacError::Spawn(e));
            }
            Err(_) => {
                warn!("Command timed out after {:?}", self.timeout);
                return Err(RacError::Timeout(self.timeout));
            }
        };

        let result = CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(
            exit_code = result.exit_code,
            stdout_bytes = result.stdout.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "rac finished"
        );

        Ok(result)
    }
}

/// Copy of `args` with password values masked, for logging
pub fn redact_args(args: &[String]) -> Vec<String> {
    let mut redacted = Vec::with_capacity(args.len());
    let mut mask_next = false;

    for arg in args {
        if mask_next {
            redacted.push("***".to_string());
            mask_next = false;
            continue;
        }
        mask_next = arg == "--cluster-pwd" || arg == "--infobase-pwd";
        redacted.push(arg.clone());
    }

    redacted
}
