use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::outcome::{FetchError, FetchOutcome, RoundRef};
use crate::payload;
use crate::strategy::FetchStrategy;

/// Browser-rendered fetch via an external renderer command.
///
/// The command (typically a headless-browser wrapper) is invoked with a
/// single argument, the round number or `latest`, and must print the
/// upstream JSON payload to stdout. A missing binary is a capability
/// failure for this strategy only; every other misbehavior is transient.
#[derive(Clone, Debug)]
pub struct RenderedStrategy {
    command: String,
}

impl RenderedStrategy {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn round_arg(round: RoundRef) -> String {
        match round {
            RoundRef::Specific(round) => round.to_string(),
            RoundRef::Latest => "latest".to_owned(),
        }
    }
}

#[async_trait]
impl FetchStrategy for RenderedStrategy {
    fn name(&self) -> &'static str {
        "rendered"
    }

    async fn attempt(&self, round: RoundRef) -> FetchOutcome {
        debug!(command = %self.command, %round, "invoking renderer");

        let output = Command::new(&self.command)
            .arg(Self::round_arg(round))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        let output = match output {
            Ok(output) => output,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return FetchOutcome::Fatal(FetchError::CapabilityMissing(format!(
                    "renderer command `{}` not found",
                    self.command
                )));
            }
            Err(err) => return FetchOutcome::Transient(FetchError::Renderer(err.to_string())),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return FetchOutcome::Transient(FetchError::Renderer(format!(
                "exit {:?}: {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        payload::decode(stdout.trim(), round)
    }
}
