//! Runs the external bracket generator and interprets its report.
//!
//! The generator is an opaque child process: team ids go in as positional
//! arguments, one JSON [`GeneratorReport`] comes out on stdout. A crash in the
//! child surfaces as a [`GenerationError`], never as a server fault.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use bracket_proto::{GeneratorReport, TeamId};
use thiserror::Error;
use tokio::process::Command as TokioCommand;
use tracing::{debug, error, info, warn};

const GENERIC_FAILURE: &str = "Failed to generate bracket";

/// What a successful generation run reports back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedBracket {
    pub champion: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Failed to generate bracket: no team identifiers supplied")]
    EmptySelection,
    #[error("Failed to generate bracket: {0}")]
    Launch(#[source] std::io::Error),
    #[error("Failed to generate bracket: generator exited with {status}: {detail}")]
    Exit { status: String, detail: String },
    #[error("Failed to parse bracket generation result: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("{0}")]
    Reported(String),
}

#[async_trait]
pub trait BracketGenerator: Send + Sync {
    /// One attempt, no retries. Callers treat any error as terminal for the
    /// request.
    async fn generate(&self, team_ids: &[TeamId]) -> Result<GeneratedBracket, GenerationError>;
}

/// Launches `program [base_args..] <team ids..>` and waits for it to exit.
#[derive(Debug, Clone)]
pub struct ProcessGenerator {
    program: OsString,
    base_args: Vec<OsString>,
    working_dir: Option<PathBuf>,
}

impl ProcessGenerator {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.base_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn command(&self, team_ids: &[TeamId]) -> TokioCommand {
        let mut command = TokioCommand::new(&self.program);
        command.args(&self.base_args);
        command.args(team_ids.iter().map(|id| id.to_string()));
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        command
    }
}

#[async_trait]
impl BracketGenerator for ProcessGenerator {
    async fn generate(&self, team_ids: &[TeamId]) -> Result<GeneratedBracket, GenerationError> {
        if team_ids.is_empty() {
            return Err(GenerationError::EmptySelection);
        }

        info!(
            program = ?self.program,
            team_ids = ?team_ids,
            "launching bracket generator"
        );
        let output = self
            .command(team_ids)
            .output()
            .await
            .map_err(|err| {
                error!(program = ?self.program, error = %err, "failed to launch bracket generator");
                GenerationError::Launch(err)
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!(stderr = %stderr.trim(), "bracket generator wrote to stderr");
        }

        if !output.status.success() {
            let detail = failure_detail(&stderr);
            error!(
                status = %describe_exit_status(output.status),
                detail = %detail,
                raw_output = %stdout.trim(),
                "bracket generator exited unsuccessfully"
            );
            return Err(GenerationError::Exit {
                status: describe_exit_status(output.status),
                detail,
            });
        }

        interpret_report(&stdout)
    }
}

/// Maps the generator's stdout onto a generation outcome. The raw output is
/// logged on parse failure and never leaves the server.
pub fn interpret_report(stdout: &str) -> Result<GeneratedBracket, GenerationError> {
    let report: GeneratorReport = serde_json::from_str(stdout.trim()).map_err(|err| {
        error!(error = %err, raw_output = %stdout, "unable to parse bracket generator output");
        GenerationError::Parse(err)
    })?;

    if !report.success {
        let reason = report
            .error
            .filter(|msg| !msg.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        warn!(reason = %reason, "bracket generator reported failure");
        return Err(GenerationError::Reported(reason));
    }

    debug!(champion = ?report.champion, "bracket generator reported success");
    Ok(GeneratedBracket {
        champion: report.champion,
        message: report.message,
    })
}

/// Client-facing detail for a failed run. Stdout stays in the logs.
fn failure_detail(stderr: &str) -> String {
    match stderr.trim() {
        "" => "no diagnostic output".to_string(),
        detail => detail.to_string(),
    }
}

fn describe_exit_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {code}"),
        None => "termination by signal".to_string(),
    }
}
