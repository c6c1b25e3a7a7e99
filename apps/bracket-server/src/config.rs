use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;

use crate::telemetry::DEFAULT_LOG_FILTER;

#[derive(Debug, Parser)]
#[command(
    name = "bracket-server",
    author,
    version,
    about = "Generates tournament brackets through an external generator and serves the result"
)]
pub struct Cli {
    /// Address the HTTP listener binds to.
    #[arg(long, env = "BRACKET_LISTEN_ADDR", default_value = "0.0.0.0:3002")]
    pub listen_addr: String,

    /// Executable that produces the bracket artifact.
    #[arg(long, env = "BRACKET_GENERATOR_PROGRAM", default_value = "python3")]
    pub generator_program: String,

    /// Arguments placed before the team ids (repeat the flag, or space-separate in the env var).
    #[arg(
        long = "generator-arg",
        env = "BRACKET_GENERATOR_ARGS",
        value_delimiter = ' ',
        default_value = "api/generate_bracket.py"
    )]
    pub generator_args: Vec<String>,

    /// Working directory for the generator process.
    #[arg(long, env = "BRACKET_GENERATOR_DIR")]
    pub generator_dir: Option<PathBuf>,

    /// Directory the generator writes its artifact into.
    #[arg(long, env = "BRACKET_SOURCE_DIR", default_value = ".")]
    pub source_dir: PathBuf,

    /// Document root the artifact is served from.
    #[arg(long, env = "BRACKET_SERVING_DIR", default_value = "api")]
    pub serving_dir: PathBuf,

    /// File name of the bracket artifact.
    #[arg(long, env = "BRACKET_ARTIFACT_NAME", default_value = "tournament_bracket.html")]
    pub artifact_name: String,

    /// tracing filter directive.
    #[arg(long, env = "RUST_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub generator_program: String,
    pub generator_args: Vec<String>,
    pub generator_dir: Option<PathBuf>,
    pub source_dir: PathBuf,
    pub serving_dir: PathBuf,
    pub artifact_name: String,
    pub log_filter: String,
}

impl ServerConfig {
    /// Where the generator leaves the artifact.
    pub fn source_artifact(&self) -> PathBuf {
        self.source_dir.join(&self.artifact_name)
    }

    /// Where the HTTP layer serves the artifact from.
    pub fn serving_artifact(&self) -> PathBuf {
        self.serving_dir.join(&self.artifact_name)
    }

    /// Fixed public path handed back in every successful response.
    pub fn bracket_url(&self) -> String {
        format!("/{}", self.artifact_name)
    }
}

impl TryFrom<Cli> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let listen_addr: SocketAddr = cli
            .listen_addr
            .parse()
            .with_context(|| format!("invalid listen address: {}", cli.listen_addr))?;

        let artifact_name = cli.artifact_name.trim().to_string();
        if artifact_name.is_empty() || artifact_name.contains(['/', '\\']) {
            bail!("artifact name must be a bare file name, got {:?}", cli.artifact_name);
        }

        let generator_program = cli.generator_program.trim().to_string();
        if generator_program.is_empty() {
            bail!("generator program must not be empty");
        }

        Ok(ServerConfig {
            listen_addr,
            generator_program,
            generator_args: cli
                .generator_args
                .into_iter()
                .filter(|arg| !arg.is_empty())
                .collect(),
            generator_dir: cli.generator_dir,
            source_dir: cli.source_dir,
            serving_dir: cli.serving_dir,
            artifact_name,
            log_filter: cli.log_filter,
        })
    }
}
