//! CLI for the dlsync download manager client.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use dlsync_core::config::{self, SyncConfig};
use dlsync_core::StreamStrategy;

use commands::{run_add, run_pause, run_remove, run_resume, run_status, run_watch};

/// Top-level CLI for the dlsync client.
#[derive(Debug, Parser)]
#[command(name = "dlsync")]
#[command(about = "dlsync: follow and control jobs on a download service", long_about = None)]
pub struct Cli {
    /// Service origin; overrides the config file and DLSYNC_API_URL.
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Show every job with the status counts.
    Status,

    /// Start a new download.
    Add {
        /// Direct HTTP/HTTPS URL to download.
        url: String,
        /// Directory on the service host to save into.
        #[arg(long, short = 'o', value_name = "DIR")]
        output: String,
        /// Target file name; detected by the service when omitted.
        #[arg(long)]
        filename: Option<String>,
    },

    /// Pause a job.
    Pause {
        /// Job identifier.
        id: String,
    },

    /// Resume a paused job.
    Resume {
        /// Job identifier.
        id: String,
    },

    /// Cancel a job and drop it from the service.
    Remove {
        /// Job identifier.
        id: String,
    },

    /// Follow live progress until interrupted.
    Watch {
        /// Override the configured push connection layout.
        #[arg(long, value_enum)]
        strategy: Option<StrategyArg>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    PerJob,
    Global,
}

impl From<StrategyArg> for StreamStrategy {
    fn from(s: StrategyArg) -> Self {
        match s {
            StrategyArg::PerJob => StreamStrategy::PerJob,
            StrategyArg::Global => StreamStrategy::Global,
        }
    }
}

impl Cli {
    /// Config file, then environment, then command line.
    fn load_config(&self) -> Result<SyncConfig> {
        let mut cfg = config::load_or_init()?;
        if let Some(url) = &self.api_url {
            cfg.api_base_url = url.clone();
        }
        if let CliCommand::Watch {
            strategy: Some(strategy),
        } = self.command
        {
            cfg.stream_strategy = strategy.into();
        }
        tracing::debug!("loaded config: {:?}", cfg);
        Ok(cfg)
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = cli.load_config()?;

        match cli.command {
            CliCommand::Status => run_status(&cfg).await?,
            CliCommand::Add {
                url,
                output,
                filename,
            } => run_add(&cfg, &url, &output, filename.as_deref()).await?,
            CliCommand::Pause { id } => run_pause(&cfg, &id).await?,
            CliCommand::Resume { id } => run_resume(&cfg, &id).await?,
            CliCommand::Remove { id } => run_remove(&cfg, &id).await?,
            CliCommand::Watch { .. } => run_watch(&cfg).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
