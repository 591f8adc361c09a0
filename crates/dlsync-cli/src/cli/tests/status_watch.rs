//! Tests for status and watch.

use clap::Parser;

use super::parse;
use crate::cli::{CliCommand, StrategyArg};

#[test]
fn cli_parse_status() {
    assert!(matches!(parse(&["dlsync", "status"]).command, CliCommand::Status));
}

#[test]
fn cli_parse_watch_default_strategy() {
    match parse(&["dlsync", "watch"]).command {
        CliCommand::Watch { strategy } => assert!(strategy.is_none()),
        other => panic!("expected Watch, got {other:?}"),
    }
}

#[test]
fn cli_parse_watch_strategy() {
    match parse(&["dlsync", "watch", "--strategy", "global"]).command {
        CliCommand::Watch { strategy } => assert_eq!(strategy, Some(StrategyArg::Global)),
        other => panic!("expected Watch, got {other:?}"),
    }
    match parse(&["dlsync", "watch", "--strategy", "per-job"]).command {
        CliCommand::Watch { strategy } => assert_eq!(strategy, Some(StrategyArg::PerJob)),
        other => panic!("expected Watch, got {other:?}"),
    }
    assert!(crate::cli::Cli::try_parse_from(["dlsync", "watch", "--strategy", "bogus"]).is_err());
}
