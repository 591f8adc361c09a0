//! CLI parse tests.

use super::{Cli, CliCommand, StrategyArg};
use clap::Parser;

pub(super) fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

mod status_watch;

#[test]
fn missing_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["dlsync"]).is_err());
}

#[test]
fn api_url_is_global() {
    let cli = parse(&["dlsync", "status", "--api-url", "http://nas:9000"]);
    assert_eq!(cli.api_url.as_deref(), Some("http://nas:9000"));
    assert!(matches!(cli.command, CliCommand::Status));

    let cli = parse(&["dlsync", "--api-url", "http://nas:9000", "pause", "j1"]);
    assert_eq!(cli.api_url.as_deref(), Some("http://nas:9000"));
}

#[test]
fn strategy_arg_maps_to_core_strategy() {
    use dlsync_core::StreamStrategy;
    assert_eq!(StreamStrategy::from(StrategyArg::PerJob), StreamStrategy::PerJob);
    assert_eq!(StreamStrategy::from(StrategyArg::Global), StreamStrategy::Global);
}
