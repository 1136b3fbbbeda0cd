//! CLI argument parsing using clap.
//!
//! Contains the Cli struct and the Commands enum.

use clap::{
    Args, Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Attribute access observer
#[derive(Parser, Debug)]
#[command(
    name = "propwatch",
    version = env!("CARGO_PKG_VERSION"),
    about = "Observe, veto and override access to a record attribute",
    next_line_help = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize project
    #[command(about = "Set up .propwatch directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings from .propwatch/settings.toml")]
    Config,

    /// Run the observation walkthrough
    #[command(
        about = "Observe `x` on a sample record and print every fired event",
        after_help = "Examples:\n  propwatch demo\n  propwatch demo --set 9 --set 10\n  propwatch demo --veto-above 100 --set 50 --set 512\n  propwatch demo --override '\"cached\"'"
    )]
    Demo(DemoArgs),
}

/// Options for the `demo` command.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct DemoArgs {
    /// Starting value of `x`
    #[arg(long, default_value_t = 10)]
    pub initial: i64,

    /// Values written to `x` in order while observed
    #[arg(long = "set", value_name = "N", default_values_t = [9, 10])]
    pub sets: Vec<i64>,

    /// Veto writes of values greater than this
    #[arg(long, value_name = "N")]
    pub veto_above: Option<i64>,

    /// Override reads of `x` with this JSON value (plain text becomes a string)
    #[arg(long = "override", value_name = "VALUE")]
    pub override_value: Option<String>,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            initial: 10,
            sets: vec![9, 10],
            veto_above: None,
            override_value: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_defaults_match_default_impl() {
        let cli = Cli::try_parse_from(["propwatch", "demo"]).unwrap();
        match cli.command {
            Commands::Demo(args) => assert_eq!(args, DemoArgs::default()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_demo_flags() {
        let cli = Cli::try_parse_from([
            "propwatch",
            "demo",
            "--initial",
            "1",
            "--set",
            "2",
            "--set",
            "300",
            "--veto-above",
            "100",
            "--override",
            "42",
        ])
        .unwrap();
        let Commands::Demo(args) = cli.command else {
            panic!("expected demo");
        };
        assert_eq!(args.initial, 1);
        assert_eq!(args.sets, vec![2, 300]);
        assert_eq!(args.veto_above, Some(100));
        assert_eq!(args.override_value.as_deref(), Some("42"));
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["propwatch", "config", "--config", "a/settings.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("a/settings.toml")));
        assert!(matches!(cli.command, Commands::Config));
    }
}
