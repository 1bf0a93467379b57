use anyhow::Result;
use ashry_types::Language;
use clap::builder::PossibleValuesParser;
use clap::Arg;
use clap::ArgAction;
use clap::Command;
use strum::VariantNames;

use crate::configuration::Config;
use crate::configuration::ConfigKey;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

fn arg(key: ConfigKey, help: &str) -> Arg {
    let name = key.to_string();
    let help = format!("{help} [default: {}]", Config::default(key));

    return Arg::new(name.clone())
        .long(name)
        .num_args(1)
        .action(ArgAction::Set)
        .help(help);
}

fn arguments() -> Vec<Arg> {
    return vec![
        arg(ConfigKey::ConfigFile, "Path to configuration file").short('c'),
        arg(
            ConfigKey::Language,
            "Language tag sent along with submitted code",
        )
        .short('l')
        .env("ASHRY_LANGUAGE")
        .value_parser(PossibleValuesParser::new(Language::VARIANTS)),
        arg(ConfigKey::LogFile, "File the JSON debug log is written to").env("ASHRY_LOG_FILE"),
        arg(ConfigKey::LogLevel, "Minimum level written to the log file")
            .env("ASHRY_LOG_LEVEL")
            .value_parser(PossibleValuesParser::new(LOG_LEVELS)),
        arg(
            ConfigKey::ServerUrl,
            "Base URL of the code execution server (POST /run, GET /health)",
        )
        .short('s')
        .env("ASHRY_SERVER_URL"),
        arg(
            ConfigKey::SyncUrl,
            "WebSocket URL editor contents are mirrored to",
        )
        .env("ASHRY_SYNC_URL"),
    ];
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file helpers")
        .subcommand_required(true)
        .subcommand(Command::new("default").about("Print a commented default config.toml"));
}

pub fn build() -> Command {
    return Command::new("ashry")
        .about("Edit code, mirror it to a sync server, and run it against a remote execution server")
        .version(env!("CARGO_PKG_VERSION"))
        .args(arguments())
        .subcommand(subcommand_config());
}

/// Parses the command line and loads configuration. Returns `false` when a
/// subcommand was handled and the UI should not start.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    if let Some(("config", subcmd_matches)) = matches.subcommand() {
        if let Some(("default", _)) = subcmd_matches.subcommand() {
            println!("{}", Config::serialize_default(build()));
        }

        return Ok(false);
    }

    Config::load(build(), vec![&matches]).await?;

    return Ok(true);
}
