pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "bistro")]
#[command(about = "Bistro CLI - token tooling and gateway checks")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign and verify bearer tokens with the local secret")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },

    #[command(about = "List routes and the guards in front of them")]
    Routes,

    #[command(about = "Checks against a running gateway")]
    Remote {
        #[arg(long, env = "BISTRO_URL", default_value = "http://localhost:5000", global = true)]
        url: String,

        #[command(subcommand)]
        cmd: commands::remote::RemoteCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Token { cmd } => commands::token::handle(cmd, output_format),
        Commands::Routes => commands::routes::handle(output_format),
        Commands::Remote { url, cmd } => commands::remote::handle(&url, cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote_admin_check() {
        let cli = Cli::parse_from([
            "bistro",
            "--json",
            "remote",
            "--url",
            "http://gateway:8080",
            "admin-check",
            "--email",
            "chef@x.com",
            "--token",
            "abc",
        ]);

        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        match cli.command {
            Commands::Remote { url, cmd } => {
                assert_eq!(url, "http://gateway:8080");
                assert!(matches!(cmd, commands::remote::RemoteCommands::AdminCheck { .. }));
            }
            _ => panic!("expected remote command"),
        }
    }
}
