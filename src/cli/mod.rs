pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::config::config;
use crate::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "plantation-admin")]
#[command(about = "Administrative CLI for the plantation registry database")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Load regions, districts, fruits, varieties and rootstocks from a YAML file")]
    Seed {
        #[arg(help = "Path to the reference fixture (YAML)")]
        file: std::path::PathBuf,
    },

    #[command(about = "User account management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
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

/// Pool for the configured DATABASE_URL
pub async fn connect() -> anyhow::Result<PgPool> {
    Ok(DatabaseManager::connect(&config().database).await?)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::Seed { file } => commands::seed::handle(file, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_user_create_with_global_json_flag() {
        let cli = Cli::try_parse_from([
            "plantation-admin",
            "user",
            "create",
            "inspector",
            "--password",
            "long-enough",
            "--district",
            "4",
            "--json",
        ])
        .unwrap();

        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Commands::User {
                cmd: commands::user::UserCommands::Create { username, district, superuser, .. },
            } => {
                assert_eq!(username, "inspector");
                assert_eq!(district, Some(4));
                assert!(!superuser);
            }
            _ => panic!("expected user create"),
        }
    }

    #[test]
    fn seed_requires_a_file() {
        assert!(Cli::try_parse_from(["plantation-admin", "seed"]).is_err());
        assert!(Cli::try_parse_from(["plantation-admin", "seed", "fixtures/reference.yaml"]).is_ok());
    }
}
