pub mod commands;
pub mod utils;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::app::AppState;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgDirectory};
use crate::notify::LogNotifier;

#[derive(Parser)]
#[command(name = "saasctl")]
#[command(about = "saasctl - Operator CLI for the multi-tenant auth service")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Super-admin account management")]
    SuperAdmin {
        #[command(subcommand)]
        cmd: commands::super_admin::SuperAdminCommands,
    },

    #[command(about = "Tenant management")]
    Tenant {
        #[command(subcommand)]
        cmd: commands::tenant::TenantCommands,
    },

    #[command(about = "Password hashing utilities")]
    Password {
        #[command(subcommand)]
        cmd: commands::password::PasswordCommands,
    },

    #[command(about = "Issue and inspect session tokens")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },

    #[command(about = "Seed demo tenants and accounts into the database")]
    Seed,
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

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = AppConfig::from_env().context("invalid configuration")?;

    match cli.command {
        Commands::SuperAdmin { cmd } => commands::super_admin::handle(cmd, &config, output_format).await,
        Commands::Tenant { cmd } => commands::tenant::handle(cmd, &config, output_format).await,
        Commands::Password { cmd } => commands::password::handle(cmd, &config, output_format).await,
        Commands::Token { cmd } => commands::token::handle(cmd, &config, output_format),
        Commands::Seed => commands::seed::handle(&config, output_format).await,
    }
}

/// Connect to the configured database and make sure the schema exists
pub(crate) async fn open_directory(config: &AppConfig) -> anyhow::Result<PgDirectory> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("connecting to database")?;
    DatabaseManager::ensure_schema(&pool).await?;
    Ok(PgDirectory::new(pool))
}

/// Full application state over the configured database
pub(crate) async fn open_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let directory = open_directory(config).await?;
    let (state, _worker) = AppState::build(config.clone(), directory, Arc::new(LogNotifier))?;
    Ok(state)
}
