use clap::Subcommand;
use serde_json::json;

use crate::auth::RegisterRequest;
use crate::cli::{open_state, utils, OutputFormat};
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum SuperAdminCommands {
    #[command(about = "Provision a super-admin account")]
    Create {
        #[arg(long, help = "Email address")]
        email: String,
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, env = "SAASCTL_PASSWORD", help = "Password (or SAASCTL_PASSWORD)")]
        password: String,
    },
}

pub async fn handle(cmd: SuperAdminCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SuperAdminCommands::Create { email, name, password } => {
            let state = open_state(config).await?;
            let account = state
                .authenticator
                .provision_super_admin(RegisterRequest { email, password, name })
                .await?;

            utils::output_success(
                output_format,
                "Super admin created",
                Some(json!({
                    "id": account.id,
                    "email": account.email,
                    "role": account.role(),
                })),
            )
        }
    }
}
