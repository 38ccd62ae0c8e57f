use clap::Subcommand;
use serde_json::json;

use crate::cli::{open_directory, utils, OutputFormat};
use crate::config::AppConfig;
use crate::database::models::NewTenant;
use crate::database::TenantRepository;

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "Register a tenant")]
    Create {
        #[arg(long, help = "Domain used as the tenant hint (e.g. 'demo')")]
        domain: String,
        #[arg(long, help = "Unique tenant code")]
        code: String,
        #[arg(long, help = "Display name")]
        name: String,
    },

    #[command(about = "Show a tenant by domain")]
    Show {
        #[arg(help = "Tenant domain")]
        domain: String,
    },
}

pub async fn handle(cmd: TenantCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let directory = open_directory(config).await?;

    match cmd {
        TenantCommands::Create { domain, code, name } => {
            let tenant = directory.create_tenant(NewTenant::new(domain, code, name)).await?;
            utils::output_success(
                output_format,
                "Tenant created",
                Some(json!({ "id": tenant.id, "domain": tenant.domain, "code": tenant.code })),
            )
        }
        TenantCommands::Show { domain } => {
            let tenant = directory
                .find_by_domain(&domain.to_ascii_lowercase())
                .await?
                .ok_or_else(|| anyhow::anyhow!("Tenant '{}' not found", domain))?;
            utils::output_success(output_format, &format!("Tenant {}", tenant.domain), Some(serde_json::to_value(&tenant)?))
        }
    }
}
