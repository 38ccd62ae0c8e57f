use serde_json::json;

use crate::auth::PasswordHasher;
use crate::cli::{open_directory, utils, OutputFormat};
use crate::config::AppConfig;
use crate::database::seed::seed_demo_data;

pub async fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let directory = open_directory(config).await?;
    let summary = seed_demo_data(&directory, PasswordHasher::new(config.security.bcrypt_cost)).await?;

    utils::output_success(
        output_format,
        "Demo data seeded",
        Some(json!({ "tenants": summary.tenants, "users": summary.users })),
    )
}
