use clap::Subcommand;

use crate::auth::PasswordHasher;
use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;

#[derive(Subcommand)]
pub enum PasswordCommands {
    #[command(about = "Hash a password with the configured bcrypt cost")]
    Hash {
        #[arg(help = "Plaintext password")]
        password: String,
        #[arg(long, help = "Override the configured cost")]
        cost: Option<u32>,
    },

    #[command(about = "Check a password against a stored digest")]
    Verify {
        #[arg(help = "Stored bcrypt digest")]
        digest: String,
        #[arg(help = "Plaintext password")]
        password: String,
    },
}

pub async fn handle(cmd: PasswordCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        PasswordCommands::Hash { password, cost } => {
            let hasher = PasswordHasher::new(cost.unwrap_or(config.security.bcrypt_cost));
            let digest = hasher.hash_blocking(password).await?;
            utils::output_value(output_format, "digest", &digest)
        }
        PasswordCommands::Verify { digest, password } => {
            let hasher = PasswordHasher::new(config.security.bcrypt_cost);
            if hasher.verify_blocking(digest, password).await? {
                utils::output_success(output_format, "Password matches", None)
            } else {
                anyhow::bail!("Password does not match")
            }
        }
    }
}
