use chrono::{TimeZone, Utc};
use clap::Subcommand;
use serde_json::json;

use crate::auth::{Audience, PrincipalClaims, TokenCodec};
use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;
use crate::types::{Role, TenantId, UserId};

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Issue a session token without a password check")]
    Issue {
        #[arg(long, help = "Principal id")]
        user_id: UserId,
        #[arg(long, help = "Principal email")]
        email: String,
        #[arg(long, help = "Role: user, admin or super_admin")]
        role: Role,
        #[arg(long, help = "Owning tenant (required unless super_admin)")]
        tenant_id: Option<TenantId>,
    },

    #[command(about = "Verify a token and print its claims")]
    Inspect {
        #[arg(help = "Encoded token")]
        token: String,
        #[arg(long, help = "Verify with the super-admin secret")]
        super_admin: bool,
    },
}

pub fn handle(cmd: TokenCommands, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Issue { user_id, email, role, tenant_id } => {
            let audience = match (role, tenant_id) {
                (Role::SuperAdmin, None) => Audience::SuperAdmin,
                (Role::SuperAdmin, Some(_)) => anyhow::bail!("super_admin tokens carry no tenant"),
                (_, None) => anyhow::bail!("--tenant-id is required for role {}", role),
                (_, Some(_)) => Audience::Tenant,
            };

            let codec = TokenCodec::from_config(audience, &config.security)?;
            let issued = codec.issue(&PrincipalClaims {
                principal_id: user_id,
                email,
                role,
                tenant_id,
            })?;
            utils::output_value(output_format, "token", &issued.token)
        }
        TokenCommands::Inspect { token, super_admin } => {
            let audience = if super_admin { Audience::SuperAdmin } else { Audience::Tenant };
            let codec = TokenCodec::from_config(audience, &config.security)?;
            let claims = codec.parse(&token)?;

            let expires = Utc
                .timestamp_opt(claims.expires_at, 0)
                .single()
                .map(|t| t.to_rfc3339());
            utils::output_success(
                output_format,
                &format!("Valid {} token", audience.as_str()),
                Some(json!({
                    "user_id": claims.principal_id,
                    "email": claims.email,
                    "role": claims.role,
                    "tenant_id": claims.tenant_id,
                    "expires_at": expires,
                })),
            )
        }
    }
}
