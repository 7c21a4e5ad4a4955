use sea_orm::*;
use tracing::info;

use crate::config::BootstrapConfig;
use crate::entity::admin;
use crate::utils::hash;

/// Create the configured bootstrap admin when no admin account exists yet.
///
/// Returns whether an account was created.
pub async fn ensure_bootstrap_admin(
    db: &DatabaseConnection,
    config: &BootstrapConfig,
) -> anyhow::Result<bool> {
    let (Some(username), Some(email), Some(password)) =
        (&config.username, &config.email, &config.password)
    else {
        return Ok(false);
    };

    if admin::Entity::find().count(db).await? > 0 {
        return Ok(false);
    }

    let hashed = hash::hash_password(password)
        .map_err(|e| anyhow::anyhow!("failed to hash bootstrap password: {e}"))?;

    admin::ActiveModel {
        username: Set(username.trim().to_string()),
        email: Set(email.trim().to_lowercase()),
        password: Set(hashed),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(%username, "Created bootstrap admin");
    Ok(true)
}
