use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// JWT Claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Username
    pub uid: i32,    // Admin ID
    pub exp: usize,  // Expiration timestamp
}

/// Sign a new JWT token for an admin.
pub fn sign(admin_id: i32, username: &str, config: &AuthConfig) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.token_ttl_hours))
        .context("token expiry out of range")?
        .timestamp();

    let claims = Claims {
        sub: username.to_owned(),
        uid: admin_id,
        exp: usize::try_from(expiration).context("token expiry before epoch")?,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify and decode a JWT token.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
