// src/handlers/auth.rs
// DOCUMENTATION: Owner authentication for protected procedures

use crate::config::Config;
use crate::errors::PortfolioError;
use actix_web::HttpRequest;

pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Helper function to verify owner authentication
/// DOCUMENTATION: Checks X-Admin-Token header against the configured token.
/// Missing header is 401, wrong token is 403.
pub fn verify_admin_token(req: &HttpRequest, config: &Config) -> Result<(), PortfolioError> {
    let token = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            log::warn!("Protected request without token: {}", req.path());
            PortfolioError::Unauthorized
        })?;

    if token != config.admin_token {
        log::warn!("Protected request with invalid token: {}", req.path());
        return Err(PortfolioError::Forbidden);
    }

    Ok(())
}
