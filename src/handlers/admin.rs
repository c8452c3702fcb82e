// src/handlers/admin.rs
// DOCUMENTATION: Admin handlers for city set maintenance
// PURPOSE: Expose aggregate rebuild and portfolio statistics via REST endpoints

use crate::config::Config;
use crate::db::CitySetRepository;
use crate::errors::PortfolioError;
use crate::handlers::auth::verify_admin_token;
use crate::services::{CitySetService, ResponseCache};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;
use std::sync::Arc;

/// POST /admin/city-sets/rebuild
/// Recompute every city set from the photo table
///
/// DOCUMENTATION: Repairs drift left by removals keyed on the raw city.
/// Requires admin authentication via X-Admin-Token header
pub async fn rebuild_city_sets(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    cache: web::Data<Arc<ResponseCache>>,
    req: HttpRequest,
) -> Result<impl Responder, PortfolioError> {
    verify_admin_token(&req, &config)?;

    log::info!("Admin city set rebuild requested");

    let stats = CitySetService::rebuild(pool.get_ref()).await?;
    cache.clear().await;

    Ok(HttpResponse::Ok().json(stats))
}

/// GET /admin/stats
/// Photo and city set counts, including sets whose count disagrees with the photo table
pub async fn portfolio_stats(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    cache: web::Data<Arc<ResponseCache>>,
    req: HttpRequest,
) -> Result<impl Responder, PortfolioError> {
    verify_admin_token(&req, &config)?;

    let stats = CitySetRepository::stats(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "stats": stats,
        "cached_responses": cache.len().await,
    })))
}

/// Configuration for admin routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/city-sets/rebuild", web::post().to(rebuild_city_sets))
            .route("/stats", web::get().to(portfolio_stats)),
    );
}
