// src/handlers/photos.rs
// DOCUMENTATION: HTTP handlers for the photos.* procedures
// PURPOSE: Parse requests, check owner auth, call services, return responses
//
// Mutations are POST with a JSON body, queries are GET with query-string input.

use crate::config::Config;
use crate::errors::PortfolioError;
use crate::handlers::auth::verify_admin_token;
use crate::models::{
    CityQuery, LikedPhotosQuery, PageQuery, PhotoIdInput, PhotoInsertInput, PhotoUpdateInput,
};
use crate::services::{CitySetService, ObjectStore, PhotoService, ResponseCache};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;
use std::sync::Arc;
use validator::Validate;

/// POST /trpc/photos.create
pub async fn create_photo(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    cache: web::Data<Arc<ResponseCache>>,
    req: HttpRequest,
    body: web::Json<PhotoInsertInput>,
) -> Result<impl Responder, PortfolioError> {
    verify_admin_token(&req, &config)?;

    if let Err(e) = body.validate() {
        return Err(PortfolioError::ValidationError(e.to_string()));
    }

    let photo = PhotoService::create_photo(pool.get_ref(), &body).await?;
    cache.clear().await;

    Ok(HttpResponse::Created().json(photo))
}

/// POST /trpc/photos.update
pub async fn update_photo(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    cache: web::Data<Arc<ResponseCache>>,
    req: HttpRequest,
    body: web::Json<PhotoUpdateInput>,
) -> Result<impl Responder, PortfolioError> {
    verify_admin_token(&req, &config)?;

    if let Err(e) = body.validate() {
        return Err(PortfolioError::ValidationError(e.to_string()));
    }

    let photo = PhotoService::update_photo(pool.get_ref(), &body).await?;
    cache.clear().await;

    Ok(HttpResponse::Ok().json(photo))
}

/// POST /trpc/photos.remove
pub async fn remove_photo(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    cache: web::Data<Arc<ResponseCache>>,
    store: web::Data<Arc<dyn ObjectStore>>,
    req: HttpRequest,
    body: web::Json<PhotoIdInput>,
) -> Result<impl Responder, PortfolioError> {
    verify_admin_token(&req, &config)?;

    let photo =
        PhotoService::remove_photo(pool.get_ref(), store.get_ref().clone(), body.id).await?;
    cache.clear().await;

    Ok(HttpResponse::Ok().json(photo))
}

/// GET /trpc/photos.getOne?id=
/// A missing photo is `null`, not an error
pub async fn get_photo(
    pool: web::Data<PgPool>,
    query: web::Query<PhotoIdInput>,
) -> Result<impl Responder, PortfolioError> {
    let photo = PhotoService::get_photo(pool.get_ref(), query.id).await?;
    Ok(HttpResponse::Ok().json(photo))
}

/// GET /trpc/photos.getMany
/// Public listing, private photos never included
pub async fn list_photos(
    pool: web::Data<PgPool>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, PortfolioError> {
    let cursor = query.cursor()?;
    let page = PhotoService::list_photos(pool.get_ref(), cursor, query.limit(), true).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /trpc/photos.getManyWithPrivate
pub async fn list_photos_with_private(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, PortfolioError> {
    verify_admin_token(&req, &config)?;

    let cursor = query.cursor()?;
    let page = PhotoService::list_photos(pool.get_ref(), cursor, query.limit(), false).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /trpc/photos.getLikedPhotos?limit=
pub async fn liked_photos(
    pool: web::Data<PgPool>,
    query: web::Query<LikedPhotosQuery>,
) -> Result<impl Responder, PortfolioError> {
    let photos = PhotoService::liked_photos(pool.get_ref(), query.limit).await?;
    Ok(HttpResponse::Ok().json(photos))
}

/// GET /trpc/photos.getCitySets
pub async fn list_city_sets(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<ResponseCache>>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, PortfolioError> {
    let cursor = query.cursor()?;
    let limit = query.limit();
    let key = ResponseCache::city_sets_key(cursor.as_ref(), limit);

    if let Some(cached) = cache.get(&key).await {
        return Ok(HttpResponse::Ok().json(cached));
    }

    let generation = cache.generation();
    let page = CitySetService::list_city_sets(pool.get_ref(), cursor, limit).await?;
    let body = cache.put(key, &page, generation).await;
    Ok(HttpResponse::Ok().json(body))
}

/// GET /trpc/photos.getCitySetByCity?city=
pub async fn get_city_set_by_city(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<ResponseCache>>,
    query: web::Query<CityQuery>,
) -> Result<impl Responder, PortfolioError> {
    let key = ResponseCache::city_key(&query.city);

    if let Some(cached) = cache.get(&key).await {
        return Ok(HttpResponse::Ok().json(cached));
    }

    let generation = cache.generation();
    let city_set = CitySetService::get_by_city(pool.get_ref(), &query.city).await?;
    let body = cache.put(key, &city_set, generation).await;
    Ok(HttpResponse::Ok().json(body))
}

/// GET /trpc/photos.getMapFeatures
pub async fn map_features(pool: web::Data<PgPool>) -> Result<impl Responder, PortfolioError> {
    let collection = PhotoService::map_features(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(collection))
}

/// Configuration for photo procedure routes
pub fn config(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| PortfolioError::InvalidInput(err.to_string()).into());
    let query_config = web::QueryConfig::default()
        .error_handler(|err, _req| PortfolioError::InvalidInput(err.to_string()).into());

    cfg.service(
        web::scope("/trpc")
            .app_data(json_config)
            .app_data(query_config)
            .route("/photos.create", web::post().to(create_photo))
            .route("/photos.update", web::post().to(update_photo))
            .route("/photos.remove", web::post().to(remove_photo))
            .route("/photos.getOne", web::get().to(get_photo))
            .route("/photos.getMany", web::get().to(list_photos))
            .route(
                "/photos.getManyWithPrivate",
                web::get().to(list_photos_with_private),
            )
            .route("/photos.getLikedPhotos", web::get().to(liked_photos))
            .route("/photos.getCitySets", web::get().to(list_city_sets))
            .route("/photos.getCitySetByCity", web::get().to(get_city_set_by_city))
            .route("/photos.getMapFeatures", web::get().to(map_features)),
    );
}
