// src/services/photo_service.rs
// DOCUMENTATION: Business logic for photos
// PURPOSE: Intermediary between handlers and repositories; owns the
// transaction boundary around photo writes and city set maintenance

use std::sync::Arc;

use crate::db::PhotoRepository;
use crate::errors::PortfolioError;
use crate::models::{clamp_limit, Cursor, Page, Photo, PhotoInsertInput, PhotoUpdateInput};
use crate::services::{
    photos_to_feature_collection, spawn_backing_object_delete, CitySetService, ObjectStore,
};
use geojson::FeatureCollection;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PhotoService;

impl PhotoService {
    /// Insert a photo and count it into its city set
    /// DOCUMENTATION: Both writes share one transaction; if the city set
    /// upsert fails the photo insert is rolled back too.
    pub async fn create_photo(
        pool: &PgPool,
        input: &PhotoInsertInput,
    ) -> Result<Photo, PortfolioError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| PortfolioError::database("create photo", e))?;

        let photo = PhotoRepository::insert(&mut *tx, input).await?;
        CitySetService::on_photo_created(&mut *tx, &photo).await?;

        tx.commit()
            .await
            .map_err(|e| PortfolioError::database("create photo", e))?;

        Ok(photo)
    }

    /// Apply a partial update
    /// DOCUMENTATION: None of the editable fields take part in the city key,
    /// so city sets are not touched.
    pub async fn update_photo(
        pool: &PgPool,
        input: &PhotoUpdateInput,
    ) -> Result<Photo, PortfolioError> {
        let id = input
            .id
            .ok_or_else(|| PortfolioError::BadRequest("Photo id is required".to_string()))?;

        PhotoRepository::update(pool, id, input).await?.ok_or_else(|| {
            log::warn!("Update for unknown photo: {}", id);
            PortfolioError::NotFound("Photo not found".to_string())
        })
    }

    /// Remove a photo, its city set membership, and (best effort) its image
    /// DOCUMENTATION: The row delete and city set adjustment commit together.
    /// The object delete runs afterwards in the background and can only log.
    /// Returns the photo as it was before deletion.
    pub async fn remove_photo(
        pool: &PgPool,
        store: Arc<dyn ObjectStore>,
        id: Uuid,
    ) -> Result<Photo, PortfolioError> {
        let mut tx = pool
            .begin()
            .await
            .map_err(|e| PortfolioError::database("delete photo", e))?;

        let photo = PhotoRepository::lock_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| {
                log::warn!("Remove for unknown photo: {}", id);
                PortfolioError::NotFound("Photo not found".to_string())
            })?;

        CitySetService::on_photo_removed(&mut *tx, &photo).await?;
        PhotoRepository::delete(&mut *tx, id).await?;

        tx.commit()
            .await
            .map_err(|e| PortfolioError::database("delete photo", e))?;

        log::info!("Deleted photo: {}", id);
        spawn_backing_object_delete(store, photo.clone());

        Ok(photo)
    }

    pub async fn get_photo(pool: &PgPool, id: Uuid) -> Result<Option<Photo>, PortfolioError> {
        PhotoRepository::get_by_id(pool, id).await
    }

    /// Keyset page of photos; `public_only` hides private photos on every page
    pub async fn list_photos(
        pool: &PgPool,
        cursor: Option<Cursor>,
        limit: i64,
        public_only: bool,
    ) -> Result<Page<Photo>, PortfolioError> {
        let rows = PhotoRepository::list_page(pool, cursor, limit, public_only).await?;
        Ok(Page::from_rows(rows, limit))
    }

    pub async fn liked_photos(
        pool: &PgPool,
        limit: Option<i64>,
    ) -> Result<Vec<Photo>, PortfolioError> {
        PhotoRepository::liked(pool, clamp_limit(limit)).await
    }

    pub async fn map_features(pool: &PgPool) -> Result<FeatureCollection, PortfolioError> {
        let photos = PhotoRepository::list_geotagged_public(pool).await?;
        Ok(photos_to_feature_collection(&photos))
    }
}
