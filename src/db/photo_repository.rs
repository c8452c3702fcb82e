// src/db/photo_repository.rs
// DOCUMENTATION: Photo database operations
// PURPOSE: CRUD and keyset listings over the photos table

use crate::errors::PortfolioError;
use crate::models::{Cursor, Photo, PhotoInsertInput, PhotoUpdateInput};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub struct PhotoRepository;

impl PhotoRepository {
    /// Insert a new photo
    /// DOCUMENTATION: Runs on the caller's connection so it can share a
    /// transaction with the city set upsert. id and timestamps are generated
    /// by the database.
    pub async fn insert(
        conn: &mut PgConnection,
        input: &PhotoInsertInput,
    ) -> Result<Photo, PortfolioError> {
        let photo = sqlx::query_as::<_, Photo>(
            r#"
            INSERT INTO photos (
                url, title, description, visibility, is_favorite,
                aspect_ratio, width, height, blur_data,
                country, country_code, region, city, district,
                full_address, place_formatted,
                make, model, lens_model,
                focal_length, focal_length_35mm, f_number, iso,
                exposure_time, exposure_compensation,
                latitude, longitude, gps_altitude, datetime_original
            )
            VALUES (
                $1, $2, $3, $4, $5,
                $6, $7, $8, $9,
                $10, $11, $12, $13, $14,
                $15, $16,
                $17, $18, $19,
                $20, $21, $22, $23,
                $24, $25,
                $26, $27, $28, $29
            )
            RETURNING *
            "#,
        )
        .bind(&input.url) // $1
        .bind(&input.title) // $2
        .bind(&input.description) // $3
        .bind(input.visibility) // $4
        .bind(input.is_favorite) // $5
        .bind(input.aspect_ratio) // $6
        .bind(input.width) // $7
        .bind(input.height) // $8
        .bind(&input.blur_data) // $9
        .bind(&input.country) // $10
        .bind(&input.country_code) // $11
        .bind(&input.region) // $12
        .bind(&input.city) // $13
        .bind(&input.district) // $14
        .bind(&input.full_address) // $15
        .bind(&input.place_formatted) // $16
        .bind(&input.make) // $17
        .bind(&input.model) // $18
        .bind(&input.lens_model) // $19
        .bind(input.focal_length) // $20
        .bind(input.focal_length_35mm) // $21
        .bind(input.f_number) // $22
        .bind(input.iso) // $23
        .bind(input.exposure_time) // $24
        .bind(input.exposure_compensation) // $25
        .bind(input.latitude) // $26
        .bind(input.longitude) // $27
        .bind(input.gps_altitude) // $28
        .bind(input.date_time_original) // $29
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| PortfolioError::database("create photo", e))?;

        log::info!("Created photo with id: {}", photo.id);
        Ok(photo)
    }

    /// Partial update of the editable fields
    /// DOCUMENTATION: COALESCE keeps every column whose input is absent.
    /// Returns None when no photo has this id.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        input: &PhotoUpdateInput,
    ) -> Result<Option<Photo>, PortfolioError> {
        let photo = sqlx::query_as::<_, Photo>(
            r#"
            UPDATE photos
            SET title = COALESCE($1, title),
                description = COALESCE($2, description),
                is_favorite = COALESCE($3, is_favorite),
                latitude = COALESCE($4, latitude),
                longitude = COALESCE($5, longitude),
                visibility = COALESCE($6, visibility),
                make = COALESCE($7, make),
                model = COALESCE($8, model),
                lens_model = COALESCE($9, lens_model),
                focal_length = COALESCE($10, focal_length),
                focal_length_35mm = COALESCE($11, focal_length_35mm),
                f_number = COALESCE($12, f_number),
                iso = COALESCE($13, iso),
                exposure_time = COALESCE($14, exposure_time),
                exposure_compensation = COALESCE($15, exposure_compensation),
                datetime_original = COALESCE($16, datetime_original),
                updated_at = NOW()
            WHERE id = $17
            RETURNING *
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.is_favorite)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(input.visibility)
        .bind(&input.make)
        .bind(&input.model)
        .bind(&input.lens_model)
        .bind(input.focal_length)
        .bind(input.focal_length_35mm)
        .bind(input.f_number)
        .bind(input.iso)
        .bind(input.exposure_time)
        .bind(input.exposure_compensation)
        .bind(input.date_time_original)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| PortfolioError::database("update photo", e))?;

        if photo.is_some() {
            log::info!("Updated photo: {}", id);
        }
        Ok(photo)
    }

    /// Retrieve photo by ID
    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Photo>, PortfolioError> {
        sqlx::query_as::<_, Photo>("SELECT * FROM photos WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| PortfolioError::database("fetch photo", e))
    }

    /// Retrieve and row-lock a photo inside a transaction
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Photo>, PortfolioError> {
        sqlx::query_as::<_, Photo>("SELECT * FROM photos WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| PortfolioError::database("fetch photo", e))
    }

    /// Delete a photo row
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<u64, PortfolioError> {
        let result = sqlx::query("DELETE FROM photos WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| PortfolioError::database("delete photo", e))?;

        Ok(result.rows_affected())
    }

    /// One keyset page, fetching `limit + 1` rows
    /// DOCUMENTATION: Ordered by updated_at DESC, id DESC. With `public_only`
    /// every page is restricted to public photos.
    pub async fn list_page(
        pool: &PgPool,
        cursor: Option<Cursor>,
        limit: i64,
        public_only: bool,
    ) -> Result<Vec<Photo>, PortfolioError> {
        sqlx::query_as::<_, Photo>(
            r#"
            SELECT * FROM photos
            WHERE ($1::timestamptz IS NULL
                   OR updated_at < $1
                   OR (updated_at = $1 AND id < $2))
              AND ($3::boolean = FALSE OR visibility = 'public')
            ORDER BY updated_at DESC, id DESC
            LIMIT $4
            "#,
        )
        .bind(cursor.map(|c| c.updated_at))
        .bind(cursor.map(|c| c.id))
        .bind(public_only)
        .bind(limit + 1)
        .fetch_all(pool)
        .await
        .map_err(|e| PortfolioError::database("list photos", e))
    }

    /// Public favourites, newest first
    pub async fn liked(pool: &PgPool, limit: i64) -> Result<Vec<Photo>, PortfolioError> {
        sqlx::query_as::<_, Photo>(
            r#"
            SELECT * FROM photos
            WHERE is_favorite = TRUE AND visibility = 'public'
            ORDER BY updated_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(|e| PortfolioError::database("list liked photos", e))
    }

    /// Any other photo tagged with (country, city), excluding `exclude_id`
    /// DOCUMENTATION: No ordering; which remaining photo is returned is
    /// unspecified.
    pub async fn find_other_in_city(
        conn: &mut PgConnection,
        country: &str,
        city: &str,
        exclude_id: Uuid,
    ) -> Result<Option<Uuid>, PortfolioError> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM photos
            WHERE country = $1 AND city = $2 AND id <> $3
            LIMIT 1
            "#,
        )
        .bind(country)
        .bind(city)
        .bind(exclude_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| PortfolioError::database("find replacement cover photo", e))?;

        Ok(row.map(|(id,)| id))
    }

    /// Fetch photos by id
    pub async fn get_many_by_ids(
        pool: &PgPool,
        ids: &[Uuid],
    ) -> Result<Vec<Photo>, PortfolioError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Photo>("SELECT * FROM photos WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await
            .map_err(|e| PortfolioError::database("fetch cover photos", e))
    }

    /// Member photos of several (country, city) pairs in one round-trip
    pub async fn list_by_city_pairs(
        pool: &PgPool,
        countries: &[String],
        cities: &[String],
    ) -> Result<Vec<Photo>, PortfolioError> {
        if countries.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, Photo>(
            r#"
            SELECT p.* FROM photos p
            JOIN UNNEST($1::text[], $2::text[]) AS k(country, city)
              ON p.country = k.country AND p.city = k.city
            ORDER BY p.updated_at DESC, p.id DESC
            "#,
        )
        .bind(countries)
        .bind(cities)
        .fetch_all(pool)
        .await
        .map_err(|e| PortfolioError::database("fetch city set photos", e))
    }

    /// Public photos carrying both coordinates
    pub async fn list_geotagged_public(pool: &PgPool) -> Result<Vec<Photo>, PortfolioError> {
        sqlx::query_as::<_, Photo>(
            r#"
            SELECT * FROM photos
            WHERE visibility = 'public'
              AND latitude IS NOT NULL
              AND longitude IS NOT NULL
            ORDER BY updated_at DESC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(|e| PortfolioError::database("list geotagged photos", e))
    }
}
