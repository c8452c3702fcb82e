// src/db/city_set_repository.rs
// DOCUMENTATION: City set database operations
// PURPOSE: Atomic upsert/decrement of the per-city aggregates

use crate::errors::PortfolioError;
use crate::models::{CityKey, CitySet, Cursor};
use serde::Serialize;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

/// Result of a full aggregate rebuild
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RebuildStats {
    pub upserted: i64,
    pub removed: i64,
}

/// Totals reported by the admin stats endpoint
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PortfolioStats {
    pub total_photos: i64,
    pub public_photos: i64,
    pub favorite_photos: i64,
    pub city_sets: i64,
    /// City sets whose stored photo_count differs from live membership
    pub drifted_city_sets: i64,
}

pub struct CitySetRepository;

impl CitySetRepository {
    /// Insert the city set with count 1, or increment an existing one
    /// DOCUMENTATION: Single INSERT .. ON CONFLICT statement; the increment is
    /// evaluated by the database so concurrent first photos for a city
    /// converge on one row. The first cover set wins.
    pub async fn upsert_increment(
        conn: &mut PgConnection,
        key: &CityKey,
        photo_id: Uuid,
    ) -> Result<CitySet, PortfolioError> {
        sqlx::query_as::<_, CitySet>(
            r#"
            INSERT INTO city_sets (country, country_code, city, photo_count, cover_photo_id)
            VALUES ($1, $2, $3, 1, $4)
            ON CONFLICT (country, city) DO UPDATE
            SET country_code = EXCLUDED.country_code,
                photo_count = city_sets.photo_count + 1,
                cover_photo_id = COALESCE(city_sets.cover_photo_id, EXCLUDED.cover_photo_id),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(&key.country)
        .bind(&key.country_code)
        .bind(&key.city)
        .bind(photo_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| PortfolioError::database("update city set", e))
    }

    /// Fetch and row-lock the city set for (country, city)
    pub async fn lock_by_pair(
        conn: &mut PgConnection,
        country: &str,
        city: &str,
    ) -> Result<Option<CitySet>, PortfolioError> {
        sqlx::query_as::<_, CitySet>(
            "SELECT * FROM city_sets WHERE country = $1 AND city = $2 FOR UPDATE",
        )
        .bind(country)
        .bind(city)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| PortfolioError::database("fetch city set", e))
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<(), PortfolioError> {
        sqlx::query("DELETE FROM city_sets WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| PortfolioError::database("delete city set", e))?;
        Ok(())
    }

    /// Decrement the count, leaving the cover as is
    pub async fn decrement(conn: &mut PgConnection, id: Uuid) -> Result<(), PortfolioError> {
        sqlx::query(
            r#"
            UPDATE city_sets
            SET photo_count = photo_count - 1,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| PortfolioError::database("update city set", e))?;
        Ok(())
    }

    /// Decrement the count and point the cover at `cover_photo_id` (or NULL)
    pub async fn decrement_with_cover(
        conn: &mut PgConnection,
        id: Uuid,
        cover_photo_id: Option<Uuid>,
    ) -> Result<(), PortfolioError> {
        sqlx::query(
            r#"
            UPDATE city_sets
            SET photo_count = photo_count - 1,
                cover_photo_id = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(cover_photo_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| PortfolioError::database("update city set", e))?;
        Ok(())
    }

    /// One keyset page, fetching `limit + 1` rows
    pub async fn list_page(
        pool: &PgPool,
        cursor: Option<Cursor>,
        limit: i64,
    ) -> Result<Vec<CitySet>, PortfolioError> {
        sqlx::query_as::<_, CitySet>(
            r#"
            SELECT * FROM city_sets
            WHERE ($1::timestamptz IS NULL
                   OR updated_at < $1
                   OR (updated_at = $1 AND id < $2))
            ORDER BY updated_at DESC, id DESC
            LIMIT $3
            "#,
        )
        .bind(cursor.map(|c| c.updated_at))
        .bind(cursor.map(|c| c.id))
        .bind(limit + 1)
        .fetch_all(pool)
        .await
        .map_err(|e| PortfolioError::database("list city sets", e))
    }

    /// First city set with this city name
    pub async fn get_by_city(pool: &PgPool, city: &str) -> Result<Option<CitySet>, PortfolioError> {
        sqlx::query_as::<_, CitySet>(
            r#"
            SELECT * FROM city_sets
            WHERE city = $1
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(city)
        .fetch_optional(pool)
        .await
        .map_err(|e| PortfolioError::database("fetch city set", e))
    }

    /// Recompute every aggregate from the photo table
    /// DOCUMENTATION: Uses the creation-time key (region for JP/TW). An
    /// existing cover is kept while it is still a member, otherwise the
    /// earliest created member becomes the cover. Descriptions survive.
    pub async fn rebuild(pool: &PgPool) -> Result<RebuildStats, PortfolioError> {
        sqlx::query_as::<_, RebuildStats>(
            r#"
            WITH keyed AS (
                SELECT id, created_at, country, country_code,
                       CASE WHEN country_code IN ('JP', 'TW') THEN region ELSE city END AS set_city
                FROM photos
                WHERE country IS NOT NULL AND country <> ''
                  AND country_code IS NOT NULL AND country_code <> ''
            ),
            computed AS (
                SELECT country,
                       set_city,
                       MAX(country_code) AS country_code,
                       COUNT(*)::int AS photo_count,
                       (ARRAY_AGG(id ORDER BY created_at ASC))[1] AS first_photo_id
                FROM keyed
                WHERE set_city IS NOT NULL AND set_city <> ''
                GROUP BY country, set_city
            ),
            removed AS (
                DELETE FROM city_sets cs
                WHERE NOT EXISTS (
                    SELECT 1 FROM computed c
                    WHERE c.country = cs.country AND c.set_city = cs.city
                )
                RETURNING cs.id
            ),
            upserted AS (
                INSERT INTO city_sets (country, country_code, city, photo_count, cover_photo_id)
                SELECT country, country_code, set_city, photo_count, first_photo_id
                FROM computed
                ON CONFLICT (country, city) DO UPDATE
                SET country_code = EXCLUDED.country_code,
                    photo_count = EXCLUDED.photo_count,
                    cover_photo_id = CASE
                        WHEN EXISTS (
                            SELECT 1 FROM keyed k
                            WHERE k.id = city_sets.cover_photo_id
                              AND k.country = city_sets.country
                              AND k.set_city = city_sets.city
                        )
                        THEN city_sets.cover_photo_id
                        ELSE EXCLUDED.cover_photo_id
                    END,
                    updated_at = NOW()
                RETURNING id
            )
            SELECT (SELECT COUNT(*) FROM upserted) AS upserted,
                   (SELECT COUNT(*) FROM removed) AS removed
            "#,
        )
        .fetch_one(pool)
        .await
        .map_err(|e| PortfolioError::database("rebuild city sets", e))
    }

    /// Photo totals and aggregate drift
    pub async fn stats(pool: &PgPool) -> Result<PortfolioStats, PortfolioError> {
        sqlx::query_as::<_, PortfolioStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM photos) AS total_photos,
                (SELECT COUNT(*) FROM photos WHERE visibility = 'public') AS public_photos,
                (SELECT COUNT(*) FROM photos WHERE is_favorite = TRUE) AS favorite_photos,
                (SELECT COUNT(*) FROM city_sets) AS city_sets,
                (SELECT COUNT(*) FROM city_sets cs
                 WHERE cs.photo_count <> (
                     SELECT COUNT(*) FROM photos p
                     WHERE p.country = cs.country
                       AND (CASE WHEN p.country_code IN ('JP', 'TW') THEN p.region ELSE p.city END) = cs.city
                 )) AS drifted_city_sets
            "#,
        )
        .fetch_one(pool)
        .await
        .map_err(|e| PortfolioError::database("fetch stats", e))
    }
}
