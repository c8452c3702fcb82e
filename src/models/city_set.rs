// src/models/city_set.rs
// DOCUMENTATION: City set aggregates (photos grouped by country + city)
// PURPOSE: Row mapping, eager-loaded response shape and city key resolution

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::pagination::{Cursor, CursorKey};
use super::Photo;

/// Countries whose geocoder "place" is too fine-grained; their
/// administrative region is used as the city instead.
const REGION_AS_CITY: [&str; 2] = ["JP", "TW"];

/// Derived aggregate: one row per unique (country, city)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CitySet {
    pub id: Uuid,
    pub description: Option<String>,
    pub country: String,
    pub country_code: String,
    pub city: String,
    pub cover_photo_id: Option<Uuid>,
    pub photo_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CursorKey for CitySet {
    fn cursor(&self) -> Cursor {
        Cursor {
            id: self.id,
            updated_at: self.updated_at,
        }
    }
}

/// City set with its cover photo and member photos
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySetWithPhotos {
    #[serde(flatten)]
    pub city_set: CitySet,
    pub cover_photo: Option<Photo>,
    pub photos: Vec<Photo>,
}

/// Query for photos.getCitySetByCity
#[derive(Debug, Clone, Deserialize)]
pub struct CityQuery {
    pub city: String,
}

/// Unique key of a city set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CityKey {
    pub country: String,
    pub country_code: String,
    pub city: String,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// City name used for aggregation: the region for JP/TW, otherwise the city
pub fn effective_city<'a>(
    country_code: Option<&str>,
    region: Option<&'a str>,
    city: Option<&'a str>,
) -> Option<&'a str> {
    match country_code {
        Some(code) if REGION_AS_CITY.contains(&code) => present(region),
        _ => present(city),
    }
}

impl CityKey {
    /// Key a newly created photo aggregates into.
    /// `None` when country, country code or effective city is missing.
    pub fn for_new_photo(photo: &Photo) -> Option<CityKey> {
        let country = present(photo.country.as_deref())?;
        let country_code = present(photo.country_code.as_deref())?;
        let city = effective_city(
            Some(country_code),
            photo.region.as_deref(),
            photo.city.as_deref(),
        )?;

        Some(CityKey {
            country: country.to_string(),
            country_code: country_code.to_string(),
            city: city.to_string(),
        })
    }

    /// Raw (country, city) of a stored photo, used when it is removed.
    /// Unlike `for_new_photo` this does not substitute the region for JP/TW.
    pub fn stored_pair(photo: &Photo) -> Option<(String, String)> {
        let country = present(photo.country.as_deref())?;
        let city = present(photo.city.as_deref())?;
        Some((country.to_string(), city.to_string()))
    }
}
