// src/models/photo.rs
// DOCUMENTATION: Photo records and the procedure inputs that create/edit them
// PURPOSE: Maps the photos table and the camelCase wire format

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::de::{lenient_datetime, lenient_f32, lenient_i32};
use super::pagination::{Cursor, CursorKey};

/// Who may see a photo in public listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "photo_visibility", rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

/// A single uploaded image with its metadata
/// DOCUMENTATION: Maps directly to the photos table.
/// Every geo/EXIF field is optional; absence is NULL, never zero.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub description: String,
    pub is_favorite: bool,
    pub visibility: Visibility,
    pub aspect_ratio: f32,
    pub width: f32,
    pub height: f32,
    pub blur_data: String,

    pub country: Option<String>,
    pub country_code: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub full_address: Option<String>,
    pub place_formatted: Option<String>,

    pub make: Option<String>,
    pub model: Option<String>,
    pub lens_model: Option<String>,
    pub focal_length: Option<f32>,
    pub focal_length_35mm: Option<f32>,
    pub f_number: Option<f32>,
    pub iso: Option<i32>,
    pub exposure_time: Option<f32>,
    pub exposure_compensation: Option<f32>,
    pub latitude: Option<f32>,
    pub longitude: Option<f32>,
    pub gps_altitude: Option<f32>,
    #[sqlx(rename = "datetime_original")]
    pub date_time_original: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Photo {
    /// Object key of the backing image: the URL path without its leading slash
    pub fn storage_key(&self) -> Option<String> {
        let url = reqwest::Url::parse(&self.url).ok()?;
        let key = url.path().trim_start_matches('/');
        if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        }
    }

    /// Coordinates as (longitude, latitude) when both are present
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.longitude, self.latitude) {
            (Some(lon), Some(lat)) => Some((lon as f64, lat as f64)),
            _ => None,
        }
    }
}

impl CursorKey for Photo {
    fn cursor(&self) -> Cursor {
        Cursor {
            id: self.id,
            updated_at: self.updated_at,
        }
    }
}

/// Input for photos.create
/// DOCUMENTATION: Address fields are resolved by the client's geocoder
/// before submission. Numeric EXIF fields accept numbers or numeric strings.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PhotoInsertInput {
    #[validate(url)]
    pub url: String,

    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default)]
    pub is_favorite: bool,

    pub aspect_ratio: f32,
    pub width: f32,
    pub height: f32,
    pub blur_data: String,

    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub full_address: Option<String>,
    #[serde(default)]
    pub place_formatted: Option<String>,

    #[validate(length(max = 255))]
    #[serde(default)]
    pub make: Option<String>,
    #[validate(length(max = 255))]
    #[serde(default)]
    pub model: Option<String>,
    #[validate(length(max = 255))]
    #[serde(default)]
    pub lens_model: Option<String>,

    #[serde(default, deserialize_with = "lenient_f32")]
    pub focal_length: Option<f32>,
    #[serde(default, deserialize_with = "lenient_f32")]
    pub focal_length_35mm: Option<f32>,
    #[serde(default, deserialize_with = "lenient_f32")]
    pub f_number: Option<f32>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub iso: Option<i32>,
    #[serde(default, deserialize_with = "lenient_f32")]
    pub exposure_time: Option<f32>,
    #[serde(default, deserialize_with = "lenient_f32")]
    pub exposure_compensation: Option<f32>,

    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default, deserialize_with = "lenient_f32")]
    pub latitude: Option<f32>,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default, deserialize_with = "lenient_f32")]
    pub longitude: Option<f32>,
    #[serde(default)]
    pub gps_altitude: Option<f32>,

    #[serde(default, deserialize_with = "lenient_datetime")]
    pub date_time_original: Option<DateTime<Utc>>,
}

/// Input for photos.update
/// DOCUMENTATION: Only this whitelist of fields is editable. Fields that are
/// absent (or empty strings for numeric fields) are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUpdateInput {
    #[serde(default)]
    pub id: Option<Uuid>,

    #[validate(length(min = 1, message = "Title is required"))]
    #[serde(default)]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Description is required"))]
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub is_favorite: Option<bool>,

    #[serde(default)]
    pub visibility: Option<Visibility>,

    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default, deserialize_with = "lenient_f32")]
    pub latitude: Option<f32>,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default, deserialize_with = "lenient_f32")]
    pub longitude: Option<f32>,

    #[validate(length(max = 255))]
    #[serde(default)]
    pub make: Option<String>,
    #[validate(length(max = 255))]
    #[serde(default)]
    pub model: Option<String>,
    #[validate(length(max = 255))]
    #[serde(default)]
    pub lens_model: Option<String>,

    #[serde(default, deserialize_with = "lenient_f32")]
    pub focal_length: Option<f32>,
    #[serde(default, deserialize_with = "lenient_f32")]
    pub focal_length_35mm: Option<f32>,
    #[serde(default, deserialize_with = "lenient_f32")]
    pub f_number: Option<f32>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub iso: Option<i32>,
    #[serde(default, deserialize_with = "lenient_f32")]
    pub exposure_time: Option<f32>,
    #[serde(default, deserialize_with = "lenient_f32")]
    pub exposure_compensation: Option<f32>,

    #[serde(default, deserialize_with = "lenient_datetime")]
    pub date_time_original: Option<DateTime<Utc>>,
}

/// `{ "id": ... }` for photos.remove and photos.getOne
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoIdInput {
    pub id: Uuid,
}

/// Query for photos.getLikedPhotos
#[derive(Debug, Clone, Deserialize)]
pub struct LikedPhotosQuery {
    pub limit: Option<i64>,
}

#[cfg(test)]
pub(crate) fn sample_photo() -> Photo {
    let now = Utc::now();
    Photo {
        id: Uuid::new_v4(),
        url: "https://p.example.com/photography/photos/IMG_0001.jpg".to_string(),
        title: "Rooftops".to_string(),
        description: "Evening light".to_string(),
        is_favorite: false,
        visibility: Visibility::Public,
        aspect_ratio: 1.5,
        width: 6000.0,
        height: 4000.0,
        blur_data: "LEHV6nWB2yk8pyo0adR*.7kCMdnj".to_string(),
        country: Some("France".to_string()),
        country_code: Some("FR".to_string()),
        region: Some("Île-de-France".to_string()),
        city: Some("Paris".to_string()),
        district: None,
        full_address: None,
        place_formatted: None,
        make: Some("FUJIFILM".to_string()),
        model: Some("X-T5".to_string()),
        lens_model: None,
        focal_length: Some(23.0),
        focal_length_35mm: Some(35.0),
        f_number: Some(2.0),
        iso: Some(160),
        exposure_time: Some(0.004),
        exposure_compensation: None,
        latitude: Some(48.8566),
        longitude: Some(2.3522),
        gps_altitude: None,
        date_time_original: None,
        created_at: now,
        updated_at: now,
    }
}
