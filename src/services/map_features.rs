// src/services/map_features.rs
// DOCUMENTATION: GeoJSON feed of geotagged photos for the map view

use geo_types::Point;
use geojson::{feature::Id, Feature, FeatureCollection, Geometry, JsonObject};
use serde_json::json;

use crate::models::Photo;

fn photo_feature(photo: &Photo) -> Option<Feature> {
    let (lon, lat) = photo.coordinates()?;
    let point = Point::new(lon, lat);

    let mut properties = JsonObject::new();
    properties.insert("title".to_string(), json!(photo.title));
    properties.insert("url".to_string(), json!(photo.url));
    properties.insert("city".to_string(), json!(photo.city));
    properties.insert("country".to_string(), json!(photo.country));
    properties.insert("aspectRatio".to_string(), json!(photo.aspect_ratio));

    Some(Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(&point))),
        id: Some(Id::String(photo.id.to_string())),
        properties: Some(properties),
        foreign_members: None,
    })
}

/// One Point feature per photo that has both coordinates
pub fn photos_to_feature_collection(photos: &[Photo]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: photos.iter().filter_map(photo_feature).collect(),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::photo::sample_photo;

    #[test]
    fn test_feature_collection_skips_photos_without_coordinates() {
        let located = sample_photo();
        let mut unlocated = sample_photo();
        unlocated.longitude = None;

        let collection = photos_to_feature_collection(&[located.clone(), unlocated]);
        assert_eq!(collection.features.len(), 1);

        let feature = &collection.features[0];
        assert_eq!(feature.id, Some(Id::String(located.id.to_string())));
        match feature.geometry.as_ref().map(|g| &g.value) {
            Some(geojson::Value::Point(coords)) => {
                // GeoJSON order is [longitude, latitude]
                assert!((coords[0] - 2.3522).abs() < 1e-4);
                assert!((coords[1] - 48.8566).abs() < 1e-4);
            }
            other => panic!("expected a point, got {:?}", other),
        }
    }

    #[test]
    fn test_feature_properties() {
        let collection = photos_to_feature_collection(&[sample_photo()]);
        let value = serde_json::to_value(&collection).unwrap();

        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["properties"]["city"], "Paris");
        assert_eq!(value["features"][0]["properties"]["title"], "Rooftops");
    }
}
