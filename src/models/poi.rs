use crate::models::ids::{CityId, PoiId, TagId};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(from = "RawPoi")]
pub struct Poi {
    pub id: PoiId,
    pub name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub city_id: Option<CityId>,
    pub images: Vec<String>,
    pub tags: Vec<String>,
}

impl Poi {
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

#[derive(Deserialize)]
struct RawPoi {
    id: PoiId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default, deserialize_with = "coordinate")]
    latitude: f64,
    #[serde(default, deserialize_with = "coordinate")]
    longitude: f64,
    #[serde(default)]
    city_id: Option<CityId>,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    img: Option<String>,
    #[serde(default)]
    tags: Vec<TagRef>,
}

impl From<RawPoi> for Poi {
    fn from(raw: RawPoi) -> Self {
        let mut images = raw.images;
        if let Some(img) = raw.img.filter(|img| !img.trim().is_empty())
            && !images.contains(&img)
        {
            images.push(img);
        }

        Self {
            id: raw.id,
            name: raw.name,
            description: raw.description,
            latitude: raw.latitude,
            longitude: raw.longitude,
            city_id: raw.city_id.filter(|id| !id.is_empty()),
            images,
            tags: raw.tags.into_iter().map(TagRef::into_name).collect(),
        }
    }
}

/// Tags are embedded either as plain names or as `{id, name}` objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum TagRef {
    Name(String),
    Object(Tag),
}

impl TagRef {
    fn into_name(self) -> String {
        match self {
            TagRef::Name(name) => name,
            TagRef::Object(tag) => tag.name,
        }
    }
}

/// Latitude/longitude are stored as text by some backend versions.
fn coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Coordinate {
        Number(f64),
        Text(String),
        Null(()),
    }

    match Coordinate::deserialize(deserializer)? {
        Coordinate::Number(value) => Ok(value),
        Coordinate::Text(text) if text.trim().is_empty() => Ok(0.0),
        Coordinate::Text(text) => text.trim().parse().map_err(|_| de::Error::custom(format!("invalid coordinate '{}'", text))),
        Coordinate::Null(()) => Ok(0.0),
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Tag {
    #[serde(default)]
    pub id: Option<TagId>,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PoiImage {
    #[serde(default)]
    pub id: Option<PoiId>,
    #[serde(default)]
    pub poi_id: Option<PoiId>,
    #[serde(alias = "image_url", alias = "img")]
    pub url: String,
}

/// Filters for `GET /api/pois`. Empty filters are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoiQuery {
    pub name: Option<String>,
    pub city_name: Option<String>,
    pub country_name: Option<String>,
    pub tags: Vec<String>,
}

impl PoiQuery {
    pub fn by_city(city_name: impl Into<String>) -> Self {
        Self {
            city_name: Some(city_name.into()),
            ..Self::default()
        }
    }

    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &'static str, value: &Option<String>| {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                pairs.push((key, value.to_string()));
            }
        };

        push("name", &self.name);
        push("country_name", &self.country_name);
        push("city_name", &self.city_name);

        for tag in self.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            pairs.push(("tag_name", tag.to_string()));
        }

        pairs
    }

    pub fn is_empty(&self) -> bool {
        self.to_pairs().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poi_accepts_textual_coordinates_and_numeric_ids() {
        let poi: Poi = serde_json::from_str(
            r#"{"id": 7, "name": "Sagrada Familia", "description": "Basilica", "latitude": "41.4036", "longitude": "2.1744", "city_id": 3, "img": "https://img/1.jpg"}"#,
        )
        .unwrap();

        assert_eq!(poi.id, PoiId::from("7"));
        assert_eq!(poi.city_id, Some(CityId::from("3")));
        assert!((poi.latitude - 41.4036).abs() < f64::EPSILON);
        assert_eq!(poi.primary_image(), Some("https://img/1.jpg"));
    }

    #[test]
    fn poi_accepts_tag_objects_and_names() {
        let poi: Poi = serde_json::from_str(r#"{"id": "a", "tags": ["museum", {"id": 2, "name": "history"}]}"#).unwrap();
        assert_eq!(poi.tags, vec!["museum".to_string(), "history".to_string()]);
        assert!(poi.images.is_empty());
        assert!(poi.city_id.is_none());
    }

    #[test]
    fn poi_rejects_garbage_coordinates() {
        let result = serde_json::from_str::<Poi>(r#"{"id": 1, "latitude": "north"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn query_skips_blank_filters_and_repeats_tags() {
        let query = PoiQuery {
            name: Some("  ".to_string()),
            city_name: Some("Madrid".to_string()),
            country_name: None,
            tags: vec!["food".to_string(), "".to_string(), "art".to_string()],
        };

        assert_eq!(
            query.to_pairs(),
            vec![
                ("city_name", "Madrid".to_string()),
                ("tag_name", "food".to_string()),
                ("tag_name", "art".to_string()),
            ]
        );
    }

    #[test]
    fn default_query_is_empty() {
        assert!(PoiQuery::default().is_empty());
    }
}
