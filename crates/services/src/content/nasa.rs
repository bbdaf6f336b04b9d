use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use futures::future::join_all;
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use quiz_core::model::Category;

use super::{ApodEntry, ContentSource, FetchParams, MarsPhoto, NearEarthObject, RawItem};
use crate::config::NasaConfig;
use crate::error::ContentError;

const APOD_DAYS: u64 = 3;
const ROVERS: [(&str, u32); 3] = [("curiosity", 4000), ("opportunity", 5000), ("spirit", 2200)];
const ROVER_ATTEMPTS: usize = 3;
const PHOTOS_PER_ROVER: usize = 10;
const NEO_WINDOW_DAYS: u64 = 6;
const NEO_TOP: usize = 5;

/// HTTP client for the NASA open APIs (APOD, Mars rover photos, NeoWs).
#[derive(Clone)]
pub struct NasaClient {
    client: Client,
    config: NasaConfig,
}

impl NasaClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(NasaConfig::from_env())
    }

    #[must_use]
    pub fn new(config: NasaConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(&'static str, String)>,
    ) -> Result<T, ContentError> {
        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .query(&[("api_key", self.config.api_key.as_str())])
            .query(&query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ContentError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }

    async fn fetch_apod(&self, today: NaiveDate) -> Result<Vec<RawItem>, ContentError> {
        let dates: Vec<NaiveDate> = (0..APOD_DAYS)
            .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
            .collect();
        let responses = join_all(dates.iter().map(|date| {
            self.get_json::<ApodJson>("/planetary/apod", vec![("date", date.to_string())])
        }))
        .await;

        let mut items = Vec::new();
        let mut last_error = None;
        for (date, response) in dates.iter().zip(responses) {
            match response {
                Ok(apod) if apod.media_type == "image" => items.push(RawItem::Apod(apod.into())),
                Ok(_) => debug!(%date, "skipping non-image picture of the day"),
                Err(err) => {
                    debug!(%date, error = %err, "picture of the day unavailable");
                    last_error = Some(err);
                }
            }
        }

        match last_error {
            Some(err) if items.is_empty() => Err(err),
            _ => Ok(items),
        }
    }

    async fn fetch_rover(&self, rover: &str, max_sol: u32) -> Vec<MarsPhoto> {
        for attempt in 1..=ROVER_ATTEMPTS {
            let sol = rand::rng().random_range(1..=max_sol);
            let path = format!("/mars-photos/api/v1/rovers/{rover}/photos");
            match self
                .get_json::<MarsPhotosJson>(&path, vec![("sol", sol.to_string())])
                .await
            {
                Ok(body) => {
                    let photos: Vec<MarsPhoto> = body
                        .photos
                        .into_iter()
                        .filter(|p| p.img_src.starts_with("http"))
                        .take(PHOTOS_PER_ROVER)
                        .map(MarsPhoto::from)
                        .collect();
                    if !photos.is_empty() {
                        return photos;
                    }
                    debug!(rover, sol, attempt, "no usable photos on sol");
                }
                Err(err) => debug!(rover, sol, attempt, error = %err, "rover photos unavailable"),
            }
        }
        warn!(rover, "giving up on rover photos");
        Vec::new()
    }

    async fn fetch_mars(&self) -> Result<Vec<RawItem>, ContentError> {
        let per_rover = join_all(
            ROVERS
                .iter()
                .map(|(rover, max_sol)| self.fetch_rover(rover, *max_sol)),
        )
        .await;

        let items: Vec<RawItem> = per_rover
            .into_iter()
            .flatten()
            .map(RawItem::MarsPhoto)
            .collect();
        if items.is_empty() {
            return Err(ContentError::Unavailable {
                category: Category::MarsRover,
            });
        }
        Ok(items)
    }

    async fn fetch_neo(&self, today: NaiveDate) -> Result<Vec<RawItem>, ContentError> {
        let end = today
            .checked_add_days(Days::new(NEO_WINDOW_DAYS))
            .unwrap_or(today);
        let feed: NeoFeedJson = self
            .get_json(
                "/neo/rest/v1/feed",
                vec![
                    ("start_date", today.to_string()),
                    ("end_date", end.to_string()),
                ],
            )
            .await?;

        let mut objects: Vec<NearEarthObject> = feed
            .near_earth_objects
            .into_values()
            .flatten()
            .filter_map(NeoJson::into_object)
            .collect();
        objects.sort_by(|a, b| b.max_diameter_km.total_cmp(&a.max_diameter_km));
        objects.truncate(NEO_TOP);
        Ok(objects.into_iter().map(RawItem::Neo).collect())
    }
}

#[async_trait]
impl ContentSource for NasaClient {
    async fn fetch(
        &self,
        category: Category,
        params: &FetchParams,
    ) -> Result<Vec<RawItem>, ContentError> {
        match category {
            Category::Apod => self.fetch_apod(params.today).await,
            Category::MarsRover => self.fetch_mars().await,
            Category::Neo => self.fetch_neo(params.today).await,
        }
    }
}

//
// ─── WIRE TYPES ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct ApodJson {
    date: NaiveDate,
    title: String,
    #[serde(default)]
    explanation: String,
    url: String,
    hdurl: Option<String>,
    media_type: String,
}

impl From<ApodJson> for ApodEntry {
    fn from(json: ApodJson) -> Self {
        Self {
            date: json.date,
            title: json.title,
            explanation: json.explanation,
            url: json.url,
            hd_url: json.hdurl,
            is_video: json.media_type == "video",
        }
    }
}

#[derive(Debug, Deserialize)]
struct MarsPhotosJson {
    #[serde(default)]
    photos: Vec<MarsPhotoJson>,
}

#[derive(Debug, Deserialize)]
struct MarsPhotoJson {
    id: u64,
    sol: u32,
    camera: NamedJson,
    img_src: String,
    earth_date: String,
    rover: NamedJson,
}

#[derive(Debug, Deserialize)]
struct NamedJson {
    #[serde(default)]
    name: String,
    #[serde(default)]
    full_name: Option<String>,
}

impl From<MarsPhotoJson> for MarsPhoto {
    fn from(json: MarsPhotoJson) -> Self {
        Self {
            id: json.id,
            rover: json.rover.name,
            camera: json.camera.full_name.unwrap_or(json.camera.name),
            sol: json.sol,
            earth_date: json.earth_date,
            img_src: json.img_src,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NeoFeedJson {
    #[serde(default)]
    near_earth_objects: HashMap<String, Vec<NeoJson>>,
}

#[derive(Debug, Deserialize)]
struct NeoJson {
    id: String,
    name: String,
    estimated_diameter: DiameterJson,
    #[serde(default)]
    close_approach_data: Vec<ApproachJson>,
}

#[derive(Debug, Deserialize)]
struct DiameterJson {
    kilometers: DiameterRangeJson,
}

#[derive(Debug, Deserialize)]
struct DiameterRangeJson {
    estimated_diameter_max: f64,
}

#[derive(Debug, Deserialize)]
struct ApproachJson {
    miss_distance: MissDistanceJson,
}

#[derive(Debug, Deserialize)]
struct MissDistanceJson {
    kilometers: String,
}

impl NeoJson {
    fn into_object(self) -> Option<NearEarthObject> {
        let miss_distance_km = self
            .close_approach_data
            .first()
            .and_then(|a| a.miss_distance.kilometers.parse::<f64>().ok())?;
        Some(NearEarthObject {
            id: self.id,
            name: self.name,
            max_diameter_km: self.estimated_diameter.kilometers.estimated_diameter_max,
            miss_distance_km,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neo_feed_parses_and_skips_objects_without_approach() {
        let raw = r#"{
            "near_earth_objects": {
                "2024-03-01": [
                    {
                        "id": "3542519",
                        "name": "(2010 PK9)",
                        "estimated_diameter": {"kilometers": {"estimated_diameter_max": 0.42}},
                        "close_approach_data": [{"miss_distance": {"kilometers": "7423312.5"}}]
                    },
                    {
                        "id": "1",
                        "name": "ghost",
                        "estimated_diameter": {"kilometers": {"estimated_diameter_max": 9.0}},
                        "close_approach_data": []
                    }
                ]
            }
        }"#;
        let feed: NeoFeedJson = serde_json::from_str(raw).unwrap();
        let objects: Vec<_> = feed
            .near_earth_objects
            .into_values()
            .flatten()
            .filter_map(NeoJson::into_object)
            .collect();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].name, "(2010 PK9)");
        assert!((objects[0].miss_distance_km - 7_423_312.5).abs() < f64::EPSILON);
    }

    #[test]
    fn mars_photo_prefers_camera_full_name() {
        let raw = r#"{"photos": [{
            "id": 102693,
            "sol": 1000,
            "camera": {"name": "FHAZ", "full_name": "Front Hazard Avoidance Camera"},
            "img_src": "http://mars.jpl.nasa.gov/msl-raw-images/1000.JPG",
            "earth_date": "2015-05-30",
            "rover": {"name": "Curiosity"}
        }]}"#;
        let body: MarsPhotosJson = serde_json::from_str(raw).unwrap();
        let photo = MarsPhoto::from(body.photos.into_iter().next().unwrap());
        assert_eq!(photo.rover, "Curiosity");
        assert_eq!(photo.camera, "Front Hazard Avoidance Camera");
        assert_eq!(photo.sol, 1000);
    }
}
