//! Remote astronomy content and the questions generated from it.

mod generate;
mod nasa;

use async_trait::async_trait;
use chrono::NaiveDate;

use quiz_core::model::Category;

use crate::error::ContentError;

pub use generate::{apod_draft, localize, mars_drafts, neo_drafts, shuffle_options};
pub use nasa::NasaClient;

/// Raw item returned by a content source, before question generation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawItem {
    Apod(ApodEntry),
    MarsPhoto(MarsPhoto),
    Neo(NearEarthObject),
}

/// Astronomy picture of the day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApodEntry {
    pub date: NaiveDate,
    pub title: String,
    pub explanation: String,
    pub url: String,
    pub hd_url: Option<String>,
    pub is_video: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarsPhoto {
    pub id: u64,
    pub rover: String,
    pub camera: String,
    pub sol: u32,
    pub earth_date: String,
    pub img_src: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearEarthObject {
    pub id: String,
    pub name: String,
    pub max_diameter_km: f64,
    pub miss_distance_km: f64,
}

/// Request context shared by every category fetch of one pool build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchParams {
    pub today: NaiveDate,
}

/// Supplies raw astronomy items by category.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `ContentError` when the category cannot be fetched.
    async fn fetch(
        &self,
        category: Category,
        params: &FetchParams,
    ) -> Result<Vec<RawItem>, ContentError>;
}

/// Source that never has content. Used when running offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

#[async_trait]
impl ContentSource for OfflineSource {
    async fn fetch(
        &self,
        category: Category,
        _params: &FetchParams,
    ) -> Result<Vec<RawItem>, ContentError> {
        Err(ContentError::Unavailable { category })
    }
}
