use anyhow::{anyhow, Context};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Serialize;
use tracing::{error, info};
use crate::models::place::{
    build_photo_url, GooglePhoto, GooglePlace, GoogleSearchResponse, PlaceDetails, PlaceSummary,
};

pub const MAX_SEARCH_RESULTS: u32 = 10;

const API_KEY_HEADER: &str = "X-Goog-Api-Key";
const FIELD_MASK_HEADER: &str = "X-Goog-FieldMask";

const SEARCH_FIELD_MASK: &str = "places.id,places.displayName,places.formattedAddress,\
places.nationalPhoneNumber,places.rating,places.photos";

const DETAILS_FIELDS: [&str; 11] = [
    "id",
    "displayName",
    "formattedAddress",
    "nationalPhoneNumber",
    "internationalPhoneNumber",
    "rating",
    "userRatingCount",
    "photos",
    "businessStatus",
    "priceLevel",
    "location",
];

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
struct TextSearchRequest<'a> {
    text_query: &'a str,
    max_result_count: u32,
}

/// Thin client over the Places API (new). Nothing is cached or retried.
pub struct GooglePlacesRepo {
    http_client: Client,
    api_key: String,
    base_url: String,
    photo_max_px: u32,
}

impl GooglePlacesRepo {
    pub fn new(
        http_client: Client,
        api_key: String,
        base_url: String,
        photo_max_px: u32,
    ) -> Self {
        Self {
            http_client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            photo_max_px,
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub async fn search_places(
        &self,
        query: &str,
    ) -> anyhow::Result<Vec<PlaceSummary>> {
        let url = self.endpoint(&["places:searchText"])?;
        let request = self.http_client
            .post(url)
            .header(FIELD_MASK_HEADER, SEARCH_FIELD_MASK)
            .json(&TextSearchRequest {
                text_query: query,
                max_result_count: MAX_SEARCH_RESULTS,
            });

        let response = self.send(request).await?;
        let body: GoogleSearchResponse = response
            .json()
            .await
            .context("Malformed text search response")?;

        let places = body.places
            .into_iter()
            .map(|place| {
                let photos = self.photo_urls(&place.photos);
                place.into_summary(photos)
            })
            .collect();

        Ok(places)
    }

    pub async fn get_place_details(
        &self,
        place_id: &str,
    ) -> anyhow::Result<PlaceDetails> {
        let url = self.endpoint(&["places", place_id])?;
        info!("Place details URL: {}", url);

        let request = self.http_client
            .get(url)
            .header(FIELD_MASK_HEADER, DETAILS_FIELDS.join(","));

        let response = self.send(request).await?;
        let place: GooglePlace = response
            .json()
            .await
            .context("Malformed place details response")?;

        let photos = self.photo_urls(&place.photos);
        Ok(place.into_details(photos))
    }

    fn photo_urls(&self, photos: &[GooglePhoto]) -> Vec<String> {
        photos
            .iter()
            .filter_map(|photo| {
                build_photo_url(&self.base_url, &photo.name, &self.api_key, self.photo_max_px)
            })
            .collect()
    }

    /// Appends path-escaped segments onto the configured base URL.
    fn endpoint(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid places API base url: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Places API base url cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> anyhow::Result<Response> {
        let response = request
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Google Places API error response ({}): {}", status, body);
            return Err(anyhow!("Google API error: {}", status.as_u16()));
        }

        Ok(response)
    }
}
