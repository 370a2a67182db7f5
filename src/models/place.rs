use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

pub const UNKNOWN_NAME: &str = "Unknown";
pub const ADDRESS_NOT_AVAILABLE: &str = "Address not available";
pub const PHONE_NOT_AVAILABLE: &str = "Phone not available";
pub const UNKNOWN_BUSINESS_STATUS: &str = "UNKNOWN";

/// Body of a `places:searchText` response.
#[serde_as]
#[derive(Deserialize, Clone, Debug, Default)]
pub struct GoogleSearchResponse {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub places: Vec<GooglePlace>,
}

/// A place record as the Places API (new) returns it. Every field is optional
/// because the response only carries what the field mask asked for.
#[serde_as]
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GooglePlace {
    pub id: Option<String>,
    pub display_name: Option<LocalizedText>,
    pub formatted_address: Option<String>,
    pub national_phone_number: Option<String>,
    pub international_phone_number: Option<String>,
    pub rating: Option<f64>,
    pub user_rating_count: Option<u32>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub photos: Vec<GooglePhoto>,
    pub business_status: Option<String>,
    pub price_level: Option<String>,
    pub location: Option<LatLng>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct LocalizedText {
    pub text: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct GooglePhoto {
    #[serde(default)]
    pub name: String,
}

/// Upstream omits zero-valued coordinates, so a missing axis reads as 0.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct LatLng {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct PlaceSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub rating: f64,
    pub photos: Vec<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct PlaceDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub international_phone: Option<String>,
    pub rating: f64,
    pub rating_count: u32,
    pub business_status: String,
    pub price_level: Option<String>,
    pub location: Option<LatLng>,
    pub photos: Vec<String>,
}

impl GooglePlace {
    pub fn into_summary(self, photos: Vec<String>) -> PlaceSummary {
        PlaceSummary {
            name: self.name(),
            address: or_default(self.formatted_address, ADDRESS_NOT_AVAILABLE),
            phone: or_default(self.national_phone_number, PHONE_NOT_AVAILABLE),
            rating: self.rating.unwrap_or_default(),
            place_id: self.id,
            photos,
        }
    }

    pub fn into_details(self, photos: Vec<String>) -> PlaceDetails {
        PlaceDetails {
            name: self.name(),
            address: or_default(self.formatted_address, ADDRESS_NOT_AVAILABLE),
            phone: or_default(self.national_phone_number, PHONE_NOT_AVAILABLE),
            international_phone: non_empty(self.international_phone_number),
            rating: self.rating.unwrap_or_default(),
            rating_count: self.user_rating_count.unwrap_or_default(),
            business_status: or_default(self.business_status, UNKNOWN_BUSINESS_STATUS),
            price_level: non_empty(self.price_level),
            location: self.location,
            place_id: self.id,
            photos,
        }
    }

    fn name(&self) -> String {
        let text = self.display_name.as_ref().and_then(|name| name.text.clone());
        or_default(text, UNKNOWN_NAME)
    }
}

/// Resolves a photo resource name (`places/{id}/photos/{ref}`) into a media URL
/// the browser can fetch directly. The key rides along in the query string, so
/// clients see it. Blank names or an unusable base yield nothing.
pub fn build_photo_url(
    base_url: &str,
    photo_name: &str,
    api_key: &str,
    max_px: u32,
) -> Option<String> {
    let segments: Vec<&str> = photo_name
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();
    if segments.is_empty() {
        return None;
    }

    let mut url = Url::parse(base_url).ok()?;
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(segments)
        .push("media");

    let max_px = max_px.to_string();
    url.query_pairs_mut()
        .append_pair("maxHeightPx", &max_px)
        .append_pair("maxWidthPx", &max_px)
        .append_pair("key", api_key);

    Some(url.into())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn or_default(value: Option<String>, default: &str) -> String {
    non_empty(value).unwrap_or_else(|| default.to_string())
}
