use crate::models::Region;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// Default endpoint listing provinces
pub const DEFAULT_PROVINCES_URL: &str = "https://sapnhap.bando.com.vn/pcotinh";
/// Default endpoint listing the wards of one province
pub const DEFAULT_WARDS_URL: &str = "https://sapnhap.bando.com.vn/ptracuu";

const PROVINCE_CODE_KEYS: &[&str] = &["code", "mahc"];
const PROVINCE_NAME_KEYS: &[&str] = &["name", "ten", "tentinh"];
const WARD_CODE_KEYS: &[&str] = &["code", "ma"];
const NAME_PART_KEYS: &[&str] = &["loai", "tenhc", "ten"];

/// Errors that can occur when talking to the region lookup service
///
/// These never reach callers of [`RegionCatalog`]; they are logged and
/// turned into empty results.
#[derive(Debug, Error)]
pub enum RegionCatalogError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Region service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Source of provinces and wards
///
/// Both operations are fail-soft: any failure yields an empty sequence.
#[async_trait]
pub trait RegionCatalog: Send + Sync {
    async fn fetch_provinces(&self) -> Vec<Region>;

    async fn fetch_wards(&self, province_code: &str) -> Vec<Region>;
}

/// Client for the bando.com.vn administrative lookup API
pub struct BandoRegionClient {
    provinces_url: String,
    wards_url: String,
    client: Client,
}

impl BandoRegionClient {
    /// Create a new region client
    pub fn new(
        provinces_url: String,
        wards_url: String,
        timeout: Duration,
    ) -> Result<Self, RegionCatalogError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            provinces_url,
            wards_url,
            client,
        })
    }

    async fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<Value, RegionCatalogError> {
        let response = self.client.post(url).form(form).send().await?;

        if !response.status().is_success() {
            return Err(RegionCatalogError::Status(response.status()));
        }

        Ok(response.json().await?)
    }

    /// Fetch provinces, surfacing failures
    pub async fn try_fetch_provinces(&self) -> Result<Vec<Region>, RegionCatalogError> {
        tracing::debug!("Fetching provinces from: {}", self.provinces_url);
        let payload = self.post_form(&self.provinces_url, &[]).await?;
        normalize_provinces(&payload)
    }

    /// Fetch wards of one province, surfacing failures
    pub async fn try_fetch_wards(&self, province_code: &str) -> Result<Vec<Region>, RegionCatalogError> {
        tracing::debug!("Fetching wards for province {} from: {}", province_code, self.wards_url);
        let payload = self
            .post_form(&self.wards_url, &[("id", province_code)])
            .await?;
        normalize_wards(&payload, province_code)
    }
}

#[async_trait]
impl RegionCatalog for BandoRegionClient {
    async fn fetch_provinces(&self) -> Vec<Region> {
        match self.try_fetch_provinces().await {
            Ok(provinces) => provinces,
            Err(e) => {
                tracing::warn!("Error fetching provinces, returning none: {}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_wards(&self, province_code: &str) -> Vec<Region> {
        if province_code.is_empty() {
            return Vec::new();
        }

        match self.try_fetch_wards(province_code).await {
            Ok(wards) => wards,
            Err(e) => {
                tracing::warn!("Error fetching wards for {}, returning none: {}", province_code, e);
                Vec::new()
            }
        }
    }
}

/// The record list: either the payload itself or its `data` array
fn records(payload: &Value) -> Result<&Vec<Value>, RegionCatalogError> {
    payload
        .as_array()
        .or_else(|| payload.get("data").and_then(Value::as_array))
        .ok_or_else(|| RegionCatalogError::InvalidResponse("Missing region array".into()))
}

/// First non-empty value among `keys`, numbers rendered as text
fn first_text(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match record.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Best-effort label for a record carrying no name field
fn synthesize_name(record: &Value, code: &str) -> String {
    let parts: Vec<String> = NAME_PART_KEYS
        .iter()
        .filter_map(|key| first_text(record, &[*key]))
        .collect();

    if parts.is_empty() {
        code.to_string()
    } else {
        parts.join(" ")
    }
}

fn ward_name(record: &Value, code: &str) -> String {
    if let Some(name) = first_text(record, &["name"]) {
        return name;
    }

    match (first_text(record, &["tenhc"]), first_text(record, &["loai"])) {
        (Some(tenhc), Some(loai)) => format!("{} ({})", tenhc, loai),
        (Some(tenhc), None) => tenhc,
        _ => synthesize_name(record, code),
    }
}

fn dedup_by_code(regions: impl Iterator<Item = Region>) -> Vec<Region> {
    let mut seen = HashSet::new();
    regions.filter(|r| seen.insert(r.code.clone())).collect()
}

/// Map an upstream province payload to canonical regions
///
/// Records without any code are dropped; the first record wins on duplicate codes.
pub fn normalize_provinces(payload: &Value) -> Result<Vec<Region>, RegionCatalogError> {
    let provinces = records(payload)?.iter().filter_map(|record| {
        let code = first_text(record, PROVINCE_CODE_KEYS)?;
        let name = first_text(record, PROVINCE_NAME_KEYS)
            .unwrap_or_else(|| synthesize_name(record, &code));
        Some(Region::province(code, name))
    });

    Ok(dedup_by_code(provinces))
}

/// Map an upstream ward payload to canonical regions of `province_code`
pub fn normalize_wards(payload: &Value, province_code: &str) -> Result<Vec<Region>, RegionCatalogError> {
    let wards = records(payload)?.iter().filter_map(|record| {
        let code = first_text(record, WARD_CODE_KEYS)?;
        let name = ward_name(record, &code);
        Some(Region::ward(code, name, province_code))
    });

    Ok(dedup_by_code(wards))
}
