use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{Coordinate, ProfilePatch};

/// Request to filter the post collection
///
/// Fields left out are seeded from the saved profile when `profileKey` is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FilterPostsRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "profile_key", rename = "profileKey", default)]
    pub profile_key: Option<String>,
    #[serde(default)]
    pub location: Option<Coordinate>,
    #[validate(range(min = 0.0, max = 20000.0))]
    #[serde(alias = "radius_km", rename = "radiusKm", default)]
    pub radius_km: Option<f64>,
    #[serde(alias = "province_name", rename = "provinceName", default)]
    pub province_name: Option<String>,
    #[serde(alias = "ward_name", rename = "wardName", default)]
    pub ward_name: Option<String>,
}

/// Request to update the saved filter preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePreferencesRequest {
    #[serde(alias = "province_code", rename = "provinceCode", default)]
    pub province_code: Option<String>,
    #[serde(alias = "province_name", rename = "provinceName", default)]
    pub province_name: Option<String>,
    #[serde(alias = "ward_code", rename = "wardCode", default)]
    pub ward_code: Option<String>,
    #[serde(alias = "ward_name", rename = "wardName", default)]
    pub ward_name: Option<String>,
    #[validate(range(min = 0.0, max = 20000.0))]
    #[serde(alias = "radius_km", rename = "radiusKm", default)]
    pub radius_km: Option<f64>,
    #[serde(default)]
    pub location: Option<Coordinate>,
}

impl From<UpdatePreferencesRequest> for ProfilePatch {
    fn from(req: UpdatePreferencesRequest) -> Self {
        ProfilePatch {
            province_code: req.province_code,
            province_name: req.province_name,
            ward_code: req.ward_code,
            ward_name: req.ward_name,
            radius_km: req.radius_km,
            location: req.location,
        }
    }
}
