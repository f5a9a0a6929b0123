use serde::{Deserialize, Serialize};

/// Geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Administrative region: a province, or a ward scoped to one province
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub code: String,
    pub name: String,
    #[serde(rename = "parentCode", default, skip_serializing_if = "Option::is_none")]
    pub parent_code: Option<String>,
}

impl Region {
    pub fn province(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            parent_code: None,
        }
    }

    pub fn ward(
        code: impl Into<String>,
        name: impl Into<String>,
        province_code: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            parent_code: Some(province_code.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Active,
    Resolved,
    Cancelled,
}

/// Where a post is: the point used for distance filtering plus the free-text
/// address used for administrative matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostLocation {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    #[serde(rename = "address")]
    pub address_text: String,
}

/// A relief request as loaded from the post repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelievePost {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_description: Option<String>,
    pub location: PostLocation,
    pub urgency: Urgency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub needs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
}

/// User-facing filter criteria handed to the relevance filter
///
/// Distance filtering is active only when both `user_location` and a
/// positive `radius_km` are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    #[serde(default)]
    pub user_location: Option<Coordinate>,
    #[serde(default)]
    pub radius_km: Option<f64>,
    #[serde(default)]
    pub province_name: Option<String>,
    #[serde(default)]
    pub ward_name: Option<String>,
}

impl FilterSpec {
    /// Center and radius, if the distance predicate applies
    pub fn distance_criteria(&self) -> Option<(Coordinate, f64)> {
        match (self.user_location, self.radius_km) {
            (Some(center), Some(radius)) if radius > 0.0 => Some((center, radius)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        non_empty(&self.province_name).is_none()
            && non_empty(&self.ward_name).is_none()
            && self.distance_criteria().is_none()
    }
}

/// Borrow an optional string only when it has content
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Province/ward cascade state owned by the region selection coordinator
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub selected_province_code: Option<String>,
    pub selected_ward_code: Option<String>,
    pub ward_options: Vec<Region>,
    pub loading_wards: bool,
}

/// Persisted filter preferences, stored as one record per profile key
///
/// Fields written by other surfaces (contact details, relatives, ...) are kept
/// in `extra` so that a merge never drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ward_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ward_name: Option<String>,
    /// Radius in kilometers; 0 disables distance filtering
    #[serde(rename = "radius", default, skip_serializing_if = "Option::is_none")]
    pub radius_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinate>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Partial update of a [`FilterProfile`]
///
/// `None` keeps the stored value; `Some("")` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(default)]
    pub province_code: Option<String>,
    #[serde(default)]
    pub province_name: Option<String>,
    #[serde(default)]
    pub ward_code: Option<String>,
    #[serde(default)]
    pub ward_name: Option<String>,
    #[serde(default)]
    pub radius_km: Option<f64>,
    #[serde(default)]
    pub location: Option<Coordinate>,
}

/// The selection as the synchronizer sees it after a settled transition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSnapshot {
    pub province_code: Option<String>,
    pub province_name: Option<String>,
    pub ward_code: Option<String>,
    pub ward_name: Option<String>,
    pub radius_km: Option<f64>,
}

impl SelectionSnapshot {
    /// Patch that writes this snapshot, clearing whatever is unset
    pub fn to_patch(&self) -> ProfilePatch {
        fn or_clear(value: &Option<String>) -> Option<String> {
            Some(value.clone().unwrap_or_default())
        }

        ProfilePatch {
            province_code: or_clear(&self.province_code),
            province_name: or_clear(&self.province_name),
            ward_code: or_clear(&self.ward_code),
            ward_name: or_clear(&self.ward_name),
            radius_km: self.radius_km,
            location: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_location_wire_format() {
        let json = serde_json::json!({
            "id": "1",
            "location": { "latitude": 21.1234, "longitude": 105.5678, "address": "Hà Nội" },
            "urgency": "critical",
            "status": "active"
        });

        let post: RelievePost = serde_json::from_value(json).unwrap();
        assert_eq!(post.location.coordinate, Coordinate::new(21.1234, 105.5678));
        assert_eq!(post.location.address_text, "Hà Nội");
        assert_eq!(post.urgency, Urgency::Critical);
        assert_eq!(post.status, Some(PostStatus::Active));
    }

    #[test]
    fn test_distance_criteria_requires_positive_radius() {
        let mut spec = FilterSpec {
            user_location: Some(Coordinate::new(21.0, 105.0)),
            radius_km: Some(0.0),
            ..Default::default()
        };
        assert!(spec.distance_criteria().is_none());
        assert!(spec.is_empty());

        spec.radius_km = Some(5.0);
        assert!(spec.distance_criteria().is_some());

        spec.user_location = None;
        assert!(spec.distance_criteria().is_none());
    }

    #[test]
    fn test_profile_keeps_unknown_fields() {
        let json = serde_json::json!({
            "provinceCode": "01",
            "radius": 10,
            "phoneNumber": "0912345678"
        });

        let profile: FilterProfile = serde_json::from_value(json).unwrap();
        assert_eq!(profile.province_code.as_deref(), Some("01"));
        assert_eq!(profile.radius_km, Some(10.0));

        let back = serde_json::to_value(&profile).unwrap();
        assert_eq!(back["phoneNumber"], "0912345678");
    }

    #[test]
    fn test_snapshot_patch_clears_unset_fields() {
        let snapshot = SelectionSnapshot {
            province_code: Some("01".to_string()),
            ..Default::default()
        };

        let patch = snapshot.to_patch();
        assert_eq!(patch.province_code.as_deref(), Some("01"));
        assert_eq!(patch.ward_code.as_deref(), Some(""));
        assert_eq!(patch.radius_km, None);
    }
}
