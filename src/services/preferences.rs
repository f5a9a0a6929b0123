use crate::models::{FilterProfile, ProfilePatch, SelectionSnapshot};
use crate::services::profile_store::{ProfileStore, ProfileStoreError};
use std::sync::Arc;

/// Record key used when no per-user key is given
pub const DEFAULT_PROFILE_KEY: &str = "user_profile";
/// Radius applied when neither the update nor the stored record has one
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Keeps the persisted filter preferences in step with the live selection
#[derive(Clone)]
pub struct PreferenceSynchronizer {
    store: Arc<dyn ProfileStore>,
    key: String,
    default_radius_km: f64,
}

impl PreferenceSynchronizer {
    pub fn new(store: Arc<dyn ProfileStore>, key: impl Into<String>, default_radius_km: f64) -> Self {
        Self {
            store,
            key: key.into(),
            default_radius_km,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn default_radius_km(&self) -> f64 {
        self.default_radius_km
    }

    /// Read the stored record; an unreadable record counts as absent
    pub async fn load(&self) -> Option<FilterProfile> {
        match self.store.load(&self.key).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("Failed to load profile {}, starting empty: {}", self.key, e);
                None
            }
        }
    }

    /// Merge `patch` into the stored record and write it back
    pub async fn try_save(&self, patch: ProfilePatch) -> Result<FilterProfile, ProfileStoreError> {
        let existing = self.store.load(&self.key).await?;
        let merged = merge_profile(existing, patch, self.default_radius_km);
        self.store.save(&self.key, &merged).await?;

        tracing::debug!(
            "Saved preferences for {}: province={:?} ward={:?} radius={:?}",
            self.key,
            merged.province_code,
            merged.ward_code,
            merged.radius_km
        );

        Ok(merged)
    }

    /// Fire-and-forget variant of [`Self::try_save`]
    pub async fn save(&self, patch: ProfilePatch) {
        if let Err(e) = self.try_save(patch).await {
            tracing::warn!("Failed to save preferences for {}: {}", self.key, e);
        }
    }

    /// Persist `snapshot` if province, ward or radius differ from what is stored
    ///
    /// Returns whether a write was attempted.
    pub async fn sync(&self, snapshot: &SelectionSnapshot) -> bool {
        let stored = self.load().await.unwrap_or_default();

        if !selection_differs(&stored, snapshot) {
            return false;
        }

        self.save(snapshot.to_patch()).await;
        true
    }
}

fn selection_differs(stored: &FilterProfile, snapshot: &SelectionSnapshot) -> bool {
    stored.province_code != snapshot.province_code
        || stored.ward_code != snapshot.ward_code
        || (snapshot.radius_km.is_some() && stored.radius_km != snapshot.radius_km)
}

/// Apply `patch` over `existing`
///
/// Absent patch fields keep their stored value, empty strings clear. The
/// radius falls back to the stored one, then to `default_radius_km`.
pub fn merge_profile(
    existing: Option<FilterProfile>,
    patch: ProfilePatch,
    default_radius_km: f64,
) -> FilterProfile {
    fn apply(current: Option<String>, update: Option<String>) -> Option<String> {
        match update {
            None => current,
            Some(value) if value.is_empty() => None,
            Some(value) => Some(value),
        }
    }

    let existing = existing.unwrap_or_default();

    FilterProfile {
        province_code: apply(existing.province_code, patch.province_code),
        province_name: apply(existing.province_name, patch.province_name),
        ward_code: apply(existing.ward_code, patch.ward_code),
        ward_name: apply(existing.ward_name, patch.ward_name),
        radius_km: patch
            .radius_km
            .or(existing.radius_km)
            .or(Some(default_radius_km)),
        location: patch.location.or(existing.location),
        extra: existing.extra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;
    use crate::services::profile_store::InMemoryProfileStore;

    fn synchronizer(store: Arc<InMemoryProfileStore>) -> PreferenceSynchronizer {
        PreferenceSynchronizer::new(store, DEFAULT_PROFILE_KEY, DEFAULT_RADIUS_KM)
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let existing = FilterProfile {
            province_code: Some("01".to_string()),
            province_name: Some("Hà Nội".to_string()),
            radius_km: Some(10.0),
            location: Some(Coordinate::new(21.0, 105.8)),
            ..Default::default()
        };

        let merged = merge_profile(
            Some(existing),
            ProfilePatch {
                ward_code: Some("0105".to_string()),
                ..Default::default()
            },
            DEFAULT_RADIUS_KM,
        );

        assert_eq!(merged.province_code.as_deref(), Some("01"));
        assert_eq!(merged.province_name.as_deref(), Some("Hà Nội"));
        assert_eq!(merged.ward_code.as_deref(), Some("0105"));
        assert_eq!(merged.radius_km, Some(10.0));
        assert_eq!(merged.location, Some(Coordinate::new(21.0, 105.8)));
    }

    #[test]
    fn test_merge_empty_string_clears() {
        let existing = FilterProfile {
            ward_code: Some("0105".to_string()),
            ward_name: Some("Đông Anh".to_string()),
            ..Default::default()
        };

        let merged = merge_profile(
            Some(existing),
            ProfilePatch {
                ward_code: Some(String::new()),
                ward_name: Some(String::new()),
                ..Default::default()
            },
            DEFAULT_RADIUS_KM,
        );

        assert_eq!(merged.ward_code, None);
        assert_eq!(merged.ward_name, None);
    }

    #[test]
    fn test_merge_default_radius() {
        let merged = merge_profile(None, ProfilePatch::default(), DEFAULT_RADIUS_KM);
        assert_eq!(merged.radius_km, Some(5.0));

        let merged = merge_profile(
            None,
            ProfilePatch {
                radius_km: Some(0.0),
                ..Default::default()
            },
            DEFAULT_RADIUS_KM,
        );
        assert_eq!(merged.radius_km, Some(0.0));
    }

    #[tokio::test]
    async fn test_sync_skips_unchanged_selection() {
        let store = Arc::new(InMemoryProfileStore::new());
        let sync = synchronizer(store.clone());

        let snapshot = SelectionSnapshot {
            province_code: Some("01".to_string()),
            province_name: Some("Hà Nội".to_string()),
            radius_km: Some(5.0),
            ..Default::default()
        };

        assert!(sync.sync(&snapshot).await);
        assert!(!sync.sync(&snapshot).await);

        let changed = SelectionSnapshot {
            radius_km: Some(10.0),
            ..snapshot.clone()
        };
        assert!(sync.sync(&changed).await);

        let stored = sync.load().await.unwrap();
        assert_eq!(stored.radius_km, Some(10.0));
        assert_eq!(stored.province_name.as_deref(), Some("Hà Nội"));
    }

    #[tokio::test]
    async fn test_sync_preserves_other_surfaces_fields() {
        let mut existing = FilterProfile::default();
        existing
            .extra
            .insert("phoneNumber".to_string(), serde_json::json!("0912345678"));
        let store = Arc::new(InMemoryProfileStore::with_profile(DEFAULT_PROFILE_KEY, existing));
        let sync = synchronizer(store.clone());

        sync.sync(&SelectionSnapshot {
            province_code: Some("79".to_string()),
            ..Default::default()
        })
        .await;

        let stored = sync.load().await.unwrap();
        assert_eq!(stored.province_code.as_deref(), Some("79"));
        assert_eq!(stored.extra["phoneNumber"], "0912345678");
    }
}
