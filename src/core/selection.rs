//! Province → ward cascade.
//!
//! The coordinator is a plain state machine: it never performs I/O itself.
//! Transitions that need wards hand back a [`WardRequest`] tagged with the
//! province code it was issued for, and the caller feeds the response back as
//! [`SelectionEvent::WardsFetched`] carrying that same tag. A response whose tag
//! no longer matches the live selection is dropped without touching state, so
//! completion order of overlapping fetches cannot leak an earlier province's
//! wards into the view.

use crate::models::{FilterProfile, Region, SelectionState};

/// The selection remembered from the profile store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedSelection {
    pub province_code: Option<String>,
    pub ward_code: Option<String>,
}

impl From<&FilterProfile> for SavedSelection {
    fn from(profile: &FilterProfile) -> Self {
        Self {
            province_code: profile.province_code.clone().filter(|c| !c.is_empty()),
            ward_code: profile.ward_code.clone().filter(|c| !c.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    /// User picked a province; an empty code clears the selection
    ProvinceChanged(String),
    /// A ward fetch resolved; `for_code` is the tag it was issued with
    WardsFetched { for_code: String, wards: Vec<Region> },
    /// User picked a ward; an empty code clears it
    WardChanged(String),
}

/// Ward fetch the caller must perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WardRequest {
    pub province_code: String,
}

/// What handling an event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// State changed and wards must be fetched for the request's province
    Fetch(WardRequest),
    /// State changed, nothing else to do
    Applied,
    /// Stale ward response, state untouched
    Discarded,
}

#[derive(Debug, Clone, Default)]
pub struct RegionSelectionCoordinator {
    state: SelectionState,
    saved: Option<SavedSelection>,
}

impl RegionSelectionCoordinator {
    /// Seed the selection from a previously saved profile, if any
    pub fn new(saved: Option<SavedSelection>) -> Self {
        let state = SelectionState {
            selected_province_code: saved.as_ref().and_then(|s| s.province_code.clone()),
            selected_ward_code: saved.as_ref().and_then(|s| s.ward_code.clone()),
            ward_options: Vec::new(),
            loading_wards: false,
        };

        Self { state, saved }
    }

    /// Run the province effect for the hydrated selection
    ///
    /// Unlike a user-driven province change, an empty saved province does not
    /// wipe the saved ward here.
    pub fn start(&mut self) -> Transition {
        match self.state.selected_province_code.clone() {
            Some(code) => self.request_wards(code),
            None => {
                self.state.ward_options.clear();
                self.state.loading_wards = false;
                Transition::Applied
            }
        }
    }

    pub fn handle(&mut self, event: SelectionEvent) -> Transition {
        match event {
            SelectionEvent::ProvinceChanged(code) => self.province_changed(code),
            SelectionEvent::WardsFetched { for_code, wards } => self.wards_fetched(for_code, wards),
            SelectionEvent::WardChanged(code) => {
                self.state.selected_ward_code = Some(code).filter(|c| !c.is_empty());
                Transition::Applied
            }
        }
    }

    fn province_changed(&mut self, code: String) -> Transition {
        if code.is_empty() {
            self.state.selected_province_code = None;
            self.state.selected_ward_code = None;
            self.state.ward_options.clear();
            self.state.loading_wards = false;
            return Transition::Applied;
        }

        if self.state.selected_province_code.as_deref() != Some(code.as_str()) {
            self.state.selected_ward_code = None;
            self.state.ward_options.clear();
        }
        self.state.selected_province_code = Some(code.clone());

        self.request_wards(code)
    }

    fn request_wards(&mut self, province_code: String) -> Transition {
        self.state.loading_wards = true;
        tracing::debug!("Requesting wards for province {}", province_code);
        Transition::Fetch(WardRequest { province_code })
    }

    fn wards_fetched(&mut self, for_code: String, wards: Vec<Region>) -> Transition {
        if self.state.selected_province_code.as_deref() != Some(for_code.as_str()) {
            tracing::debug!(
                "Discarding stale wards for {} (selected: {:?})",
                for_code,
                self.state.selected_province_code
            );
            return Transition::Discarded;
        }

        let restored = self
            .saved
            .as_ref()
            .filter(|saved| saved.province_code.as_deref() == Some(for_code.as_str()))
            .and_then(|saved| saved.ward_code.as_deref())
            .filter(|ward_code| wards.iter().any(|w| w.code == *ward_code))
            .map(str::to_string);

        self.state.ward_options = wards;
        self.state.loading_wards = false;
        self.state.selected_ward_code = restored;

        Transition::Applied
    }

    /// Replace the baseline used to restore a saved ward after a fetch
    pub fn set_saved(&mut self, saved: Option<SavedSelection>) {
        self.saved = saved;
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// The selected ward, if its options have loaded
    pub fn selected_ward(&self) -> Option<&Region> {
        let code = self.state.selected_ward_code.as_deref()?;
        self.state.ward_options.iter().find(|w| w.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wards_of(province: &str, codes: &[&str]) -> Vec<Region> {
        codes
            .iter()
            .map(|c| Region::ward(*c, format!("Ward {}", c), province))
            .collect()
    }

    fn saved(province: &str, ward: &str) -> SavedSelection {
        SavedSelection {
            province_code: Some(province.to_string()),
            ward_code: Some(ward.to_string()),
        }
    }

    #[test]
    fn test_start_without_profile() {
        let mut coordinator = RegionSelectionCoordinator::new(None);

        assert_eq!(coordinator.start(), Transition::Applied);
        assert_eq!(coordinator.state(), &SelectionState::default());
    }

    #[test]
    fn test_start_with_profile_requests_wards() {
        let mut coordinator = RegionSelectionCoordinator::new(Some(saved("01", "0105")));

        let transition = coordinator.start();
        assert_eq!(
            transition,
            Transition::Fetch(WardRequest { province_code: "01".to_string() })
        );
        assert!(coordinator.state().loading_wards);
        // The saved ward survives until its province's wards arrive
        assert_eq!(coordinator.state().selected_ward_code.as_deref(), Some("0105"));
    }

    #[test]
    fn test_hydration_without_province_keeps_saved_ward() {
        let mut coordinator = RegionSelectionCoordinator::new(Some(SavedSelection {
            province_code: None,
            ward_code: Some("0105".to_string()),
        }));

        assert_eq!(coordinator.start(), Transition::Applied);
        assert_eq!(coordinator.state().selected_ward_code.as_deref(), Some("0105"));
    }

    #[test]
    fn test_saved_ward_restored_when_present() {
        let mut coordinator = RegionSelectionCoordinator::new(Some(saved("01", "0105")));
        coordinator.start();

        let transition = coordinator.handle(SelectionEvent::WardsFetched {
            for_code: "01".to_string(),
            wards: wards_of("01", &["0101", "0105"]),
        });

        assert_eq!(transition, Transition::Applied);
        assert_eq!(coordinator.state().selected_ward_code.as_deref(), Some("0105"));
        assert!(!coordinator.state().loading_wards);
        assert_eq!(coordinator.selected_ward().map(|w| w.name.as_str()), Some("Ward 0105"));
    }

    #[test]
    fn test_saved_ward_cleared_when_missing() {
        let mut coordinator = RegionSelectionCoordinator::new(Some(saved("01", "0105")));
        coordinator.start();

        coordinator.handle(SelectionEvent::WardsFetched {
            for_code: "01".to_string(),
            wards: wards_of("01", &["0101", "0102"]),
        });

        assert_eq!(coordinator.state().selected_ward_code, None);
    }

    #[test]
    fn test_stale_response_discarded() {
        let mut coordinator = RegionSelectionCoordinator::new(None);
        coordinator.handle(SelectionEvent::ProvinceChanged("01".to_string()));
        coordinator.handle(SelectionEvent::ProvinceChanged("02".to_string()));

        let fresh = coordinator.handle(SelectionEvent::WardsFetched {
            for_code: "02".to_string(),
            wards: wards_of("02", &["0201"]),
        });
        let stale = coordinator.handle(SelectionEvent::WardsFetched {
            for_code: "01".to_string(),
            wards: wards_of("01", &["0101"]),
        });

        assert_eq!(fresh, Transition::Applied);
        assert_eq!(stale, Transition::Discarded);
        assert_eq!(coordinator.state().ward_options, wards_of("02", &["0201"]));
        assert!(!coordinator.state().loading_wards);
    }

    #[test]
    fn test_stale_response_before_fresh_leaves_loading() {
        let mut coordinator = RegionSelectionCoordinator::new(None);
        coordinator.handle(SelectionEvent::ProvinceChanged("01".to_string()));
        coordinator.handle(SelectionEvent::ProvinceChanged("02".to_string()));

        coordinator.handle(SelectionEvent::WardsFetched {
            for_code: "01".to_string(),
            wards: wards_of("01", &["0101"]),
        });

        assert!(coordinator.state().ward_options.is_empty());
        assert!(coordinator.state().loading_wards);
    }

    #[test]
    fn test_province_change_clears_ward() {
        let mut coordinator = RegionSelectionCoordinator::new(None);
        coordinator.handle(SelectionEvent::ProvinceChanged("01".to_string()));
        coordinator.handle(SelectionEvent::WardsFetched {
            for_code: "01".to_string(),
            wards: wards_of("01", &["0101"]),
        });
        coordinator.handle(SelectionEvent::WardChanged("0101".to_string()));
        assert_eq!(coordinator.state().selected_ward_code.as_deref(), Some("0101"));

        coordinator.handle(SelectionEvent::ProvinceChanged("02".to_string()));
        assert_eq!(coordinator.state().selected_ward_code, None);
        assert!(coordinator.state().ward_options.is_empty());
    }

    #[test]
    fn test_clearing_province() {
        let mut coordinator = RegionSelectionCoordinator::new(Some(saved("01", "0105")));
        coordinator.start();

        let transition = coordinator.handle(SelectionEvent::ProvinceChanged(String::new()));

        assert_eq!(transition, Transition::Applied);
        assert_eq!(coordinator.state(), &SelectionState::default());

        // The in-flight hydration fetch is now stale
        let late = coordinator.handle(SelectionEvent::WardsFetched {
            for_code: "01".to_string(),
            wards: wards_of("01", &["0105"]),
        });
        assert_eq!(late, Transition::Discarded);
    }

    #[test]
    fn test_failed_fetch_is_empty_result() {
        let mut coordinator = RegionSelectionCoordinator::new(None);
        coordinator.handle(SelectionEvent::ProvinceChanged("01".to_string()));

        coordinator.handle(SelectionEvent::WardsFetched {
            for_code: "01".to_string(),
            wards: vec![],
        });

        assert!(coordinator.state().ward_options.is_empty());
        assert!(!coordinator.state().loading_wards);
    }
}
