use crate::core::{
    relevance::filter_posts,
    selection::{RegionSelectionCoordinator, SavedSelection, SelectionEvent, Transition},
};
use crate::models::{
    Coordinate, FilterProfile, FilterSpec, Region, RelievePost, SelectionSnapshot, SelectionState,
};
use crate::services::{
    geolocation::GeolocationProvider, preferences::PreferenceSynchronizer,
    region_catalog::RegionCatalog,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::{Id, JoinError, JoinSet};

/// One user's filter selection, driven against live region data
///
/// This is the entry point for embedding the engine in a client; the HTTP
/// service only exposes the stateless filter and preference endpoints.
///
/// Events are applied one at a time on the caller's task. Ward fetches run as
/// tasks in a [`JoinSet`]; their responses are only applied when the caller
/// pulls them with [`Self::settle`] or [`Self::drain`]. A fetch task that
/// panics resolves as an empty ward list.
pub struct SelectionSession {
    catalog: Arc<dyn RegionCatalog>,
    synchronizer: PreferenceSynchronizer,
    geolocation: Arc<dyn GeolocationProvider>,
    coordinator: RegionSelectionCoordinator,
    provinces: Vec<Region>,
    radius_km: f64,
    stored: Option<FilterProfile>,
    fetches: JoinSet<Vec<Region>>,
    fetch_codes: HashMap<Id, String>,
}

impl SelectionSession {
    /// Hydrate from the saved profile, load provinces and kick off the first ward fetch
    pub async fn start(
        catalog: Arc<dyn RegionCatalog>,
        synchronizer: PreferenceSynchronizer,
        geolocation: Arc<dyn GeolocationProvider>,
    ) -> Self {
        let stored = synchronizer.load().await;
        let provinces = catalog.fetch_provinces().await;
        let radius_km = stored
            .as_ref()
            .and_then(|p| p.radius_km)
            .unwrap_or_else(|| synchronizer.default_radius_km());
        let coordinator = RegionSelectionCoordinator::new(stored.as_ref().map(SavedSelection::from));

        tracing::info!(
            "Selection session started for {} ({} provinces, saved province: {:?})",
            synchronizer.key(),
            provinces.len(),
            coordinator.state().selected_province_code
        );

        let mut session = Self {
            catalog,
            synchronizer,
            geolocation,
            coordinator,
            provinces,
            radius_km,
            stored,
            fetches: JoinSet::new(),
            fetch_codes: HashMap::new(),
        };

        let transition = session.coordinator.start();
        session.follow(transition).await;
        session
    }

    pub async fn select_province(&mut self, code: impl Into<String>) {
        self.apply(SelectionEvent::ProvinceChanged(code.into())).await;
    }

    pub async fn select_ward(&mut self, code: impl Into<String>) {
        self.apply(SelectionEvent::WardChanged(code.into())).await;
    }

    /// Change the radius; 0 disables distance filtering
    pub async fn set_radius(&mut self, radius_km: f64) {
        self.radius_km = radius_km.max(0.0);
        self.persist().await;
    }

    /// Wait for the next ward fetch to complete and apply it
    ///
    /// Returns `None` when no fetch is outstanding.
    pub async fn settle(&mut self) -> Option<Transition> {
        let joined = self.fetches.join_next_with_id().await?;
        let event = self.completion(joined)?;
        Some(self.apply(event).await)
    }

    /// Wait until every outstanding ward fetch has been applied or discarded
    pub async fn settle_all(&mut self) {
        while self.settle().await.is_some() {}
    }

    /// Apply whatever fetches have already completed, without waiting
    pub async fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Some(joined) = self.fetches.try_join_next_with_id() {
            if let Some(event) = self.completion(joined) {
                self.apply(event).await;
                applied += 1;
            }
        }
        applied
    }

    /// Turn a finished fetch task into the event carrying its province tag
    fn completion(&mut self, joined: Result<(Id, Vec<Region>), JoinError>) -> Option<SelectionEvent> {
        let (id, wards) = match joined {
            Ok((id, wards)) => (id, wards),
            Err(e) => {
                tracing::warn!("Ward fetch task failed, treating as no wards: {}", e);
                (e.id(), Vec::new())
            }
        };

        let for_code = self.fetch_codes.remove(&id)?;
        Some(SelectionEvent::WardsFetched { for_code, wards })
    }

    async fn apply(&mut self, event: SelectionEvent) -> Transition {
        let transition = self.coordinator.handle(event);
        self.follow(transition.clone()).await;
        transition
    }

    async fn follow(&mut self, transition: Transition) {
        match transition {
            Transition::Fetch(request) => {
                self.spawn_ward_fetch(request.province_code);
                self.persist().await;
            }
            Transition::Applied => self.persist().await,
            Transition::Discarded => {}
        }
    }

    fn spawn_ward_fetch(&mut self, province_code: String) {
        let catalog = Arc::clone(&self.catalog);
        let code = province_code.clone();

        let handle = self
            .fetches
            .spawn(async move { catalog.fetch_wards(&code).await });
        self.fetch_codes.insert(handle.id(), province_code);
    }

    async fn persist(&mut self) {
        let snapshot = self.snapshot();
        if self.synchronizer.sync(&snapshot).await {
            self.stored = self.synchronizer.load().await;
        }

        let baseline = self.stored.as_ref().map(SavedSelection::from);
        self.coordinator.set_saved(baseline);
    }

    fn province_name(&self) -> Option<String> {
        let code = self.coordinator.state().selected_province_code.as_deref()?;
        self.provinces
            .iter()
            .find(|p| p.code == code)
            .map(|p| p.name.clone())
            .or_else(|| {
                let stored = self.stored.as_ref()?;
                (stored.province_code.as_deref() == Some(code))
                    .then(|| stored.province_name.clone())
                    .flatten()
            })
    }

    fn ward_name(&self) -> Option<String> {
        let code = self.coordinator.state().selected_ward_code.as_deref()?;
        self.coordinator
            .selected_ward()
            .map(|w| w.name.clone())
            .or_else(|| {
                let stored = self.stored.as_ref()?;
                (stored.ward_code.as_deref() == Some(code))
                    .then(|| stored.ward_name.clone())
                    .flatten()
            })
    }

    /// The selection as it should be persisted
    pub fn snapshot(&self) -> SelectionSnapshot {
        let state = self.coordinator.state();
        SelectionSnapshot {
            province_code: state.selected_province_code.clone(),
            province_name: self.province_name(),
            ward_code: state.selected_ward_code.clone(),
            ward_name: self.ward_name(),
            radius_km: Some(self.radius_km),
        }
    }

    /// Current filter criteria, using the live position when one is available
    pub async fn filter_spec(&self) -> FilterSpec {
        let location: Option<Coordinate> = match self.geolocation.current_position().await {
            Some(position) => Some(position),
            None => self.stored.as_ref().and_then(|p| p.location),
        };

        FilterSpec {
            user_location: location,
            radius_km: Some(self.radius_km).filter(|r| *r > 0.0),
            province_name: self.province_name(),
            ward_name: self.ward_name(),
        }
    }

    /// The subset of `posts` relevant under the current selection
    pub async fn visible_posts(&self, posts: &[RelievePost]) -> Vec<RelievePost> {
        let spec = self.filter_spec().await;
        filter_posts(posts, &spec)
    }

    pub fn state(&self) -> &SelectionState {
        self.coordinator.state()
    }

    pub fn provinces(&self) -> &[Region] {
        &self.provinces
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    pub fn pending_fetches(&self) -> usize {
        self.fetches.len()
    }
}
