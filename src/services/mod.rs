// Service exports
pub mod cache;
pub mod geolocation;
pub mod posts;
pub mod preferences;
pub mod profile_store;
pub mod region_catalog;
pub mod session;

pub use cache::{CacheKey, CachedRegionCatalog};
pub use geolocation::{FixedGeolocation, GeolocationProvider};
pub use posts::{InMemoryPostRepository, PostRepository, PostRepositoryError};
pub use preferences::{merge_profile, PreferenceSynchronizer, DEFAULT_PROFILE_KEY, DEFAULT_RADIUS_KM};
pub use profile_store::{InMemoryProfileStore, PostgresProfileStore, ProfileStore, ProfileStoreError};
pub use region_catalog::{BandoRegionClient, RegionCatalog, RegionCatalogError};
pub use session::SelectionSession;
