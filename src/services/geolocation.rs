use crate::models::Coordinate;
use async_trait::async_trait;

/// Source of the user's live position
///
/// `None` means no position is available; distance filtering is then skipped.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(&self) -> Option<Coordinate>;
}

/// Provider that always reports the same position (or none)
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedGeolocation {
    position: Option<Coordinate>,
}

impl FixedGeolocation {
    pub fn new(position: Coordinate) -> Self {
        Self {
            position: Some(position),
        }
    }

    pub fn unavailable() -> Self {
        Self { position: None }
    }
}

#[async_trait]
impl GeolocationProvider for FixedGeolocation {
    async fn current_position(&self) -> Option<Coordinate> {
        self.position
    }
}
