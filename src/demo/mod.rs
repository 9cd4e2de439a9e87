//! Where hooks get their data: the live adapter or the demo fixtures.

mod fixtures;

pub use fixtures::Fixtures;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Local;
use tracing::info;

use crate::adapter::CollectionAdapter;
use crate::error::{KarrosError, Result};
use crate::hook::ChangeBus;

/// The route one hook operation takes, decided once at its start.
pub enum Route<'a> {
    Live(&'a CollectionAdapter),
    Demo(&'a Fixtures),
}

/// Shared by every hook built from it. Demo and live data never mix:
/// switching modes only changes where the next operation goes.
pub struct DataSource {
    live: Option<CollectionAdapter>,
    fixtures: Arc<Fixtures>,
    demo: AtomicBool,
    bus: ChangeBus,
}

impl DataSource {
    /// Backed by a live adapter, demo mode off.
    pub fn live(adapter: CollectionAdapter) -> Self {
        Self {
            live: Some(adapter),
            fixtures: Arc::new(Fixtures::builtin(Local::now().date_naive())),
            demo: AtomicBool::new(false),
            bus: ChangeBus::default(),
        }
    }

    /// Demo mode only, with the built-in fixtures.
    pub fn demo() -> Self {
        Self {
            live: None,
            fixtures: Arc::new(Fixtures::builtin(Local::now().date_naive())),
            demo: AtomicBool::new(true),
            bus: ChangeBus::default(),
        }
    }

    pub fn with_fixtures(mut self, fixtures: Fixtures) -> Self {
        self.fixtures = Arc::new(fixtures);
        self
    }

    pub fn is_demo(&self) -> bool {
        self.demo.load(Ordering::SeqCst)
    }

    /// Switch modes for subsequent operations. Going live without a live
    /// backend fails and leaves the mode unchanged.
    pub fn set_demo(&self, demo: bool) -> Result<()> {
        if !demo && self.live.is_none() {
            return Err(KarrosError::NotConfigured);
        }
        let was = self.demo.swap(demo, Ordering::SeqCst);
        if was != demo {
            info!(demo, "data source mode changed");
        }
        Ok(())
    }

    pub fn route(&self) -> Result<Route<'_>> {
        if self.is_demo() {
            return Ok(Route::Demo(&self.fixtures));
        }
        self.live
            .as_ref()
            .map(Route::Live)
            .ok_or(KarrosError::NotConfigured)
    }

    pub fn fixtures(&self) -> &Fixtures {
        &self.fixtures
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Backend, MemoryStore};

    fn live_source() -> DataSource {
        let store = Arc::new(MemoryStore::new());
        DataSource::live(CollectionAdapter::new(Backend::from_store(store)))
    }

    #[test]
    fn test_demo_only_source_cannot_go_live() {
        let source = DataSource::demo();
        assert!(source.is_demo());
        assert!(matches!(
            source.set_demo(false),
            Err(KarrosError::NotConfigured)
        ));
        assert!(source.is_demo());
    }

    #[test]
    fn test_route_follows_flag() {
        let source = live_source();
        assert!(matches!(source.route().unwrap(), Route::Live(_)));
        source.set_demo(true).unwrap();
        assert!(matches!(source.route().unwrap(), Route::Demo(_)));
        source.set_demo(false).unwrap();
        assert!(matches!(source.route().unwrap(), Route::Live(_)));
    }
}
