use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use dashmap::DashMap;

use crate::config::LocatorSettings;
use crate::models::outlet::Outlet;
use crate::observability::metrics::Metrics;

pub struct AppState {
    outlets: DashMap<String, Outlet>,
    /// Shared by per-outlet access, exclusive for whole-directory swaps, so no
    /// reader sees a directory halfway through `replace_all`.
    directory: RwLock<()>,
    pub settings: LocatorSettings,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(settings: LocatorSettings) -> Self {
        Self {
            outlets: DashMap::new(),
            directory: RwLock::new(()),
            settings,
            metrics: Metrics::new(),
        }
    }

    pub fn len(&self) -> usize {
        let _guard = self.read_directory();
        self.outlets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<Outlet> {
        let _guard = self.read_directory();
        self.outlets.get(id).map(|entry| entry.value().clone())
    }

    /// Owned copy of the directory, ordered by id so rankings are repeatable.
    pub fn snapshot(&self) -> Vec<Outlet> {
        let _guard = self.read_directory();
        let mut outlets: Vec<Outlet> = self
            .outlets
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        outlets.sort_by(|a, b| a.id.cmp(&b.id));
        outlets
    }

    pub fn upsert(&self, outlet: Outlet) -> Option<Outlet> {
        let _guard = self.read_directory();
        let previous = self.outlets.insert(outlet.id.clone(), outlet);
        self.refresh_directory_gauge();
        previous
    }

    pub fn set_active(&self, id: &str, is_active: bool) -> Option<Outlet> {
        let _guard = self.read_directory();
        let mut outlet = self.outlets.get_mut(id)?;
        outlet.is_active = is_active;
        outlet.updated_at = Utc::now();
        Some(outlet.clone())
    }

    pub fn remove(&self, id: &str) -> Option<Outlet> {
        let _guard = self.read_directory();
        let removed = self.outlets.remove(id).map(|(_, outlet)| outlet);
        self.refresh_directory_gauge();
        removed
    }

    /// Swaps in a new directory. Readers see either the old or the new one.
    pub fn replace_all(&self, outlets: Vec<Outlet>) {
        let _guard = self.write_directory();
        self.outlets.clear();
        for outlet in outlets {
            self.outlets.insert(outlet.id.clone(), outlet);
        }
        self.refresh_directory_gauge();
    }

    fn refresh_directory_gauge(&self) {
        self.metrics.outlets_registered.set(self.outlets.len() as i64);
    }

    // The guarded value is `()`, so a poisoned lock carries no broken state.
    fn read_directory(&self) -> RwLockReadGuard<'_, ()> {
        self.directory.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_directory(&self) -> RwLockWriteGuard<'_, ()> {
        self.directory.write().unwrap_or_else(PoisonError::into_inner)
    }
}
