//! Session-scoped layer registry.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Layer, LayerError};

struct Entry {
    layer: Arc<Layer>,
    revision: u64,
}

#[derive(Default)]
struct RegistryState {
    layers: HashMap<String, Entry>,
    revision: u64,
}

/// Name → layer map shared by every tool in one session.
///
/// Writes are last-write-wins. Every write bumps a monotonically increasing
/// revision so a caller can ask which names changed after a given point.
#[derive(Clone, Default)]
pub struct LayerRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `layer` under its own name, replacing any previous layer.
    pub async fn register(&self, layer: Layer) -> Arc<Layer> {
        let layer = Arc::new(layer);
        let mut state = self.state.write().await;
        state.revision += 1;
        let revision = state.revision;
        let replaced = state
            .layers
            .insert(
                layer.name.clone(),
                Entry {
                    layer: Arc::clone(&layer),
                    revision,
                },
            )
            .is_some();
        tracing::debug!(
            "Registered layer '{}' ({} features, revision {}{})",
            layer.name,
            layer.len(),
            revision,
            if replaced { ", replaced" } else { "" }
        );
        layer
    }

    /// Look up a layer by name.
    ///
    /// # Errors
    ///
    /// Returns `LayerError::NotFound` listing every known name when `name` is absent.
    pub async fn resolve(&self, name: &str) -> Result<Arc<Layer>, LayerError> {
        let state = self.state.read().await;
        match state.layers.get(name) {
            Some(entry) => Ok(Arc::clone(&entry.layer)),
            None => Err(LayerError::NotFound {
                name: name.to_string(),
                available: sorted_names(&state),
            }),
        }
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.state.read().await.layers.contains_key(name)
    }

    pub async fn remove(&self, name: &str) -> Option<Arc<Layer>> {
        self.state
            .write()
            .await
            .layers
            .remove(name)
            .map(|entry| entry.layer)
    }

    /// Known layer names, sorted.
    pub async fn names(&self) -> Vec<String> {
        sorted_names(&*self.state.read().await)
    }

    /// Snapshot of all layers, sorted by name.
    pub async fn layers(&self) -> Vec<Arc<Layer>> {
        let state = self.state.read().await;
        let mut layers: Vec<Arc<Layer>> = state
            .layers
            .values()
            .map(|entry| Arc::clone(&entry.layer))
            .collect();
        layers.sort_by(|a, b| a.name.cmp(&b.name));
        layers
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.layers.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.layers.is_empty()
    }

    /// Current write revision.
    pub async fn revision(&self) -> u64 {
        self.state.read().await.revision
    }

    /// Names whose latest write happened after `revision`, in write order.
    pub async fn written_since(&self, revision: u64) -> Vec<String> {
        let state = self.state.read().await;
        let mut written: Vec<(u64, &String)> = state
            .layers
            .iter()
            .filter(|(_, entry)| entry.revision > revision)
            .map(|(name, entry)| (entry.revision, name))
            .collect();
        written.sort();
        written.into_iter().map(|(_, name)| name.clone()).collect()
    }
}

fn sorted_names(state: &RegistryState) -> Vec<String> {
    let mut names: Vec<String> = state.layers.keys().cloned().collect();
    names.sort();
    names
}
