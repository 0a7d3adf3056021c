//! In-memory session store (non-persistent).
//!
//! Every browser tab gets its own session: a private layer registry plus a
//! lock that keeps queries within the session strictly sequential.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::layers::LayerRegistry;

pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub layers: LayerRegistry,
    /// Held for the duration of a query.
    pub run_lock: Mutex<()>,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Arc<Session> {
        let session = Arc::new(Session {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            layers: LayerRegistry::new(),
            run_lock: Mutex::new(()),
        });
        self.sessions
            .write()
            .await
            .insert(session.id, Arc::clone(&session));
        tracing::info!("Created session {}", session.id);
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<Session>> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        if let Some(session) = &removed {
            tracing::info!(
                "Removed session {} (created {})",
                session.id,
                session.created_at.to_rfc3339()
            );
        }
        removed.is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
