//! Per-session form state.
//!
//! Each browser or client session owns a `form_key`. It starts at 0 and is
//! bumped after every successful create so the client knows to clear its
//! inputs. Sessions live in memory only, and only ids handed out by
//! [`SessionStore::start`] are tracked.
use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormSession {
    pub form_key: u64,
}

#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, FormSession>>>,
}

impl SessionStore {
    /// Open a new session with a zeroed form key.
    pub async fn start(&self) -> (Uuid, FormSession) {
        let id = Uuid::new_v4();
        let session = FormSession::default();
        self.inner.lock().await.insert(id, session);
        (id, session)
    }

    pub async fn get(&self, id: Uuid) -> Option<FormSession> {
        self.inner.lock().await.get(&id).copied()
    }

    pub async fn update<F>(&self, id: Uuid, f: F) -> Option<FormSession>
    where
        F: FnOnce(&mut FormSession),
    {
        let mut guard = self.inner.lock().await;
        let session = guard.get_mut(&id)?;
        f(session);
        Some(*session)
    }

    /// Record a successful submission, returning the new form key.
    ///
    /// Unknown ids are ignored.
    pub async fn bump_form_key(&self, id: Uuid) -> Option<u64> {
        self.update(id, |session| session.form_key += 1)
            .await
            .map(|session| session.form_key)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}
