// Cache de session unique du processus. Toute la couche client lit le token
// et le rôle ici ; logout, changement de rôle et 401 l'invalident.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::warn;
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::models::enums::Role;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: i32,
    pub role: Role,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedSession {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Default)]
pub struct SessionCache {
    inner: RwLock<Option<CachedSession>>,
}

static GLOBAL_SESSION: Lazy<SessionCache> = Lazy::new(SessionCache::default);

impl SessionCache {
    /// Instance partagée par tout le processus
    pub fn global() -> &'static SessionCache {
        &GLOBAL_SESSION
    }

    pub fn store(&self, session: CachedSession) {
        *self.write() = Some(session);
    }

    pub fn current(&self) -> Option<CachedSession> {
        self.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|session| session.token)
    }

    pub fn role(&self) -> Option<Role> {
        self.current().map(|session| session.user.role)
    }

    pub fn invalidate(&self) {
        self.write().take();
    }

    /// Le rôle affiché ne correspond plus au serveur : on repart de zéro
    pub fn invalidate_if_role_changed(&self, role: Role) -> bool {
        let changed = self.role().is_some_and(|cached| cached != role);
        if changed {
            self.invalidate();
        }
        changed
    }

    // Verrou empoisonné par un panic: la valeur est reprise telle quelle
    fn read(&self) -> RwLockReadGuard<'_, Option<CachedSession>> {
        self.inner.read().unwrap_or_else(|poisoned| {
            warn!("Session cache lock poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<CachedSession>> {
        self.inner.write().unwrap_or_else(|poisoned| {
            warn!("Session cache lock poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }
}
