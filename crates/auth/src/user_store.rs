//! Role assignments keyed by identity id.
//!
//! The production user store is an external managed database; this module
//! defines the contract MotorHub consumes plus an in-memory implementation
//! for tests/dev.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use motorhub_core::IdentityId;

use crate::{Identity, Role};

/// A registered identity and its single current role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub identity: Identity,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a role write: the role replaced and the updated record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleChange {
    pub previous: Role,
    pub record: UserRecord,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserStoreError {
    #[error("user '{0}' not found")]
    NotFound(IdentityId),

    #[error("user '{0}' is already registered")]
    AlreadyRegistered(IdentityId),

    #[error("user store unavailable: {0}")]
    Unavailable(String),
}

pub trait UserStore: Send + Sync {
    /// Register a new identity with the default role ([`Role::Customer`]).
    fn register(&self, identity: Identity) -> Result<UserRecord, UserStoreError>;
    fn get(&self, id: &IdentityId) -> Result<Option<UserRecord>, UserStoreError>;
    fn get_role(&self, id: &IdentityId) -> Result<Option<Role>, UserStoreError> {
        Ok(self.get(id)?.map(|record| record.role))
    }
    /// Replace the role, reporting the one it replaced (read under the same write).
    fn set_role(&self, id: &IdentityId, role: Role) -> Result<RoleChange, UserStoreError>;
    fn list(&self) -> Result<Vec<UserRecord>, UserStoreError>;
}

impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    fn register(&self, identity: Identity) -> Result<UserRecord, UserStoreError> {
        (**self).register(identity)
    }

    fn get(&self, id: &IdentityId) -> Result<Option<UserRecord>, UserStoreError> {
        (**self).get(id)
    }

    fn get_role(&self, id: &IdentityId) -> Result<Option<Role>, UserStoreError> {
        (**self).get_role(id)
    }

    fn set_role(&self, id: &IdentityId, role: Role) -> Result<RoleChange, UserStoreError> {
        (**self).set_role(id, role)
    }

    fn list(&self) -> Result<Vec<UserRecord>, UserStoreError> {
        (**self).list()
    }
}

/// In-memory user store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<IdentityId, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> UserStoreError {
    UserStoreError::Unavailable("lock poisoned".to_string())
}

impl UserStore for InMemoryUserStore {
    fn register(&self, identity: Identity) -> Result<UserRecord, UserStoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        if map.contains_key(&identity.id) {
            return Err(UserStoreError::AlreadyRegistered(identity.id));
        }

        let now = Utc::now();
        let record = UserRecord {
            identity,
            role: Role::default(),
            created_at: now,
            updated_at: now,
        };
        map.insert(record.identity.id.clone(), record.clone());
        Ok(record)
    }

    fn get(&self, id: &IdentityId) -> Result<Option<UserRecord>, UserStoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        Ok(map.get(id).cloned())
    }

    fn set_role(&self, id: &IdentityId, role: Role) -> Result<RoleChange, UserStoreError> {
        let mut map = self.inner.write().map_err(poisoned)?;
        let record = map
            .get_mut(id)
            .ok_or_else(|| UserStoreError::NotFound(id.clone()))?;
        let previous = std::mem::replace(&mut record.role, role);
        record.updated_at = Utc::now();
        Ok(RoleChange {
            previous,
            record: record.clone(),
        })
    }

    fn list(&self) -> Result<Vec<UserRecord>, UserStoreError> {
        let map = self.inner.read().map_err(poisoned)?;
        let mut records: Vec<UserRecord> = map.values().cloned().collect();
        records.sort_by(|a, b| a.identity.id.cmp(&b.identity.id));
        Ok(records)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Role promotion
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PromotionError {
    #[error("only admins can change roles (actor role: {0})")]
    NotAdmin(Role),

    #[error("admins cannot change their own role")]
    SelfPromotion,

    #[error(transparent)]
    Store(#[from] UserStoreError),
}

/// Change `target`'s role on behalf of `actor`.
///
/// # Invariants
/// - Only admins mutate roles.
/// - An actor cannot change their own role (no self-escalation or lock-out).
pub fn promote_role<S>(
    store: &S,
    actor_id: &IdentityId,
    actor_role: Role,
    target: &IdentityId,
    new_role: Role,
) -> Result<UserRecord, PromotionError>
where
    S: UserStore + ?Sized,
{
    if actor_role != Role::Admin {
        return Err(PromotionError::NotAdmin(actor_role));
    }
    if actor_id == target {
        return Err(PromotionError::SelfPromotion);
    }

    let change = store.set_role(target, new_role)?;

    info!(
        actor = %actor_id,
        target = %target,
        from = %change.previous,
        to = %new_role,
        "role changed; sessions issued before this carry a stale role"
    );

    Ok(change.record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> IdentityId {
        IdentityId::parse(s).unwrap()
    }

    fn register(store: &InMemoryUserStore, uid: &str) -> UserRecord {
        store
            .register(Identity::new(id(uid), format!("{uid}@example.com"), uid))
            .unwrap()
    }

    #[test]
    fn registration_defaults_to_customer() {
        let store = InMemoryUserStore::new();
        let record = register(&store, "alice");
        assert_eq!(record.role, Role::Customer);
        assert_eq!(store.get_role(&id("alice")).unwrap(), Some(Role::Customer));
    }

    #[test]
    fn duplicate_registration_conflicts() {
        let store = InMemoryUserStore::new();
        register(&store, "alice");
        let err = store
            .register(Identity::new(id("alice"), "other@example.com", "Other"))
            .unwrap_err();
        assert_eq!(err, UserStoreError::AlreadyRegistered(id("alice")));
    }

    #[test]
    fn set_role_on_unknown_user_is_not_found() {
        let store = InMemoryUserStore::new();
        let err = store.set_role(&id("ghost"), Role::Admin).unwrap_err();
        assert_eq!(err, UserStoreError::NotFound(id("ghost")));
    }

    #[test]
    fn admin_promotes_customer_to_vendor() {
        let store = InMemoryUserStore::new();
        register(&store, "root");
        register(&store, "dealer");

        let record = promote_role(&store, &id("root"), Role::Admin, &id("dealer"), Role::Vendor).unwrap();
        assert_eq!(record.role, Role::Vendor);
        assert_eq!(store.get_role(&id("dealer")).unwrap(), Some(Role::Vendor));
    }

    #[test]
    fn set_role_reports_replaced_role() {
        let store = InMemoryUserStore::new();
        register(&store, "dealer");

        let change = store.set_role(&id("dealer"), Role::Vendor).unwrap();
        assert_eq!(change.previous, Role::Customer);
        assert_eq!(change.record.role, Role::Vendor);

        let change = store.set_role(&id("dealer"), Role::Admin).unwrap();
        assert_eq!(change.previous, Role::Vendor);
    }

    #[test]
    fn concurrent_promotions_see_each_previous_role_once() {
        let store = Arc::new(InMemoryUserStore::new());
        register(&store, "dealer");

        let handles: Vec<_> = [Role::Vendor, Role::Admin, Role::Customer, Role::Vendor]
            .into_iter()
            .map(|role| {
                let store = store.clone();
                std::thread::spawn(move || store.set_role(&id("dealer"), role).unwrap())
            })
            .collect();
        let changes: Vec<RoleChange> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        // Writes form one chain: replaced roles plus the final role equal
        // written roles plus the initial role.
        let final_role = store.get_role(&id("dealer")).unwrap().unwrap();
        let mut previous: Vec<Role> = changes.iter().map(|c| c.previous).collect();
        let mut written: Vec<Role> = changes.iter().map(|c| c.record.role).collect();
        previous.push(final_role);
        written.push(Role::Customer);
        previous.sort();
        written.sort();
        assert_eq!(previous, written);
    }

    #[test]
    fn non_admin_cannot_promote() {
        let store = InMemoryUserStore::new();
        register(&store, "seller");
        register(&store, "buyer");

        let err = promote_role(&store, &id("seller"), Role::Vendor, &id("buyer"), Role::Vendor).unwrap_err();
        assert_eq!(err, PromotionError::NotAdmin(Role::Vendor));
        assert_eq!(store.get_role(&id("buyer")).unwrap(), Some(Role::Customer));
    }

    #[test]
    fn admin_cannot_change_own_role() {
        let store = InMemoryUserStore::new();
        register(&store, "root");
        let err = promote_role(&store, &id("root"), Role::Admin, &id("root"), Role::Customer).unwrap_err();
        assert_eq!(err, PromotionError::SelfPromotion);
    }

    #[test]
    fn promoting_unknown_user_fails() {
        let store = InMemoryUserStore::new();
        let err = promote_role(&store, &id("root"), Role::Admin, &id("ghost"), Role::Vendor).unwrap_err();
        assert_eq!(err, PromotionError::Store(UserStoreError::NotFound(id("ghost"))));
    }

    #[test]
    fn list_is_sorted_by_id() {
        let store = InMemoryUserStore::new();
        register(&store, "zed");
        register(&store, "amy");
        let ids: Vec<String> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|r| r.identity.id.to_string())
            .collect();
        assert_eq!(ids, vec!["amy", "zed"]);
    }
}
