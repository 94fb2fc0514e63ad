//! Key-value persistence of expenses, budgets and alert markers, scoped by user.

pub mod export;
pub mod json_backend;
pub mod memory;

use std::collections::BTreeSet;

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::domain::{Budget, Expense, MarkerSet, UserRecord, UserScope};
use crate::errors::{BuddyError, Result};

pub use export::{clear_all, export_all, import_all, storage_info, AppData, ImportReport, StorageInfo};
pub use json_backend::JsonFileBackend;
pub use memory::MemoryBackend;

pub const EXPENSES_PREFIX: &str = "expenses-";
pub const BUDGETS_PREFIX: &str = "budgets-";
pub const MARKERS_PREFIX: &str = "notified-budgets-";
pub const USERS_KEY: &str = "budget-buddy-users";

const SCOPED_PREFIXES: [&str; 3] = [EXPENSES_PREFIX, BUDGETS_PREFIX, MARKERS_PREFIX];

pub fn expenses_key(user: &UserScope) -> String {
    format!("{EXPENSES_PREFIX}{user}")
}

pub fn budgets_key(user: &UserScope) -> String {
    format!("{BUDGETS_PREFIX}{user}")
}

pub fn markers_key(user: &UserScope) -> String {
    format!("{MARKERS_PREFIX}{user}")
}

/// Returns `true` for keys written by this application.
pub fn is_app_key(key: &str) -> bool {
    key == USERS_KEY || SCOPED_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
}

/// Extracts the user scope from a per-user key.
pub fn scope_of_key(key: &str) -> Option<UserScope> {
    SCOPED_PREFIXES
        .iter()
        .find_map(|prefix| key.strip_prefix(prefix))
        .filter(|rest| !rest.is_empty())
        .map(UserScope::new)
}

/// Raw string storage addressed by key.
pub trait KeyValueBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Removes the key, returning `true` when it existed.
    fn remove(&self, key: &str) -> Result<bool>;
    fn keys(&self) -> Result<Vec<String>>;

    /// Moves an unreadable value out of the way and returns where it went.
    /// `None` means this backend cannot set values aside.
    fn quarantine(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Typed persistence used by the tracker.
pub trait EntityStore: Send + Sync {
    fn load_expenses(&self, user: &UserScope) -> Result<Vec<Expense>>;
    fn save_expenses(&self, user: &UserScope, expenses: &[Expense]) -> Result<()>;
    fn load_budgets(&self, user: &UserScope) -> Result<Vec<Budget>>;
    fn save_budgets(&self, user: &UserScope, budgets: &[Budget]) -> Result<()>;
    fn load_markers(&self, user: &UserScope) -> Result<MarkerSet>;
    fn save_markers(&self, user: &UserScope, markers: &MarkerSet) -> Result<()>;
    /// Every user scope that has at least one stored collection.
    fn scopes(&self) -> Result<Vec<UserScope>>;
}

/// JSON documents over any [`KeyValueBackend`].
#[derive(Debug, Clone, Default)]
pub struct ScopedStore<B> {
    backend: B,
}

impl<B: KeyValueBackend> ScopedStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn load_users(&self) -> Result<Vec<UserRecord>> {
        self.read_json(USERS_KEY)
    }

    pub fn save_users(&self, users: &[UserRecord]) -> Result<()> {
        self.write_json(USERS_KEY, &users)
    }

    /// Adds `user` to the registry when it is not listed yet.
    pub fn register_user(&self, user: &UserScope) -> Result<bool> {
        let mut users = self.load_users()?;
        if users.iter().any(|record| record.id == user.as_str()) {
            return Ok(false);
        }
        users.push(UserRecord::new(user.as_str()));
        self.save_users(&users)?;
        Ok(true)
    }

    /// Reads and decodes `key`. A value that cannot be read or decoded is
    /// quarantined and then read as empty; when the backend cannot quarantine
    /// it the error is returned and the value is left in place.
    fn read_json<T>(&self, key: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let decoded = match self.backend.get(key) {
            Ok(None) => return Ok(T::default()),
            Ok(Some(raw)) => serde_json::from_str(&raw).map_err(|err| err.to_string()),
            Err(err) => Err(err.to_string()),
        };
        match decoded {
            Ok(value) => Ok(value),
            Err(reason) => match self.backend.quarantine(key)? {
                Some(moved_to) => {
                    warn!(key, error = %reason, %moved_to, "unreadable value quarantined");
                    Ok(T::default())
                }
                None => {
                    warn!(key, error = %reason, "unreadable value could not be quarantined");
                    Err(BuddyError::Storage(format!(
                        "`{key}` holds unreadable data: {reason}"
                    )))
                }
            },
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.backend.set(key, &json)
    }
}

impl<B: KeyValueBackend> EntityStore for ScopedStore<B> {
    fn load_expenses(&self, user: &UserScope) -> Result<Vec<Expense>> {
        self.read_json(&expenses_key(user))
    }

    fn save_expenses(&self, user: &UserScope, expenses: &[Expense]) -> Result<()> {
        self.write_json(&expenses_key(user), expenses)
    }

    fn load_budgets(&self, user: &UserScope) -> Result<Vec<Budget>> {
        self.read_json(&budgets_key(user))
    }

    fn save_budgets(&self, user: &UserScope, budgets: &[Budget]) -> Result<()> {
        self.write_json(&budgets_key(user), budgets)
    }

    fn load_markers(&self, user: &UserScope) -> Result<MarkerSet> {
        self.read_json(&markers_key(user))
    }

    fn save_markers(&self, user: &UserScope, markers: &MarkerSet) -> Result<()> {
        self.write_json(&markers_key(user), markers)
    }

    fn scopes(&self) -> Result<Vec<UserScope>> {
        let scopes: BTreeSet<UserScope> = self
            .backend
            .keys()?
            .iter()
            .filter_map(|key| scope_of_key(key))
            .collect();
        Ok(scopes.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ThresholdTier;

    #[test]
    fn keys_follow_the_per_user_layout() {
        let user = UserScope::new("alice");
        assert_eq!(expenses_key(&user), "expenses-alice");
        assert_eq!(budgets_key(&user), "budgets-alice");
        assert_eq!(markers_key(&user), "notified-budgets-alice");
        assert_eq!(scope_of_key("notified-budgets-bob"), Some(UserScope::new("bob")));
        assert_eq!(scope_of_key("budgets-"), None);
        assert!(is_app_key(USERS_KEY));
        assert!(!is_app_key("theme"));
    }

    #[test]
    fn collections_are_isolated_per_user() {
        let store = ScopedStore::new(MemoryBackend::new());
        let alice = UserScope::new("alice");
        let mut markers = MarkerSet::new();
        markers.insert("b1", ThresholdTier::Warning);
        store.save_markers(&alice, &markers).expect("save markers");

        assert_eq!(store.load_markers(&alice).expect("load"), markers);
        assert!(store.load_markers(&UserScope::guest()).expect("load").is_empty());
        assert_eq!(store.scopes().expect("scopes"), vec![alice]);
    }

    #[test]
    fn unreadable_values_are_set_aside_and_read_as_empty() {
        let store = ScopedStore::new(MemoryBackend::new());
        store
            .backend()
            .set("budgets-guest", "{not json")
            .expect("seed");
        assert!(store.load_budgets(&UserScope::guest()).expect("load").is_empty());
        assert_eq!(
            store.backend().quarantined(),
            vec![("budgets-guest".to_string(), "{not json".to_string())]
        );
        assert_eq!(store.backend().get("budgets-guest").expect("get"), None);
    }

    struct NoQuarantine(MemoryBackend);

    impl KeyValueBackend for NoQuarantine {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.0.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<bool> {
            self.0.remove(key)
        }
        fn keys(&self) -> Result<Vec<String>> {
            self.0.keys()
        }
    }

    #[test]
    fn unreadable_values_stay_put_when_they_cannot_be_set_aside() {
        let store = ScopedStore::new(NoQuarantine(MemoryBackend::new()));
        store.backend().set("budgets-guest", "{not json").expect("seed");
        let err = store.load_budgets(&UserScope::guest()).expect_err("corrupt");
        assert!(matches!(err, BuddyError::Storage(_)));
        assert_eq!(
            store.backend().get("budgets-guest").expect("get").as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn registering_a_user_is_idempotent() {
        let store = ScopedStore::new(MemoryBackend::new());
        let carol = UserScope::new("carol");
        assert!(store.register_user(&carol).expect("register"));
        assert!(!store.register_user(&carol).expect("register again"));
        assert_eq!(store.load_users().expect("users").len(), 1);
    }
}
