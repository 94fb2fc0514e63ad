//! Whole-store snapshots: export, import, clear and usage figures.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{is_app_key, EntityStore, KeyValueBackend, ScopedStore};
use crate::domain::{Budget, Expense, MarkerSet, UserRecord, UserScope};
use crate::errors::{BuddyError, Result};

pub const EXPORT_VERSION: &str = "1.0.0";

/// Versioned snapshot of every user's data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub user_budgets: BTreeMap<String, Vec<Budget>>,
    #[serde(default)]
    pub user_expenses: BTreeMap<String, Vec<Expense>>,
    #[serde(default)]
    pub user_notifications: BTreeMap<String, MarkerSet>,
    #[serde(default)]
    pub export_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: String,
}

impl AppData {
    /// Parses a snapshot; a missing `users` array makes the file invalid.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|err| BuddyError::Validation(format!("invalid backup file: {err}")))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub users: usize,
    pub expenses: usize,
    pub budgets: usize,
    pub markers: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageInfo {
    pub entries: usize,
    pub used_bytes: usize,
}

impl StorageInfo {
    pub fn used_kib(&self) -> f64 {
        self.used_bytes as f64 / 1024.0
    }
}

pub fn export_all<B: KeyValueBackend>(store: &ScopedStore<B>, now: DateTime<Utc>) -> Result<AppData> {
    let mut users = store.load_users()?;
    let listed: BTreeSet<String> = users.iter().map(|user| user.id.clone()).collect();
    let mut scopes: BTreeSet<UserScope> = users.iter().map(UserRecord::scope).collect();
    for scope in store.scopes()? {
        if !listed.contains(scope.as_str()) {
            users.push(UserRecord::new(scope.as_str()));
        }
        scopes.insert(scope);
    }

    let mut data = AppData {
        users,
        user_budgets: BTreeMap::new(),
        user_expenses: BTreeMap::new(),
        user_notifications: BTreeMap::new(),
        export_date: Some(now),
        version: EXPORT_VERSION.to_string(),
    };
    for scope in scopes {
        let key = scope.as_str().to_string();
        data.user_budgets.insert(key.clone(), store.load_budgets(&scope)?);
        data.user_expenses.insert(key.clone(), store.load_expenses(&scope)?);
        data.user_notifications.insert(key, store.load_markers(&scope)?);
    }
    info!(users = data.users.len(), "exported application data");
    Ok(data)
}

/// Validates every entity in `data`, then writes it. Nothing is written when
/// any entity is rejected.
pub fn import_all<B: KeyValueBackend>(store: &ScopedStore<B>, data: &AppData) -> Result<ImportReport> {
    for (user, expenses) in &data.user_expenses {
        for expense in expenses {
            expense.validate().map_err(|err| {
                BuddyError::Validation(format!("user `{user}` expense `{}`: {err}", expense.id))
            })?;
        }
    }
    for (user, budgets) in &data.user_budgets {
        for budget in budgets {
            budget.validate().map_err(|err| {
                BuddyError::Validation(format!("user `{user}` budget `{}`: {err}", budget.id))
            })?;
        }
    }

    let mut report = ImportReport {
        users: data.users.len(),
        ..ImportReport::default()
    };
    store.save_users(&data.users)?;
    for (user, budgets) in &data.user_budgets {
        store.save_budgets(&UserScope::new(user.as_str()), budgets)?;
        report.budgets += budgets.len();
    }
    for (user, expenses) in &data.user_expenses {
        store.save_expenses(&UserScope::new(user.as_str()), expenses)?;
        report.expenses += expenses.len();
    }
    for (user, markers) in &data.user_notifications {
        store.save_markers(&UserScope::new(user.as_str()), markers)?;
        report.markers += markers.len();
    }
    info!(
        users = report.users,
        expenses = report.expenses,
        budgets = report.budgets,
        "imported application data"
    );
    Ok(report)
}

/// Removes every application key. Returns how many were removed.
pub fn clear_all<B: KeyValueBackend>(store: &ScopedStore<B>) -> Result<usize> {
    let mut removed = 0;
    for key in store.backend().keys()? {
        if is_app_key(&key) && store.backend().remove(&key)? {
            removed += 1;
        }
    }
    info!(removed, "cleared application data");
    Ok(removed)
}

pub fn storage_info<B: KeyValueBackend>(store: &ScopedStore<B>) -> Result<StorageInfo> {
    let mut info = StorageInfo::default();
    for key in store.backend().keys()? {
        if !is_app_key(&key) {
            continue;
        }
        if let Some(value) = store.backend().get(&key)? {
            info.entries += 1;
            info.used_bytes += key.len() + value.len();
        }
    }
    Ok(info)
}
