//! Static registry of spending categories.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;

use super::common::{Displayable, Identifiable, NamedEntity};

/// Spending category shown next to expenses and budgets.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

impl Identifiable for Category {
    fn id(&self) -> &str {
        self.id
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        self.name
    }
}

impl Displayable for Category {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }
}

pub const FALLBACK_CATEGORY_ID: &str = "other";

pub const DEFAULT_CATEGORIES: [Category; 9] = [
    Category { id: "food", name: "Food & Dining", icon: "ForkKnife", color: "#FF6B6B" },
    Category { id: "transport", name: "Transportation", icon: "Car", color: "#4ECDC4" },
    Category { id: "shopping", name: "Shopping", icon: "ShoppingBag", color: "#45B7D1" },
    Category { id: "entertainment", name: "Entertainment", icon: "GameController", color: "#96CEB4" },
    Category { id: "bills", name: "Bills & Utilities", icon: "House", color: "#FFEAA7" },
    Category { id: "healthcare", name: "Healthcare", icon: "Heart", color: "#DDA0DD" },
    Category { id: "education", name: "Education", icon: "GraduationCap", color: "#74B9FF" },
    Category { id: "travel", name: "Travel", icon: "Airplane", color: "#98D8C8" },
    Category { id: FALLBACK_CATEGORY_ID, name: "Other", icon: "Dots", color: "#A8A8A8" },
];

static INDEX: Lazy<HashMap<&'static str, &'static Category>> =
    Lazy::new(|| DEFAULT_CATEGORIES.iter().map(|c| (c.id, c)).collect());

/// Read-only lookup over [`DEFAULT_CATEGORIES`].
pub struct CategoryRegistry;

impl CategoryRegistry {
    pub fn all() -> &'static [Category] {
        &DEFAULT_CATEGORIES
    }

    pub fn find(id: &str) -> Option<&'static Category> {
        INDEX.get(id).copied()
    }

    /// Resolves `id`, falling back to the `other` category for unknown ids.
    pub fn info(id: &str) -> &'static Category {
        Self::find(id).unwrap_or(&DEFAULT_CATEGORIES[DEFAULT_CATEGORIES.len() - 1])
    }

    pub fn name_of(id: &str) -> &'static str {
        Self::info(id).name
    }

    pub fn color_of(id: &str) -> &'static str {
        Self::info(id).color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_categories() {
        let food = CategoryRegistry::find("food").expect("food category");
        assert_eq!(food.name, "Food & Dining");
        assert_eq!(CategoryRegistry::color_of("travel"), "#98D8C8");
    }

    #[test]
    fn unknown_ids_fall_back_to_other() {
        assert!(CategoryRegistry::find("pets").is_none());
        assert_eq!(CategoryRegistry::info("pets").id, FALLBACK_CATEGORY_ID);
        assert_eq!(CategoryRegistry::name_of("pets"), "Other");
    }

    #[test]
    fn registry_ids_are_unique() {
        assert_eq!(INDEX.len(), CategoryRegistry::all().len());
    }
}
