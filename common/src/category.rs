use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique category identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub String);

/// A node in the category tree. Top-level categories have no parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub parent: Option<CategoryId>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Category {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Ids of the active categories whose slug appears in `slugs`.
///
/// Unknown slugs contribute nothing. The result is sorted and deduplicated.
pub fn resolve_slugs<'a, I>(categories: I, slugs: &[String]) -> Vec<CategoryId>
where
    I: IntoIterator<Item = &'a Category>,
{
    let wanted: BTreeSet<&str> = slugs.iter().map(String::as_str).collect();
    categories
        .into_iter()
        .filter(|c| c.is_active() && wanted.contains(c.slug.as_str()))
        .map(|c| c.id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
