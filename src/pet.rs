use std::fmt;

use serde::{Deserialize, Serialize};

/// An adoptable pet record.
///
/// The id is assigned by [`CatalogStore`](crate::CatalogStore) on creation
/// and never changes afterwards; the basket engine only references pets,
/// it never mutates them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: u32,
    pub category: String,
    pub name: String,
}

impl Pet {
    pub fn new(id: u32, category: impl Into<String>, name: impl Into<String>) -> Self {
        Pet {
            id,
            category: category.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Pet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pet [id={}, category={}, name={}]", self.id, self.category, self.name)
    }
}
