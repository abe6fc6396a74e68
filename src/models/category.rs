//! Category model

use serde::{Deserialize, Serialize};

/// Category entity used to classify posts.
///
/// Deleting a category does not delete its posts; their category reference
/// becomes null instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// Category name (unique)
    pub name: String,
}

impl Category {
    /// Create a new Category. The ID is assigned by the database.
    pub fn new(name: String) -> Self {
        Self { id: 0, name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_new() {
        let category = Category::new("Science".to_string());
        assert_eq!(category.id, 0);
        assert_eq!(category.name, "Science");
    }
}
