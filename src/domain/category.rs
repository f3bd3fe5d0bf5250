use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::pagination::Pagination;

/// Domain representation of a node in the materialized-path category tree.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Category {
    /// Unique identifier of the category.
    pub id: i32,
    /// Materialized path; one fixed-width segment per level.
    pub path: String,
    /// Distance from the root, roots have depth 1.
    pub depth: i32,
    /// Number of direct children.
    pub numchild: i32,
    /// Human-readable title of the category.
    pub title: String,
    /// Unique URL-friendly identifier.
    pub slug: String,
    /// Optional description that expands upon the category title.
    pub description: Option<String>,
    /// Whether the category is shown in public listings.
    pub is_active: bool,
    /// Timestamp for when the category record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the category record.
    pub updated_at: NaiveDateTime,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.depth == 1
    }

    pub fn is_leaf(&self) -> bool {
        self.numchild == 0
    }
}

/// Payload required to insert a new category. The tree position is chosen by
/// the repository (`create_root` or `create_child`).
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_active: bool,
    /// Timestamp captured when the category payload was created.
    pub updated_at: NaiveDateTime,
}

impl NewCategory {
    /// Build an active category payload with the current timestamp.
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            description: None,
            is_active: true,
            updated_at: Local::now().naive_utc(),
        }
    }

    /// Attach a descriptive text to the category payload.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Create the category hidden from public listings.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Patch data for the non-structural fields of a category.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCategory {
    pub title: String,
    pub slug: String,
    /// New description value; `None` clears the description.
    pub description: Option<String>,
    pub is_active: bool,
    /// Timestamp captured when the patch was created.
    pub updated_at: NaiveDateTime,
}

impl UpdateCategory {
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        description: Option<String>,
        is_active: bool,
    ) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            description,
            is_active,
            updated_at: Local::now().naive_utc(),
        }
    }
}

/// What happens to the children of a deleted category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Refuse to delete a category that still has children.
    #[default]
    Restrict,
    /// Delete the whole subtree.
    Cascade,
    /// Move the children under the deleted category's parent.
    ReparentChildren,
}

/// Query definition used to retrieve the flattened, tree-ordered category list.
#[derive(Debug, Clone, Default)]
pub struct CategoryListQuery {
    /// Restrict the results to active categories (the public view).
    pub active_only: bool,
    /// Optional substring search applied to titles and descriptions.
    pub search: Option<String>,
    /// Optional pagination options.
    pub pagination: Option<Pagination>,
}

impl CategoryListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only return categories flagged as active.
    pub fn public(mut self) -> Self {
        self.active_only = true;
        self
    }

    /// Filter results by a search term applied to the title and description.
    pub fn search(mut self, value: impl Into<String>) -> Self {
        self.search = Some(value.into());
        self
    }

    /// Apply pagination to the query.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Node representation of a category and its children for tree rendering.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CategoryTreeNode {
    /// Category data represented by this node.
    pub category: Category,
    /// Children that belong to this node, in sibling order.
    pub children: Vec<CategoryTreeNode>,
}

impl CategoryTreeNode {
    /// Create a new category tree node with no children.
    pub fn new(category: Category) -> Self {
        Self {
            category,
            children: Vec::new(),
        }
    }

    /// Attach a collection of children to the node.
    pub fn with_children(mut self, children: impl Into<Vec<CategoryTreeNode>>) -> Self {
        self.children = children.into();
        self
    }
}

/// Inconsistency found while auditing the stored tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeProblem {
    /// The path has an invalid length or characters.
    MalformedPath { id: i32, path: String },
    /// The stored depth disagrees with the path length.
    WrongDepth { id: i32, stored: i32, expected: i32 },
    /// No row holds the parent path.
    Orphan { id: i32, path: String },
    /// The stored child count disagrees with the rows below the node.
    WrongNumchild { id: i32, stored: i32, expected: i32 },
}

impl std::fmt::Display for TreeProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeProblem::MalformedPath { id, path } => {
                write!(f, "category {id}: malformed path `{path}`")
            }
            TreeProblem::WrongDepth {
                id,
                stored,
                expected,
            } => write!(f, "category {id}: depth {stored}, expected {expected}"),
            TreeProblem::Orphan { id, path } => {
                write!(f, "category {id}: no parent row for path `{path}`")
            }
            TreeProblem::WrongNumchild {
                id,
                stored,
                expected,
            } => write!(f, "category {id}: numchild {stored}, expected {expected}"),
        }
    }
}
