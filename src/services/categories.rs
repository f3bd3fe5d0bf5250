use crate::domain::category::{Category, CategoryListQuery, CategoryTreeNode, DeletePolicy};
use crate::forms::categories::{
    AddCategoryForm, DeleteCategoryForm, EditCategoryForm, MoveCategoryForm,
};
use crate::repository::{CategoryReader, CategoryWriter};
use crate::services::{ServiceError, ServiceResult};

/// Loads the category tree, optionally restricted to the public view.
///
/// Categories below an inactive ancestor are left out of the public tree.
pub fn load_category_tree<R>(repo: &R, public_only: bool) -> ServiceResult<Vec<CategoryTreeNode>>
where
    R: CategoryReader + ?Sized,
{
    let mut query = CategoryListQuery::new();
    if public_only {
        query = query.public();
    }

    let (_, flat) = repo.list_categories(query).map_err(ServiceError::from)?;

    Ok(build_category_tree(flat))
}

/// Ancestors of the category followed by the category itself.
pub fn load_breadcrumbs<R>(repo: &R, category_id: i32) -> ServiceResult<Vec<Category>>
where
    R: CategoryReader + ?Sized,
{
    let category = repo
        .get_category_by_id(category_id)
        .map_err(ServiceError::from)?
        .ok_or(ServiceError::NotFound)?;

    let mut trail = repo
        .list_ancestors(category_id)
        .map_err(ServiceError::from)?;
    trail.push(category);

    Ok(trail)
}

/// Creates a root category, or a child when the form names a parent.
pub fn create_category<R>(repo: &R, form: AddCategoryForm) -> ServiceResult<Category>
where
    R: CategoryWriter + ?Sized,
{
    let payload = form
        .into_new_category()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    match payload.parent_id {
        Some(parent_id) => repo.create_child_category(parent_id, &payload.category),
        None => repo.create_root_category(&payload.category),
    }
    .map_err(ServiceError::from)
}

pub fn modify_category<R>(repo: &R, form: EditCategoryForm) -> ServiceResult<Category>
where
    R: CategoryWriter + ?Sized,
{
    let payload = form
        .into_update_category()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.update_category(payload.category_id, &payload.update)
        .map_err(ServiceError::from)
}

/// Moves the category, with its subtree, under a new parent or to the roots.
pub fn relocate_category<R>(repo: &R, form: MoveCategoryForm) -> ServiceResult<Category>
where
    R: CategoryWriter + ?Sized,
{
    let payload = form
        .into_payload()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.move_category(payload.category_id, payload.parent_id)
        .map_err(ServiceError::from)
}

pub fn remove_category<R>(repo: &R, form: DeleteCategoryForm) -> ServiceResult<DeletePolicy>
where
    R: CategoryWriter + ?Sized,
{
    if form.category_id < 1 {
        return Err(ServiceError::Form(format!(
            "invalid category id {}",
            form.category_id
        )));
    }

    repo.delete_category(form.category_id, form.policy)
        .map_err(ServiceError::from)?;

    Ok(form.policy)
}

/// Build nested nodes from a path-ordered flat list in a single pass.
///
/// The stack holds the chain of open ancestors. A category whose parent is
/// not on top of the stack after closing finished branches has a filtered
/// parent and is skipped together with its subtree.
fn build_category_tree(categories: Vec<Category>) -> Vec<CategoryTreeNode> {
    let mut roots = Vec::new();
    let mut stack: Vec<CategoryTreeNode> = Vec::new();

    for category in categories {
        while stack.last().is_some_and(|open| {
            !(category.path.starts_with(&open.category.path)
                && category.path.len() > open.category.path.len())
        }) {
            close_node(&mut stack, &mut roots);
        }

        let expected_depth = stack.last().map_or(1, |open| open.category.depth + 1);
        if category.depth != expected_depth {
            continue;
        }

        stack.push(CategoryTreeNode::new(category));
    }

    while !stack.is_empty() {
        close_node(&mut stack, &mut roots);
    }

    roots
}

fn close_node(stack: &mut Vec<CategoryTreeNode>, roots: &mut Vec<CategoryTreeNode>) {
    if let Some(node) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }
}
