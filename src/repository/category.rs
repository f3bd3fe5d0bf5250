use std::collections::{HashMap, HashSet};

use chrono::Local;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::category::{
    Category as DomainCategory, CategoryListQuery, DeletePolicy, NewCategory as DomainNewCategory,
    TreeProblem, UpdateCategory as DomainUpdateCategory,
};
use crate::domain::path::PathScheme;
use crate::models::category::{
    Category as DbCategory, NewCategory as DbNewCategory, UpdateCategory as DbUpdateCategory,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{CategoryReader, CategoryWriter, DieselRepository, like_pattern};

impl CategoryReader for DieselRepository {
    fn get_category_by_id(&self, category_id: i32) -> RepositoryResult<Option<DomainCategory>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let category = categories::table
            .find(category_id)
            .first::<DbCategory>(&mut conn)
            .optional()?;

        Ok(category.map(DomainCategory::from))
    }

    fn get_category_by_slug(&self, slug: &str) -> RepositoryResult<Option<DomainCategory>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let category = categories::table
            .filter(categories::slug.eq(slug))
            .first::<DbCategory>(&mut conn)
            .optional()?;

        Ok(category.map(DomainCategory::from))
    }

    fn list_categories(
        &self,
        query: CategoryListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainCategory>)> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let mut count_query = categories::table.into_boxed::<diesel::sqlite::Sqlite>();

        if query.active_only {
            count_query = count_query.filter(categories::is_active.eq(true));
        }

        if let Some(term) = query.search.as_ref() {
            let pattern = like_pattern(term);
            count_query = count_query.filter(
                categories::title
                    .like(pattern.clone())
                    .escape('\\')
                    .or(categories::description.like(pattern).escape('\\')),
            );
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items_query = categories::table.into_boxed::<diesel::sqlite::Sqlite>();

        if query.active_only {
            items_query = items_query.filter(categories::is_active.eq(true));
        }

        if let Some(term) = query.search.as_ref() {
            let pattern = like_pattern(term);
            items_query = items_query.filter(
                categories::title
                    .like(pattern.clone())
                    .escape('\\')
                    .or(categories::description.like(pattern).escape('\\')),
            );
        }

        // Path order is pre-order tree order.
        items_query = items_query.order(categories::path.asc());

        if let Some(pagination) = &query.pagination {
            items_query = items_query
                .offset(pagination.offset())
                .limit(pagination.limit());
        }

        let categories = items_query.load::<DbCategory>(&mut conn)?;
        let categories = categories.into_iter().map(DomainCategory::from).collect();

        Ok((total, categories))
    }

    fn list_root_categories(&self) -> RepositoryResult<Vec<DomainCategory>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let roots = categories::table
            .filter(categories::depth.eq(1))
            .order(categories::path.asc())
            .load::<DbCategory>(&mut conn)?;

        Ok(roots.into_iter().map(DomainCategory::from).collect())
    }

    fn list_children(&self, category_id: i32) -> RepositoryResult<Vec<DomainCategory>> {
        let mut conn = self.conn()?;

        let node = load_category(&mut conn, category_id)?;
        let children = load_children(&mut conn, &self.scheme, &node)?;

        Ok(children.into_iter().map(DomainCategory::from).collect())
    }

    fn list_descendants(&self, category_id: i32) -> RepositoryResult<Vec<DomainCategory>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let node = load_category(&mut conn, category_id)?;
        let descendants = categories::table
            .filter(categories::path.gt(node.path.as_str()))
            .filter(categories::path.le(self.scheme.subtree_upper_bound(&node.path)))
            .order(categories::path.asc())
            .load::<DbCategory>(&mut conn)?;

        Ok(descendants.into_iter().map(DomainCategory::from).collect())
    }

    fn list_ancestors(&self, category_id: i32) -> RepositoryResult<Vec<DomainCategory>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let node = load_category(&mut conn, category_id)?;
        let paths: Vec<String> = self
            .scheme
            .ancestors_of(&node.path)
            .into_iter()
            .map(str::to_string)
            .collect();

        if paths.is_empty() {
            return Ok(Vec::new());
        }

        let ancestors = categories::table
            .filter(categories::path.eq_any(paths))
            .order(categories::path.asc())
            .load::<DbCategory>(&mut conn)?;

        Ok(ancestors.into_iter().map(DomainCategory::from).collect())
    }

    fn find_tree_problems(&self) -> RepositoryResult<Vec<TreeProblem>> {
        let mut conn = self.conn()?;

        let rows = load_tree_rows(&mut conn)?;
        Ok(audit_tree(&self.scheme, &rows))
    }
}

impl CategoryWriter for DieselRepository {
    fn create_root_category(
        &self,
        new_category: &DomainNewCategory,
    ) -> RepositoryResult<DomainCategory> {
        let scheme = self.scheme;
        let mut conn = self.conn()?;

        conn.immediate_transaction::<DomainCategory, RepositoryError, _>(|conn| {
            let last_root = last_child_path(conn, &scheme, None)?;
            let path = scheme.next_child(None, last_root.as_deref())?;

            let created = insert_category(conn, new_category, &path, 1)?;
            log::debug!("Created root category {} at {}", created.id, created.path);

            Ok(created.into())
        })
    }

    fn create_child_category(
        &self,
        parent_id: i32,
        new_category: &DomainNewCategory,
    ) -> RepositoryResult<DomainCategory> {
        let scheme = self.scheme;
        let mut conn = self.conn()?;

        conn.immediate_transaction::<DomainCategory, RepositoryError, _>(|conn| {
            let parent = load_category(conn, parent_id)?;
            let last_child = last_child_path(conn, &scheme, Some(&parent))?;
            let path = scheme.next_child(Some(&parent.path), last_child.as_deref())?;

            let created = insert_category(conn, new_category, &path, parent.depth + 1)?;
            adjust_numchild(conn, parent.id, 1)?;
            log::debug!(
                "Created category {} at {} under {}",
                created.id,
                created.path,
                parent.id
            );

            Ok(created.into())
        })
    }

    fn update_category(
        &self,
        category_id: i32,
        updates: &DomainUpdateCategory,
    ) -> RepositoryResult<DomainCategory> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let db_updates = DbUpdateCategory::from(updates);

        let updated = diesel::update(categories::table.find(category_id))
            .set(&db_updates)
            .get_result::<DbCategory>(&mut conn)?;

        Ok(updated.into())
    }

    fn move_category(
        &self,
        category_id: i32,
        new_parent_id: Option<i32>,
    ) -> RepositoryResult<DomainCategory> {
        use crate::schema::categories;

        let scheme = self.scheme;
        let mut conn = self.conn()?;

        conn.immediate_transaction::<DomainCategory, RepositoryError, _>(|conn| {
            let node = load_category(conn, category_id)?;
            let new_parent = new_parent_id
                .map(|parent_id| load_category(conn, parent_id))
                .transpose()?;

            if let Some(parent) = &new_parent {
                if parent.id == node.id || scheme.is_descendant_of(&parent.path, &node.path) {
                    return Err(RepositoryError::InvalidMove { id: node.id });
                }
            }

            let old_parent_path = scheme.parent_of(&node.path).map(str::to_string);
            let new_parent_path = new_parent.as_ref().map(|parent| parent.path.as_str());
            if old_parent_path.as_deref() == new_parent_path {
                return Ok(node.into());
            }

            let last_child = last_child_path(conn, &scheme, new_parent.as_ref())?;
            let new_path = scheme.next_child(new_parent_path, last_child.as_deref())?;
            let moved = relocate_subtree(conn, &scheme, &node.path, &new_path)?;

            if let Some(old_parent_path) = old_parent_path {
                adjust_numchild_at(conn, &old_parent_path, -1)?;
            }
            if let Some(parent) = &new_parent {
                adjust_numchild(conn, parent.id, 1)?;
            }

            log::debug!(
                "Moved category {} from {} to {} ({moved} rows)",
                node.id,
                node.path,
                new_path
            );

            let node = categories::table.find(node.id).first::<DbCategory>(conn)?;
            Ok(node.into())
        })
    }

    fn delete_category(&self, category_id: i32, policy: DeletePolicy) -> RepositoryResult<()> {
        use crate::schema::categories;

        let scheme = self.scheme;
        let mut conn = self.conn()?;

        conn.immediate_transaction::<(), RepositoryError, _>(|conn| {
            let node = load_category(conn, category_id)?;
            let parent_path = scheme.parent_of(&node.path).map(str::to_string);
            let children = load_children(conn, &scheme, &node)?;

            match policy {
                DeletePolicy::Restrict => {
                    if !children.is_empty() {
                        return Err(RepositoryError::HasChildren {
                            id: node.id,
                            count: children.len() as i32,
                        });
                    }
                    diesel::delete(categories::table.find(node.id)).execute(conn)?;
                }
                DeletePolicy::Cascade => {
                    let deleted = diesel::delete(categories::table.filter(
                        categories::path.between(
                            node.path.clone(),
                            scheme.subtree_upper_bound(&node.path),
                        ),
                    ))
                    .execute(conn)?;
                    log::debug!("Deleted subtree of category {} ({deleted} rows)", node.id);
                }
                DeletePolicy::ReparentChildren => {
                    let parent = parent_path
                        .as_deref()
                        .map(|path| load_category_at(conn, path))
                        .transpose()?;

                    for child in &children {
                        let last_child = last_child_path(conn, &scheme, parent.as_ref())?;
                        let new_path = scheme.next_child(parent_path.as_deref(), last_child.as_deref())?;
                        relocate_subtree(conn, &scheme, &child.path, &new_path)?;
                    }

                    if let Some(parent) = &parent {
                        adjust_numchild(conn, parent.id, children.len() as i32)?;
                    }
                    diesel::delete(categories::table.find(node.id)).execute(conn)?;
                }
            }

            if let Some(parent_path) = parent_path {
                adjust_numchild_at(conn, &parent_path, -1)?;
            }

            Ok(())
        })
    }

    fn fix_tree(&self) -> RepositoryResult<usize> {
        use crate::schema::categories;

        let scheme = self.scheme;
        let mut conn = self.conn()?;

        conn.immediate_transaction::<usize, RepositoryError, _>(|conn| {
            let rows = load_tree_rows(conn)?;
            let child_counts = count_children(&scheme, &rows);
            let mut repaired = 0;

            for row in &rows {
                let depth = match scheme.depth_of(&row.path) {
                    Ok(depth) => depth,
                    Err(err) => {
                        log::warn!("Skipping category {}: {err}", row.id);
                        continue;
                    }
                };
                let numchild = child_counts.get(row.path.as_str()).copied().unwrap_or(0);

                if row.depth != depth || row.numchild != numchild {
                    diesel::update(categories::table.find(row.id))
                        .set((
                            categories::depth.eq(depth),
                            categories::numchild.eq(numchild),
                        ))
                        .execute(conn)?;
                    repaired += 1;
                }
            }

            if repaired > 0 {
                log::info!("Repaired bookkeeping of {repaired} categories");
            }

            Ok(repaired)
        })
    }
}

/// Structural columns needed to audit the tree.
#[derive(Debug, Queryable)]
struct TreeRow {
    id: i32,
    path: String,
    depth: i32,
    numchild: i32,
}

fn load_tree_rows(conn: &mut SqliteConnection) -> RepositoryResult<Vec<TreeRow>> {
    use crate::schema::categories;

    let rows = categories::table
        .select((
            categories::id,
            categories::path,
            categories::depth,
            categories::numchild,
        ))
        .order(categories::path.asc())
        .load::<TreeRow>(conn)?;

    Ok(rows)
}

/// Number of direct children per parent path, derived from paths alone.
fn count_children<'a>(scheme: &PathScheme, rows: &'a [TreeRow]) -> HashMap<&'a str, i32> {
    let mut counts: HashMap<&str, i32> = HashMap::new();
    for row in rows {
        if scheme.validate(&row.path).is_err() {
            continue;
        }
        if let Some(parent) = scheme.parent_of(&row.path) {
            *counts.entry(parent).or_default() += 1;
        }
    }
    counts
}

fn audit_tree(scheme: &PathScheme, rows: &[TreeRow]) -> Vec<TreeProblem> {
    let paths: HashSet<&str> = rows.iter().map(|row| row.path.as_str()).collect();
    let child_counts = count_children(scheme, rows);
    let mut problems = Vec::new();

    for row in rows {
        let Ok(depth) = scheme.depth_of(&row.path) else {
            problems.push(TreeProblem::MalformedPath {
                id: row.id,
                path: row.path.clone(),
            });
            continue;
        };

        if row.depth != depth {
            problems.push(TreeProblem::WrongDepth {
                id: row.id,
                stored: row.depth,
                expected: depth,
            });
        }

        if let Some(parent) = scheme.parent_of(&row.path) {
            if !paths.contains(parent) {
                problems.push(TreeProblem::Orphan {
                    id: row.id,
                    path: row.path.clone(),
                });
            }
        }

        let expected = child_counts.get(row.path.as_str()).copied().unwrap_or(0);
        if row.numchild != expected {
            problems.push(TreeProblem::WrongNumchild {
                id: row.id,
                stored: row.numchild,
                expected,
            });
        }
    }

    problems
}

fn load_category(conn: &mut SqliteConnection, category_id: i32) -> RepositoryResult<DbCategory> {
    use crate::schema::categories;

    let category = categories::table
        .find(category_id)
        .first::<DbCategory>(conn)?;

    Ok(category)
}

fn load_category_at(conn: &mut SqliteConnection, path: &str) -> RepositoryResult<DbCategory> {
    use crate::schema::categories;

    let category = categories::table
        .filter(categories::path.eq(path))
        .first::<DbCategory>(conn)?;

    Ok(category)
}

fn load_children(
    conn: &mut SqliteConnection,
    scheme: &PathScheme,
    node: &DbCategory,
) -> RepositoryResult<Vec<DbCategory>> {
    use crate::schema::categories;

    let children = categories::table
        .filter(categories::path.gt(node.path.as_str()))
        .filter(categories::path.le(scheme.subtree_upper_bound(&node.path)))
        .filter(categories::depth.eq(node.depth + 1))
        .order(categories::path.asc())
        .load::<DbCategory>(conn)?;

    Ok(children)
}

/// Highest existing child path of `parent`, or of the roots when `None`.
fn last_child_path(
    conn: &mut SqliteConnection,
    scheme: &PathScheme,
    parent: Option<&DbCategory>,
) -> RepositoryResult<Option<String>> {
    use crate::schema::categories;

    let last = match parent {
        Some(parent) => categories::table
            .filter(categories::path.gt(parent.path.as_str()))
            .filter(categories::path.le(scheme.subtree_upper_bound(&parent.path)))
            .filter(categories::depth.eq(parent.depth + 1))
            .select(categories::path)
            .order(categories::path.desc())
            .first::<String>(conn)
            .optional()?,
        None => categories::table
            .filter(categories::depth.eq(1))
            .select(categories::path)
            .order(categories::path.desc())
            .first::<String>(conn)
            .optional()?,
    };

    Ok(last)
}

fn insert_category(
    conn: &mut SqliteConnection,
    new_category: &DomainNewCategory,
    path: &str,
    depth: i32,
) -> RepositoryResult<DbCategory> {
    use crate::schema::categories;

    let insertable = DbNewCategory::at_path(new_category, path, depth);

    let created = diesel::insert_into(categories::table)
        .values(&insertable)
        .get_result::<DbCategory>(conn)?;

    Ok(created)
}

/// Rewrite the prefix of every path in the subtree rooted at `old_path`.
/// Returns the number of rewritten rows.
fn relocate_subtree(
    conn: &mut SqliteConnection,
    scheme: &PathScheme,
    old_path: &str,
    new_path: &str,
) -> RepositoryResult<usize> {
    use crate::schema::categories;

    let subtree = categories::table
        .filter(categories::path.between(old_path.to_string(), scheme.subtree_upper_bound(old_path)))
        .select((categories::id, categories::path))
        .load::<(i32, String)>(conn)?;

    let now = Local::now().naive_utc();
    for (id, path) in &subtree {
        let rebased = scheme.rebase(path, old_path, new_path)?;
        let depth = scheme.depth_of(&rebased)?;

        diesel::update(categories::table.find(*id))
            .set((
                categories::path.eq(rebased.as_str()),
                categories::depth.eq(depth),
                categories::updated_at.eq(now),
            ))
            .execute(conn)?;
    }

    Ok(subtree.len())
}

fn adjust_numchild(conn: &mut SqliteConnection, category_id: i32, delta: i32) -> RepositoryResult<()> {
    use crate::schema::categories;

    let updated = diesel::update(categories::table.find(category_id))
        .set(categories::numchild.eq(categories::numchild + delta))
        .execute(conn)?;

    if updated == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

fn adjust_numchild_at(conn: &mut SqliteConnection, path: &str, delta: i32) -> RepositoryResult<()> {
    use crate::schema::categories;

    let updated = diesel::update(categories::table.filter(categories::path.eq(path)))
        .set(categories::numchild.eq(categories::numchild + delta))
        .execute(conn)?;

    if updated == 0 {
        log::warn!("No parent row at {path} while updating numchild");
    }

    Ok(())
}
