use diesel::prelude::*;

use pushkind_catalog::domain::category::{
    Category, CategoryListQuery, DeletePolicy, NewCategory, TreeProblem, UpdateCategory,
};
use pushkind_catalog::domain::path::PathScheme;
use pushkind_catalog::repository::errors::RepositoryError;
use pushkind_catalog::repository::{CategoryReader, CategoryWriter, DieselRepository};
use pushkind_catalog::schema::categories;

mod common;

fn add(repo: &DieselRepository, parent: Option<&Category>, title: &str, slug: &str) -> Category {
    let new_category = NewCategory::new(title, slug);
    match parent {
        Some(parent) => repo.create_child_category(parent.id, &new_category).unwrap(),
        None => repo.create_root_category(&new_category).unwrap(),
    }
}

fn reload(repo: &DieselRepository, category: &Category) -> Category {
    repo.get_category_by_id(category.id)
        .unwrap()
        .expect("category exists")
}

fn ids(categories: &[Category]) -> Vec<i32> {
    categories.iter().map(|category| category.id).collect()
}

#[test]
fn test_move_category_between_roots() {
    let test_db = common::TestDb::new("test_move_category_between_roots.db");
    let repo = test_db.repo();

    let electronics = add(&repo, None, "Electronics", "electronics");
    let computers = add(&repo, None, "Computers", "computers");
    let laptops = add(&repo, Some(&electronics), "Laptops", "laptops");
    let ultrabooks = add(&repo, Some(&laptops), "Ultrabooks", "ultrabooks");

    assert_eq!(laptops.depth, 2);
    assert!(laptops.path.starts_with(&electronics.path));
    assert_eq!(reload(&repo, &electronics).numchild, 1);

    let moved = repo.move_category(laptops.id, Some(computers.id)).unwrap();

    assert!(moved.path.starts_with(&computers.path));
    assert_eq!(moved.depth, 2);
    assert!(repo.list_children(electronics.id).unwrap().is_empty());
    assert_eq!(ids(&repo.list_children(computers.id).unwrap()), vec![laptops.id]);
    assert_eq!(reload(&repo, &electronics).numchild, 0);
    assert_eq!(reload(&repo, &computers).numchild, 1);

    let ultrabooks = reload(&repo, &ultrabooks);
    assert_eq!(ultrabooks.depth, 3);
    assert!(ultrabooks.path.starts_with(&moved.path));
    assert_eq!(
        ids(&repo.list_ancestors(ultrabooks.id).unwrap()),
        vec![computers.id, laptops.id]
    );
    assert_eq!(
        ids(&repo.list_descendants(computers.id).unwrap()),
        vec![laptops.id, ultrabooks.id]
    );

    assert!(repo.find_tree_problems().unwrap().is_empty());
}

#[test]
fn test_ancestors_are_path_prefixes_root_first() {
    let test_db = common::TestDb::new("test_ancestors_are_path_prefixes_root_first.db");
    let repo = test_db.repo();

    let books = add(&repo, None, "Books", "books");
    let fiction = add(&repo, Some(&books), "Fiction", "fiction");
    let fantasy = add(&repo, Some(&fiction), "Fantasy", "fantasy");
    let epic = add(&repo, Some(&fantasy), "Epic", "epic");

    let ancestors = repo.list_ancestors(epic.id).unwrap();

    assert_eq!(ids(&ancestors), vec![books.id, fiction.id, fantasy.id]);
    for (level, ancestor) in ancestors.iter().enumerate() {
        assert_eq!(ancestor.depth as usize, level + 1);
        assert!(epic.path.starts_with(&ancestor.path));
    }
    assert!(repo.list_ancestors(books.id).unwrap().is_empty());
}

#[test]
fn test_children_are_counted_and_ordered() {
    let test_db = common::TestDb::new("test_children_are_counted_and_ordered.db");
    let repo = test_db.repo();

    let books = add(&repo, None, "Books", "books");
    let first = add(&repo, Some(&books), "Non-fiction", "non-fiction");
    let second = add(&repo, Some(&books), "Fiction", "fiction");
    let third = add(&repo, Some(&books), "Comics", "comics");

    let books = reload(&repo, &books);
    let children = repo.list_children(books.id).unwrap();

    assert_eq!(books.numchild, 3);
    assert_eq!(ids(&children), vec![first.id, second.id, third.id]);
    assert!(children.windows(2).all(|pair| pair[0].path < pair[1].path));
    assert!(!books.is_leaf());
    assert!(books.is_root());
}

#[test]
fn test_move_into_own_subtree_is_rejected() {
    let test_db = common::TestDb::new("test_move_into_own_subtree_is_rejected.db");
    let repo = test_db.repo();

    let books = add(&repo, None, "Books", "books");
    let fiction = add(&repo, Some(&books), "Fiction", "fiction");
    let fantasy = add(&repo, Some(&fiction), "Fantasy", "fantasy");

    let err = repo
        .move_category(books.id, Some(fantasy.id))
        .expect_err("expected move into descendant to fail");
    assert!(matches!(err, RepositoryError::InvalidMove { id } if id == books.id));

    let err = repo
        .move_category(fiction.id, Some(fiction.id))
        .expect_err("expected move onto itself to fail");
    assert!(matches!(err, RepositoryError::InvalidMove { .. }));

    assert_eq!(reload(&repo, &fantasy).path, fantasy.path);
}

#[test]
fn test_move_to_root_and_to_same_parent() {
    let test_db = common::TestDb::new("test_move_to_root_and_to_same_parent.db");
    let repo = test_db.repo();

    let books = add(&repo, None, "Books", "books");
    let music = add(&repo, None, "Music", "music");
    let fiction = add(&repo, Some(&books), "Fiction", "fiction");

    let unchanged = repo.move_category(fiction.id, Some(books.id)).unwrap();
    assert_eq!(unchanged.path, fiction.path);
    assert_eq!(reload(&repo, &books).numchild, 1);

    let promoted = repo.move_category(fiction.id, None).unwrap();

    assert!(promoted.is_root());
    assert!(promoted.path > music.path);
    assert_eq!(reload(&repo, &books).numchild, 0);
    assert_eq!(
        ids(&repo.list_root_categories().unwrap()),
        vec![books.id, music.id, fiction.id]
    );
    assert!(repo.find_tree_problems().unwrap().is_empty());
}

#[test]
fn test_delete_policies() {
    let test_db = common::TestDb::new("test_delete_policies.db");
    let repo = test_db.repo();

    let books = add(&repo, None, "Books", "books");
    let fiction = add(&repo, Some(&books), "Fiction", "fiction");
    let fantasy = add(&repo, Some(&fiction), "Fantasy", "fantasy");
    let horror = add(&repo, Some(&fiction), "Horror", "horror");
    let poetry = add(&repo, Some(&books), "Poetry", "poetry");

    let err = repo
        .delete_category(fiction.id, DeletePolicy::Restrict)
        .expect_err("expected restrict to refuse a parent");
    assert!(matches!(err, RepositoryError::HasChildren { count: 2, .. }));

    repo.delete_category(fiction.id, DeletePolicy::ReparentChildren)
        .unwrap();

    assert!(repo.get_category_by_id(fiction.id).unwrap().is_none());
    let books_children = repo.list_children(books.id).unwrap();
    assert_eq!(
        ids(&books_children),
        vec![poetry.id, fantasy.id, horror.id]
    );
    assert_eq!(reload(&repo, &books).numchild, 3);
    assert_eq!(reload(&repo, &fantasy).depth, 2);
    assert!(repo.find_tree_problems().unwrap().is_empty());

    repo.delete_category(poetry.id, DeletePolicy::Restrict)
        .unwrap();
    assert_eq!(reload(&repo, &books).numchild, 2);

    repo.delete_category(books.id, DeletePolicy::Cascade).unwrap();

    assert!(repo.get_category_by_id(fantasy.id).unwrap().is_none());
    assert!(repo.get_category_by_id(horror.id).unwrap().is_none());
    let (total, _) = repo.list_categories(CategoryListQuery::new()).unwrap();
    assert_eq!(total, 0);
}

#[test]
fn test_reparent_root_children_become_roots() {
    let test_db = common::TestDb::new("test_reparent_root_children_become_roots.db");
    let repo = test_db.repo();

    let books = add(&repo, None, "Books", "books");
    let fiction = add(&repo, Some(&books), "Fiction", "fiction");
    let fantasy = add(&repo, Some(&fiction), "Fantasy", "fantasy");

    repo.delete_category(books.id, DeletePolicy::ReparentChildren)
        .unwrap();

    let fiction = reload(&repo, &fiction);
    assert!(fiction.is_root());
    assert_eq!(reload(&repo, &fantasy).depth, 2);
    assert_eq!(ids(&repo.list_root_categories().unwrap()), vec![fiction.id]);
    assert!(repo.find_tree_problems().unwrap().is_empty());
}

#[test]
fn test_sibling_capacity_is_enforced() {
    let test_db = common::TestDb::new("test_sibling_capacity_is_enforced.db");
    let scheme = PathScheme::new("01", 2).unwrap();
    let repo = test_db.repo_with_scheme(scheme);

    for index in 0..scheme.max_segment_value() {
        add(&repo, None, &format!("Root {index}"), &format!("root-{index}"));
    }

    let err = repo
        .create_root_category(&NewCategory::new("Overflow", "overflow"))
        .expect_err("expected sibling capacity to be exhausted");
    assert!(matches!(err, RepositoryError::CapacityExceeded(_)));
    assert!(repo.get_category_by_slug("overflow").unwrap().is_none());
}

#[test]
fn test_depth_capacity_is_enforced() {
    let test_db = common::TestDb::new("test_depth_capacity_is_enforced.db");
    let repo = test_db.repo_with_scheme(PathScheme::default().with_max_len(8));

    let books = add(&repo, None, "Books", "books");
    let fiction = add(&repo, Some(&books), "Fiction", "fiction");

    let err = repo
        .create_child_category(fiction.id, &NewCategory::new("Fantasy", "fantasy"))
        .expect_err("expected depth limit");
    assert!(matches!(err, RepositoryError::CapacityExceeded(_)));
    assert_eq!(reload(&repo, &fiction).numchild, 0);
}

#[test]
fn test_failed_move_leaves_tree_untouched() {
    let test_db = common::TestDb::new("test_failed_move_leaves_tree_untouched.db");
    let repo = test_db.repo_with_scheme(PathScheme::default().with_max_len(12));

    let books = add(&repo, None, "Books", "books");
    let fiction = add(&repo, Some(&books), "Fiction", "fiction");
    let fantasy = add(&repo, Some(&fiction), "Fantasy", "fantasy");
    let music = add(&repo, None, "Music", "music");
    let scores = add(&repo, Some(&music), "Scores", "scores");

    let err = repo
        .move_category(fiction.id, Some(scores.id))
        .expect_err("expected the rebased subtree to exceed the path length");
    assert!(matches!(err, RepositoryError::CapacityExceeded(_)));

    assert_eq!(reload(&repo, &fiction).path, fiction.path);
    assert_eq!(reload(&repo, &fiction).depth, 2);
    assert_eq!(reload(&repo, &fantasy).path, fantasy.path);
    assert_eq!(reload(&repo, &books).numchild, 1);
    assert_eq!(reload(&repo, &scores).numchild, 0);
    assert!(repo.list_children(scores.id).unwrap().is_empty());
    assert!(repo.find_tree_problems().unwrap().is_empty());
}

#[test]
fn test_duplicate_slug_is_reported() {
    let test_db = common::TestDb::new("test_duplicate_slug_is_reported.db");
    let repo = test_db.repo();

    let books = add(&repo, None, "Books", "books");

    let err = repo
        .create_child_category(books.id, &NewCategory::new("More books", "books"))
        .expect_err("expected duplicate slug");
    assert!(matches!(err, RepositoryError::DuplicateSlug(ref table) if table == "categories"));
    assert_eq!(reload(&repo, &books).numchild, 0);
}

#[test]
fn test_update_category_fields() {
    let test_db = common::TestDb::new("test_update_category_fields.db");
    let repo = test_db.repo();

    let books = add(&repo, None, "Books", "books");

    let updated = repo
        .update_category(
            books.id,
            &UpdateCategory::new(
                "Printed books",
                "printed-books",
                Some("Paper only".to_string()),
                false,
            ),
        )
        .unwrap();

    assert_eq!(updated.title, "Printed books");
    assert_eq!(updated.slug, "printed-books");
    assert_eq!(updated.description.as_deref(), Some("Paper only"));
    assert!(!updated.is_active);
    assert_eq!(updated.path, books.path);

    let err = repo
        .update_category(
            9999,
            &UpdateCategory::new("Missing", "missing", None, true),
        )
        .expect_err("expected unknown category");
    assert!(matches!(err, RepositoryError::NotFound));
}

#[test]
fn test_list_categories_filters_and_paginates() {
    let test_db = common::TestDb::new("test_list_categories_filters_and_paginates.db");
    let repo = test_db.repo();

    let books = add(&repo, None, "Books", "books");
    let fiction = add(&repo, Some(&books), "Fiction", "fiction");
    let hidden = repo
        .create_child_category(
            books.id,
            &NewCategory::new("Drafts", "drafts")
                .with_description("Unreleased fiction")
                .inactive(),
        )
        .unwrap();
    let music = add(&repo, None, "Music", "music");

    let (total, items) = repo.list_categories(CategoryListQuery::new()).unwrap();
    assert_eq!(total, 4);
    assert_eq!(ids(&items), vec![books.id, fiction.id, hidden.id, music.id]);

    let (total, items) = repo
        .list_categories(CategoryListQuery::new().public())
        .unwrap();
    assert_eq!(total, 3);
    assert!(!ids(&items).contains(&hidden.id));

    let (total, items) = repo
        .list_categories(CategoryListQuery::new().search("fiction"))
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(ids(&items), vec![fiction.id, hidden.id]);

    let (total, items) = repo
        .list_categories(CategoryListQuery::new().paginate(2, 3))
        .unwrap();
    assert_eq!(total, 4);
    assert_eq!(ids(&items), vec![music.id]);
}

#[test]
fn test_category_search_wildcards_match_literally() {
    let test_db = common::TestDb::new("test_category_search_wildcards_match_literally.db");
    let repo = test_db.repo();

    let sale = add(&repo, None, "50% off", "sale");
    add(&repo, None, "50 off", "clearance");
    add(&repo, None, "Preseason", "preseason");
    let outlet = repo
        .create_root_category(
            &NewCategory::new("Outlet", "outlet").with_description("Off_season stock"),
        )
        .unwrap();

    let (total, items) = repo
        .list_categories(CategoryListQuery::new().search("0%"))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(ids(&items), vec![sale.id]);

    let (total, items) = repo
        .list_categories(CategoryListQuery::new().search("_season"))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(ids(&items), vec![outlet.id]);
}

#[test]
fn test_fix_tree_repairs_bookkeeping() {
    let test_db = common::TestDb::new("test_fix_tree_repairs_bookkeeping.db");
    let repo = test_db.repo();

    let books = add(&repo, None, "Books", "books");
    let fiction = add(&repo, Some(&books), "Fiction", "fiction");

    {
        let mut conn = test_db.pool().get().unwrap();
        diesel::update(categories::table.find(books.id))
            .set(categories::numchild.eq(5))
            .execute(&mut conn)
            .unwrap();
        diesel::update(categories::table.find(fiction.id))
            .set(categories::depth.eq(4))
            .execute(&mut conn)
            .unwrap();
    }

    let problems = repo.find_tree_problems().unwrap();
    assert_eq!(problems.len(), 2);
    assert!(problems.contains(&TreeProblem::WrongNumchild {
        id: books.id,
        stored: 5,
        expected: 1,
    }));
    assert!(problems.contains(&TreeProblem::WrongDepth {
        id: fiction.id,
        stored: 4,
        expected: 2,
    }));

    assert_eq!(repo.fix_tree().unwrap(), 2);
    assert!(repo.find_tree_problems().unwrap().is_empty());
    assert_eq!(reload(&repo, &books).numchild, 1);
    assert_eq!(repo.fix_tree().unwrap(), 0);
}
