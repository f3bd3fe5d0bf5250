use pushkind_catalog::domain::attribute::{AttributeType, AttributeValueError};
use pushkind_catalog::domain::category::NewCategory;
use pushkind_catalog::domain::option::{NewOptionGroup, NewProductOption};
use pushkind_catalog::domain::product::{NewProduct, ProductListQuery, UpdateProduct};
use pushkind_catalog::domain::product_class::NewProductClass;
use pushkind_catalog::domain::product_image::NewProductImage;
use pushkind_catalog::domain::recommendation::NewProductRecommendation;
use pushkind_catalog::repository::errors::RepositoryError;
use pushkind_catalog::repository::{
    CategoryWriter, OptionReader, OptionWriter, ProductClassReader, ProductClassWriter,
    ProductImageReader, ProductImageWriter, ProductReader, ProductWriter, RecommendationReader,
    RecommendationWriter,
};

mod common;

#[test]
fn test_product_crud_and_filters() {
    let test_db = common::TestDb::new("test_product_crud_and_filters.db");
    let repo = test_db.repo();

    let books = repo
        .create_product_class(&NewProductClass::new("Books", "books"))
        .unwrap();
    let fiction = repo
        .create_root_category(&NewCategory::new("Fiction", "fiction"))
        .unwrap();
    let fantasy = repo
        .create_child_category(fiction.id, &NewCategory::new("Fantasy", "fantasy"))
        .unwrap();

    let hobbit = repo
        .create_product(
            &NewProduct::new("the-hobbit")
                .with_title("The Hobbit")
                .with_product_class(books.id),
        )
        .unwrap();
    let silmarillion = repo
        .create_product(
            &NewProduct::new("the-silmarillion")
                .with_title("The Silmarillion")
                .with_product_class(books.id)
                .inactive(),
        )
        .unwrap();
    let hardcover = repo
        .create_product(&NewProduct::new("the-hobbit-hardcover").with_parent(hobbit.id))
        .unwrap();

    assert!(hardcover.is_variant());
    assert!(hardcover.title.is_none());

    repo.set_product_categories(hobbit.id, &[fantasy.id, fiction.id, fantasy.id])
        .unwrap();
    repo.set_product_categories(silmarillion.id, &[fantasy.id])
        .unwrap();

    let linked = repo.list_product_categories(hobbit.id).unwrap();
    assert_eq!(
        linked.iter().map(|c| c.id).collect::<Vec<_>>(),
        vec![fiction.id, fantasy.id]
    );

    let (total, items) = repo
        .list_products(ProductListQuery::new().category(fantasy.id))
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(items.len(), 2);

    let (total, items) = repo
        .list_products(ProductListQuery::new().category(fantasy.id).active_only())
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].id, hobbit.id);

    let (total, _) = repo
        .list_products(ProductListQuery::new().search("hobbit"))
        .unwrap();
    assert_eq!(total, 2);

    let (total, items) = repo
        .list_products(ProductListQuery::new().variants_of(hobbit.id))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].id, hardcover.id);

    let (total, _) = repo
        .list_products(ProductListQuery::new().product_class(books.id))
        .unwrap();
    assert_eq!(total, 2);

    let (total, items) = repo
        .list_products(ProductListQuery::new().paginate(2, 2))
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(items.len(), 1);

    let updated = repo
        .update_product(
            hobbit.id,
            &UpdateProduct::new()
                .title(Some("The Hobbit, or There and Back Again"))
                .discountable(false),
        )
        .unwrap();
    assert_eq!(
        updated.title.as_deref(),
        Some("The Hobbit, or There and Back Again")
    );
    assert!(!updated.is_discountable);
    assert_eq!(updated.slug, "the-hobbit");
    assert_eq!(updated.product_class_id, Some(books.id));

    assert_eq!(
        repo.get_product_by_slug("the-hobbit").unwrap().map(|p| p.id),
        Some(hobbit.id)
    );
}

#[test]
fn test_product_constraints() {
    let test_db = common::TestDb::new("test_product_constraints.db");
    let repo = test_db.repo();

    repo.create_product(&NewProduct::new("the-hobbit")).unwrap();

    let err = repo
        .create_product(&NewProduct::new("the-hobbit"))
        .expect_err("expected duplicate slug");
    assert!(matches!(err, RepositoryError::DuplicateSlug(ref table) if table == "products"));

    let product = repo.get_product_by_slug("the-hobbit").unwrap().unwrap();
    let err = repo
        .set_product_categories(product.id, &[4242])
        .expect_err("expected unknown category to be rejected");
    assert!(matches!(err, RepositoryError::Conflict(_)));

    let err = repo
        .delete_product(4242)
        .expect_err("expected unknown product");
    assert!(matches!(err, RepositoryError::NotFound));
}

#[test]
fn test_delete_product_cascades() {
    let test_db = common::TestDb::new("test_delete_product_cascades.db");
    let repo = test_db.repo();

    let hobbit = repo.create_product(&NewProduct::new("the-hobbit")).unwrap();
    let hardcover = repo
        .create_product(&NewProduct::new("the-hobbit-hardcover").with_parent(hobbit.id))
        .unwrap();
    let lotr = repo
        .create_product(&NewProduct::new("the-lord-of-the-rings"))
        .unwrap();

    repo.add_product_image(&NewProductImage::new(hobbit.id, "images/hobbit.jpg", 600, 900))
        .unwrap();
    repo.upsert_recommendation(&NewProductRecommendation::new(lotr.id, hobbit.id, 3))
        .unwrap();

    repo.delete_product(hobbit.id).unwrap();

    assert!(repo.get_product_by_id(hobbit.id).unwrap().is_none());
    assert!(repo.get_product_by_id(hardcover.id).unwrap().is_none());
    assert!(repo.list_product_images(hobbit.id).unwrap().is_empty());
    assert!(repo.list_recommendations(lotr.id).unwrap().is_empty());
}

#[test]
fn test_recommendations_are_ranked() {
    let test_db = common::TestDb::new("test_recommendations_are_ranked.db");
    let repo = test_db.repo();

    let hobbit = repo.create_product(&NewProduct::new("the-hobbit")).unwrap();
    let lotr = repo
        .create_product(&NewProduct::new("the-lord-of-the-rings"))
        .unwrap();
    let silmarillion = repo
        .create_product(&NewProduct::new("the-silmarillion"))
        .unwrap();

    repo.upsert_recommendation(&NewProductRecommendation::new(hobbit.id, silmarillion.id, 1))
        .unwrap();
    repo.upsert_recommendation(&NewProductRecommendation::new(hobbit.id, lotr.id, 5))
        .unwrap();

    let ranked: Vec<i32> = repo
        .list_recommendations(hobbit.id)
        .unwrap()
        .iter()
        .map(|r| r.recommendation_id)
        .collect();
    assert_eq!(ranked, vec![lotr.id, silmarillion.id]);

    let stored = repo
        .upsert_recommendation(&NewProductRecommendation::new(hobbit.id, silmarillion.id, 10))
        .unwrap();
    assert_eq!(stored.ranking, 10);

    let recommendations = repo.list_recommendations(hobbit.id).unwrap();
    assert_eq!(recommendations.len(), 2);
    assert_eq!(recommendations[0].recommendation_id, silmarillion.id);

    let err = repo
        .upsert_recommendation(&NewProductRecommendation::new(hobbit.id, hobbit.id, 1))
        .expect_err("expected self recommendation to fail");
    assert!(matches!(err, RepositoryError::Conflict(_)));

    let err = repo
        .upsert_recommendation(&NewProductRecommendation::new(hobbit.id, lotr.id, -1))
        .expect_err("expected negative ranking to fail");
    assert!(matches!(err, RepositoryError::Conflict(_)));

    repo.delete_recommendation(hobbit.id, silmarillion.id)
        .unwrap();
    let err = repo
        .delete_recommendation(hobbit.id, silmarillion.id)
        .expect_err("expected missing recommendation");
    assert!(matches!(err, RepositoryError::NotFound));
    assert_eq!(repo.list_recommendations(hobbit.id).unwrap().len(), 1);
}

#[test]
fn test_images_keep_dense_display_order() {
    let test_db = common::TestDb::new("test_images_keep_dense_display_order.db");
    let repo = test_db.repo();

    let hobbit = repo.create_product(&NewProduct::new("the-hobbit")).unwrap();

    assert!(repo.get_main_image(hobbit.id).unwrap().is_none());

    let cover = repo
        .add_product_image(&NewProductImage::new(hobbit.id, "images/cover.jpg", 600, 900))
        .unwrap();
    let back = repo
        .add_product_image(&NewProductImage::new(hobbit.id, "images/back.jpg", 600, 900))
        .unwrap();
    let spine = repo
        .add_product_image(&NewProductImage::new(hobbit.id, "images/spine.jpg", 80, 900))
        .unwrap();

    assert_eq!(
        [cover.display_order, back.display_order, spine.display_order],
        [0, 1, 2]
    );
    assert_eq!(repo.get_main_image(hobbit.id).unwrap(), Some(cover.clone()));

    repo.delete_product_image(cover.id).unwrap();

    let images = repo.list_product_images(hobbit.id).unwrap();
    assert_eq!(
        images.iter().map(|i| (i.id, i.display_order)).collect::<Vec<_>>(),
        vec![(back.id, 0), (spine.id, 1)]
    );
    assert_eq!(
        repo.get_main_image(hobbit.id).unwrap().map(|i| i.id),
        Some(back.id)
    );

    let err = repo
        .delete_product_image(cover.id)
        .expect_err("expected missing image");
    assert!(matches!(err, RepositoryError::NotFound));
}

#[test]
fn test_classes_and_options() {
    let test_db = common::TestDb::new("test_classes_and_options.db");
    let repo = test_db.repo();

    let shirts = repo
        .create_product_class(
            &NewProductClass::new("T-shirts", "t-shirts").with_description("Printed shirts"),
        )
        .unwrap();
    let ebooks = repo
        .create_product_class(&NewProductClass::new("E-books", "e-books").digital())
        .unwrap();
    assert!(shirts.track_stock && shirts.require_shipping);
    assert!(!ebooks.track_stock && !ebooks.require_shipping);

    let sizes = repo
        .create_option_group(
            &NewOptionGroup::new("Size")
                .with_value("S")
                .with_value("M")
                .with_value("L"),
        )
        .unwrap();
    let extra = repo.add_option_group_value(sizes.id, "XL").unwrap();
    let values = repo.list_option_group_values(sizes.id).unwrap();
    assert_eq!(
        values.iter().map(|v| v.title.as_str()).collect::<Vec<_>>(),
        vec!["S", "M", "L", "XL"]
    );
    assert_eq!(values[3], extra);

    let message = repo
        .create_option(&NewProductOption::new("Gift message", AttributeType::Text))
        .unwrap();
    let size = repo
        .create_option(
            &NewProductOption::new("Size", AttributeType::Option)
                .with_option_group(sizes.id)
                .required(),
        )
        .unwrap();

    let err = repo
        .create_option(&NewProductOption::new("Colours", AttributeType::MultiOption))
        .expect_err("expected option without group to fail");
    assert!(matches!(
        err,
        RepositoryError::Value(AttributeValueError::MissingOptionGroup { .. })
    ));

    repo.set_class_options(shirts.id, &[size.id, message.id, size.id])
        .unwrap();
    let class_options = repo.list_class_options(shirts.id).unwrap();
    assert_eq!(class_options.len(), 2);

    repo.set_class_options(shirts.id, &[message.id]).unwrap();
    assert_eq!(repo.list_class_options(shirts.id).unwrap(), vec![message.clone()]);

    let err = repo
        .set_class_options(4242, &[message.id])
        .expect_err("expected unknown class");
    assert!(matches!(err, RepositoryError::NotFound));

    let shirt = repo
        .create_product(&NewProduct::new("logo-shirt").with_product_class(shirts.id))
        .unwrap();
    repo.set_product_options(shirt.id, &[size.id]).unwrap();
    assert_eq!(repo.list_product_options(shirt.id).unwrap(), vec![size]);
    assert_eq!(repo.list_options().unwrap().len(), 2);
    assert_eq!(repo.list_option_groups().unwrap(), vec![sizes]);

    let err = repo
        .delete_product_class(shirts.id)
        .expect_err("expected class in use to be kept");
    assert!(matches!(err, RepositoryError::Conflict(_)));

    repo.delete_product_class(ebooks.id).unwrap();
    let classes = repo.list_product_classes().unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].id, shirts.id);
}

#[test]
fn test_create_product_in_categories_is_atomic() {
    let test_db = common::TestDb::new("test_create_product_in_categories_is_atomic.db");
    let repo = test_db.repo();

    let fiction = repo
        .create_root_category(&NewCategory::new("Fiction", "fiction"))
        .unwrap();

    let err = repo
        .create_product_in_categories(&NewProduct::new("the-hobbit"), &[fiction.id, 4242])
        .expect_err("expected unknown category to be refused");
    assert!(matches!(err, RepositoryError::Conflict(_)));
    assert!(repo.get_product_by_slug("the-hobbit").unwrap().is_none());

    let hobbit = repo
        .create_product_in_categories(&NewProduct::new("the-hobbit"), &[fiction.id, fiction.id])
        .unwrap();
    let linked = repo.list_product_categories(hobbit.id).unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].id, fiction.id);
}

#[test]
fn test_search_wildcards_match_literally() {
    let test_db = common::TestDb::new("test_search_wildcards_match_literally.db");
    let repo = test_db.repo();

    let sale = repo
        .create_product(&NewProduct::new("half_price").with_title("50% off"))
        .unwrap();
    repo.create_product(&NewProduct::new("half-price").with_title("50 off"))
        .unwrap();
    repo.create_product(&NewProduct::new("halfxprice").with_title("Fifty"))
        .unwrap();

    let (total, items) = repo
        .list_products(ProductListQuery::new().search("%"))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].id, sale.id);

    let (total, items) = repo
        .list_products(ProductListQuery::new().search("half_"))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].id, sale.id);

    let (total, _) = repo
        .list_products(ProductListQuery::new().search("half"))
        .unwrap();
    assert_eq!(total, 3);
}
