pub mod attribute;
pub mod category;
pub mod option;
pub mod path;
pub mod product;
pub mod product_class;
pub mod product_image;
pub mod recommendation;
