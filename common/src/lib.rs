pub mod category;
pub mod product;
pub mod query;
pub mod response;
pub mod seed;
