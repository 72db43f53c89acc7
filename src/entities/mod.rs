//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod keyword;
pub mod product;

// Re-export specific types to avoid conflicts
pub use keyword::{
    Column as KeywordColumn, Entity as Keyword, KeywordStatus, Model as KeywordModel,
};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
