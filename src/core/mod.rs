//! Core business logic - framework-agnostic keyword lifecycle, persistence and projection.

/// Keyword queries and partial updates over a `SeaORM` connection
pub mod keyword;
/// The keyword lifecycle state machine
pub mod lifecycle;
/// Product inserts and listings over a `SeaORM` connection
pub mod product;
/// Append-only local mirror of generated products
pub mod product_log;
/// Pure projections for status tabs
pub mod view;

pub use lifecycle::{Generation, LifecycleEvent, LifecycleManager};
pub use product_log::ProductLog;
