// Domain layer modules
pub mod product;
pub mod product_deleted_event;

// Re-exports
pub use product::{Product, ProductPriceBracket};
pub use product_deleted_event::ProductDeletedEvent;
