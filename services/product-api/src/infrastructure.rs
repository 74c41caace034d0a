// Infrastructure layer modules
pub mod config;
pub mod event_publisher;
pub mod logging;
pub mod product_repository;

// Re-exports
pub use config::{ConfigError, ProductApiConfig};
pub use event_publisher::{
    AwsSnsEventPublisher, EventPublisher, ProductEventPublisher, PublishError, PublishResult,
};
pub use logging::init_logging;
pub use product_repository::{
    DynamoProductRepository, ProductRepository, RepositoryError, product_from_item,
    product_to_item,
};
