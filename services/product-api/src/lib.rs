// Domain layer modules
pub mod domain;

// Infrastructure layer modules
pub mod infrastructure;
