pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;

pub use config::{AppConfig, EducationConfig, LoggingConfig, ServerConfig};
pub use observability::init_tracing;
pub use server::{ServerBuilder, WoundcareServer, build_app, load_registry};
