//! HTTP server: shared host, routes and the fluent builder

pub mod builder;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use host::ServerHost;
pub use router::build_routes;
