// Web Interface module root
pub mod routes;
pub mod types;
pub mod web_server;

#[cfg(test)]
mod integration_tests;

// Re-export commonly used items
pub use routes::handle_rejection;
pub use web_server::WebServer;
