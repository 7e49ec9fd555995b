pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod template;
pub mod types;

pub use routes::create_router;
pub use server::WebServer;
pub use state::AppState;
