//! Hinglish analysis server
//!
//! HTTP front end for the classifier stack: text or audio in, sentiment,
//! toxicity and life categories out.

pub mod config;
pub mod routes;
pub mod state;
pub mod transcribe;

pub use config::ServerConfig;
pub use routes::create_router;
pub use state::AppState;
