//! HTTP layer: JSON task API plus the embedded browser page.

mod server;
pub mod templates;

pub use server::{AppState, ServerHandle, build_router, start_server};
