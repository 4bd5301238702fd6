//! Server-rendered web layer for quill.
//!
//! This crate provides the HTML-facing surface:
//!
//! - **Handlers**: feed pages, post pages, follow actions
//! - **Extractors**: required and optional viewer authentication
//! - **Middleware**: session-token resolution
//! - **Templates**: askama templates rendered server-side
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod templates;

pub use error::{PageError, PageResult};
pub use handlers::router;
pub use state::AppState;
