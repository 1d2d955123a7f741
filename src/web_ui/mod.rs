//! Web UI Module
//!
//! The entire presentation layer: access and admin login pages, the token
//! generator panel, and the panorama viewer. Templates are embedded in the
//! binary.

mod routes;
mod templates;

use axum::Router;
use std::sync::Arc;

use crate::app::AppState;

/// Create the web UI router.
pub fn router() -> Router<Arc<AppState>> {
    routes::create_router()
}
