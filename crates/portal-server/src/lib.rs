// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP server for the portal.
//!
//! Every page route is protected by [`page_guard::Guarded`], the server-side
//! access guard, and every `/api/admin` route by [`access_middleware::RequireRole`].
//! Both decide through `portal_server_auth::authorize`.

pub mod access_middleware;
pub mod api;
pub mod error;
pub mod jobs;
pub mod operator;
pub mod page_guard;
pub mod routes;

pub use api::{create_app_state, create_router, AppState};
pub use error::{ErrorResponse, ServerError};
pub use portal_server_config::ServerConfig;
