// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for the portal.
//!
//! Each repository wraps a [`sqlx::SqlitePool`] and implements the matching
//! store trait from `portal-server-auth`, so an
//! [`AccessResolver`](portal_server_auth::AccessResolver) can be built
//! straight from a pool with [`access_resolver`].

pub mod client;
pub mod error;
pub mod pool;
pub mod profile;
mod row;
pub mod session;
pub mod testing;

use std::sync::Arc;

pub use client::ClientRepository;
pub use error::{DbError, Result};
pub use pool::{create_pool, run_migrations};
pub use profile::ProfileRepository;
pub use session::SessionRepository;
pub use sqlx::sqlite::SqlitePool;

use portal_server_auth::AccessResolver;

/// An access resolver backed by `pool`.
pub fn access_resolver(pool: &SqlitePool) -> AccessResolver {
	AccessResolver::new(
		Arc::new(SessionRepository::new(pool.clone())),
		Arc::new(ProfileRepository::new(pool.clone())),
		Arc::new(ClientRepository::new(pool.clone())),
	)
}
