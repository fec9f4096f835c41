// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Collaborator traits the access policy reads from.
//!
//! The SQLite implementations live in `portal-server-db`; tests use the
//! in-memory implementations from [`crate::testing`].

use async_trait::async_trait;

use crate::error::AccessError;
use crate::profile::{ClientRecord, Profile};
use crate::session::{Session, SessionToken};
use crate::types::UserId;

/// Session lookup and sign-out.
#[async_trait]
pub trait AuthBackend: Send + Sync {
	/// Returns the live session for `token`. Expired or unknown tokens yield `None`.
	async fn find_session(&self, token: &SessionToken) -> Result<Option<Session>, AccessError>;

	/// Ends the session for `token`. Returns true if a session was removed.
	async fn sign_out(&self, token: &SessionToken) -> Result<bool, AccessError>;
}

/// Profile lookup keyed by identity.
#[async_trait]
pub trait ProfileStore: Send + Sync {
	async fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>, AccessError>;
}

/// Client record lookup.
#[async_trait]
pub trait ClientStore: Send + Sync {
	/// The client record linked to `user_id`, if any.
	async fn get_client_for_user(&self, user_id: &UserId)
		-> Result<Option<ClientRecord>, AccessError>;
}
