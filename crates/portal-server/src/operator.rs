// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Operator actions run from the command line.

use portal_server_auth::{Profile, ProfileStatus, Session, SessionToken, UserId};
use portal_server_db::{ProfileRepository, SessionRepository};
use sqlx::SqlitePool;

use crate::error::ServerError;

/// A session issued for an existing, enabled profile.
pub struct IssuedSession {
	pub profile: Profile,
	pub session: Session,
	pub token: SessionToken,
}

/// Issue a session for `user_id`.
///
/// # Errors
/// `NotFound` without a profile, `Forbidden` when the profile is disabled.
#[tracing::instrument(skip(pool), fields(user_id = %user_id))]
pub async fn issue_session(
	pool: &SqlitePool,
	user_id: UserId,
	ttl: chrono::Duration,
) -> Result<IssuedSession, ServerError> {
	let profile = ProfileRepository::new(pool.clone())
		.get_profile(&user_id)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("profile for user {user_id}")))?;

	if profile.status == ProfileStatus::Disabled {
		return Err(ServerError::Forbidden(format!(
			"profile for user {user_id} is disabled"
		)));
	}

	let (session, token) = SessionRepository::new(pool.clone())
		.issue_session(user_id, ttl)
		.await?;

	tracing::info!(role = %profile.role, session_id = %session.id, "issued session");
	Ok(IssuedSession {
		profile,
		session,
		token,
	})
}
