// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session repository.
//!
//! Sessions are keyed by the SHA-256 hash of their token. Expired rows are
//! never returned, whether or not [`SessionRepository::cleanup_expired_sessions`]
//! has run yet.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use portal_server_auth::{AccessError, AuthBackend, Session, SessionId, SessionToken, UserId};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::row::{format_timestamp, parse_timestamp, parse_uuid};

#[derive(Clone)]
pub struct SessionRepository {
	pool: SqlitePool,
}

impl SessionRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Persist `session` under `token_hash`.
	#[tracing::instrument(skip(self, session, token_hash), fields(session_id = %session.id, user_id = %session.user_id))]
	pub async fn create_session(&self, session: &Session, token_hash: &str) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO sessions (id, user_id, token_hash, created_at, last_used_at, expires_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(session.id.to_string())
		.bind(session.user_id.to_string())
		.bind(token_hash)
		.bind(format_timestamp(session.created_at))
		.bind(format_timestamp(session.last_used_at))
		.bind(format_timestamp(session.expires_at))
		.execute(&self.pool)
		.await?;

		tracing::debug!("session created");
		Ok(())
	}

	/// Create a session for `user_id` and return it with its plaintext token.
	pub async fn issue_session(
		&self,
		user_id: UserId,
		ttl: Duration,
	) -> Result<(Session, SessionToken), DbError> {
		let session = Session::new(user_id, ttl);
		let token = SessionToken::generate();
		self.create_session(&session, &token.hash()).await?;
		Ok((session, token))
	}

	/// The live session stored under `token_hash`.
	#[tracing::instrument(skip(self, token_hash))]
	pub async fn get_session_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, user_id, created_at, last_used_at, expires_at
			FROM sessions
			WHERE token_hash = ? AND expires_at > ?
			"#,
		)
		.bind(token_hash)
		.bind(format_timestamp(Utc::now()))
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_session(&r)).transpose()
	}

	#[tracing::instrument(skip(self), fields(session_id = %id))]
	pub async fn touch_session(&self, id: &SessionId) -> Result<(), DbError> {
		sqlx::query("UPDATE sessions SET last_used_at = ? WHERE id = ?")
			.bind(format_timestamp(Utc::now()))
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	#[tracing::instrument(skip(self, token_hash))]
	pub async fn delete_session_by_token_hash(&self, token_hash: &str) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
			.bind(token_hash)
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	/// Delete every expired session, returning how many were removed.
	#[tracing::instrument(skip(self))]
	pub async fn cleanup_expired_sessions(&self) -> Result<u64, DbError> {
		let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
			.bind(format_timestamp(Utc::now()))
			.execute(&self.pool)
			.await?;

		let removed = result.rows_affected();
		if removed > 0 {
			tracing::info!(removed, "expired sessions removed");
		}
		Ok(removed)
	}
}

fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Result<Session, DbError> {
	let id: String = row.get("id");
	let user_id: String = row.get("user_id");
	let created_at: String = row.get("created_at");
	let last_used_at: String = row.get("last_used_at");
	let expires_at: String = row.get("expires_at");

	Ok(Session {
		id: SessionId::new(parse_uuid(&id, "session id")?),
		user_id: UserId::new(parse_uuid(&user_id, "user_id")?),
		created_at: parse_timestamp(&created_at, "created_at")?,
		last_used_at: parse_timestamp(&last_used_at, "last_used_at")?,
		expires_at: parse_timestamp(&expires_at, "expires_at")?,
	})
}

#[async_trait]
impl AuthBackend for SessionRepository {
	async fn find_session(&self, token: &SessionToken) -> Result<Option<Session>, AccessError> {
		let session = self.get_session_by_token_hash(&token.hash()).await?;
		if let Some(session) = &session {
			if let Err(e) = self.touch_session(&session.id).await {
				tracing::warn!(session_id = %session.id, error = %e, "failed to update session last_used_at");
			}
		}
		Ok(session)
	}

	async fn sign_out(&self, token: &SessionToken) -> Result<bool, AccessError> {
		Ok(self.delete_session_by_token_hash(&token.hash()).await?)
	}
}
