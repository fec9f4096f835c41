// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Profile repository.
//!
//! Roles are stored as free text. Reads go through [`Role::normalize`], so a
//! NULL or unrecognized role is served as CLIENT and never widens access.

use async_trait::async_trait;
use chrono::Utc;
use portal_server_auth::{AccessError, Profile, ProfileStatus, ProfileStore, Role, UserId};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::row::{format_timestamp, is_unique_violation, parse_timestamp, parse_uuid};

#[derive(Clone)]
pub struct ProfileRepository {
	pool: SqlitePool,
}

impl ProfileRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a new profile.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if a profile already exists for the user.
	#[tracing::instrument(skip(self, profile), fields(user_id = %profile.user_id, role = %profile.role))]
	pub async fn create_profile(&self, profile: &Profile) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO profiles (user_id, role, full_name, email, status, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(profile.user_id.to_string())
		.bind(profile.role.as_str())
		.bind(&profile.full_name)
		.bind(&profile.email)
		.bind(profile.status.to_string())
		.bind(format_timestamp(profile.created_at))
		.bind(format_timestamp(profile.updated_at))
		.execute(&self.pool)
		.await
		.map_err(|e| {
			if is_unique_violation(&e) {
				DbError::Conflict(format!("profile for user {} already exists", profile.user_id))
			} else {
				DbError::Sqlx(e)
			}
		})?;

		tracing::debug!("profile created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT user_id, role, full_name, email, status, created_at, updated_at
			FROM profiles
			WHERE user_id = ?
			"#,
		)
		.bind(user_id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_profile(&r)).transpose()
	}

	/// All profiles, oldest first.
	#[tracing::instrument(skip(self))]
	pub async fn list_profiles(&self) -> Result<Vec<Profile>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT user_id, role, full_name, email, status, created_at, updated_at
			FROM profiles
			ORDER BY created_at ASC
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_profile).collect()
	}

	/// Apply an admin change to a profile's role and/or status in one
	/// transaction. Disabling the profile also deletes all of its sessions.
	///
	/// Returns the number of sessions revoked, or `None` if no profile exists
	/// for the user, in which case nothing is written.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn apply_admin_update(
		&self,
		user_id: &UserId,
		role: Option<Role>,
		status: Option<ProfileStatus>,
	) -> Result<Option<u64>, DbError> {
		let mut tx = self.pool.begin().await?;

		let result = sqlx::query(
			r#"
			UPDATE profiles
			SET role = COALESCE(?, role), status = COALESCE(?, status), updated_at = ?
			WHERE user_id = ?
			"#,
		)
		.bind(role.map(|r| r.as_str()))
		.bind(status.map(|s| s.to_string()))
		.bind(format_timestamp(Utc::now()))
		.bind(user_id.to_string())
		.execute(&mut *tx)
		.await?;

		if result.rows_affected() == 0 {
			tx.rollback().await?;
			return Ok(None);
		}

		let revoked = if status == Some(ProfileStatus::Disabled) {
			sqlx::query("DELETE FROM sessions WHERE user_id = ?")
				.bind(user_id.to_string())
				.execute(&mut *tx)
				.await?
				.rows_affected()
		} else {
			0
		};

		tx.commit().await?;
		tracing::info!(revoked, "profile updated");
		Ok(Some(revoked))
	}
}

fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<Profile, DbError> {
	let user_id: String = row.get("user_id");
	let role: Option<String> = row.get("role");
	let status: String = row.get("status");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	Ok(Profile {
		user_id: UserId::new(parse_uuid(&user_id, "user_id")?),
		role: Role::normalize(role.as_deref()),
		full_name: row.get("full_name"),
		email: row.get("email"),
		status: ProfileStatus::parse(&status),
		created_at: parse_timestamp(&created_at, "created_at")?,
		updated_at: parse_timestamp(&updated_at, "updated_at")?,
	})
}

#[async_trait]
impl ProfileStore for ProfileRepository {
	async fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>, AccessError> {
		Ok(self.get_profile(user_id).await?)
	}
}
