// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Profile and client record types.
//!
//! This module provides:
//! - [`Profile`] - application record extending an auth identity with a role
//! - [`ClientRecord`] - the client account linked to a CLIENT profile

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ClientId, ProfileStatus, Role, UserId};

/// The application-level record of an authenticated identity.
///
/// # PII Handling
///
/// `full_name` and `email` are user-provided PII and must not be logged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
	/// The identity this profile belongs to.
	pub user_id: UserId,

	/// The single role held by this profile.
	pub role: Role,

	/// Display name shown in the UI.
	pub full_name: Option<String>,

	/// Contact email.
	pub email: Option<String>,

	pub status: ProfileStatus,

	pub created_at: DateTime<Utc>,

	pub updated_at: DateTime<Utc>,
}

impl Profile {
	/// Creates an active profile with the given role.
	pub fn new(user_id: UserId, role: Role) -> Self {
		let now = Utc::now();
		Self {
			user_id,
			role,
			full_name: None,
			email: None,
			status: ProfileStatus::Active,
			created_at: now,
			updated_at: now,
		}
	}

	/// Set the display name.
	pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
		self.full_name = Some(full_name.into());
		self
	}

	/// Set the contact email.
	pub fn with_email(mut self, email: impl Into<String>) -> Self {
		self.email = Some(email.into());
		self
	}

	/// Set the profile status.
	pub fn with_status(mut self, status: ProfileStatus) -> Self {
		self.status = status;
		self
	}
}

/// A client account. CLIENT profiles reach client-scoped pages only through
/// this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
	pub id: ClientId,

	/// The CLIENT profile that owns this record.
	pub user_id: UserId,

	pub name: String,

	pub created_at: DateTime<Utc>,
}

impl ClientRecord {
	pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
		Self {
			id: ClientId::generate(),
			user_id,
			name: name.into(),
			created_at: Utc::now(),
		}
	}
}
