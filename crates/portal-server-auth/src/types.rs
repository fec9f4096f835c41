// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for authentication and authorization.
//!
//! This module defines the foundational types used throughout the access layer:
//!
//! - **ID newtypes**: Type-safe wrappers around UUIDs ([`UserId`], [`SessionId`],
//!   [`ClientId`]) preventing accidental mixing
//! - **Role enum**: The single portal role a profile holds ([`Role`])
//! - **Profile status**: Lifecycle state of a profile ([`ProfileStatus`])
//!
//! All ID types implement transparent serde serialization (as UUID strings) and
//! provide conversion to/from [`uuid::Uuid`].

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for an authenticated identity.");
define_id_type!(SessionId, "Unique identifier for a session.");
define_id_type!(ClientId, "Unique identifier for a client record.");

// =============================================================================
// Roles
// =============================================================================

/// The portal role held by a profile.
///
/// Every profile holds exactly one role. The role decides which route trees
/// are reachable: ADMIN and TEAM work in the staff area (`/admin`), CLIENT in
/// the client area (`/app`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
	/// Full staff access including settings.
	Admin,
	/// A customer; sees only their own client record.
	Client,
	/// Staff member without access to settings.
	Team,
}

impl Role {
	/// The role assigned when none is stored or the stored value is unknown.
	///
	/// CLIENT is the least privileged role.
	pub const DEFAULT: Role = Role::Client;

	/// Returns all available roles.
	pub fn all() -> &'static [Role] {
		&[Role::Admin, Role::Client, Role::Team]
	}

	/// Parses a stored role value, returning `None` for unknown values.
	///
	/// Matching ignores ASCII case and surrounding whitespace.
	pub fn parse(raw: &str) -> Option<Role> {
		let raw = raw.trim();
		Role::all()
			.iter()
			.copied()
			.find(|role| role.as_str().eq_ignore_ascii_case(raw))
	}

	/// Normalizes a possibly missing or unrecognized stored value.
	///
	/// Anything that does not parse becomes [`Role::DEFAULT`].
	pub fn normalize(raw: Option<&str>) -> Role {
		match raw.and_then(Role::parse) {
			Some(role) => role,
			None => {
				tracing::debug!(raw = ?raw, default = %Role::DEFAULT, "normalizing unrecognized role");
				Role::DEFAULT
			}
		}
	}

	/// The canonical stored representation.
	pub fn as_str(&self) -> &'static str {
		match self {
			Role::Admin => "ADMIN",
			Role::Client => "CLIENT",
			Role::Team => "TEAM",
		}
	}

	/// Returns true for roles that work in the staff area.
	pub fn is_staff(&self) -> bool {
		matches!(self, Role::Admin | Role::Team)
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

// =============================================================================
// Profile status
// =============================================================================

/// Lifecycle status of a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
	#[default]
	Active,
	Invited,
	Disabled,
	/// A stored value this build does not recognise.
	Unknown,
}

impl ProfileStatus {
	/// Parses a stored status value. Unrecognized values become `Unknown`.
	pub fn parse(raw: &str) -> ProfileStatus {
		match raw.trim().to_ascii_lowercase().as_str() {
			"active" => ProfileStatus::Active,
			"invited" => ProfileStatus::Invited,
			"disabled" => ProfileStatus::Disabled,
			_ => ProfileStatus::Unknown,
		}
	}
}

impl fmt::Display for ProfileStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ProfileStatus::Active => write!(f, "active"),
			ProfileStatus::Invited => write!(f, "invited"),
			ProfileStatus::Disabled => write!(f, "disabled"),
			ProfileStatus::Unknown => write!(f, "unknown"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	mod id_types {
		use super::*;

		#[test]
		fn user_id_roundtrips() {
			let uuid = Uuid::new_v4();
			let user_id = UserId::new(uuid);
			assert_eq!(user_id.into_inner(), uuid);
		}

		#[test]
		fn client_id_serializes_as_uuid() {
			let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
			let client_id = ClientId::new(uuid);
			let json = serde_json::to_string(&client_id).unwrap();
			assert_eq!(json, "\"550e8400-e29b-41d4-a716-446655440000\"");
		}

		proptest! {
				#[test]
				fn user_id_display_matches_uuid(a: u128) {
						let uuid = Uuid::from_u128(a);
						prop_assert_eq!(UserId::new(uuid).to_string(), uuid.to_string());
				}
		}
	}

	mod roles {
		use super::*;

		#[test]
		fn parse_is_case_insensitive() {
			assert_eq!(Role::parse("admin"), Some(Role::Admin));
			assert_eq!(Role::parse(" Team "), Some(Role::Team));
			assert_eq!(Role::parse("CLIENT"), Some(Role::Client));
		}

		#[test]
		fn parse_rejects_unknown() {
			assert_eq!(Role::parse("superuser"), None);
			assert_eq!(Role::parse(""), None);
		}

		#[test]
		fn normalize_defaults_to_client() {
			assert_eq!(Role::normalize(None), Role::Client);
			assert_eq!(Role::normalize(Some("owner")), Role::Client);
			assert_eq!(Role::normalize(Some("ADMIN")), Role::Admin);
		}

		#[test]
		fn serializes_screaming_case() {
			assert_eq!(serde_json::to_string(&Role::Team).unwrap(), "\"TEAM\"");
		}

		#[test]
		fn staff_roles() {
			assert!(Role::Admin.is_staff());
			assert!(Role::Team.is_staff());
			assert!(!Role::Client.is_staff());
		}

		proptest! {
				#[test]
				fn normalize_always_yields_a_known_role(raw in ".*") {
						let role = Role::normalize(Some(&raw));
						prop_assert!(Role::all().contains(&role));
				}
		}
	}

	mod profile_status {
		use super::*;

		#[test]
		fn parses_known_values() {
			assert_eq!(ProfileStatus::parse("Active"), ProfileStatus::Active);
			assert_eq!(ProfileStatus::parse("disabled"), ProfileStatus::Disabled);
		}

		#[test]
		fn unknown_values_are_kept_as_unknown() {
			assert_eq!(ProfileStatus::parse("archived"), ProfileStatus::Unknown);
		}
	}
}
