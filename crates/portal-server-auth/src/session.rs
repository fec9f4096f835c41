// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session credentials.
//!
//! Session tokens are opaque random strings handed to the browser in the
//! session cookie. Only their SHA-256 hash is stored; the plaintext never
//! leaves [`SessionToken`] except through [`SessionToken::expose`].

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::types::{SessionId, UserId};

/// Prefix carried by every session token.
pub const SESSION_TOKEN_PREFIX: &str = "ps_";

/// Number of random bytes in a session token.
const SESSION_TOKEN_BYTES: usize = 32;

/// A stored session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
	pub id: SessionId,
	pub user_id: UserId,
	pub created_at: DateTime<Utc>,
	pub last_used_at: DateTime<Utc>,
	pub expires_at: DateTime<Utc>,
}

impl Session {
	/// Creates a session for `user_id` that expires after `ttl`.
	pub fn new(user_id: UserId, ttl: Duration) -> Self {
		let now = Utc::now();
		Self {
			id: SessionId::generate(),
			user_id,
			created_at: now,
			last_used_at: now,
			expires_at: now + ttl,
		}
	}

	/// Returns true if the session is no longer valid at `now`.
	pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
		self.expires_at <= now
	}

	pub fn is_expired(&self) -> bool {
		self.is_expired_at(Utc::now())
	}
}

/// Plaintext session token. Redacted in `Debug`/`Display`, zeroed on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SessionToken(String);

impl SessionToken {
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Generates a fresh random token.
	pub fn generate() -> Self {
		let mut bytes = [0u8; SESSION_TOKEN_BYTES];
		rand::thread_rng().fill_bytes(&mut bytes);
		let token = format!("{SESSION_TOKEN_PREFIX}{}", hex::encode(bytes));
		bytes.zeroize();
		Self(token)
	}

	/// The plaintext value. Only for writing cookies and hashing.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// SHA-256 hash (hex) used as the lookup key in storage.
	pub fn hash(&self) -> String {
		hash_session_token(&self.0)
	}
}

impl fmt::Debug for SessionToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("SessionToken([REDACTED])")
	}
}

impl fmt::Display for SessionToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[REDACTED]")
	}
}

/// Hash a session token for storage.
pub fn hash_session_token(token: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(token.as_bytes());
	hex::encode(hasher.finalize())
}
