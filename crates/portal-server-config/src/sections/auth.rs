// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session and access-gate configuration.

use serde::Deserialize;

const DEFAULT_SESSION_COOKIE_NAME: &str = "portal_session";
const DEFAULT_SESSION_TTL_HOURS: u32 = 168;
const DEFAULT_SESSION_CLEANUP_INTERVAL_SECS: u64 = 3600;
const DEFAULT_ENVIRONMENT: &str = "development";

#[derive(Debug, Clone, PartialEq)]
pub struct AuthConfig {
	pub session_cookie_name: String,
	pub session_ttl_hours: u32,
	pub cookie_secure: bool,
	/// Upper bound on a client role gate check; `None` waits indefinitely.
	pub gate_timeout_ms: Option<u64>,
	pub environment: String,
	pub session_cleanup_interval_secs: u64,
}

impl AuthConfig {
	pub fn is_production(&self) -> bool {
		self.environment.eq_ignore_ascii_case("production")
	}
}

impl Default for AuthConfig {
	fn default() -> Self {
		AuthConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub session_cookie_name: Option<String>,
	#[serde(default)]
	pub session_ttl_hours: Option<u32>,
	#[serde(default)]
	pub cookie_secure: Option<bool>,
	#[serde(default)]
	pub gate_timeout_ms: Option<u64>,
	#[serde(default)]
	pub environment: Option<String>,
	#[serde(default)]
	pub session_cleanup_interval_secs: Option<u64>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.session_cookie_name.is_some() {
			self.session_cookie_name = other.session_cookie_name;
		}
		if other.session_ttl_hours.is_some() {
			self.session_ttl_hours = other.session_ttl_hours;
		}
		if other.cookie_secure.is_some() {
			self.cookie_secure = other.cookie_secure;
		}
		if other.gate_timeout_ms.is_some() {
			self.gate_timeout_ms = other.gate_timeout_ms;
		}
		if other.environment.is_some() {
			self.environment = other.environment;
		}
		if other.session_cleanup_interval_secs.is_some() {
			self.session_cleanup_interval_secs = other.session_cleanup_interval_secs;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		AuthConfig {
			session_cookie_name: self
				.session_cookie_name
				.unwrap_or_else(|| DEFAULT_SESSION_COOKIE_NAME.to_string()),
			session_ttl_hours: self.session_ttl_hours.unwrap_or(DEFAULT_SESSION_TTL_HOURS),
			cookie_secure: self.cookie_secure.unwrap_or(true),
			// Zero disables the timeout.
			gate_timeout_ms: self.gate_timeout_ms.filter(|ms| *ms > 0),
			environment: self
				.environment
				.unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
			session_cleanup_interval_secs: self
				.session_cleanup_interval_secs
				.unwrap_or(DEFAULT_SESSION_CLEANUP_INTERVAL_SECS),
		}
	}
}
