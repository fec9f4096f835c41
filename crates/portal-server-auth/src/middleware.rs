// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request plumbing for the access layer.
//!
//! This module provides:
//! - [`AuthConfig`] - cookie and session settings
//! - Helpers for extracting the session cookie into an [`AccessContext`]
//! - Helpers for writing and clearing the session cookie
//!
//! # Security Notes
//!
//! - The session cookie is HttpOnly and SameSite=Lax; Secure unless disabled
//! - Token values are never logged

use chrono::Duration;
use http::header::COOKIE;
use http::HeaderMap;
use std::sync::Arc;
use tracing::instrument;

use crate::gate::{GateBackend, RoleGate};
use crate::policy::{AccessContext, AccessRequirement};
use crate::session::SessionToken;

/// Default name for the session cookie.
pub const SESSION_COOKIE_NAME: &str = "portal_session";

/// Default session lifetime.
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 168;

/// Configuration for session handling.
#[derive(Debug, Clone)]
pub struct AuthConfig {
	/// Name of the session cookie.
	pub session_cookie_name: String,
	/// Lifetime of newly issued sessions.
	pub session_ttl: Duration,
	/// Mark the cookie `Secure`.
	pub cookie_secure: bool,
	/// Upper bound on a client role gate check. `None` waits indefinitely.
	pub gate_timeout: Option<std::time::Duration>,
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			session_cookie_name: SESSION_COOKIE_NAME.to_string(),
			session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
			cookie_secure: true,
			gate_timeout: None,
		}
	}
}

impl AuthConfig {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set the session cookie name.
	pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
		self.session_cookie_name = name.into();
		self
	}

	pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
		self.session_ttl = ttl;
		self
	}

	pub fn with_cookie_secure(mut self, secure: bool) -> Self {
		self.cookie_secure = secure;
		self
	}

	pub fn with_gate_timeout(mut self, timeout: Option<std::time::Duration>) -> Self {
		self.gate_timeout = timeout;
		self
	}

	/// A role gate for `requirement` that gives up after [`AuthConfig::gate_timeout`].
	pub fn role_gate<B>(&self, backend: Arc<B>, requirement: AccessRequirement) -> RoleGate<B>
	where
		B: GateBackend + ?Sized + 'static,
	{
		let gate = RoleGate::new(backend, requirement);
		match self.gate_timeout {
			Some(timeout) => gate.with_timeout(timeout),
			None => gate,
		}
	}

	/// Build the request-scoped access context from request headers.
	#[instrument(level = "trace", skip_all)]
	pub fn access_context(&self, headers: &HeaderMap) -> AccessContext {
		AccessContext::from_cookie_value(extract_session_cookie_with_name(
			headers,
			&self.session_cookie_name,
		))
	}

	/// `Set-Cookie` value carrying `token`.
	pub fn session_cookie(&self, token: &SessionToken) -> String {
		let mut cookie = format!(
			"{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
			self.session_cookie_name,
			token.expose(),
			self.session_ttl.num_seconds()
		);
		if self.cookie_secure {
			cookie.push_str("; Secure");
		}
		cookie
	}

	/// `Set-Cookie` value that removes the session cookie.
	pub fn clear_session_cookie(&self) -> String {
		let mut cookie = format!(
			"{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
			self.session_cookie_name
		);
		if self.cookie_secure {
			cookie.push_str("; Secure");
		}
		cookie
	}
}

/// Extract session token from the Cookie header.
///
/// Parses the Cookie header to find the session cookie (default: `portal_session`).
pub fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
	extract_session_cookie_with_name(headers, SESSION_COOKIE_NAME)
}

/// Extract session token from the Cookie header with a custom cookie name.
///
/// # Returns
///
/// The session token value if found, or `None` if the cookie is not present.
pub fn extract_session_cookie_with_name(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
	headers
		.get_all(COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(|value| value.split(';'))
		.find_map(|cookie| {
			let cookie = cookie.trim();
			let (name, value) = cookie.split_once('=')?;

			if name == cookie_name {
				Some(value.to_string())
			} else {
				None
			}
		})
}
