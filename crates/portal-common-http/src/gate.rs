// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Role gate backend over HTTP.

use async_trait::async_trait;
use portal_server_auth::{AccessError, GateBackend, SessionSnapshot, SessionToken};
use reqwest::header::COOKIE;
use reqwest::Client;

/// Path of the session snapshot endpoint.
pub const SESSION_ENDPOINT: &str = "/api/session";

/// Fetches [`SessionSnapshot`]s from `GET {base_url}/api/session`,
/// forwarding the browser's session cookie.
#[derive(Clone)]
pub struct HttpGateBackend {
	client: Client,
	session_url: String,
	cookie: Option<String>,
}

impl std::fmt::Debug for HttpGateBackend {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HttpGateBackend")
			.field("session_url", &self.session_url)
			.field("has_session", &self.cookie.is_some())
			.finish()
	}
}

impl HttpGateBackend {
	pub fn new(client: Client, base_url: &str) -> Self {
		Self {
			client,
			session_url: format!("{}{SESSION_ENDPOINT}", base_url.trim_end_matches('/')),
			cookie: None,
		}
	}

	/// Send `token` as the `cookie_name` cookie.
	pub fn with_session(mut self, cookie_name: &str, token: &SessionToken) -> Self {
		self.cookie = Some(format!("{cookie_name}={}", token.expose()));
		self
	}

	pub fn session_url(&self) -> &str {
		&self.session_url
	}
}

#[async_trait]
impl GateBackend for HttpGateBackend {
	#[tracing::instrument(skip(self), fields(url = %self.session_url))]
	async fn fetch_session(&self) -> Result<SessionSnapshot, AccessError> {
		let mut request = self.client.get(&self.session_url);
		if let Some(cookie) = &self.cookie {
			request = request.header(COOKIE, cookie);
		}

		let response = request.send().await.map_err(AccessError::backend)?;
		let status = response.status();
		if !status.is_success() {
			tracing::warn!(%status, "session endpoint returned an error");
			return Err(AccessError::InvalidResponse(format!(
				"unexpected status {status}"
			)));
		}

		response
			.json::<SessionSnapshot>()
			.await
			.map_err(|e| AccessError::InvalidResponse(e.to_string()))
	}
}
