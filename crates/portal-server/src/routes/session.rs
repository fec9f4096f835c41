// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Session endpoints.

use axum::{
	extract::State,
	http::{header::SET_COOKIE, HeaderMap},
	response::{IntoResponse, Redirect, Response},
	Extension, Json,
};
use portal_server_auth::{SessionSnapshot, LANDING_ROUTE};

use crate::{
	access_middleware::{unavailable_response, RequestAccess},
	api::AppState,
};

/// GET /api/session - what the role gate fetches on mount.
///
/// Anonymous viewers get an empty snapshot with 200; a backend failure is a
/// 503 so the gate ends in `Failed`.
pub async fn get_session(Extension(access): Extension<RequestAccess>) -> Response {
	match access {
		RequestAccess::Resolved(resolution) => {
			Json(SessionSnapshot::from_resolution(&resolution)).into_response()
		}
		RequestAccess::Unavailable => unavailable_response(),
	}
}

/// POST /auth/logout - end the current session and return to the landing page.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
	let ctx = state.auth_config.access_context(&headers);

	if let Some(token) = ctx.session_token() {
		match state.resolver.auth().sign_out(token).await {
			Ok(true) => tracing::info!("session signed out"),
			Ok(false) => tracing::debug!("logout for unknown session"),
			Err(e) => tracing::warn!(error = %e, "failed to delete session on logout"),
		}
	}

	(
		[(SET_COOKIE, state.auth_config.clear_session_cookie())],
		Redirect::to(LANDING_ROUTE),
	)
		.into_response()
}
