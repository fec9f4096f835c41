// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Access resolution and role checks for JSON API routes.
//!
//! # Architecture
//!
//! 1. [`resolve_request_access`] resolves the session cookie once per request
//!    and stores a [`RequestAccess`] in the request extensions.
//! 2. [`RequireRole`] is a route layer that reads it and rejects requests
//!    whose resolution does not satisfy an [`AccessRequirement`].
//!
//! # Security Properties
//!
//! - Unauthenticated requests are rejected with 401 Unauthorized
//! - Role mismatches and missing client records are rejected with 403 Forbidden
//! - A failed resolution is rejected with 503; nothing is let through
//! - Decisions are logged with user_id and reason, never the token
//!
//! # Example
//!
//! ```ignore
//! Router::new()
//!     .route("/api/admin/profiles/{user_id}", patch(update_profile))
//!     .route_layer(RequireRole::admin());
//! ```

use axum::{
	body::Body,
	extract::{Request, State},
	http::StatusCode,
	middleware::Next,
	response::{IntoResponse, Response},
	Json,
};
use pin_project_lite::pin_project;
use portal_server_auth::{authorize, AccessRequirement, AccessResolution, Denial};
use std::{
	future::Future,
	pin::Pin,
	task::{Context, Poll},
};
use tower::{Layer, Service};

use crate::api::AppState;
use crate::error::{ErrorResponse, ServerError};

/// Outcome of resolving the current request's session.
#[derive(Debug, Clone)]
pub enum RequestAccess {
	Resolved(AccessResolution),
	/// The access backend failed; treat as denied.
	Unavailable,
}

impl RequestAccess {
	pub fn resolution(&self) -> Option<&AccessResolution> {
		match self {
			RequestAccess::Resolved(resolution) => Some(resolution),
			RequestAccess::Unavailable => None,
		}
	}
}

/// Middleware that resolves access for the request and stores the
/// [`AccessContext`](portal_server_auth::AccessContext) and [`RequestAccess`]
/// as extensions.
pub async fn resolve_request_access(
	State(state): State<AppState>,
	mut req: Request,
	next: Next,
) -> Response {
	let ctx = state.auth_config.access_context(req.headers());
	let access = match state.resolver.resolve_access(&ctx).await {
		Ok(resolution) => RequestAccess::Resolved(resolution),
		Err(e) => {
			tracing::warn!(error = %e, "access resolution failed");
			RequestAccess::Unavailable
		}
	};

	req.extensions_mut().insert(ctx);
	req.extensions_mut().insert(access);
	next.run(req).await
}

/// Route layer that requires the resolved viewer to satisfy an [`AccessRequirement`].
#[derive(Clone)]
pub struct RequireRole {
	requirement: AccessRequirement,
}

impl RequireRole {
	pub fn new(requirement: AccessRequirement) -> Self {
		Self { requirement }
	}

	/// Require the ADMIN role.
	pub fn admin() -> Self {
		Self::new(AccessRequirement::ADMIN)
	}
}

impl<S> Layer<S> for RequireRole {
	type Service = RequireRoleService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RequireRoleService {
			inner,
			requirement: self.requirement.clone(),
		}
	}
}

/// Service wrapper for [`RequireRole`] layer.
#[derive(Clone)]
pub struct RequireRoleService<S> {
	inner: S,
	requirement: AccessRequirement,
}

impl<S> Service<Request<Body>> for RequireRoleService<S>
where
	S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
	S::Future: Send,
{
	type Response = Response;
	type Error = S::Error;
	type Future = RequireRoleFuture<S::Future>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		let access = req
			.extensions()
			.get::<RequestAccess>()
			.cloned()
			.unwrap_or(RequestAccess::Unavailable);

		let Some(resolution) = access.resolution() else {
			tracing::warn!(
				roles = ?self.requirement.allowed_roles(),
				"Role check denied: access unavailable"
			);
			return RequireRoleFuture::Rejected {
				resp: Some(unavailable_response()),
			};
		};

		match authorize(resolution, &self.requirement) {
			Ok(()) => {
				tracing::debug!(user_id = ?resolution.user_id(), "Role check passed");
				RequireRoleFuture::Inner {
					fut: self.inner.call(req),
				}
			}
			Err(Denial::Unauthenticated) => {
				tracing::debug!(
					roles = ?self.requirement.allowed_roles(),
					"Role check denied: not authenticated"
				);
				RequireRoleFuture::Rejected {
					resp: Some(unauthorized_response()),
				}
			}
			Err(denial) => {
				tracing::info!(
					user_id = ?resolution.user_id(),
					roles = ?self.requirement.allowed_roles(),
					reason = %denial,
					"Role check denied: insufficient privileges"
				);
				RequireRoleFuture::Rejected {
					resp: Some(forbidden_response()),
				}
			}
		}
	}
}

pin_project! {
	/// Future for [`RequireRoleService`].
	#[project = RequireRoleFutureProj]
	pub enum RequireRoleFuture<F> {
		Inner { #[pin] fut: F },
		Rejected { resp: Option<Response> },
	}
}

impl<F, E> Future for RequireRoleFuture<F>
where
	F: Future<Output = Result<Response, E>>,
{
	type Output = Result<Response, E>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		match self.project() {
			RequireRoleFutureProj::Inner { fut } => fut.poll(cx),
			RequireRoleFutureProj::Rejected { resp } => {
				Poll::Ready(Ok(resp.take().unwrap_or_else(unavailable_response)))
			}
		}
	}
}

fn unauthorized_response() -> Response {
	ServerError::Unauthorized("Authentication required".to_string()).into_response()
}

fn forbidden_response() -> Response {
	ServerError::Forbidden("Insufficient permissions".to_string()).into_response()
}

pub(crate) fn unavailable_response() -> Response {
	(
		StatusCode::SERVICE_UNAVAILABLE,
		Json(ErrorResponse::new(
			"service_unavailable",
			"Access could not be resolved",
		)),
	)
		.into_response()
}
