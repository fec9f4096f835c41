// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server-side access guard.
//!
//! Runs before a server-rendered page fetches any data. It resolves the
//! request's session through the shared policy and either lets the page
//! proceed with the resolution or names the route to redirect to.
//!
//! Redirect rules:
//!
//! | denial                  | target |
//! |-------------------------|--------|
//! | unauthenticated         | `/`    |
//! | role mismatch           | `/`    |
//! | missing client record   | `/app` |
//! | backend failure         | `/`    |

use tracing::instrument;

use crate::policy::{
	authorize, AccessContext, AccessRequirement, AccessResolution, AccessResolver, Denial,
	CLIENT_HOME_ROUTE, LANDING_ROUTE,
};

/// Result of running the server guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
	/// Access granted; the page may fetch role-scoped data.
	Proceed(AccessResolution),
	/// Access refused; redirect before rendering anything.
	Redirect {
		target: &'static str,
		denial: Option<Denial>,
	},
}

impl GuardOutcome {
	pub fn redirect_target(&self) -> Option<&'static str> {
		match self {
			GuardOutcome::Proceed(_) => None,
			GuardOutcome::Redirect { target, .. } => Some(*target),
		}
	}
}

/// Where the server guard sends a denied request.
pub fn server_redirect(denial: Denial) -> &'static str {
	match denial {
		Denial::Unauthenticated | Denial::RoleMismatch { .. } => LANDING_ROUTE,
		Denial::MissingClient => CLIENT_HOME_ROUTE,
	}
}

/// Check `requirement` for the request described by `ctx`. Fails closed.
#[instrument(skip(resolver, ctx), fields(roles = ?requirement.allowed_roles()))]
pub async fn guard_page(
	resolver: &AccessResolver,
	ctx: &AccessContext,
	requirement: &AccessRequirement,
) -> GuardOutcome {
	let resolution = match resolver.resolve_access(ctx).await {
		Ok(resolution) => resolution,
		Err(e) => {
			tracing::warn!(error = %e, redirect_to = LANDING_ROUTE, "access resolution failed, denying");
			return GuardOutcome::Redirect {
				target: LANDING_ROUTE,
				denial: None,
			};
		}
	};

	match authorize(&resolution, requirement) {
		Ok(()) => {
			tracing::debug!(user_id = ?resolution.user_id(), "server guard passed");
			GuardOutcome::Proceed(resolution)
		}
		Err(denial) => {
			let target = server_redirect(denial);
			tracing::info!(
				user_id = ?resolution.user_id(),
				reason = %denial,
				redirect_to = target,
				"server guard redirect"
			);
			GuardOutcome::Redirect {
				target,
				denial: Some(denial),
			}
		}
	}
}
