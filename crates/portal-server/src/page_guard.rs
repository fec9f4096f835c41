// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Server-side access guard as an axum extractor.
//!
//! A page handler that takes `Guarded<P>` cannot run unless the viewer
//! satisfies `P::REQUIREMENT`; otherwise extraction fails with a
//! `303 See Other` to the route chosen by
//! [`portal_server_auth::guard::server_redirect`].

use axum::{extract::FromRequestParts, http::request::Parts, response::Redirect};
use portal_server_auth::{
	guard_page, AccessRequirement, AccessResolution, GuardOutcome, ResolvedUser, LANDING_ROUTE,
};
use std::marker::PhantomData;

use crate::api::AppState;

/// Names the requirement a page enforces.
pub trait PagePolicy: Send + Sync + 'static {
	const PAGE: &'static str;
	const REQUIREMENT: AccessRequirement;
}

/// CLIENT pages that work without a client record.
pub struct ClientPage;

impl PagePolicy for ClientPage {
	const PAGE: &'static str = "client";
	const REQUIREMENT: AccessRequirement = AccessRequirement::CLIENT;
}

/// CLIENT pages scoped to the linked client record.
pub struct ClientRecordPage;

impl PagePolicy for ClientRecordPage {
	const PAGE: &'static str = "client_record";
	const REQUIREMENT: AccessRequirement = AccessRequirement::CLIENT_WITH_RECORD;
}

/// Pages for ADMIN and TEAM.
pub struct StaffPage;

impl PagePolicy for StaffPage {
	const PAGE: &'static str = "staff";
	const REQUIREMENT: AccessRequirement = AccessRequirement::STAFF;
}

/// ADMIN-only pages.
pub struct AdminPage;

impl PagePolicy for AdminPage {
	const PAGE: &'static str = "admin";
	const REQUIREMENT: AccessRequirement = AccessRequirement::ADMIN;
}

/// A viewer that passed the server guard for `P`.
pub struct Guarded<P> {
	pub user: ResolvedUser,
	_policy: PhantomData<fn() -> P>,
}

impl<P> Guarded<P> {
	pub fn into_resolution(self) -> AccessResolution {
		AccessResolution::authenticated(self.user)
	}
}

impl<P: PagePolicy> FromRequestParts<AppState> for Guarded<P> {
	type Rejection = Redirect;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let ctx = state.auth_config.access_context(&parts.headers);

		match guard_page(&state.resolver, &ctx, &P::REQUIREMENT).await {
			GuardOutcome::Proceed(AccessResolution { user: Some(user) }) => Ok(Self {
				user,
				_policy: PhantomData,
			}),
			GuardOutcome::Proceed(_) => Err(Redirect::to(LANDING_ROUTE)),
			GuardOutcome::Redirect { target, .. } => {
				tracing::debug!(page = P::PAGE, path = %parts.uri.path(), redirect_to = target, "page guard rejected request");
				Err(Redirect::to(target))
			}
		}
	}
}
