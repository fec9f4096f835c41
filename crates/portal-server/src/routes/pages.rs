// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Page handlers.
//!
//! Each handler renders a JSON page shell describing the viewer and the
//! role-scoped data the page would display. Data is only fetched after the
//! `Guarded` extractor has let the request through.

use axum::{
	extract::State,
	http::HeaderMap,
	response::{IntoResponse, Redirect, Response},
	Json,
};
use portal_server_auth::{home_route, ClientId, ResolvedUser, Role, UserId};
use serde::Serialize;
use serde_json::json;

use crate::{
	api::AppState,
	error::ServerError,
	page_guard::{AdminPage, ClientPage, ClientRecordPage, Guarded, StaffPage},
};

#[derive(Debug, Serialize)]
pub struct Viewer {
	pub user_id: UserId,
	pub role: Role,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub client_id: Option<ClientId>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub full_name: Option<String>,
}

impl From<&ResolvedUser> for Viewer {
	fn from(user: &ResolvedUser) -> Self {
		Self {
			user_id: user.user_id,
			role: user.role,
			client_id: user.client_id,
			full_name: user.profile.as_ref().and_then(|p| p.full_name.clone()),
		}
	}
}

#[derive(Debug, Serialize)]
pub struct PageShell {
	pub page: &'static str,
	pub viewer: Option<Viewer>,
	pub data: serde_json::Value,
}

impl PageShell {
	fn for_user(page: &'static str, user: &ResolvedUser, data: serde_json::Value) -> Json<Self> {
		Json(Self {
			page,
			viewer: Some(Viewer::from(user)),
			data,
		})
	}
}

/// GET / - public landing. Authenticated viewers go to their home route.
pub async fn landing(State(state): State<AppState>, headers: HeaderMap) -> Response {
	let ctx = state.auth_config.access_context(&headers);
	match state.resolver.resolve_access(&ctx).await {
		Ok(resolution) => {
			if let Some(role) = resolution.role() {
				let target = home_route(role);
				tracing::debug!(role = %role, redirect_to = target, "landing redirect");
				return Redirect::to(target).into_response();
			}
		}
		Err(e) => {
			tracing::warn!(error = %e, "access resolution failed on landing, rendering anonymous");
		}
	}

	Json(PageShell {
		page: "landing",
		viewer: None,
		data: json!({}),
	})
	.into_response()
}

/// GET /app - client dashboard.
pub async fn client_home(guard: Guarded<ClientPage>) -> Json<PageShell> {
	let user = &guard.user;
	PageShell::for_user(
		"client_dashboard",
		user,
		json!({ "has_client_record": user.client_id.is_some() }),
	)
}

/// GET /app/invoices - invoice list scoped to the viewer's client record.
pub async fn client_invoices(
	State(state): State<AppState>,
	guard: Guarded<ClientRecordPage>,
) -> Result<Json<PageShell>, ServerError> {
	let user = &guard.user;
	let client_id = user
		.client_id
		.ok_or_else(|| ServerError::Internal("guard passed without client record".to_string()))?;
	let client = state
		.client_repo
		.get_client_by_id(&client_id)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("client {client_id}")))?;

	Ok(PageShell::for_user(
		"client_invoices",
		user,
		json!({ "client": { "id": client.id, "name": client.name }, "invoices": [] }),
	))
}

/// GET /admin - staff home.
pub async fn staff_home(guard: Guarded<StaffPage>) -> Json<PageShell> {
	PageShell::for_user("staff_home", &guard.user, json!({}))
}

/// GET /admin/dashboard
pub async fn staff_dashboard(
	State(state): State<AppState>,
	guard: Guarded<StaffPage>,
) -> Result<Json<PageShell>, ServerError> {
	let profiles = state.profile_repo.list_profiles().await?;
	let count = |role: Role| profiles.iter().filter(|p| p.role == role).count();

	Ok(PageShell::for_user(
		"staff_dashboard",
		&guard.user,
		json!({
			"profiles": {
				"admin": count(Role::Admin),
				"team": count(Role::Team),
				"client": count(Role::Client),
			}
		}),
	))
}

/// GET /admin/clients - client management.
pub async fn staff_clients(
	State(state): State<AppState>,
	guard: Guarded<StaffPage>,
) -> Result<Json<PageShell>, ServerError> {
	let clients = state.client_repo.list_clients().await?;
	let clients: Vec<_> = clients
		.into_iter()
		.map(|c| json!({ "id": c.id, "user_id": c.user_id, "name": c.name }))
		.collect();

	Ok(PageShell::for_user(
		"staff_clients",
		&guard.user,
		json!({ "clients": clients }),
	))
}

/// GET /admin/invoices
pub async fn staff_invoices(guard: Guarded<StaffPage>) -> Json<PageShell> {
	PageShell::for_user("staff_invoices", &guard.user, json!({ "invoices": [] }))
}

/// GET /admin/settings - ADMIN only; lists profiles whose role and status can be changed.
pub async fn admin_settings(
	State(state): State<AppState>,
	guard: Guarded<AdminPage>,
) -> Result<Json<PageShell>, ServerError> {
	let profiles = state.profile_repo.list_profiles().await?;
	let profiles: Vec<_> = profiles
		.into_iter()
		.map(|p| {
			json!({
				"user_id": p.user_id,
				"role": p.role,
				"status": p.status,
				"full_name": p.full_name,
				"email": p.email,
			})
		})
		.collect();

	Ok(PageShell::for_user(
		"admin_settings",
		&guard.user,
		json!({ "profiles": profiles }),
	))
}
