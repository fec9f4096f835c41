// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Application state and router assembly.

use axum::{
	middleware,
	routing::{get, patch, post},
	Router,
};
use portal_server_auth::{AccessResolver, AuthConfig};
use portal_server_config::ServerConfig;
use portal_server_db::{ClientRepository, ProfileRepository, SessionRepository};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::{
	access_middleware::{resolve_request_access, RequireRole},
	routes,
};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub pool: SqlitePool,
	pub profile_repo: Arc<ProfileRepository>,
	pub client_repo: Arc<ClientRepository>,
	pub session_repo: Arc<SessionRepository>,
	pub resolver: AccessResolver,
	pub auth_config: AuthConfig,
}

/// Build the runtime auth settings from the loaded configuration.
pub fn auth_config_from(config: &ServerConfig) -> AuthConfig {
	AuthConfig::new()
		.with_session_cookie_name(config.auth.session_cookie_name.clone())
		.with_session_ttl(chrono::Duration::hours(i64::from(
			config.auth.session_ttl_hours,
		)))
		.with_cookie_secure(config.auth.cookie_secure)
		.with_gate_timeout(
			config
				.auth
				.gate_timeout_ms
				.map(std::time::Duration::from_millis),
		)
}

pub fn create_app_state(pool: SqlitePool, config: &ServerConfig) -> AppState {
	let profile_repo = Arc::new(ProfileRepository::new(pool.clone()));
	let client_repo = Arc::new(ClientRepository::new(pool.clone()));
	let session_repo = Arc::new(SessionRepository::new(pool.clone()));

	let resolver = AccessResolver::new(
		session_repo.clone(),
		profile_repo.clone(),
		client_repo.clone(),
	);

	AppState {
		pool,
		profile_repo,
		client_repo,
		session_repo,
		resolver,
		auth_config: auth_config_from(config),
	}
}

/// Assemble every route.
///
/// Page routes guard themselves through their `Guarded<P>` extractor. API
/// routes share one access resolution per request; `/api/admin` adds a role
/// check on top.
pub fn create_router(state: AppState) -> Router {
	let admin_api = Router::new()
		.route(
			"/api/admin/profiles/{user_id}",
			patch(routes::admin::update_profile),
		)
		.route_layer(RequireRole::admin());

	let api = Router::new()
		.route("/api/session", get(routes::session::get_session))
		.merge(admin_api)
		.route_layer(middleware::from_fn_with_state(
			state.clone(),
			resolve_request_access,
		));

	Router::new()
		.route("/", get(routes::pages::landing))
		.route("/app", get(routes::pages::client_home))
		.route("/app/invoices", get(routes::pages::client_invoices))
		.route("/admin", get(routes::pages::staff_home))
		.route("/admin/dashboard", get(routes::pages::staff_dashboard))
		.route("/admin/clients", get(routes::pages::staff_clients))
		.route("/admin/invoices", get(routes::pages::staff_invoices))
		.route("/admin/settings", get(routes::pages::admin_settings))
		.route("/auth/logout", post(routes::session::logout))
		.route("/health", get(routes::health::health_check))
		.merge(api)
		.with_state(state)
}
