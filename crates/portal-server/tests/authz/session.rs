// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session endpoint tests: `/api/session`, logout and expiry.

use axum::http::{header::SET_COOKIE, StatusCode};
use chrono::Utc;
use portal_server_auth::{Session, SessionToken};

use super::support::{body_json, location, TestApp, TestUser};

#[tokio::test]
async fn anonymous_snapshot_is_empty() {
	let app = TestApp::new().await;

	let response = app.get("/api/session", None).await;
	assert_eq!(response.status(), StatusCode::OK);

	let body = body_json(response).await;
	assert!(body["user_id"].is_null());
	assert!(body["role"].is_null());
	assert!(body["client_id"].is_null());
}

#[tokio::test]
async fn snapshot_reports_role_and_client() {
	let app = TestApp::new().await;

	let body = body_json(app.get("/api/session", Some(&app.fixtures.admin)).await).await;
	assert_eq!(body["role"], "ADMIN");
	assert_eq!(body["user_id"], app.fixtures.admin.user_id.to_string());
	assert!(body["client_id"].is_null());

	let body = body_json(app.get("/api/session", Some(&app.fixtures.client)).await).await;
	assert_eq!(body["role"], "CLIENT");
	assert!(body["client_id"].is_string());

	let body = body_json(app.get("/api/session", Some(&app.fixtures.no_profile)).await).await;
	assert_eq!(body["role"], "CLIENT");
}

#[tokio::test]
async fn snapshot_fails_when_backend_is_down() {
	let app = TestApp::new().await;
	app.state.pool.close().await;

	let response = app.get("/api/session", Some(&app.fixtures.admin)).await;
	assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn logout_revokes_session_and_clears_cookie() {
	let app = TestApp::new().await;
	let client = &app.fixtures.client;

	let response = app.post("/auth/logout", Some(client)).await;
	assert_eq!(response.status(), StatusCode::SEE_OTHER);
	assert_eq!(location(&response), Some("/"));

	let cookie = response
		.headers()
		.get(SET_COOKIE)
		.and_then(|v| v.to_str().ok())
		.unwrap();
	assert!(cookie.starts_with("portal_session=;"));
	assert!(cookie.contains("Max-Age=0"));

	let response = app.get("/app", Some(client)).await;
	assert_eq!(response.status(), StatusCode::SEE_OTHER);
	assert_eq!(location(&response), Some("/"));
}

#[tokio::test]
async fn anonymous_logout_still_redirects() {
	let app = TestApp::new().await;

	let response = app.post("/auth/logout", None).await;
	assert_eq!(response.status(), StatusCode::SEE_OTHER);
	assert_eq!(location(&response), Some("/"));
}

#[tokio::test]
async fn expired_session_is_anonymous() {
	let app = TestApp::new().await;

	let mut session = Session::new(app.fixtures.admin.user_id, chrono::Duration::hours(1));
	session.expires_at = Utc::now() - chrono::Duration::seconds(1);
	let token = SessionToken::generate();
	app
		.state
		.session_repo
		.create_session(&session, &token.hash())
		.await
		.unwrap();

	let expired = TestUser {
		user_id: app.fixtures.admin.user_id,
		session_token: token,
	};

	let response = app.get("/admin", Some(&expired)).await;
	assert_eq!(response.status(), StatusCode::SEE_OTHER);
	assert_eq!(location(&response), Some("/"));

	let body = body_json(app.get("/api/session", Some(&expired)).await).await;
	assert!(body["user_id"].is_null());
}

#[tokio::test]
async fn health_reports_database_state() {
	let app = TestApp::new().await;

	let response = app.get("/health", None).await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_json(response).await["status"], "healthy");

	app.state.pool.close().await;
	let response = app.get("/health", None).await;
	assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
