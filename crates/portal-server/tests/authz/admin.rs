// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization tests for admin API routes.
//!
//! Key invariant: `/api/admin/*` requires the ADMIN role. Anonymous callers
//! get 401, every other role 403.

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::support::{body_json, location, run_authz_cases, AuthzCase, TestApp, TestUser};

fn patch_case(
	name: &'static str,
	target: &str,
	user: Option<&TestUser>,
	body: serde_json::Value,
	expected_status: StatusCode,
) -> AuthzCase {
	AuthzCase {
		name,
		method: Method::PATCH,
		path: format!("/api/admin/profiles/{target}"),
		user: user.cloned(),
		body: Some(body),
		expected_status,
		expected_location: None,
	}
}

#[tokio::test]
async fn only_admin_can_update_profiles() {
	let app = TestApp::new().await;
	let target = app.fixtures.client_no_record.user_id.to_string();
	let body = json!({ "role": "TEAM" });

	let cases = vec![
		patch_case(
			"anonymous_update",
			&target,
			None,
			body.clone(),
			StatusCode::UNAUTHORIZED,
		),
		patch_case(
			"client_update",
			&target,
			Some(&app.fixtures.client),
			body.clone(),
			StatusCode::FORBIDDEN,
		),
		patch_case(
			"team_update",
			&target,
			Some(&app.fixtures.team),
			body.clone(),
			StatusCode::FORBIDDEN,
		),
		patch_case(
			"no_profile_update",
			&target,
			Some(&app.fixtures.no_profile),
			body.clone(),
			StatusCode::FORBIDDEN,
		),
		patch_case(
			"admin_update",
			&target,
			Some(&app.fixtures.admin),
			body,
			StatusCode::OK,
		),
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn denied_requests_get_json_errors() {
	let app = TestApp::new().await;
	let target = app.fixtures.client.user_id;

	let response = app
		.patch(
			&format!("/api/admin/profiles/{target}"),
			None,
			json!({ "role": "ADMIN" }),
		)
		.await;
	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(body_json(response).await["error"], "unauthorized");

	let response = app
		.patch(
			&format!("/api/admin/profiles/{target}"),
			Some(&app.fixtures.team),
			json!({ "role": "ADMIN" }),
		)
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	assert_eq!(body_json(response).await["error"], "forbidden");
}

#[tokio::test]
async fn invalid_updates_are_rejected() {
	let app = TestApp::new().await;
	let admin = Some(&app.fixtures.admin);
	let target = app.fixtures.team.user_id.to_string();
	let unknown = portal_server_auth::UserId::generate().to_string();

	let cases = vec![
		patch_case(
			"unknown_role",
			&target,
			admin,
			json!({ "role": "SUPERUSER" }),
			StatusCode::BAD_REQUEST,
		),
		patch_case(
			"unknown_status",
			&target,
			admin,
			json!({ "status": "banned" }),
			StatusCode::BAD_REQUEST,
		),
		patch_case("empty_update", &target, admin, json!({}), StatusCode::BAD_REQUEST),
		patch_case(
			"malformed_user_id",
			"not-a-uuid",
			admin,
			json!({ "role": "TEAM" }),
			StatusCode::BAD_REQUEST,
		),
		patch_case(
			"unknown_profile",
			&unknown,
			admin,
			json!({ "role": "TEAM" }),
			StatusCode::NOT_FOUND,
		),
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn role_change_takes_effect_on_next_request() {
	let app = TestApp::new().await;
	let team = &app.fixtures.team;

	let response = app.get("/admin/settings", Some(team)).await;
	assert_eq!(response.status(), StatusCode::SEE_OTHER);

	let response = app
		.patch(
			&format!("/api/admin/profiles/{}", team.user_id),
			Some(&app.fixtures.admin),
			json!({ "role": "admin" }),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_json(response).await["role"], "ADMIN");

	let response = app.get("/admin/settings", Some(team)).await;
	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn disabling_a_profile_revokes_its_sessions() {
	let app = TestApp::new().await;
	let client = &app.fixtures.client;

	let response = app.get("/app", Some(client)).await;
	assert_eq!(response.status(), StatusCode::OK);

	let response = app
		.patch(
			&format!("/api/admin/profiles/{}", client.user_id),
			Some(&app.fixtures.admin),
			json!({ "status": "disabled" }),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(body_json(response).await["status"], "disabled");

	let response = app.get("/app", Some(client)).await;
	assert_eq!(response.status(), StatusCode::SEE_OTHER);
	assert_eq!(location(&response), Some("/"));
}

#[tokio::test]
async fn backend_failure_is_service_unavailable() {
	let app = TestApp::new().await;
	app.state.pool.close().await;

	let response = app
		.patch(
			&format!("/api/admin/profiles/{}", app.fixtures.team.user_id),
			Some(&app.fixtures.admin),
			json!({ "role": "ADMIN" }),
		)
		.await;
	assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
	assert_eq!(body_json(response).await["error"], "service_unavailable");
}
