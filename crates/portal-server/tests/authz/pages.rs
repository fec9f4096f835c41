// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server guard tests for page routes.
//!
//! Key invariant: a page renders iff the viewer's role is in its allow-list
//! (plus a client record for client-scoped pages). Anything else is a
//! `303` before any data is fetched.

use axum::http::StatusCode;

use super::support::{body_json, location, AuthzCase, TestApp};

const STAFF_PAGES: &[&str] = &[
	"/admin",
	"/admin/dashboard",
	"/admin/clients",
	"/admin/invoices",
];

#[tokio::test]
async fn anonymous_is_sent_to_landing() {
	let app = TestApp::new().await;

	let mut cases: Vec<AuthzCase> = ["/app", "/app/invoices", "/admin/settings"]
		.iter()
		.chain(STAFF_PAGES)
		.map(|path| AuthzCase::redirects("anonymous_page_visit", path, None, "/"))
		.collect();
	cases.push(AuthzCase::renders("anonymous_landing", "/", None));

	super::support::run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn admin_reaches_every_staff_page() {
	let app = TestApp::new().await;
	let admin = &app.fixtures.admin;

	let mut cases: Vec<AuthzCase> = STAFF_PAGES
		.iter()
		.map(|path| AuthzCase::renders("admin_staff_page", path, Some(admin)))
		.collect();
	cases.push(AuthzCase::renders(
		"admin_settings",
		"/admin/settings",
		Some(admin),
	));

	super::support::run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn team_reaches_staff_pages_but_not_settings() {
	let app = TestApp::new().await;
	let team = &app.fixtures.team;

	let mut cases: Vec<AuthzCase> = STAFF_PAGES
		.iter()
		.map(|path| AuthzCase::renders("team_staff_page", path, Some(team)))
		.collect();
	cases.push(AuthzCase::redirects(
		"team_settings",
		"/admin/settings",
		Some(team),
		"/",
	));

	super::support::run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn staff_on_client_pages_land_on_admin_home() {
	let app = TestApp::new().await;

	for user in [&app.fixtures.admin, &app.fixtures.team] {
		let response = app.get("/app", Some(user)).await;
		assert_eq!(response.status(), StatusCode::SEE_OTHER);
		assert_eq!(location(&response), Some("/"));

		let response = app.get("/", Some(user)).await;
		assert_eq!(response.status(), StatusCode::SEE_OTHER);
		assert_eq!(location(&response), Some("/admin"));
	}
}

#[tokio::test]
async fn client_with_record() {
	let app = TestApp::new().await;
	let client = &app.fixtures.client;

	let mut cases = vec![
		AuthzCase::renders("client_dashboard", "/app", Some(client)),
		AuthzCase::renders("client_invoices", "/app/invoices", Some(client)),
		AuthzCase::redirects("client_landing", "/", Some(client), "/app"),
		AuthzCase::redirects("client_settings", "/admin/settings", Some(client), "/"),
	];
	cases.extend(
		STAFF_PAGES
			.iter()
			.map(|path| AuthzCase::redirects("client_staff_page", path, Some(client), "/")),
	);

	super::support::run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn client_without_record_is_sent_to_app() {
	let app = TestApp::new().await;
	let prospect = &app.fixtures.client_no_record;

	let cases = vec![
		AuthzCase::renders("prospect_dashboard", "/app", Some(prospect)),
		AuthzCase::redirects("prospect_invoices", "/app/invoices", Some(prospect), "/app"),
	];

	super::support::run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn missing_or_unknown_role_is_treated_as_client() {
	let app = TestApp::new().await;

	for user in [&app.fixtures.no_profile, &app.fixtures.legacy_role] {
		let cases = vec![
			AuthzCase::renders("default_role_dashboard", "/app", Some(user)),
			AuthzCase::redirects("default_role_staff", "/admin/dashboard", Some(user), "/"),
			AuthzCase::redirects("default_role_settings", "/admin/settings", Some(user), "/"),
			AuthzCase::redirects("default_role_invoices", "/app/invoices", Some(user), "/app"),
		];
		super::support::run_authz_cases(&app, &cases).await;
	}
}

#[tokio::test]
async fn disabled_profile_is_treated_as_anonymous() {
	let app = TestApp::new().await;
	let disabled = &app.fixtures.disabled_admin;

	let mut cases: Vec<AuthzCase> = ["/admin/settings", "/app"]
		.iter()
		.chain(STAFF_PAGES)
		.map(|path| AuthzCase::redirects("disabled_page_visit", path, Some(disabled), "/"))
		.collect();
	cases.push(AuthzCase::renders("disabled_landing", "/", Some(disabled)));

	super::support::run_authz_cases(&app, &cases).await;

	let body = body_json(app.get("/api/session", Some(disabled)).await).await;
	assert!(body["user_id"].is_null());
}

#[tokio::test]
async fn invalid_session_cookie_is_anonymous() {
	let app = TestApp::new().await;
	let mut forged = app.fixtures.admin.clone();
	forged.session_token = portal_server_auth::SessionToken::new("ps_forged");

	let cases = vec![AuthzCase::redirects(
		"forged_token",
		"/admin",
		Some(&forged),
		"/",
	)];

	super::support::run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn backend_failure_fails_closed() {
	let app = TestApp::new().await;
	app.state.pool.close().await;

	let response = app.get("/admin", Some(&app.fixtures.admin)).await;
	assert_eq!(response.status(), StatusCode::SEE_OTHER);
	assert_eq!(location(&response), Some("/"));

	let response = app.get("/", Some(&app.fixtures.admin)).await;
	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn page_shell_describes_viewer() {
	let app = TestApp::new().await;
	let client = &app.fixtures.client;

	let response = app.get("/app/invoices", Some(client)).await;
	assert_eq!(response.status(), StatusCode::OK);

	let body = body_json(response).await;
	assert_eq!(body["page"], "client_invoices");
	assert_eq!(body["viewer"]["role"], "CLIENT");
	assert_eq!(body["viewer"]["user_id"], client.user_id.to_string());
	assert_eq!(body["viewer"]["full_name"], "Client Contact");
	assert_eq!(body["data"]["client"]["name"], "Acme Ltd");
	assert_eq!(
		body["viewer"]["client_id"],
		body["data"]["client"]["id"]
	);
}

#[tokio::test]
async fn staff_clients_lists_client_records() {
	let app = TestApp::new().await;

	let response = app.get("/admin/clients", Some(&app.fixtures.team)).await;
	assert_eq!(response.status(), StatusCode::OK);

	let body = body_json(response).await;
	let clients = body["data"]["clients"].as_array().unwrap();
	assert_eq!(clients.len(), 1);
	assert_eq!(clients[0]["name"], "Acme Ltd");
	assert!(body["viewer"].get("client_id").is_none());
}
