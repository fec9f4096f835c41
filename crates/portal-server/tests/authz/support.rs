// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{
	body::Body,
	http::{
		header::{HeaderName, HeaderValue, LOCATION},
		Method, Request, StatusCode,
	},
	response::Response,
	Router,
};
use portal_server_auth::{ClientRecord, Profile, Role, SessionToken, UserId};
use serde::Serialize;
use tempfile::TempDir;
use tower::ServiceExt;

use portal_server::{create_app_state, create_router, AppState, ServerConfig};

#[derive(Clone)]
pub struct TestUser {
	pub user_id: UserId,
	pub session_token: SessionToken,
}

impl TestUser {
	pub fn auth_header(&self) -> (HeaderName, HeaderValue) {
		(
			HeaderName::from_static("cookie"),
			HeaderValue::from_str(&format!(
				"portal_session={}",
				self.session_token.expose()
			))
			.unwrap(),
		)
	}
}

#[derive(Clone)]
pub struct Fixtures {
	pub admin: TestUser,
	pub team: TestUser,
	/// CLIENT with a linked client record.
	pub client: TestUser,
	/// CLIENT without a client record.
	pub client_no_record: TestUser,
	/// Live session, no profile row.
	pub no_profile: TestUser,
	/// Profile whose stored role is not a known value.
	pub legacy_role: TestUser,
	/// ADMIN profile with status `disabled`.
	pub disabled_admin: TestUser,
}

pub struct TestApp {
	pub router: Router,
	pub fixtures: Fixtures,
	pub state: AppState,
	_temp_dir: TempDir,
}

impl TestApp {
	pub async fn new() -> Self {
		let temp_dir = tempfile::tempdir().unwrap();
		let db_path = temp_dir.path().join("test_authz.db");
		let db_url = format!("sqlite:{}", db_path.display());

		let pool = portal_server_db::create_pool(&db_url, 5).await.unwrap();
		portal_server_db::run_migrations(&pool).await.unwrap();

		let config = ServerConfig::default();
		let state = create_app_state(pool, &config);
		let fixtures = create_fixtures(&state).await;
		let router = create_router(state.clone());

		Self {
			router,
			fixtures,
			state,
			_temp_dir: temp_dir,
		}
	}

	pub async fn get(&self, path: &str, user: Option<&TestUser>) -> Response<Body> {
		self
			.request(Method::GET, path, user, Option::<()>::None)
			.await
	}

	pub async fn post(&self, path: &str, user: Option<&TestUser>) -> Response<Body> {
		self
			.request(Method::POST, path, user, Option::<()>::None)
			.await
	}

	pub async fn patch(
		&self,
		path: &str,
		user: Option<&TestUser>,
		body: impl Serialize,
	) -> Response<Body> {
		self.request(Method::PATCH, path, user, Some(body)).await
	}

	async fn request<T: Serialize>(
		&self,
		method: Method,
		path: &str,
		user: Option<&TestUser>,
		body: Option<T>,
	) -> Response<Body> {
		let mut builder = Request::builder().method(method).uri(path);

		if let Some(test_user) = user {
			let (name, value) = test_user.auth_header();
			builder = builder.header(name, value);
		}

		let request_body = match body {
			Some(b) => {
				builder = builder.header("content-type", "application/json");
				Body::from(serde_json::to_string(&b).unwrap())
			}
			None => Body::empty(),
		};

		let request = builder.body(request_body).unwrap();
		self.router.clone().oneshot(request).await.unwrap()
	}
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> Option<&str> {
	response
		.headers()
		.get(LOCATION)
		.and_then(|v| v.to_str().ok())
}

pub struct AuthzCase {
	pub name: &'static str,
	pub method: Method,
	pub path: String,
	pub user: Option<TestUser>,
	pub body: Option<serde_json::Value>,
	pub expected_status: StatusCode,
	/// Checked only for redirects.
	pub expected_location: Option<&'static str>,
}

impl AuthzCase {
	/// A GET page visit expected to render.
	pub fn renders(name: &'static str, path: &str, user: Option<&TestUser>) -> Self {
		Self {
			name,
			method: Method::GET,
			path: path.to_string(),
			user: user.cloned(),
			body: None,
			expected_status: StatusCode::OK,
			expected_location: None,
		}
	}

	/// A GET page visit expected to redirect to `target`.
	pub fn redirects(
		name: &'static str,
		path: &str,
		user: Option<&TestUser>,
		target: &'static str,
	) -> Self {
		Self {
			name,
			method: Method::GET,
			path: path.to_string(),
			user: user.cloned(),
			body: None,
			expected_status: StatusCode::SEE_OTHER,
			expected_location: Some(target),
		}
	}
}

pub async fn run_authz_cases(app: &TestApp, cases: &[AuthzCase]) {
	for case in cases {
		let response = match (&case.method, &case.body) {
			(m, Some(body)) if *m == Method::PATCH => {
				app
					.patch(&case.path, case.user.as_ref(), body.clone())
					.await
			}
			(m, _) if *m == Method::POST => app.post(&case.path, case.user.as_ref()).await,
			_ => app.get(&case.path, case.user.as_ref()).await,
		};

		let actual_location = location(&response).map(str::to_string);
		if response.status() != case.expected_status
			|| (case.expected_location.is_some()
				&& actual_location.as_deref() != case.expected_location)
		{
			let (parts, body) = response.into_parts();
			let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
			let body_str = String::from_utf8_lossy(&body_bytes);
			panic!(
				"Case '{}': {} {} - expected {} {:?}, got {} {:?}\nResponse body: {}",
				case.name,
				case.method,
				case.path,
				case.expected_status,
				case.expected_location,
				parts.status,
				actual_location,
				body_str
			);
		}
	}
}

async fn create_fixtures(state: &AppState) -> Fixtures {
	let admin = create_test_user(state, Some(Role::Admin), "Admin User").await;
	let team = create_test_user(state, Some(Role::Team), "Team Member").await;

	let client = create_test_user(state, Some(Role::Client), "Client Contact").await;
	state
		.client_repo
		.create_client(&ClientRecord::new(client.user_id, "Acme Ltd"))
		.await
		.unwrap();

	let client_no_record = create_test_user(state, Some(Role::Client), "Prospect").await;
	let no_profile = create_test_user(state, None, "Nobody").await;

	let legacy_role = create_test_user(state, Some(Role::Client), "Legacy").await;
	sqlx::query("UPDATE profiles SET role = 'SUPERUSER' WHERE user_id = ?")
		.bind(legacy_role.user_id.to_string())
		.execute(&state.pool)
		.await
		.unwrap();

	let disabled_admin = create_test_user(state, Some(Role::Admin), "Former Admin").await;
	sqlx::query("UPDATE profiles SET status = 'disabled' WHERE user_id = ?")
		.bind(disabled_admin.user_id.to_string())
		.execute(&state.pool)
		.await
		.unwrap();

	Fixtures {
		admin,
		team,
		client,
		client_no_record,
		no_profile,
		legacy_role,
		disabled_admin,
	}
}

async fn create_test_user(state: &AppState, role: Option<Role>, full_name: &str) -> TestUser {
	let user_id = UserId::generate();

	if let Some(role) = role {
		let profile = Profile::new(user_id, role)
			.with_full_name(full_name)
			.with_email(format!("{}@portal.test", user_id));
		state.profile_repo.create_profile(&profile).await.unwrap();
	}

	let (_, session_token) = state
		.session_repo
		.issue_session(user_id, chrono::Duration::hours(1))
		.await
		.unwrap();

	TestUser {
		user_id,
		session_token,
	}
}
