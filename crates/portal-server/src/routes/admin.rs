// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Admin settings actions.

use axum::{
	extract::{Path, State},
	Extension, Json,
};
use portal_server_auth::{Profile, ProfileStatus, Role, UserId};
use serde::Deserialize;
use uuid::Uuid;

use crate::{access_middleware::RequestAccess, api::AppState, error::ServerError};

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
	pub role: Option<String>,
	pub status: Option<String>,
}

/// PATCH /api/admin/profiles/{user_id}
///
/// Changes the role and/or status of a profile. Disabling a profile revokes
/// all of its sessions.
#[tracing::instrument(skip_all, fields(target_user = %user_id))]
pub async fn update_profile(
	State(state): State<AppState>,
	Extension(access): Extension<RequestAccess>,
	Path(user_id): Path<String>,
	Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, ServerError> {
	let user_id = Uuid::parse_str(&user_id)
		.map(UserId::new)
		.map_err(|_| ServerError::BadRequest(format!("invalid user id: {user_id}")))?;

	if body.role.is_none() && body.status.is_none() {
		return Err(ServerError::BadRequest(
			"at least one of role or status is required".to_string(),
		));
	}

	let role = body
		.role
		.as_deref()
		.map(|raw| Role::parse(raw).ok_or_else(|| ServerError::BadRequest(format!("unknown role: {raw}"))))
		.transpose()?;

	let status = body
		.status
		.as_deref()
		.map(|raw| match ProfileStatus::parse(raw) {
			ProfileStatus::Unknown => Err(ServerError::BadRequest(format!("unknown status: {raw}"))),
			status => Ok(status),
		})
		.transpose()?;

	let revoked = state
		.profile_repo
		.apply_admin_update(&user_id, role, status)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("profile {user_id}")))?;
	if revoked > 0 {
		tracing::info!(revoked, "revoked sessions of disabled profile");
	}

	let profile = state
		.profile_repo
		.get_profile(&user_id)
		.await?
		.ok_or_else(|| ServerError::NotFound(format!("profile {user_id}")))?;

	tracing::info!(
		actor = ?access.resolution().and_then(|r| r.user_id()),
		role = %profile.role,
		status = %profile.status,
		"profile updated by admin"
	);

	Ok(Json(profile))
}
