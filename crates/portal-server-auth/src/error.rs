// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Errors raised while resolving access.

use thiserror::Error;

/// Failure to resolve the current session, profile or client record.
///
/// Guards treat every variant the same way: access is denied.
#[derive(Debug, Error)]
pub enum AccessError {
	/// The session/profile backend failed.
	#[error("access backend error: {0}")]
	Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

	/// The backend answered with something that could not be understood.
	#[error("invalid access backend response: {0}")]
	InvalidResponse(String),

	/// The access check did not complete in time.
	#[error("access check timed out after {0:?}")]
	Timeout(std::time::Duration),
}

impl AccessError {
	/// Wrap a backend error.
	pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
		AccessError::Backend(Box::new(err))
	}
}

pub type Result<T> = std::result::Result<T, AccessError>;
