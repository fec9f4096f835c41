// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for the portal.
//!
//! This crate provides:
//! - A pre-configured HTTP client with consistent User-Agent header
//! - [`HttpGateBackend`], which lets a role gate re-resolve the session
//!   against a running portal server

mod client;
mod gate;

pub use client::{builder, new_client, user_agent};
pub use gate::{HttpGateBackend, SESSION_ENDPOINT};
