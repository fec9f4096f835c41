// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Portal server binary.

use clap::{Parser, Subcommand};
use portal_server::{create_app_state, create_router, jobs::SessionCleanupJob};
use portal_server_auth::UserId;
use portal_server_config::{LogFormat, ServerConfig};
use portal_server_db::SessionRepository;
use std::path::PathBuf;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod version;

/// Portal server - role-gated client and staff portal.
#[derive(Parser, Debug)]
#[command(name = "portal-server", about = "Role-gated portal server", version)]
struct Args {
	/// Configuration file (defaults to /etc/portal/server.toml)
	#[arg(long, env = "PORTAL_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
	/// Issue a session token for an existing profile
	IssueSession {
		#[arg(long)]
		user_id: uuid::Uuid,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => portal_server_config::load_config_with_file(path)?,
		None => portal_server_config::load_config()?,
	};

	init_tracing(&config);

	let pool = portal_server_db::create_pool(
		&config.database.url,
		config.database.max_connections,
	)
	.await?;
	portal_server_db::run_migrations(&pool).await?;

	if let Some(Command::IssueSession { user_id }) = args.command {
		return issue_session(pool, &config, UserId::new(user_id)).await;
	}

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		environment = %config.auth.environment,
		"starting portal-server"
	);

	let state = create_app_state(pool.clone(), &config);

	let cleanup = SessionCleanupJob::new(SessionRepository::new(pool.clone())).spawn(
		Duration::from_secs(config.auth.session_cleanup_interval_secs.max(1)),
	);

	let app = create_router(state).layer(TraceLayer::new_for_http());

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	cleanup.abort();
	pool.close().await;
	tracing::info!("Server shutdown complete");
	Ok(())
}

fn init_tracing(config: &ServerConfig) {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());

	let registry = tracing_subscriber::registry().with(filter);
	match config.logging.format {
		LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
		LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
	}
}

async fn issue_session(
	pool: sqlx::SqlitePool,
	config: &ServerConfig,
	user_id: UserId,
) -> Result<(), Box<dyn std::error::Error>> {
	let ttl = chrono::Duration::hours(i64::from(config.auth.session_ttl_hours));
	let issued = portal_server::operator::issue_session(&pool, user_id, ttl).await?;

	println!("{}={}", config.auth.session_cookie_name, issued.token.expose());
	println!("role: {}", issued.profile.role);
	println!("expires_at: {}", issued.session.expires_at.to_rfc3339());
	Ok(())
}
