//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the guard pipeline and account routes from config
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener with client address info
//! - Run session sweeping and limiter upkeep alongside the server

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware, response::IntoResponse, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::clock::{delta, Clock, SystemClock};
use crate::config::validation::{validate_config, ValidationError};
use crate::config::{AuthMode, GatewayConfig, RateLimitBackend};
use crate::limiter::{LimiterError, RateLimiter, RedisSlidingWindowLimiter, SlidingWindowLimiter};
use crate::pipeline::{enforce, Guard, Pipeline};
use crate::security::{AdmissionGuard, PathAllowlist, SessionAuthenticator, TokenAuthenticator};
use crate::session::MemorySessionStore;
use crate::token::{TokenIssuer, TokenKeys};
use crate::users::{self, LoginMode, UserRepository, UserService, UsersState};

/// Errors raised while assembling the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid configuration: {0:?}")]
    Config(Vec<ValidationError>),
    #[error("rate limiter backend: {0}")]
    Limiter(#[from] LimiterError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// In-process stores that need periodic upkeep while serving.
#[derive(Default)]
struct Upkeep {
    sessions: Option<(Arc<MemorySessionStore>, Duration)>,
    limiter: Option<(Arc<SlidingWindowLimiter>, Duration)>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    pipeline: Arc<Pipeline>,
    upkeep: Upkeep,
}

impl HttpServer {
    /// Create a server using wall-clock time.
    pub async fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        Self::with_clock(config, Arc::new(SystemClock)).await
    }

    /// Create a server whose authenticators read time from `clock`.
    pub async fn with_clock(config: GatewayConfig, clock: Arc<dyn Clock>) -> Result<Self, ServerError> {
        validate_config(&config).map_err(ServerError::Config)?;

        let mut upkeep = Upkeep::default();
        let mut builder = Pipeline::builder();

        if config.rate_limit.enabled {
            let rl = &config.rate_limit;
            let limiter: Arc<dyn RateLimiter> = match rl.backend {
                RateLimitBackend::Memory => {
                    let limiter = Arc::new(SlidingWindowLimiter::new(rl.window(), rl.max_requests));
                    upkeep.limiter = Some((limiter.clone(), rl.window()));
                    limiter
                }
                RateLimitBackend::Redis => {
                    Arc::new(RedisSlidingWindowLimiter::connect(&rl.redis_url, rl.window(), rl.max_requests).await?)
                }
            };
            let admission = AdmissionGuard::builder(limiter)
                .prefix(rl.prefix.clone())
                .trust_forwarded_for(rl.trust_forwarded_for)
                .build();
            builder = builder.admission(Arc::new(admission));
        }

        let allowlist = Arc::new(PathAllowlist::new(config.auth.allowlist.iter().cloned()));
        let (authenticator, login): (Arc<dyn Guard>, LoginMode) = match config.auth.mode {
            AuthMode::Session => {
                let sc = &config.session;
                let store = Arc::new(MemorySessionStore::new(sc.max_age()));
                upkeep.sessions = Some((store.clone(), Duration::from_secs(sc.sweep_interval_secs)));
                let authenticator = SessionAuthenticator::new(
                    store.clone(),
                    allowlist,
                    sc.cookie_name.clone(),
                    delta(sc.refresh_threshold()),
                    clock,
                );
                let login = LoginMode::Session {
                    store,
                    cookie_name: sc.cookie_name.clone(),
                    max_age: sc.max_age(),
                };
                (Arc::new(authenticator), login)
            }
            AuthMode::Token => {
                let tc = &config.token;
                let keys = Arc::new(TokenKeys::from_secret(tc.signing_key.as_bytes()));
                let issuer = TokenIssuer::new(keys, delta(tc.extension()), clock.clone());
                let authenticator =
                    TokenAuthenticator::new(issuer.clone(), allowlist, delta(tc.refresh_threshold()), clock);
                (Arc::new(authenticator), LoginMode::Token { issuer })
            }
        };
        let pipeline = Arc::new(builder.authenticator(authenticator).build());

        let service = Arc::new(UserService::new(Arc::new(UserRepository::new()), config.users.bcrypt_cost));
        let state = UsersState { service, login };

        let router = Self::build_router(&config, state, pipeline.clone());
        tracing::info!(steps = ?pipeline.step_names(), mode = ?config.auth.mode, "Pipeline assembled");

        Ok(Self {
            router,
            pipeline,
            upkeep,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: UsersState, pipeline: Arc<Pipeline>) -> Router {
        users::routes(state)
            .fallback(not_found)
            .layer(middleware::from_fn_with_state(pipeline, enforce))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if let Some((store, interval)) = self.upkeep.sessions {
            let rx = shutdown.resubscribe();
            tokio::spawn(async move { store.run_sweeper(interval, rx).await });
        }
        if let Some((limiter, window)) = self.upkeep.limiter {
            let rx = shutdown.resubscribe();
            tokio::spawn(purge_limiter(limiter, window, rx));
        }

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn not_found() -> impl IntoResponse {
    StatusCode::NOT_FOUND
}

/// Drop idle client windows once per window length until shutdown.
async fn purge_limiter(limiter: Arc<SlidingWindowLimiter>, window: Duration, mut shutdown: broadcast::Receiver<()>) {
    let mut ticker = tokio::time::interval(window.max(Duration::from_secs(1)));
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let purged = limiter.purge_idle();
                if purged > 0 {
                    tracing::debug!(purged, tracked = limiter.tracked_keys(), "Purged idle limiter windows");
                }
            }
            _ = shutdown.recv() => break,
        }
    }
}
