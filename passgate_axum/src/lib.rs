//! passgate-axum - Axum routes, extractor and middleware for passgate
//!
//! Mount [`passgate_router`] at [`PASSGATE_ROUTE_PREFIX`] after calling
//! [`init`], then use [`AuthSession`] in handlers that need the signed-in user.
//!
//! ```no_run
//! use axum::{Router, middleware::from_fn};
//! use passgate_axum::{PASSGATE_ROUTE_PREFIX, passgate_router, refresh_session};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! passgate_axum::init().await?;
//! let app: Router = Router::new()
//!     .nest(PASSGATE_ROUTE_PREFIX.as_str(), passgate_router())
//!     .layer(from_fn(refresh_session));
//! # Ok(())
//! # }
//! ```

mod auth;
mod config;
mod credentials;
mod error;
mod middleware;
mod oauth2;
mod router;
mod session;

pub use config::{PASSGATE_REDIRECT_ANON, PASSGATE_REDIRECT_USER};
pub use error::IntoResponseError;
pub use middleware::{is_authenticated_401, is_authenticated_redirect, refresh_session};
pub use router::{passgate_router, passgate_router_no_trace};
pub use session::{AuthRedirect, AuthSession};

pub use passgate::{PASSGATE_ROUTE_PREFIX, Session, SessionUser, init};
