mod config;
mod errors;
mod main;
mod types;

pub use config::{SESSION_COOKIE_NAME, SESSION_MAX_AGE, SESSION_UPDATE_AGE};
pub use errors::SessionError;
pub use main::{
    ResolvedSession, get_server_auth_session, prepare_logout_response, resolve_session,
    shape_session,
};
pub use types::{Session, SessionPolicy, SessionToken, SessionUser};

pub(crate) use main::create_session_with_uid;
