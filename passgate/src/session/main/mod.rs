mod session;
mod shape;

pub use session::{
    ResolvedSession, get_server_auth_session, prepare_logout_response, resolve_session,
};
pub use shape::shape_session;

pub(crate) use session::create_session_with_uid;
