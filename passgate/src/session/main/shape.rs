use crate::session::types::{Session, SessionToken, SessionUser};
use crate::userdb::User;

/// Produce the session object handed to application code.
///
/// Copies the persistent user id into `session.user.id` and leaves every
/// other field untouched. Applying it twice gives the same result as once.
pub fn shape_session(session: Session, _token: &SessionToken, user: &User) -> Session {
    Session {
        user: SessionUser {
            id: Some(user.id.clone()),
            ..session.user
        },
        ..session
    }
}
