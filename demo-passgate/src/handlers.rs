use askama::Template;
use axum::{http::StatusCode, response::Html};
use passgate_axum::{AuthSession, PASSGATE_ROUTE_PREFIX, Session};

#[derive(Template)]
#[template(path = "index_user.j2")]
struct IndexTemplateUser<'a> {
    message: &'a str,
    auth_route_prefix: &'a str,
}

#[derive(Template)]
#[template(path = "index_anon.j2")]
struct IndexTemplateAnon<'a> {
    message: &'a str,
    auth_route_prefix: &'a str,
}

#[derive(Template)]
#[template(path = "protected.j2")]
struct ProtectedTemplate<'a> {
    session: Session,
    auth_route_prefix: &'a str,
}

fn render(template: impl Template) -> Result<Html<String>, (StatusCode, String)> {
    template
        .render()
        .map(Html)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

pub(crate) async fn index(
    session: Option<AuthSession>,
) -> Result<Html<String>, (StatusCode, String)> {
    match session {
        Some(session) => {
            let who = session
                .user
                .name
                .as_deref()
                .or(session.user.email.as_deref())
                .unwrap_or("there");
            let message = format!("Hey {who}!");
            render(IndexTemplateUser {
                message: &message,
                auth_route_prefix: PASSGATE_ROUTE_PREFIX.as_str(),
            })
        }
        None => render(IndexTemplateAnon {
            message: "Sign in with Google or with your email and password.",
            auth_route_prefix: PASSGATE_ROUTE_PREFIX.as_str(),
        }),
    }
}

pub(crate) async fn protected(
    session: AuthSession,
) -> Result<Html<String>, (StatusCode, String)> {
    tracing::trace!(expires = %session.expires, "Rendering protected page");
    render(ProtectedTemplate {
        session: session.into(),
        auth_route_prefix: PASSGATE_ROUTE_PREFIX.as_str(),
    })
}
