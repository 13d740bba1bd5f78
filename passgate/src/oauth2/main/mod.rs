mod core;
mod google;
mod utils;

pub(crate) use core::{csrf_checks, fetch_user_info, prepare_oauth2_auth_request};
