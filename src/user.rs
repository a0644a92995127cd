//! The simulated Drupal administrator.
//!
//! One [`Scenario`] is defined: the user logs in once with the one-time login
//! link, then loads the module administration page over and over.

use goose::prelude::*;

use crate::session::{self, SessionConfig};

/// Name of the scenario registered by [`admin_user`].
pub const SCENARIO_NAME: &str = "Drupal admin user";

/// Page loaded repeatedly by every user.
pub const MODULES_PATH: &str = "/admin/modules";

/// Request name used for the login request, so one-time login links don't
/// show up in metrics and reports.
pub const LOGIN_REQUEST_NAME: &str = "login";

/// Build the scenario simulating a Drupal administrator.
///
/// # Example
/// ```rust,no_run
/// use drupal_benchmark::user::admin_user;
/// use goose::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> Result<(), GooseError> {
///     GooseAttack::initialize()?
///         .register_scenario(admin_user())
///         .execute()
///         .await?;
///
///     Ok(())
/// }
/// ```
pub fn admin_user() -> Scenario {
    scenario!(SCENARIO_NAME)
        // Runs one time when each user starts.
        .register_transaction(transaction!(on_start).set_on_start().set_name("login"))
        // Runs repeatedly until the load test ends.
        .register_transaction(transaction!(hello_world).set_name("hello_world"))
}

/// Log in with the one-time login link.
///
/// Certificate verification is disabled on the user's client before the login
/// request is made, and the cookies set by logging in are kept for all later
/// requests. The response isn't validated: a failed log in shows up as failed
/// requests in the metrics.
///
/// Without a login url no request is made. Goose transactions can only fail
/// with a [`TransactionError`], none of which describes missing configuration,
/// so the unusable login url is reported as a `Url` error and the cause is
/// logged.
pub async fn on_start(user: &mut GooseUser) -> TransactionResult {
    let host = session::host_from_base_url(&user.base_url);
    let session = match SessionConfig::from_env(&host) {
        Ok(session) => session,
        Err(e) => {
            error!(
                "[user {}]: not logging in, {} is unavailable: {}",
                user.weighted_users_index,
                session::LOGIN_URL_VAR,
                e
            );
            return Err(Box::new(TransactionError::Url(url::ParseError::EmptyHost)));
        }
    };

    if !session.host_in_login_url() {
        warn!(
            "[user {}]: host {} not found in {}, requesting the full login url",
            user.weighted_users_index,
            session.host,
            session::LOGIN_URL_VAR
        );
    }

    // The client must be replaced before the first request.
    user.set_client_builder(session.client_builder()).await?;

    debug!(
        "[user {}]: logging in with {}",
        user.weighted_users_index, session.login_path
    );
    let _goose = user
        .get_named(&session.login_path, LOGIN_REQUEST_NAME)
        .await?;

    user.set_session_data(session);

    Ok(())
}

/// Load the module administration page.
///
/// The request is named after its path, otherwise Goose reports it under the
/// transaction name.
pub async fn hello_world(user: &mut GooseUser) -> TransactionResult {
    // The page is requested even if logging in failed.
    if user.get_session_data::<SessionConfig>().is_none() {
        debug!(
            "[user {}]: loading {} without a session",
            user.weighted_users_index, MODULES_PATH
        );
    }

    let _goose = user.get_named(MODULES_PATH, MODULES_PATH).await?;

    Ok(())
}
