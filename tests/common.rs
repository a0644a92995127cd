use gumdrop::Options;
use httpmock::MockServer;

use drupal_benchmark::session::LOGIN_URL_VAR;
use goose::config::GooseConfiguration;
use goose::metrics::GooseMetrics;
use goose::GooseAttack;

/// The following options are configured by default, if not set to a custom value:
///  --host <mock-server>
///  --users 1
///  --hatch-rate 1
///  --run-time 1 (unless --iterations is set)
pub fn build_configuration(server: &MockServer, custom: Vec<&str>) -> GooseConfiguration {
    // Start with an empty configuration.
    let mut configuration: Vec<&str> = vec![];
    // Declare server_url here no matter what, so its lifetime is sufficient when needed.
    let server_url = server.base_url();

    // Merge in all custom options first.
    configuration.extend_from_slice(&custom);

    // Default to using mock server if not otherwise configured.
    if !configuration.contains(&"--host") {
        configuration.extend_from_slice(&["--host", &server_url]);
    }

    // Default to testing with 1 user if not otherwise configured.
    if !configuration.contains(&"--users") {
        configuration.extend_from_slice(&["--users", "1"]);
    }

    // Default to hatch 1 user per second if not otherwise configured.
    if !configuration.contains(&"--hatch-rate") {
        configuration.extend_from_slice(&["--hatch-rate", "1"]);
    }

    // Default to running for 1 second if neither a run time nor iterations are configured.
    if !configuration.contains(&"--run-time") && !configuration.contains(&"--iterations") {
        configuration.extend_from_slice(&["--run-time", "1"]);
    }

    // Parse these options to generate a GooseConfiguration.
    GooseConfiguration::parse_args_default(&configuration)
        .expect("failed to parse options and generate a configuration")
}

/// Point the login url at a path on the mock server, keeping the trailing
/// newline `drush uli` prints.
#[allow(dead_code)]
pub fn set_login_url(server: &MockServer, path: &str) {
    std::env::set_var(LOGIN_URL_VAR, format!("{}\n", server.url(path)));
}

/// Remove the login url from the environment.
#[allow(dead_code)]
pub fn unset_login_url() {
    std::env::remove_var(LOGIN_URL_VAR);
}

/// Run the actual load test, returning the GooseMetrics.
pub async fn run_load_test(goose_attack: GooseAttack) -> GooseMetrics {
    // Execute the load test.
    goose_attack.execute().await.unwrap()
}
