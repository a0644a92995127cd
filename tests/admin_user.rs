use httpmock::{Method::GET, Mock, MockServer};
use reqwest::header;
use serial_test::serial;

mod common;

use drupal_benchmark::report;
use drupal_benchmark::user::{admin_user, LOGIN_REQUEST_NAME, MODULES_PATH};
use goose::config::GooseConfiguration;
use goose::metrics::GooseMetrics;
use goose::prelude::*;

// One-time login path, as generated by `drush uli`.
const LOGIN_PATH: &str = "/user/reset/1/1700000000/aBcD3fGh1jK/login";

// Cookie set when logging in.
const SESSION_COOKIE: &str = "SSESS0123456789abcdef";

// Indexes for the mock endpoints below.
const LOGIN_KEY: usize = 0;
const MODULES_KEY: usize = 1;

// How many times each user loads the modules page.
const ITERATIONS: usize = 3;

// There are multiple test variations in this file.
#[derive(Clone)]
enum TestType {
    // The modules page requires the session cookie.
    Authenticated,
    // The modules page always fails.
    Failing,
}

// Sets up the endpoints used by these tests.
fn setup_mock_server_endpoints<'a>(test_type: &TestType, server: &'a MockServer) -> Vec<Mock<'a>> {
    vec![
        // Logging in starts a session, store in vector at LOGIN_KEY.
        server.mock(|when, then| {
            when.method(GET).path(LOGIN_PATH);
            then.status(200).header(
                header::SET_COOKIE.as_str(),
                format!("{}=session-id; path=/; HttpOnly", SESSION_COOKIE),
            );
        }),
        // The modules page, store in vector at MODULES_KEY.
        match test_type {
            // Only matches when the session cookie is sent, otherwise the mock
            // server returns a 404.
            TestType::Authenticated => server.mock(|when, then| {
                when.method(GET)
                    .path(MODULES_PATH)
                    .cookie_exists(SESSION_COOKIE);
                then.status(200).body("<h1>Extend</h1>");
            }),
            TestType::Failing => server.mock(|when, then| {
                when.method(GET).path(MODULES_PATH);
                then.status(500);
            }),
        },
    ]
}

// Build a configuration running each user for ITERATIONS iterations.
fn iterations_configuration(server: &MockServer, users: usize) -> GooseConfiguration {
    common::build_configuration(
        server,
        vec![
            "--users",
            &users.to_string(),
            "--hatch-rate",
            &users.to_string(),
            "--iterations",
            &ITERATIONS.to_string(),
        ],
    )
}

// Run the admin user scenario against the mock server.
async fn run_admin_user(configuration: GooseConfiguration) -> GooseMetrics {
    let goose_attack = GooseAttack::initialize_with_config(configuration)
        .unwrap()
        .register_scenario(admin_user());

    common::run_load_test(goose_attack).await
}

#[tokio::test]
#[serial]
// Log in once, then load the modules page with the session cookie each iteration.
async fn test_login_then_modules() {
    let server = MockServer::start();
    let mock_endpoints = setup_mock_server_endpoints(&TestType::Authenticated, &server);
    common::set_login_url(&server, LOGIN_PATH);

    let goose_metrics = run_admin_user(iterations_configuration(&server, 1)).await;

    // Exactly one log in, trailing newline and host removed from the login url.
    mock_endpoints[LOGIN_KEY].assert_hits(1);
    // Every iteration reused the session cookie.
    mock_endpoints[MODULES_KEY].assert_hits(ITERATIONS);

    let stats = report::stats_from_metrics(&goose_metrics);
    let modules = stats
        .iter()
        .find(|stat| stat.name == MODULES_PATH)
        .expect("modules page metrics");
    assert_eq!(modules.method, "GET");
    assert_eq!(modules.num_requests, ITERATIONS);
    assert_eq!(modules.num_failures, 0);
    assert!(modules.min_response_time <= modules.max_response_time);
    assert!(modules.total_response_time >= modules.max_response_time);

    // The one-time login path is not reported.
    assert!(stats.iter().all(|stat| !stat.name.contains("aBcD3fGh1jK")));
    assert!(stats.iter().any(|stat| stat.name == LOGIN_REQUEST_NAME));
}

#[tokio::test]
#[serial]
// Each user logs in with its own session.
async fn test_login_multiple_users() {
    let users = 3;
    let server = MockServer::start();
    let mock_endpoints = setup_mock_server_endpoints(&TestType::Authenticated, &server);
    common::set_login_url(&server, LOGIN_PATH);

    run_admin_user(iterations_configuration(&server, users)).await;

    mock_endpoints[LOGIN_KEY].assert_hits(users);
    mock_endpoints[MODULES_KEY].assert_hits(users * ITERATIONS);
}

#[tokio::test]
#[serial]
// Failing modules page requests don't stop the next ones.
async fn test_modules_failures() {
    let server = MockServer::start();
    let mock_endpoints = setup_mock_server_endpoints(&TestType::Failing, &server);
    common::set_login_url(&server, LOGIN_PATH);

    let goose_metrics = run_admin_user(iterations_configuration(&server, 1)).await;

    mock_endpoints[LOGIN_KEY].assert_hits(1);
    mock_endpoints[MODULES_KEY].assert_hits(ITERATIONS);

    let stats = report::stats_from_metrics(&goose_metrics);
    let modules = stats
        .iter()
        .find(|stat| stat.name == MODULES_PATH)
        .expect("modules page metrics");
    assert_eq!(modules.num_failures, ITERATIONS);
}

#[tokio::test]
#[serial]
// Without a login url the user never tries to log in.
async fn test_missing_login_url() {
    let server = MockServer::start();
    let mock_endpoints = setup_mock_server_endpoints(&TestType::Authenticated, &server);
    common::unset_login_url();

    run_admin_user(iterations_configuration(&server, 1)).await;

    mock_endpoints[LOGIN_KEY].assert_hits(0);
    // No session cookie, so the authenticated modules page is never matched.
    mock_endpoints[MODULES_KEY].assert_hits(0);
}
