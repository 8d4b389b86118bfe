//! Integration tests for the status overview.

mod support;

use support::*;

#[test]
fn test_status_on_fresh_deployment() {
    let t = Test::new();

    let output = t.status();
    assert_success(&output);
    assert_stdout_contains(&output, "missing");
    assert_stdout_contains(&output, "not set");
    assert_stdout_contains(&output, "deckhand bootstrap");
}

#[test]
fn test_status_reports_certificate_state() {
    let t = Test::with_domain("anki.example.com");

    let output = t.status();
    assert_success(&output);
    assert_stdout_contains(&output, "anki.example.com");
    assert_stdout_contains(&output, "absent");

    t.install_cert("anki.example.com");
    let output = t.status();
    assert_success(&output);
    assert_stdout_contains(&output, "present");
}

#[test]
fn test_status_shows_rendered_config_digest() {
    let t = Test::with_domain("anki.example.com");
    assert_success(&t.render());

    let output = t.status();
    assert_success(&output);
    assert_stdout_contains(&output, "anki.conf");
}
