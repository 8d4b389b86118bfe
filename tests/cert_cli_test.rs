//! Integration tests for the certificate command's precondition and
//! idempotence paths (issuance itself needs a live ACME endpoint and is
//! covered by unit tests against a fake host).

mod support;

use support::*;

#[test]
fn test_cert_without_domain_fails() {
    let t = Test::new();

    let output = t.cert();
    assert_failure(&output);
    assert_stderr_contains(&output, "missing required input");
}

#[test]
fn test_cert_without_email_fails_before_any_request() {
    let t = Test::with_domain("anki.example.com");
    let before = t.env_contents();

    let output = t.cert();
    assert_failure(&output);
    assert_stderr_contains(&output, "CERTBOT_EMAIL");
    // the abort leaves the store untouched
    assert_eq!(t.env_contents(), before);
}

#[test]
fn test_cert_already_present_is_a_noop() {
    let t = Test::with_domain("anki.example.com");
    t.install_cert("anki.example.com");

    // no email stored: must not matter, nothing is requested
    let output = t.cert();
    assert_success(&output);
    assert_stdout_contains(&output, "already present");
}
