//! Integration tests for rendering the reverse-proxy config.

mod support;

use support::*;

#[test]
fn test_render_without_domain_fails_fast() {
    let t = Test::new();

    let output = t.render();
    assert_failure(&output);
    assert_stderr_contains(&output, "missing required input");
    assert!(!t.rendered_path().exists());
}

#[test]
fn test_render_http_variant_without_certificate() {
    let t = Test::with_domain("anki.example.com");

    let output = t.render();
    assert_success(&output);
    assert_stdout_contains(&output, "HTTP-only");

    let rendered = t.rendered();
    assert_eq!(rendered, HTTP_BODY.replace("__DOMAIN__", "anki.example.com"));
    assert!(!rendered.contains("__DOMAIN__"));
}

#[test]
fn test_render_tls_variant_with_certificate() {
    let t = Test::with_domain("anki.example.com");
    t.install_cert("anki.example.com");

    let output = t.render();
    assert_success(&output);
    assert_stdout_contains(&output, "TLS");

    let rendered = t.rendered();
    assert_eq!(rendered, TLS_BODY.replace("__DOMAIN__", "anki.example.com"));
}

#[test]
fn test_certificate_appearing_flips_variant() {
    let t = Test::with_domain("anki.example.com");

    assert_success(&t.render());
    assert!(t.rendered().contains("listen 80"));

    // certificate appears between renders; nothing else changes
    t.install_cert("anki.example.com");
    assert_success(&t.render());
    assert!(t.rendered().contains("listen 443 ssl"));
    assert!(!t.rendered().contains("listen 80"));
}

#[test]
fn test_render_is_deterministic() {
    let t = Test::with_domain("anki.example.com");

    assert_success(&t.render());
    let first = t.rendered();
    let output = t.render();
    assert_success(&output);

    assert_eq!(t.rendered(), first);
    assert_stdout_contains(&output, "unchanged");
}

#[test]
fn test_missing_template_is_fatal() {
    let t = Test::with_domain("anki.example.com");
    t.remove_template("anki-http.conf.tmpl");

    let output = t.render();
    assert_failure(&output);
    assert_stderr_contains(&output, "template file missing");
}
