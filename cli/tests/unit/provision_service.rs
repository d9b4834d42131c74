//! Tests for the provisioning workflow against a recording fake host.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use noteomatic_deploy::application::services::preflight::check_ports;
use noteomatic_deploy::application::services::provision::{activate_site, provision_site};
use noteomatic_deploy::domain::site::{SiteVariant, render};
use noteomatic_deploy::domain::{DeployConfig, ProvisionError, error_code};

use crate::helpers::{DOMAIN, config};
use crate::mocks::{Call, FakeHost, RecordingReporter};

fn host(config: &DeployConfig) -> FakeHost {
    FakeHost::new(config.certificate_chain())
}

fn provision_error(err: &anyhow::Error) -> &ProvisionError {
    err.downcast_ref::<ProvisionError>()
        .unwrap_or_else(|| panic!("expected ProvisionError, got: {err:#}"))
}

// ── Port guard ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_any_busy_port_fails_before_install_or_write() {
    let config = config();
    for port in [80, 443, 8000] {
        let mut host = host(&config);
        host.busy_ports = vec![port];
        let reporter = RecordingReporter::default();

        let err = provision_site(&host, &reporter, &config).await.unwrap_err();

        assert!(
            matches!(provision_error(&err), ProvisionError::PortInUse { port: p } if *p == port)
        );
        assert_eq!(host.installs(), 0, "port {port}: package manager invoked");
        assert_eq!(host.writes(), 0, "port {port}: site written");
        assert_eq!(host.count(|c| *c == Call::Enable), 0);
        assert_eq!(host.count(|c| *c == Call::DisableDefault), 0);
        assert_eq!(host.reloads(), 0);
    }
}

#[tokio::test]
async fn test_app_port_bound_names_8000_and_touches_nothing() {
    let config = config();
    let mut host = host(&config);
    host.busy_ports = vec![8000];

    let err = provision_site(&host, &RecordingReporter::default(), &config)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("8000"), "got: {err}");
    assert_eq!(error_code(&err), "port_in_use");
    assert_eq!(
        host.calls(),
        vec![Call::Probe(80), Call::Probe(443), Call::Probe(8000)]
    );
    assert!(host.active().is_none());
}

#[tokio::test]
async fn test_check_ports_stops_at_first_busy_port() {
    let config = config();
    let mut host = host(&config);
    host.busy_ports = vec![80, 443];

    let err = check_ports(&host, &config.ports).await.unwrap_err();

    assert!(matches!(
        provision_error(&err),
        ProvisionError::PortInUse { port: 80 }
    ));
    assert_eq!(host.calls(), vec![Call::Probe(80)]);
}

// ── Dependency installation ──────────────────────────────────────────────────

#[tokio::test]
async fn test_install_failure_halts_before_site_configuration() {
    let config = config();
    let mut host = host(&config);
    host.install_code = 100;

    let err = provision_site(&host, &RecordingReporter::default(), &config)
        .await
        .unwrap_err();

    let ProvisionError::InstallFailed { detail } = provision_error(&err) else {
        panic!("expected InstallFailed, got: {err:#}");
    };
    assert!(detail.contains("Unable to locate package"), "got: {detail}");
    assert_eq!(host.writes(), 0);
    assert_eq!(host.issues(), 0);
}

#[tokio::test]
async fn test_installs_configured_packages() {
    let config = config();
    let host = host(&config);

    provision_site(&host, &RecordingReporter::default(), &config)
        .await
        .unwrap();

    assert!(host.calls().contains(&Call::Install(vec![
        "nginx".to_string(),
        "certbot".to_string(),
        "python3-certbot-nginx".to_string(),
        "netcat-openbsd".to_string(),
    ])));
}

// ── End to end ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_success_activates_tls_with_two_reloads() {
    let config = config();
    let host = host(&config);
    let reporter = RecordingReporter::default();

    let outcome = provision_site(&host, &reporter, &config).await.unwrap();

    assert_eq!(outcome.domain, DOMAIN);
    assert_eq!(outcome.certificate, config.certificate_chain());
    assert_eq!(outcome.reloads, 2);
    assert_eq!(host.reloads(), 2);
    assert_eq!(
        host.active().as_deref(),
        Some(render(SiteVariant::Tls, &config).as_str())
    );
    assert!(!host.default_enabled.get(), "default site left enabled");
    assert!(reporter.warnings.borrow().is_empty());
    assert_eq!(reporter.steps.borrow().len(), 6);
}

#[tokio::test]
async fn test_steps_run_in_order() {
    let config = config();
    let host = host(&config);

    provision_site(&host, &RecordingReporter::default(), &config)
        .await
        .unwrap();

    let plain = render(SiteVariant::Plain, &config);
    let tls = render(SiteVariant::Tls, &config);
    let calls: Vec<Call> = host
        .calls()
        .into_iter()
        .filter(|c| !matches!(c, Call::Probe(_)))
        .collect();
    assert_eq!(
        calls,
        vec![
            Call::Install(config.packages.clone()),
            Call::Write(plain),
            Call::Enable,
            Call::Validate,
            Call::DisableDefault,
            Call::Reload,
            Call::Issue {
                domain: DOMAIN.to_string(),
                email: None,
            },
            Call::Write(tls),
            Call::Enable,
            Call::Validate,
            Call::DisableDefault,
            Call::Reload,
        ]
    );
}

#[tokio::test]
async fn test_exactly_one_reload_follows_tls_swap() {
    let config = config();
    let host = host(&config);

    provision_site(&host, &RecordingReporter::default(), &config)
        .await
        .unwrap();

    let tls = Call::Write(render(SiteVariant::Tls, &config));
    let calls = host.calls();
    let swap = calls.iter().position(|c| *c == tls).unwrap();
    let after = calls[swap..].iter().filter(|c| **c == Call::Reload).count();
    assert_eq!(after, 1);
}

#[tokio::test]
async fn test_email_is_passed_to_certbot() {
    let config = DeployConfig {
        email: Some("ops@example.org".to_string()),
        ..config()
    };
    let host = host(&config);

    provision_site(&host, &RecordingReporter::default(), &config)
        .await
        .unwrap();

    assert!(host.calls().contains(&Call::Issue {
        domain: DOMAIN.to_string(),
        email: Some("ops@example.org".to_string()),
    }));
}

// ── Certificate oracle ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_certificate_leaves_plain_active() {
    let config = config();
    let mut host = host(&config);
    host.certbot_issues = false;
    host.certbot_code = 1;
    let reporter = RecordingReporter::default();

    let err = provision_site(&host, &reporter, &config).await.unwrap_err();

    let ProvisionError::CertificateMissing { domain, path } = provision_error(&err) else {
        panic!("expected CertificateMissing, got: {err:#}");
    };
    assert_eq!(domain, DOMAIN);
    assert_eq!(*path, config.certificate_chain());
    assert_eq!(
        host.active().as_deref(),
        Some(render(SiteVariant::Plain, &config).as_str())
    );
    assert_eq!(host.reloads(), 1);
    assert_eq!(host.writes(), 1);
    assert_eq!(reporter.warnings.borrow().len(), 1, "certbot exit not reported");
}

#[tokio::test]
async fn test_certbot_exit_status_is_not_authoritative() {
    let config = config();
    let mut host = host(&config);
    host.certbot_code = 1;
    let reporter = RecordingReporter::default();

    let outcome = provision_site(&host, &reporter, &config).await.unwrap();

    assert_eq!(outcome.reloads, 2);
    assert!(
        reporter.warnings.borrow()[0].contains("certbot"),
        "got: {:?}",
        reporter.warnings.borrow()
    );
}

#[tokio::test]
async fn test_certbot_success_without_artifact_still_fails() {
    let config = config();
    let mut host = host(&config);
    host.certbot_issues = false;

    let err = provision_site(&host, &RecordingReporter::default(), &config)
        .await
        .unwrap_err();

    assert_eq!(error_code(&err), "certificate_missing");
    assert!(err.to_string().contains("certbot output"), "got: {err}");
}

// ── Validation gates reloads ─────────────────────────────────────────────────

#[tokio::test]
async fn test_plain_validation_failure_prevents_reload_and_issuance() {
    let config = config();
    let host = host(&config).with_validate_codes(&[1]);

    let err = provision_site(&host, &RecordingReporter::default(), &config)
        .await
        .unwrap_err();

    let ProvisionError::ConfigInvalid { variant, detail } = provision_error(&err) else {
        panic!("expected ConfigInvalid, got: {err:#}");
    };
    assert_eq!(*variant, SiteVariant::Plain);
    assert!(detail.contains("test failed"), "got: {detail}");
    assert_eq!(host.reloads(), 0);
    assert_eq!(host.issues(), 0);
}

#[tokio::test]
async fn test_rejected_plain_site_leaves_sites_enabled_as_found() {
    let config = config();
    let host = host(&config).with_validate_codes(&[1]);
    let reporter = RecordingReporter::default();

    provision_site(&host, &reporter, &config).await.unwrap_err();

    assert!(host.default_enabled.get(), "default site link removed");
    assert!(host.active().is_none(), "rejected site left enabled");
    assert_eq!(host.count(|c| *c == Call::DisableDefault), 0);
    assert_eq!(host.calls().last(), Some(&Call::Disable));
    assert!(
        reporter
            .warnings
            .borrow()
            .iter()
            .any(|w| w.contains("restored"))
    );
}

#[tokio::test]
async fn test_rejected_plain_site_restores_previous_content() {
    let config = config();
    let host = host(&config).with_validate_codes(&[1]);
    let previous = "# hand-written site\nserver { listen 80; }\n".to_string();
    *host.site.borrow_mut() = Some(previous.clone());
    host.enabled.set(true);
    host.default_enabled.set(false);

    provision_site(&host, &RecordingReporter::default(), &config)
        .await
        .unwrap_err();

    assert_eq!(host.active(), Some(previous.clone()));
    assert_eq!(host.calls().last(), Some(&Call::Write(previous)));
    assert_eq!(host.count(|c| *c == Call::Disable), 0);
}

#[tokio::test]
async fn test_tls_validation_failure_restores_plain_without_reload() {
    let config = config();
    let host = host(&config).with_validate_codes(&[0, 1]);
    let reporter = RecordingReporter::default();

    let err = provision_site(&host, &reporter, &config).await.unwrap_err();

    assert!(matches!(
        provision_error(&err),
        ProvisionError::ConfigInvalid {
            variant: SiteVariant::Tls,
            ..
        }
    ));
    assert_eq!(host.reloads(), 1, "reload after a failed validation");
    assert_eq!(
        host.active().as_deref(),
        Some(render(SiteVariant::Plain, &config).as_str())
    );
    assert_eq!(host.calls().last(), Some(&Call::Write(render(SiteVariant::Plain, &config))));
    assert_eq!(host.count(|c| *c == Call::Disable), 0);
    assert!(
        reporter
            .warnings
            .borrow()
            .iter()
            .any(|w| w.contains("restored"))
    );
}

#[tokio::test]
async fn test_activate_site_skips_reload_on_invalid_config() {
    let config = config();
    let host = host(&config).with_validate_codes(&[1]);

    let err = activate_site(&host, SiteVariant::Plain, "server {")
        .await
        .unwrap_err();

    assert_eq!(error_code(&err), "config_invalid");
    assert_eq!(host.reloads(), 0);
    assert!(host.active().is_none());
    assert!(host.default_enabled.get());
}

#[tokio::test]
async fn test_reload_failure_is_reported() {
    let config = config();
    let mut host = host(&config);
    host.reload_code = 1;

    let err = provision_site(&host, &RecordingReporter::default(), &config)
        .await
        .unwrap_err();

    let ProvisionError::ReloadFailed { detail } = provision_error(&err) else {
        panic!("expected ReloadFailed, got: {err:#}");
    };
    assert!(detail.contains("nginx.service"), "got: {detail}");
    assert_eq!(host.issues(), 0);
}

// ── Re-runs ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_rerun_with_nginx_running_stops_at_port_guard() {
    let config = config();
    let host = host(&config);
    let reporter = RecordingReporter::default();
    provision_site(&host, &reporter, &config).await.unwrap();

    let err = provision_site(&host, &reporter, &config).await.unwrap_err();

    assert!(matches!(
        provision_error(&err),
        ProvisionError::PortInUse { port: 80 }
    ));
    assert_eq!(host.installs(), 1);
    assert_eq!(host.reloads(), 2);
    assert_eq!(
        host.active().as_deref(),
        Some(render(SiteVariant::Tls, &config).as_str())
    );
}

#[tokio::test]
async fn test_rerun_after_stopping_nginx_succeeds() {
    let config = config();
    let host = host(&config);
    let reporter = RecordingReporter::default();
    provision_site(&host, &reporter, &config).await.unwrap();
    host.stop_nginx();

    let second = provision_site(&host, &reporter, &config).await.unwrap();

    assert_eq!(second.reloads, 2);
    assert_eq!(host.installs(), 2);
    assert_eq!(
        host.active().as_deref(),
        Some(render(SiteVariant::Tls, &config).as_str())
    );
}

#[tokio::test]
async fn test_invalid_domain_rejected_before_any_probe() {
    let config = DeployConfig {
        domain: "-bad-.example.org".to_string(),
        ..config()
    };
    let host = host(&config);

    let err = provision_site(&host, &RecordingReporter::default(), &config)
        .await
        .unwrap_err();

    assert_eq!(error_code(&err), "invalid_config");
    assert!(host.calls().is_empty());
}
