//! Integration tests for locating and loading the config file.
//!
//! Everything touching `INBOXSWEEP_CONFIG` lives in one test so no other
//! test in this binary observes the variable mid-change.

use assert_fs::prelude::*;
use predicates::prelude::*;

use inboxsweep::config::{self, Config, CONFIG_ENV};

#[test]
fn test_env_override_and_fallback_to_defaults() {
    let dir = assert_fs::TempDir::new().unwrap();

    // ── Valid file: overrides applied ───────────────────────────
    let good = dir.child("good.toml");
    good.write_str(
        r#"
[general]
log_level = "debug"

[classifier]
max_age_days = 14
top_senders = 3

[classifier.rules.social]
keywords = ["Photos"]

[actions]
step_delay_ms = 0
"#,
    )
    .unwrap();
    std::env::set_var(CONFIG_ENV, good.path());
    assert_eq!(config::config_file_path().as_deref(), Some(good.path()));

    let cfg = config::load_config();
    assert_eq!(cfg.general.log_level, "debug");
    assert_eq!(cfg.classifier.max_age_days, 14);
    assert_eq!(cfg.classifier.top_senders, 3);
    assert_eq!(cfg.classifier.rules.social.keywords, vec!["photos"]);
    assert_eq!(cfg.actions.step_delay_ms, 0);
    assert_eq!(cfg.actions.select_delay_ms, 50);

    // ── Malformed file: defaults ────────────────────────────────
    let broken = dir.child("broken.toml");
    broken.write_str("[classifier\nmax_age_days = ").unwrap();
    std::env::set_var(CONFIG_ENV, broken.path());
    assert_eq!(config::load_config(), Config::default());

    // ── Parses but fails validation: defaults ───────────────────
    let invalid = dir.child("invalid.toml");
    invalid.write_str("[classifier]\nmax_age_days = 0\n").unwrap();
    std::env::set_var(CONFIG_ENV, invalid.path());
    assert_eq!(config::load_config(), Config::default());

    // ── Missing file: defaults, and save creates it ─────────────
    let missing = dir.child("nested/config.toml");
    std::env::set_var(CONFIG_ENV, missing.path());
    assert_eq!(config::load_config(), Config::default());

    let mut cfg = Config::default();
    cfg.classifier.top_senders = 5;
    config::save_config(&cfg).unwrap();
    missing.assert(predicate::path::is_file());
    assert_eq!(config::load_config().classifier.top_senders, 5);

    std::env::remove_var(CONFIG_ENV);
}
