// tests/search_config.rs
use job_hunt::config::search::{ENV_CONFIG_PATH, ENV_THRESHOLD};
use job_hunt::filter::{AcceptancePolicy, SimilarityMetric};
use job_hunt::SearchConfig;
use std::{env, fs};

#[test]
fn toml_and_json_files_load() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("job_hunt.toml");
    fs::write(
        &p_toml,
        r#"
keywords = [" product owner ", "", "product owner"]
policy = "title-only"
metric = "levenshtein"
threshold = 0.8
allow_titles = ["Product Owner"]
"#,
    )
    .unwrap();
    let c = SearchConfig::load_from(&p_toml).unwrap();
    assert_eq!(c.keywords, vec!["product owner".to_string()]);
    assert_eq!(c.policy, AcceptancePolicy::TitleOnly);
    assert_eq!(c.metric, SimilarityMetric::Levenshtein);
    assert_eq!(c.threshold, 0.8);
    assert_eq!(c.allow_titles, vec!["product owner".to_string()]);

    let p_json = dir.path().join("job_hunt.json");
    fs::write(&p_json, r#"{"sources": ["AllJobs"], "politeness_delay_ms": 0}"#).unwrap();
    let j = SearchConfig::load_from(&p_json).unwrap();
    assert!(j.source_enabled("alljobs"));
    assert!(!j.source_enabled("Indeed"));
    assert_eq!(j.politeness_delay_ms, 0);
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("job_hunt.toml");
    fs::write(&p, "policy = \"whatever\"").unwrap();
    assert!(SearchConfig::load_from(&p).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_CONFIG_PATH);
    env::remove_var(ENV_THRESHOLD);

    // 1) Nothing on disk -> defaults
    let d = SearchConfig::load_default().unwrap();
    assert_eq!(d.threshold, 0.7);
    assert_eq!(d.top_n, 10);

    // 2) config/job_hunt.toml fallback
    fs::create_dir_all(tmp.path().join("config")).unwrap();
    fs::write(tmp.path().join("config/job_hunt.toml"), "top_n = 3").unwrap();
    assert_eq!(SearchConfig::load_default().unwrap().top_n, 3);

    // 3) env path wins
    let p_env = tmp.path().join("other.json");
    fs::write(&p_env, r#"{"top_n": 7}"#).unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    assert_eq!(SearchConfig::load_default().unwrap().top_n, 7);

    // 4) env threshold override, clamped
    env::set_var(ENV_THRESHOLD, "1.5");
    assert_eq!(SearchConfig::load_default().unwrap().threshold, 1.0);

    // 5) env path to nowhere is an error
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("nope.toml").display().to_string());
    assert!(SearchConfig::load_default().is_err());

    env::remove_var(ENV_CONFIG_PATH);
    env::remove_var(ENV_THRESHOLD);
    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn threshold_env_applies_to_explicit_path_too() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("job_hunt.toml");
    fs::write(&p, "threshold = 0.9").unwrap();
    env::remove_var(ENV_CONFIG_PATH);

    env::set_var(ENV_THRESHOLD, "0.55");
    let cfg = SearchConfig::load(Some(&p)).unwrap();
    assert_eq!(cfg.threshold, 0.55);

    env::set_var(ENV_THRESHOLD, "not-a-number");
    assert_eq!(SearchConfig::load(Some(&p)).unwrap().threshold, 0.9);

    env::remove_var(ENV_THRESHOLD);
    assert_eq!(SearchConfig::load_from(&p).unwrap().threshold, 0.9);
}
