use clap::Parser;
use dupesweep::cli::Cli;
use dupesweep::config::{Config, ConfigError};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert_eq!(config, Config::default());
    assert!(config.skip_set().matches(OsStr::new("System Volume Information")));
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("DUPESWEEP_FOLLOW_SYMLINKS", "true");
    std::env::set_var("DUPESWEEP_MMAP_THRESHOLD", "4096");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("DUPESWEEP_").split("__"))
        .extract()
        .unwrap();

    assert!(config.follow_symlinks);
    assert_eq!(config.mmap_threshold, 4096);

    std::env::remove_var("DUPESWEEP_FOLLOW_SYMLINKS");
    std::env::remove_var("DUPESWEEP_MMAP_THRESHOLD");
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
skip_dirs = ["Backups", "saves"]
io_threads = 8
report_path = "reports/dupes.txt"
"#,
    )
    .unwrap();

    let config = Config::load(Some(&config_path)).unwrap();

    assert_eq!(config.skip_dirs, vec!["Backups", "saves"]);
    assert_eq!(config.io_threads, Some(8));
    assert_eq!(config.report_path, PathBuf::from("reports/dupes.txt"));
    // Unset keys keep their defaults.
    assert!(!config.skip_set().matches(OsStr::new("themes")));
}

#[test]
fn test_config_invalid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = \"many\"").unwrap();

    assert!(matches!(
        Config::load(Some(&config_path)),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_cli_overrides_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = 8\nreport_path = \"from_file.txt\"\n").unwrap();

    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path));
    let config: Config = figment.extract().unwrap();

    let cli = Cli::try_parse_from(["dupesweep", "--io-threads", "2", "--skip", "Backups"]).unwrap();
    let config = config.with_cli_overrides(&cli);

    assert_eq!(config.io_threads, Some(2));
    assert_eq!(config.report_path, PathBuf::from("from_file.txt"));
    assert!(config.skip_set().matches(OsStr::new("BACKUPS")));
    assert!(config.skip_set().matches(OsStr::new("themes")));
}

#[test]
fn test_print_config_output_parses_back() {
    let config = Config::default();
    let text = config.to_toml().unwrap();
    let parsed: Config = Figment::from(Toml::string(&text)).extract().unwrap();
    assert_eq!(parsed, config);
}
