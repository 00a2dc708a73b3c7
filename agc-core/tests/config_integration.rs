/// Integration tests for configuration loading and saving
use agc_core::config::{default_config, load_config, save_config, Config};
use agc_core::AgcError;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_loading_from_multiple_sources() {
    let dir = TempDir::new().unwrap();

    let home_config = dir.path().join("config.toml");
    let project_config = dir.path().join("project.toml");

    fs::write(
        &home_config,
        r#"
[dereplication]
min_count = 5
"#,
    )
    .unwrap();

    fs::write(
        &project_config,
        r#"
[dereplication]
min_seq_len = 250
min_count = 2

[clustering]
kmer_prefilter = true
identity_threshold = 99.0
"#,
    )
    .unwrap();

    let config1 = load_config(&home_config).unwrap();
    assert_eq!(config1.dereplication.min_count, 5);
    assert_eq!(config1.dereplication.min_seq_len, 400); // Default

    let config2 = load_config(&project_config).unwrap();
    assert_eq!(config2.dereplication.min_seq_len, 250);
    assert_eq!(config2.dereplication.min_count, 2);
    assert!(config2.clustering.kmer_prefilter);
    assert_eq!(config2.clustering.identity_threshold, 99.0);
}

#[test]
fn test_config_validation() {
    let dir = TempDir::new().unwrap();

    let test_cases = vec![
        ("invalid syntax {{", true),
        ("[dereplication]\n", false),
        ("[dereplication]\nmin_count = \"ten\"", true),
        ("[clustering]\nidentity_threshold = -1.0", true),
        ("[clustering]\nidentity_threshold = 100.0", false),
        ("[clustering]\nkmer_size = 0", true),
        ("[alignment]\ngap_extend = -2", true),
        ("[output]\nline_width = 0", true),
    ];

    for (content, should_fail) in test_cases {
        let config_file = dir.path().join("test_config.toml");
        fs::write(&config_file, content).unwrap();

        let result = load_config(&config_file);
        if should_fail {
            assert!(result.is_err(), "Config should fail: {}", content);
        } else {
            assert!(result.is_ok(), "Config should succeed: {}", content);
        }
    }
}

#[test]
fn test_type_error_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let config_file = dir.path().join("bad_type.toml");
    fs::write(&config_file, "[clustering]\nkmer_prefilter = \"yes\"").unwrap();

    assert!(matches!(
        load_config(&config_file),
        Err(AgcError::Configuration(_))
    ));
}

#[test]
fn test_config_serialization_preservation() {
    let dir = TempDir::new().unwrap();

    let mut config = Config::default();
    config.dereplication.min_seq_len = 123;
    config.alignment.gap_open = 10;
    config.alignment.gap_extend = 2;
    config.clustering.kmer_prefilter = true;
    config.clustering.chunk_size = 75;
    config.output.line_width = 70;

    let config_file = dir.path().join("complex_config.toml");
    save_config(&config_file, &config).unwrap();
    let loaded = load_config(&config_file).unwrap();

    assert_eq!(loaded.dereplication.min_seq_len, 123);
    assert_eq!(loaded.alignment.gap_open, 10);
    assert_eq!(loaded.alignment.gap_extend, 2);
    assert!(loaded.clustering.kmer_prefilter);
    assert_eq!(loaded.clustering.chunk_size, 75);
    assert_eq!(loaded.output.line_width, 70);
}

#[test]
fn test_config_format_preservation() {
    let dir = TempDir::new().unwrap();

    let formatted_config = r#"# agc configuration file

[dereplication]
# Minimum read length kept during extraction
min_seq_len = 350

[clustering]
# Percent identity required to join an OTU
identity_threshold = 97.0
"#;

    let config_file = dir.path().join("formatted_config.toml");
    fs::write(&config_file, formatted_config).unwrap();

    let config = load_config(&config_file).unwrap();
    let output_file = dir.path().join("output_config.toml");
    save_config(&output_file, &config).unwrap();

    let reloaded = load_config(&output_file).unwrap();
    assert_eq!(config.dereplication.min_seq_len, reloaded.dereplication.min_seq_len);
    assert_eq!(
        config.clustering.identity_threshold,
        reloaded.clustering.identity_threshold
    );
}

#[test]
fn test_default_config_completeness() {
    let config = default_config();

    assert!(config.dereplication.min_seq_len > 0);
    assert!(config.dereplication.min_count > 0);
    assert!(config.alignment.match_score > config.alignment.mismatch_score);
    assert!(config.clustering.identity_threshold > 0.0);
    assert!(config.clustering.kmer_size > 0);
    assert!(config.output.line_width > 0);
}
