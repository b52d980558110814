//! CLI TOML configuration tests
//!
//! Tests for loading configuration files and CLI precedence over them.

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use topicq::app::cli::args::Args;
use topicq::app::driver::DriverPlan;
use toml::Table;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_config_file_fills_unset_values() {
    let file = write_config(
        r#"
topics = ["orders", "audit"]
producers = 3
consumers = 5
messages = 20
capacity = 8
log-level = "warn"
log-format = "ext"
log-file = "none"
color = false
"#,
    );

    let mut args = Args::try_parse_from(["topicq"]).unwrap();
    let table = Args::load_config_file(&mut args, Some(file.path().to_path_buf()))
        .await
        .unwrap();

    assert!(table.is_some());
    assert_eq!(args.topics, vec!["orders", "audit"]);
    assert_eq!(args.producers, Some(3));
    assert_eq!(args.consumers, Some(5));
    assert_eq!(args.messages, Some(20));
    assert_eq!(args.capacity, Some(8));
    assert_eq!(args.log_level.as_deref(), Some("warn"));
    assert_eq!(args.log_format.as_deref(), Some("ext"));
    assert_eq!(args.log_file_str(), None);
    assert!(!args.use_color());

    let plan = DriverPlan::from_args(&args).unwrap();
    assert_eq!(plan.capacity, 8);
    assert_eq!(plan.total_messages(), 60);
}

#[tokio::test]
async fn test_cli_values_take_precedence() {
    let file = write_config("topics = \"from-config\"\nproducers = 9\ncapacity = 2\n");

    let mut args =
        Args::try_parse_from(["topicq", "--topics", "from-cli", "--producers", "1"]).unwrap();
    Args::load_config_file(&mut args, Some(file.path().to_path_buf()))
        .await
        .unwrap();

    assert_eq!(args.topics, vec!["from-cli"]);
    assert_eq!(args.producers, Some(1));
    assert_eq!(args.capacity, Some(2));
}

#[tokio::test]
async fn test_malformed_config_file_reported() {
    let file = write_config("producers = [\n");
    let mut args = Args::default();
    let error = Args::load_config_file(&mut args, Some(file.path().to_path_buf()))
        .await
        .unwrap_err();
    assert!(error.message().contains("Error parsing configuration file"));
}

#[tokio::test]
async fn test_invalid_config_value_reported_with_path() {
    let file = write_config("capacity = -4\n");
    let mut args = Args::default();
    let error = Args::load_config_file(&mut args, Some(file.path().to_path_buf()))
        .await
        .unwrap_err();
    assert!(error.message().contains("capacity"));
    assert!(error
        .message()
        .contains(&file.path().display().to_string()));
}

#[tokio::test]
async fn test_missing_config_file_reported() {
    let mut args = Args::default();
    let error = Args::load_config_file(&mut args, Some(PathBuf::from("/no/such/topicq.toml")))
        .await
        .unwrap_err();
    assert!(error.message().contains("does not exist"));
}

#[test]
fn test_topics_single_string_and_array() {
    let mut args = Args::default();
    let mut config = Table::new();
    config.insert(
        "topics".to_string(),
        toml::Value::String("a, b".to_string()),
    );
    Args::apply_toml_values(&mut args, &config).unwrap();
    assert_eq!(args.topics, vec!["a", "b"]);

    let mut args = Args::default();
    let mut config = Table::new();
    config.insert("topics".to_string(), toml::Value::Integer(3));
    assert!(Args::apply_toml_values(&mut args, &config).is_err());
}
