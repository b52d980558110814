//! Core CLI argument parsing tests

use clap::Parser;
use std::path::PathBuf;
use topicq::app::cli::args::Args;
use topicq::app::driver::DriverPlan;

#[test]
fn test_full_argument_set() {
    let args = Args::try_parse_from([
        "topicq",
        "--topics",
        "orders,audit",
        "-t",
        "billing",
        "--producers",
        "4",
        "--consumers",
        "6",
        "--messages",
        "100",
        "--capacity",
        "32",
        "--json",
        "--log-level",
        "debug",
        "--log-format",
        "json",
        "--log-file",
        "run.log",
        "--config-file",
        "custom.toml",
    ])
    .unwrap();

    assert_eq!(args.topics, vec!["orders,audit", "billing"]);
    assert_eq!(args.producers, Some(4));
    assert_eq!(args.consumers, Some(6));
    assert_eq!(args.messages, Some(100));
    assert_eq!(args.capacity, Some(32));
    assert!(args.json);
    assert_eq!(args.log_level.as_deref(), Some("debug"));
    assert_eq!(args.log_format.as_deref(), Some("json"));
    assert_eq!(args.log_file, Some(PathBuf::from("run.log")));
    assert_eq!(args.config_file, Some(PathBuf::from("custom.toml")));

    let plan = DriverPlan::from_args(&args).unwrap();
    assert_eq!(plan.topics, vec!["orders", "audit", "billing"]);
    assert_eq!(plan.total_messages(), 400);
}

#[test]
fn test_counts_must_be_positive() {
    for flag in ["--producers", "--consumers", "--messages", "--capacity"] {
        assert!(
            Args::try_parse_from(["topicq", flag, "0"]).is_err(),
            "{} accepted 0",
            flag
        );
        assert!(
            Args::try_parse_from(["topicq", flag, "many"]).is_err(),
            "{} accepted a non-number",
            flag
        );
    }
}

#[test]
fn test_invalid_log_options_rejected() {
    assert!(Args::try_parse_from(["topicq", "--log-level", "loud"]).is_err());
    assert!(Args::try_parse_from(["topicq", "--log-format", "xml"]).is_err());
}

#[test]
fn test_topics_deduplicated_case_insensitively() {
    let args = Args::try_parse_from(["topicq", "-t", "Orders,orders", "-t", "ORDERS,audit"]).unwrap();
    let plan = DriverPlan::from_args(&args).unwrap();
    assert_eq!(plan.topics, vec!["Orders", "audit"]);
    assert_eq!(plan.consumers, 2);
}

#[test]
fn test_blank_topic_rejected() {
    let args = Args::try_parse_from(["topicq", "--topics", "orders,,audit"]).unwrap();
    assert!(DriverPlan::from_args(&args).is_err());
}

#[test]
fn test_too_few_consumers_rejected() {
    let args = Args::try_parse_from(["topicq", "-t", "a,b,c", "--consumers", "2"]).unwrap();
    let error = DriverPlan::from_args(&args).unwrap_err();
    assert!(error.message().contains("consumer per topic"));
}

#[test]
fn test_version_flag() {
    let error = Args::try_parse_from(["topicq", "--version"]).unwrap_err();
    assert_eq!(error.kind(), clap::error::ErrorKind::DisplayVersion);
}
