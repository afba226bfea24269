//! Unit tests for upload command line parsing

use clap::Parser;
use std::path::PathBuf;
use tree_uploader::cli::Cli;

#[test]
fn test_destination_defaults_to_root() {
    let cli = Cli::try_parse_from(["tree-uploader", "--source", "./site"]).unwrap();

    assert_eq!(cli.source, PathBuf::from("./site"));
    assert_eq!(cli.destination, "/");
}

#[test]
fn test_short_flags() {
    let cli = Cli::try_parse_from(["tree-uploader", "-s", "./site", "-d", "/assets"]).unwrap();

    assert_eq!(cli.source, PathBuf::from("./site"));
    assert_eq!(cli.destination, "/assets");
}

#[test]
fn test_long_flags() {
    let cli = Cli::try_parse_from([
        "tree-uploader",
        "--source",
        "/tmp/report.pdf",
        "--destination",
        "/docs/2024",
    ])
    .unwrap();

    assert_eq!(cli.source, PathBuf::from("/tmp/report.pdf"));
    assert_eq!(cli.destination, "/docs/2024");
}

#[test]
fn test_source_is_required() {
    let result = Cli::try_parse_from(["tree-uploader", "-d", "/assets"]);
    assert!(result.is_err(), "missing --source should be rejected");
}

#[test]
fn test_unknown_flag_is_rejected() {
    let result = Cli::try_parse_from(["tree-uploader", "-s", "./site", "--workers", "10"]);
    assert!(result.is_err());
}
