//! Tests for tree, batch, domain.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;

#[test]
fn cli_parse_tree() {
    match parse(&["hkit", "tree", "page.json"]) {
        CliCommand::Tree { path } => assert_eq!(path, PathBuf::from("page.json")),
        _ => panic!("expected Tree"),
    }
}

#[test]
fn cli_parse_batch_defaults() {
    match parse(&["hkit", "batch", "urls.txt", "-o", "domains.txt"]) {
        CliCommand::Batch {
            input,
            output,
            batch_size,
            threads,
        } => {
            assert_eq!(input, PathBuf::from("urls.txt"));
            assert_eq!(output, PathBuf::from("domains.txt"));
            assert!(batch_size.is_none());
            assert!(threads.is_none());
        }
        _ => panic!("expected Batch"),
    }
}

#[test]
fn cli_parse_batch_overrides() {
    match parse(&[
        "hkit",
        "batch",
        "urls.txt",
        "--output",
        "out.txt",
        "--batch-size",
        "50",
        "--threads",
        "4",
    ]) {
        CliCommand::Batch {
            batch_size,
            threads,
            ..
        } => {
            assert_eq!(batch_size, Some(50));
            assert_eq!(threads, Some(4));
        }
        _ => panic!("expected Batch"),
    }
}

#[test]
fn cli_parse_batch_requires_output() {
    assert!(Cli::try_parse_from(["hkit", "batch", "urls.txt"]).is_err());
}

#[test]
fn cli_parse_domain_many() {
    match parse(&["hkit", "domain", "http://a.example.com/x", "b.example.org"]) {
        CliCommand::Domain { urls } => assert_eq!(urls.len(), 2),
        _ => panic!("expected Domain"),
    }
}

#[test]
fn cli_parse_domain_requires_url() {
    assert!(Cli::try_parse_from(["hkit", "domain"]).is_err());
}
