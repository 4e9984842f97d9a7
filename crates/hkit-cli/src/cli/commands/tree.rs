//! `hkit tree` – print a JSON document as an indented node tree.

use anyhow::{Context, Result};
use hkit_core::tree::{self, Node};
use std::fs;
use std::path::Path;

pub fn run_tree(path: &Path) -> Result<()> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    tree::print_tree(&Node::from_json(&value))?;
    Ok(())
}
