//! One handler per front-end command (spec §6): create, open, insert,
//! search, load, print, extract, quit. Each returns the message the REPL
//! should print rather than printing it directly — this is what lets the
//! tests below drive each command without going through stdin.
//!
//! File-exists-and-overwrite confirmation is a REPL concern (it needs
//! stdin) and is handled by `main.rs` before `cmd_create`/`cmd_extract`
//! are called; these functions assume that confirmation already happened.

use std::path::Path;

use btreeidx::error::BTreeError;
use btreeidx::{bulk, tree, BTreeIndex};

const NOT_OPEN_MSG: &str = "Error: No index file is currently open.";

/// `menu` / `help`.
pub fn print_menu() -> String {
    let mut s = String::new();
    s.push_str("\nB-Tree Index Manager\n");
    s.push_str("===================\n");
    s.push_str("1. create  - Create a new index file\n");
    s.push_str("2. open    - Open an existing index file\n");
    s.push_str("3. insert  - Insert a key-value pair\n");
    s.push_str("4. search  - Search for a key\n");
    s.push_str("5. load    - Load pairs from file\n");
    s.push_str("6. print   - Print all pairs\n");
    s.push_str("7. extract - Extract pairs to file\n");
    s.push_str("8. quit    - Exit program\n");
    s
}

/// `create`. Closes the currently open index first, if any.
pub fn cmd_create(current: &mut Option<BTreeIndex>, path: &Path) -> String {
    if let Some(mut idx) = current.take() {
        let _ = idx.close();
    }
    match BTreeIndex::create(path) {
        Ok(idx) => {
            *current = Some(idx);
            "B-Tree file created successfully.".to_string()
        }
        Err(_) => "Error creating B-Tree file.".to_string(),
    }
}

/// `open`. Closes the currently open index first, if any.
pub fn cmd_open(current: &mut Option<BTreeIndex>, path: &Path) -> String {
    if let Some(mut idx) = current.take() {
        let _ = idx.close();
    }
    match BTreeIndex::open(path) {
        Ok(idx) => {
            *current = Some(idx);
            "B-Tree file opened successfully.".to_string()
        }
        Err(_) => "Error opening file. Check if file exists and is valid.".to_string(),
    }
}

/// `insert`.
pub fn cmd_insert(current: &mut Option<BTreeIndex>, key: u64, value: u64) -> String {
    match current.as_mut() {
        None => NOT_OPEN_MSG.to_string(),
        Some(idx) => match tree::insert(idx, key, value) {
            Ok(()) => "Key-value pair inserted successfully.".to_string(),
            Err(_) => "Error: Key already exists or insertion failed.".to_string(),
        },
    }
}

/// `search`.
pub fn cmd_search(current: &mut Option<BTreeIndex>, key: u64) -> String {
    match current.as_mut() {
        None => NOT_OPEN_MSG.to_string(),
        Some(idx) => match tree::search(idx, key) {
            Ok(Some(value)) => format!("Found: Key = {key}, Value = {value}"),
            Ok(None) => "Key not found.".to_string(),
            Err(_) => "Key not found.".to_string(),
        },
    }
}

/// `load`.
pub fn cmd_load(current: &mut Option<BTreeIndex>, path: &Path) -> String {
    let idx = match current.as_mut() {
        None => return NOT_OPEN_MSG.to_string(),
        Some(idx) => idx,
    };
    match bulk::load(idx, path) {
        Ok(report) => {
            let mut s = format!("Data loaded successfully: {} pair(s) inserted.", report.inserted);
            for (line_no, reason) in &report.skipped {
                s.push_str(&format!("\n  warning: line {line_no} skipped: {reason}"));
            }
            s
        }
        Err(_) => "Error loading data from file.".to_string(),
    }
}

/// `print`. Pre-order dump, each key/value indented by `depth * 2` spaces.
pub fn cmd_print(current: &mut Option<BTreeIndex>) -> String {
    let idx = match current.as_mut() {
        None => return NOT_OPEN_MSG.to_string(),
        Some(idx) => idx,
    };
    match tree::preorder_with_depth(idx) {
        Ok(visited) => {
            let mut s = String::new();
            for v in &visited {
                s.push_str(&" ".repeat(v.depth * 2));
                s.push_str(&format!("{}: {}\n", v.key, v.value));
            }
            s
        }
        Err(e) => format!("Error printing tree: {e}"),
    }
}

/// `extract`.
pub fn cmd_extract(current: &mut Option<BTreeIndex>, path: &Path) -> String {
    let idx = match current.as_mut() {
        None => return NOT_OPEN_MSG.to_string(),
        Some(idx) => idx,
    };
    match bulk::extract(idx, path) {
        Ok(_) => "Data extracted successfully.".to_string(),
        Err(_) => "Error extracting data to file.".to_string(),
    }
}

/// `quit`. Flushes and closes the currently open index, if any.
pub fn cmd_quit(current: &mut Option<BTreeIndex>) -> Result<(), BTreeError> {
    if let Some(mut idx) = current.take() {
        idx.close()?;
    }
    Ok(())
}
