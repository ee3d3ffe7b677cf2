//! btreeidx - interactive B-Tree index manager REPL.
//!
//! A command token is read from stdin, lowercased, and dispatched against
//! a small table of numeric-or-name aliases (spec §6). Unknown tokens
//! print an advisory and the loop continues; `quit` flushes and closes the
//! open index before exiting.

mod commands;
mod prompt;

use std::path::PathBuf;

use clap::Parser;

use btreeidx::BTreeIndex;
use prompt::{confirm_yes_no, prompt_line, prompt_u64};

/// Interactive B-Tree index manager.
#[derive(Parser)]
#[command(name = "btreeidx")]
#[command(about = "Interactive manager for disk-resident B-Tree index files")]
struct Args {
    /// Index file to open immediately on startup.
    #[arg(short, long)]
    file: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    let mut current: Option<BTreeIndex> = None;

    println!("Welcome to B-Tree Index Manager");
    println!("Type 'menu' to see available commands");

    if let Some(path) = args.file {
        match BTreeIndex::open(&path) {
            Ok(idx) => {
                current = Some(idx);
                println!("B-Tree file opened successfully.");
            }
            Err(e) => eprintln!("Error opening {}: {e}", path.display()),
        }
    }

    loop {
        let line = match prompt_line("\n> ") {
            Ok(line) => line,
            Err(_) => break,
        };
        let choice = line.trim().to_lowercase();

        match choice.as_str() {
            "menu" | "help" => print!("{}", commands::print_menu()),
            "1" | "create" => handle_create(&mut current),
            "2" | "open" => handle_open(&mut current),
            "3" | "insert" => handle_insert(&mut current),
            "4" | "search" => handle_search(&mut current),
            "5" | "load" => handle_load(&mut current),
            "6" | "print" => handle_print(&mut current),
            "7" | "extract" => handle_extract(&mut current),
            "8" | "quit" => {
                if let Err(e) = commands::cmd_quit(&mut current) {
                    eprintln!("Error closing index: {e}");
                }
                break;
            }
            "" => {}
            _ => println!("Unknown command. Type 'menu' to see available commands."),
        }
    }

    println!("Goodbye!");
}

fn handle_create(current: &mut Option<BTreeIndex>) {
    let filename = match prompt_line("Enter filename to create: ") {
        Ok(f) => f,
        Err(_) => return,
    };
    if filename.is_empty() {
        return;
    }
    let path = PathBuf::from(&filename);
    if path.exists() {
        match confirm_yes_no("File exists. Overwrite?") {
            Ok(true) => {}
            _ => {
                println!("Operation cancelled.");
                return;
            }
        }
    }
    println!("{}", commands::cmd_create(current, &path));
}

fn handle_open(current: &mut Option<BTreeIndex>) {
    let filename = match prompt_line("Enter filename to open: ") {
        Ok(f) => f,
        Err(_) => return,
    };
    if filename.is_empty() {
        return;
    }
    println!("{}", commands::cmd_open(current, &PathBuf::from(filename)));
}

fn handle_insert(current: &mut Option<BTreeIndex>) {
    if current.is_none() {
        println!("Error: No index file is currently open.");
        return;
    }
    let key = match prompt_u64("Enter key (unsigned integer): ") {
        Ok(Some(k)) => k,
        _ => {
            println!("Invalid key format.");
            return;
        }
    };
    let value = match prompt_u64("Enter value (unsigned integer): ") {
        Ok(Some(v)) => v,
        _ => {
            println!("Invalid value format.");
            return;
        }
    };
    println!("{}", commands::cmd_insert(current, key, value));
}

fn handle_search(current: &mut Option<BTreeIndex>) {
    if current.is_none() {
        println!("Error: No index file is currently open.");
        return;
    }
    let key = match prompt_u64("Enter key to search: ") {
        Ok(Some(k)) => k,
        _ => {
            println!("Invalid key format.");
            return;
        }
    };
    println!("{}", commands::cmd_search(current, key));
}

fn handle_load(current: &mut Option<BTreeIndex>) {
    if current.is_none() {
        println!("Error: No index file is currently open.");
        return;
    }
    let filename = match prompt_line("Enter filename to load from: ") {
        Ok(f) => f,
        Err(_) => return,
    };
    if filename.is_empty() {
        return;
    }
    println!("{}", commands::cmd_load(current, &PathBuf::from(filename)));
}

fn handle_print(current: &mut Option<BTreeIndex>) {
    if current.is_none() {
        println!("Error: No index file is currently open.");
        return;
    }
    print!("{}", commands::cmd_print(current));
}

fn handle_extract(current: &mut Option<BTreeIndex>) {
    if current.is_none() {
        println!("Error: No index file is currently open.");
        return;
    }
    let filename = match prompt_line("Enter filename to extract to: ") {
        Ok(f) => f,
        Err(_) => return,
    };
    if filename.is_empty() {
        return;
    }
    let path = PathBuf::from(&filename);
    if path.exists() {
        match confirm_yes_no("File exists. Overwrite?") {
            Ok(true) => {}
            _ => {
                println!("Operation cancelled.");
                return;
            }
        }
    }
    println!("{}", commands::cmd_extract(current, &path));
}
