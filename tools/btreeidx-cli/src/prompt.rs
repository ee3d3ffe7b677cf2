//! Small stdin helpers used by the REPL loop to read a filename, a numeric
//! key/value, or a yes/no confirmation.

use std::io::{self, Write};

/// Print `prompt` (no trailing newline) and read one line of input,
/// trimming the trailing newline. Returns an empty string on EOF.
pub fn prompt_line(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

/// Prompt for a line and parse it as `u64`. Returns `None` (rather than an
/// error) on a blank line or unparseable input so the caller can print its
/// own "Invalid ... format." message and keep the REPL loop going.
pub fn prompt_u64(prompt: &str) -> io::Result<Option<u64>> {
    let line = prompt_line(prompt)?;
    Ok(line.trim().parse::<u64>().ok())
}

/// Prompt `"{prompt} (y/n): "` and return whether the reply starts with
/// `y`/`Y`.
pub fn confirm_yes_no(prompt: &str) -> io::Result<bool> {
    let reply = prompt_line(&format!("{prompt} (y/n): "))?;
    Ok(matches!(reply.trim().chars().next(), Some('y') | Some('Y')))
}
