//! Interactive prompts: choosing the scan root and confirming deletion.
//!
//! Both prompts read from any [`BufRead`] and write to any [`Write`], so the
//! binary passes stdin/stderr and tests pass in-memory buffers.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Ask for explicit confirmation. Only `y` or `yes` (any case) accepts.
///
/// End of input counts as a refusal.
///
/// # Errors
///
/// Returns an error if reading or writing fails.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<bool> {
    write!(output, "{question} (yes/no): ")?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        writeln!(output)?;
        return Ok(false);
    }

    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Existing drive roots (`C:\` ...) on Windows; empty elsewhere.
#[must_use]
pub fn available_drives() -> Vec<PathBuf> {
    if cfg!(windows) {
        (b'A'..=b'Z')
            .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
            .filter(|p| p.exists())
            .collect()
    } else {
        Vec::new()
    }
}

/// Ask the user which directory to scan.
///
/// With a non-empty `drives` list the user picks a number, or the entry after
/// the last drive to type a custom path. Without drives the path is typed
/// directly. Returns `None` on end of input or an invalid choice.
///
/// # Errors
///
/// Returns an error if reading or writing fails.
pub fn select_root<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    drives: &[PathBuf],
) -> io::Result<Option<PathBuf>> {
    if drives.is_empty() {
        return read_path(input, output);
    }

    writeln!(output, "Available drives:")?;
    for (i, drive) in drives.iter().enumerate() {
        writeln!(output, "  {}. {}", i + 1, drive.display())?;
    }
    let custom = drives.len() + 1;
    writeln!(output, "  {custom}. Enter custom path")?;
    write!(output, "Select (1-{custom}): ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    match line.trim().parse::<usize>() {
        Ok(n) if (1..=drives.len()).contains(&n) => Ok(Some(drives[n - 1].clone())),
        Ok(n) if n == custom => read_path(input, output),
        _ => {
            writeln!(output, "Invalid selection")?;
            Ok(None)
        }
    }
}

fn read_path<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<Option<PathBuf>> {
    write!(output, "Enter directory to scan: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    let trimmed = line.trim().trim_matches('"');
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(Path::new(trimmed).to_path_buf()))
}
