//! The shell-pipe column transform: stream one column through an external
//! command and substitute its output.
//!
//! The command's input must be written concurrently with reading its output;
//! writing every row before reading anything deadlocks once the subprocess's
//! pipe buffers fill. A background thread owns a snapshot of the column and
//! the child's stdin, the calling thread reads stdout synchronously and
//! overwrites cells as lines arrive. Rows already overwritten when the
//! command stops early are kept; there is no rollback.

use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Command, Stdio};
use std::thread;

use color_eyre::eyre::{bail, eyre};
use color_eyre::Result;

/// Run `command` under `sh -c`, feeding `column`'s cell of every row (in
/// dataset order) on stdin, one per line, and replacing each cell with the
/// corresponding output line. Returns a recoverable error when the command
/// produces fewer lines than there are rows, with whatever stderr output is
/// available attached.
pub fn pipe_column(rows: &mut [Vec<String>], column: usize, command: &str) -> Result<()> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| eyre!("failed to open subprocess stdin"))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| eyre!("failed to open subprocess stdout"))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| eyre!("failed to open subprocess stderr"))?;

    // The writer only sees a snapshot of the column, never the live rows.
    let input: Vec<String> = rows.iter().map(|row| row[column].clone()).collect();
    let writer = thread::spawn(move || {
        for value in input {
            // The subprocess may stop reading at any point; the first broken
            // write ends the feed and dropping stdin closes the pipe.
            if writeln!(stdin, "{}", value).is_err() {
                break;
            }
        }
    });

    let mut lines = BufReader::new(stdout).lines();
    let mut result = Ok(());

    for row in rows.iter_mut() {
        match lines.next() {
            Some(Ok(line)) => row[column] = line,
            Some(Err(err)) => {
                result = Err(eyre!("error reading subprocess output: {}", err));
                break;
            }
            None => {
                let mut captured = String::new();
                let _ = stderr.read_to_string(&mut captured);
                result = Err(eyre!("process exited too early!\n\n{}", captured));
                break;
            }
        }
    }

    // Reap the child and join the writer on every path so no pipe handle
    // outlives the transform.
    drop(lines);
    let _ = writer.join();
    let _ = child.wait();

    result
}

/// Validate the command line before running it: an empty command is a no-op
/// the prompt filters out.
pub fn prepare(command: &str) -> Result<&str> {
    let trimmed = command.trim();
    if trimmed.is_empty() {
        bail!("empty command");
    }
    Ok(trimmed)
}
