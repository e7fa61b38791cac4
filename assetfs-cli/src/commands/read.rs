//! Commands that resolve names and read file contents.

use std::io::{self, Write};

use assetfs::{BackendTag, Stream};

use crate::error::CliError;
use crate::runner::CliRunner;
use crate::GlobalArgs;

/// Whether a candidate extension passes the `--ext` filter.
///
/// An empty filter accepts everything; matching ignores ASCII case.
pub fn accepts_extension(filter: &[String], ext: Option<&str>) -> bool {
    if filter.is_empty() {
        return true;
    }
    ext.is_some_and(|ext| filter.iter().any(|f| f.trim_start_matches('.').eq_ignore_ascii_case(ext)))
}

/// Resolve a name the way the engine would and describe the winner.
pub fn run_resolve(args: &GlobalArgs, name: &str, ext_filter: &[String]) -> Result<(), CliError> {
    let mut runner = CliRunner::new(args)?;
    runner.log_startup("resolve");

    let mut claimed: Option<(BackendTag, Option<u64>)> = None;
    let resolved = runner.vfs_mut().open_read(name, |mut stream: Stream, ext: Option<&str>| {
        if !accepts_extension(ext_filter, ext) {
            return false;
        }
        claimed = Some((stream.tag(), stream.size().ok()));
        true
    })?;

    println!("Path:       {}", resolved.path);
    println!(
        "Extension:  {}",
        resolved.extension.as_deref().unwrap_or("(none)")
    );
    if let Some((tag, size)) = claimed {
        println!("Backend:    {}", tag);
        if let Some(size) = size {
            println!("Size:       {} bytes", size);
        }
    }
    println!("Candidates: {}", resolved.attempts);

    Ok(())
}

/// Copy a file to stdout.
pub fn run_cat(args: &GlobalArgs, name: &str, raw: bool) -> Result<(), CliError> {
    let mut runner = CliRunner::new(args)?;
    runner.log_startup("cat");
    let vfs = runner.vfs_mut();

    let data = if raw {
        let mut stream = vfs.open_read_raw(name, false)?;
        stream.read_to_end_vec()?
    } else {
        let mut data = None;
        let mut read_error = None;
        vfs.open_read(name, |mut stream: Stream, _: Option<&str>| match stream.read_to_end_vec() {
            Ok(bytes) => {
                data = Some(bytes);
                true
            }
            Err(e) => {
                read_error = Some(e);
                false
            }
        })
        .map_err(|e| match read_error.take() {
            Some(io_err) => CliError::Io(io_err),
            None => CliError::Vfs(e),
        })?;
        data.unwrap_or_default()
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(&data)?;
    stdout.flush()?;
    Ok(())
}
