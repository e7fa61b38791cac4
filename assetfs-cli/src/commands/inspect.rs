//! Commands that look at the mounted tree without reading file contents.

use assetfs::path::sanitize;
use assetfs::{Stream, WalkEntry};

use crate::error::CliError;
use crate::runner::CliRunner;
use crate::GlobalArgs;

/// Print each mount with its backend.
pub fn run_mounts(args: &GlobalArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args)?;
    runner.log_startup("mounts");
    let vfs = runner.vfs();

    println!("Mounts (search order)");
    println!("=====================");
    for (index, mount) in vfs.mounts().iter().enumerate() {
        println!("  {:>2}. {:<14} {}", index + 1, mount.backend.to_string(), mount.name);
    }

    if let Some(cache) = vfs.path_cache() {
        println!();
        println!(
            "Path cache: {} files in {} directories (normalization: {})",
            cache.file_count(),
            cache.directory_count(),
            cache.normalization()
        );
    } else {
        println!();
        println!("Path cache: disabled");
    }

    Ok(())
}

/// Render one walk entry as an indented line.
pub fn format_entry(entry: &WalkEntry) -> String {
    let indent = "  ".repeat(entry.depth);
    if entry.kind.is_dir() {
        format!("{}{}/", indent, entry.name)
    } else {
        format!("{}{}", indent, entry.name)
    }
}

/// Walk the merged tree below `dir`.
pub fn run_ls(args: &GlobalArgs, dir: &str, depth: Option<usize>, files_only: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(args)?;
    runner.log_startup("ls");
    let dir = sanitize(dir)?;
    let table = runner.vfs().mount_table();

    let mut walk = table.walk(&dir);
    if let Some(depth) = depth {
        walk = walk.max_depth(depth);
    }

    let mut count = 0usize;
    if files_only {
        for entry in walk.files() {
            println!("{}", entry.path);
            count += 1;
        }
    } else {
        for entry in walk {
            println!("{}", format_entry(&entry));
            count += 1;
        }
    }

    if count == 0 && !dir.is_empty() && !table.stat(&dir).is_some_and(|k| k.is_dir()) {
        return Err(CliError::Missing(dir));
    }
    Ok(())
}

/// Report whether an exact path exists.
pub fn run_exists(args: &GlobalArgs, name: &str) -> Result<(), CliError> {
    let runner = CliRunner::new(args)?;
    runner.log_startup("exists");

    if runner.vfs().exists(name) {
        println!("{}", name);
        Ok(())
    } else {
        Err(CliError::Missing(name.to_string()))
    }
}

/// List the fonts the engine would register.
pub fn run_fonts(args: &GlobalArgs) -> Result<(), CliError> {
    let mut runner = CliRunner::new(args)?;
    runner.log_startup("fonts");

    let mut fonts = Vec::new();
    let count = runner.vfs_mut().init_font_sets(|stream: &mut Stream, path: &str| {
        let size = stream.size().ok();
        fonts.push((path.to_string(), size));
    });

    for (path, size) in &fonts {
        match size {
            Some(bytes) => println!("{:<40} {:>10} bytes", path, bytes),
            None => println!("{:<40} {:>10}", path, "?"),
        }
    }
    println!("{} font(s)", count);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetfs::EntryKind;

    fn entry(name: &str, kind: EntryKind, depth: usize) -> WalkEntry {
        WalkEntry {
            path: name.to_string(),
            name: name.to_string(),
            kind,
            depth,
        }
    }

    #[test]
    fn test_format_entry_marks_directories() {
        assert_eq!(format_entry(&entry("Graphics", EntryKind::Directory, 0)), "Graphics/");
        assert_eq!(format_entry(&entry("Title.png", EntryKind::File, 2)), "    Title.png");
    }
}
