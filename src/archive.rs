//! Packages the written feed tables into a single zip archive.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, info};
use zip::CompressionMethod;
use zip::write::{FileOptions, ZipWriter};

/// `.txt` files directly inside `dir`, sorted by name.
pub fn table_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Zips every `.txt` table in `dir` into `dir/zip_name` and returns the
/// archive path.
///
/// # Errors
///
/// Fails if `dir` does not exist or holds no `.txt` files.
#[tracing::instrument(skip(dir), fields(dir = %dir.display()))]
pub fn create_archive(dir: &Path, zip_name: &str) -> Result<PathBuf> {
    if !dir.is_dir() {
        bail!("output directory not found: {}", dir.display());
    }

    let files = table_files(dir)?;
    if files.is_empty() {
        bail!("no feed .txt files found in {}", dir.display());
    }

    let zip_path = dir.join(zip_name);
    let file = File::create(&zip_path)
        .with_context(|| format!("failed to create '{}'", zip_path.display()))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in &files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let contents = fs::read(path)?;
        zip.start_file(name, options)?;
        zip.write_all(&contents)?;
        debug!(file = name, bytes = contents.len(), "Added to archive");
    }

    let mut writer = zip.finish()?;
    writer.flush()?;

    let bytes = fs::metadata(&zip_path)?.len();
    info!(archive = %zip_path.display(), files = files.len(), bytes, "Feed archive created");
    Ok(zip_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_dir_fails() {
        let dir = env::temp_dir().join("gtfs_sheet_builder_no_such_dir");
        let _ = fs::remove_dir_all(&dir);
        assert!(create_archive(&dir, "gtfs.zip").is_err());
    }

    #[test]
    fn test_empty_dir_fails() {
        let dir = temp_dir("gtfs_sheet_builder_archive_empty");
        fs::write(dir.join("notes.md"), "not a table").unwrap();

        assert!(create_archive(&dir, "gtfs.zip").is_err());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_archive_holds_only_tables() {
        let dir = temp_dir("gtfs_sheet_builder_archive_tables");
        fs::write(dir.join("stops.txt"), "stop_id,stop_name,stop_lat,stop_lon\n").unwrap();
        fs::write(dir.join("agency.txt"), "agency_id\n").unwrap();
        fs::write(dir.join("readme.md"), "skip").unwrap();

        let zip_path = create_archive(&dir, "gtfs.zip").unwrap();

        let archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["agency.txt", "stops.txt"]);

        fs::remove_dir_all(&dir).unwrap();
    }
}
