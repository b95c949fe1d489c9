use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use walkdir::WalkDir;
use zip::ZipArchive;

/// Extracts the given `.zip` file to the target directory.
pub(crate) fn extract_zip(zip_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = fs::File::open(zip_path)
        .with_context(|| format!("failed to open {}", zip_path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("failed to read zip archive {}", zip_path.display()))?;

    archive.extract(dest_dir)
        .with_context(|| format!("failed to extract {} to {}", zip_path.display(), dest_dir.display()))
}

/// First file under `dir` (recursively, in name order) with extension `ext`.
pub(crate) fn find_with_extension(dir: &Path, ext: &str) -> Option<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .find(|path| has_extension(path, ext))
}

/// Read the first entry of a zip archive whose name ends in `.{ext}`.
/// Returns `Ok(None)` when the archive has no such entry.
pub(crate) fn read_zip_entry(zip_path: &Path, ext: &str) -> Result<Option<String>> {
    let file = fs::File::open(zip_path)
        .with_context(|| format!("failed to open {}", zip_path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("failed to read zip archive {}", zip_path.display()))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)
            .map_err(|e| anyhow!("failed to read entry {i} of {}: {e}", zip_path.display()))?;
        if !entry.is_dir() && has_extension(Path::new(entry.name()), ext) {
            let mut text = String::new();
            entry.read_to_string(&mut text)
                .with_context(|| format!("failed to read {} from {}", entry.name(), zip_path.display()))?;
            return Ok(Some(text))
        }
    }
    Ok(None)
}

/// Case-insensitive extension check.
pub(crate) fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::{write::SimpleFileOptions, ZipWriter};

    use super::*;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut writer = ZipWriter::new(fs::File::create(path).unwrap());
        for (name, body) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn reads_first_matching_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.kmz");
        write_zip(&path, &[("images/icon.png", "png"), ("doc.KML", "<kml/>")]);

        assert_eq!(read_zip_entry(&path, "kml").unwrap().as_deref(), Some("<kml/>"));
        assert_eq!(read_zip_entry(&path, "shp").unwrap(), None);
    }

    #[test]
    fn finds_nested_files_after_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.zip");
        write_zip(&path, &[("inner/fields.shp", "x"), ("inner/fields.dbf", "y")]);

        let out = dir.path().join("out");
        extract_zip(&path, &out).unwrap();
        let shp = find_with_extension(&out, "shp").unwrap();
        assert!(shp.ends_with("inner/fields.shp"));
        assert!(find_with_extension(&out, "prj").is_none());
    }
}
