//! Memory image handles and discovery.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

/// File extensions acquisition tools give raw memory captures.
pub const IMAGE_EXTENSIONS: &[&str] = &["raw", "mem", "vmem", "dmp", "mddramimage"];

/// A raw physical-memory capture on disk. The file is produced externally
/// and never mutated here; this is just a typed handle around its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryImage {
    path: PathBuf,
}

impl MemoryImage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base filename with extension, used as the record's identity field.
    pub fn name_extn(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    /// Streaming SHA-256 of the image. Images run to tens of gigabytes, so
    /// the file is hashed in 1 MiB chunks rather than read whole.
    pub fn sha256(&self) -> Result<String> {
        let mut file = fs::File::open(&self.path)
            .with_context(|| format!("cannot open {}", self.path.display()))?;
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; 1024 * 1024];
        loop {
            let n = file
                .read(&mut buf)
                .with_context(|| format!("cannot read {}", self.path.display()))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// Check whether a path carries a known memory-capture extension.
pub fn is_memory_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Collect memory images from the given paths. Files are taken as-is
/// (the caller named them deliberately); directories are walked and
/// filtered by extension.
pub fn collect_images(paths: &[PathBuf]) -> Vec<MemoryImage> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            images.push(MemoryImage::new(path.clone()));
        } else if path.is_dir() {
            for entry in WalkDir::new(path).follow_links(false).into_iter().flatten() {
                let p = entry.into_path();
                if p.is_file() && is_memory_image(&p) {
                    images.push(MemoryImage::new(p));
                }
            }
        }
    }

    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn name_extn_is_the_base_filename() {
        let image = MemoryImage::new("/dumps/infected/memory_dmp.raw");
        assert_eq!(image.name_extn(), "memory_dmp.raw");
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(is_memory_image(Path::new("a/b/capture.RAW")));
        assert!(is_memory_image(Path::new("vm.vmem")));
        assert!(is_memory_image(Path::new("host.mddramimage")));
        assert!(!is_memory_image(Path::new("notes.txt")));
        assert!(!is_memory_image(Path::new("no_extension")));
    }

    #[test]
    fn collect_images_walks_directories_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("one.raw"), b"x").unwrap();
        fs::write(dir.path().join("two.vmem"), b"x").unwrap();
        fs::write(dir.path().join("skip.txt"), b"x").unwrap();

        let mut found: Vec<String> = collect_images(&[dir.path().to_path_buf()])
            .into_iter()
            .map(|i| i.name_extn())
            .collect();
        found.sort();

        assert_eq!(found, vec!["one.raw", "two.vmem"]);
    }

    #[test]
    fn explicit_files_are_kept_regardless_of_extension() {
        let dir = tempfile::tempdir().unwrap();
        let odd = dir.path().join("capture.bin");
        fs::write(&odd, b"x").unwrap();

        let found = collect_images(&[odd.clone()]);
        assert_eq!(found, vec![MemoryImage::new(odd)]);
    }

    #[test]
    fn sha256_known_content() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"hello world").unwrap();
        tmp.flush().unwrap();

        let hash = MemoryImage::new(tmp.path()).sha256().unwrap();
        // SHA-256 of "hello world"
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn sha256_missing_file_is_an_error() {
        let image = MemoryImage::new("/nonexistent/capture.raw");
        assert!(image.sha256().is_err());
    }
}
