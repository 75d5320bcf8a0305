//! Output tree writer.
//!
//! Places generated pages and assets under the output directory, creating
//! parent directories on demand. Site-relative paths use forward slashes
//! everywhere; conversion to the host separator happens only here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mdsite_index::ResolvedAsset;

/// Writes the generated site to disk.
#[derive(Debug)]
pub struct SiteWriter {
    out_dir: PathBuf,
}

impl SiteWriter {
    #[must_use]
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }

    /// Write one generated page.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error; the caller treats it as a
    /// per-document failure, not a build failure.
    pub fn write_page(&self, output_path: &str, html: &str) -> io::Result<()> {
        let dest = self.dest(output_path);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, html)
    }

    /// Copy one resolved asset into the output tree.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    pub fn copy_asset(&self, asset: &ResolvedAsset) -> io::Result<()> {
        let dest = self.dest(&asset.output_path);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&asset.disk_path, dest)?;
        Ok(())
    }

    fn dest(&self, site_path: &str) -> PathBuf {
        let mut dest = self.out_dir.clone();
        for segment in site_path.split('/').filter(|s| !s.is_empty()) {
            dest.push(segment);
        }
        dest
    }

    /// The output root.
    #[must_use]
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}
