//! Writing the built page to disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name written into the output directory and the project root.
pub const INDEX_FILE: &str = "index.html";

/// Where the page goes.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    /// Directory receiving `index.html`
    pub output_dir: PathBuf,

    /// Path the built page is copied to afterwards
    pub root_copy: PathBuf,

    /// Write through a temporary file and rename into place
    pub atomic: bool,
}

/// Paths produced by [`OutputWriter::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    pub output: PathBuf,
    pub root_copy: PathBuf,
}

impl OutputWriter {
    /// Write `html` to `<output_dir>/index.html`, then copy it to the root.
    pub fn write(&self, html: &str) -> io::Result<WrittenFiles> {
        fs::create_dir_all(&self.output_dir)?;

        let output = self.output_dir.join(INDEX_FILE);
        if self.atomic {
            write_atomic(&output, html.as_bytes())?;
        } else {
            fs::write(&output, html)?;
        }
        tracing::info!("Built {}", output.display());

        if same_file(&output, &self.root_copy) {
            tracing::debug!("Output already at {}, skipping copy", self.root_copy.display());
        } else {
            self.copy_to_root(&output)?;
            tracing::info!("Copied {} to {}", INDEX_FILE, self.root_copy.display());
        }

        Ok(WrittenFiles {
            output,
            root_copy: self.root_copy.clone(),
        })
    }

    fn copy_to_root(&self, output: &Path) -> io::Result<()> {
        if self.atomic {
            let bytes = fs::read(output)?;
            write_atomic(&self.root_copy, &bytes)
        } else {
            fs::copy(output, &self.root_copy).map(|_| ())
        }
    }
}

/// Whether both paths name the same existing file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Write to a sibling temp file and rename it over `path`.
fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or(INDEX_FILE);
    let temp = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&temp, contents)?;
    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(e);
    }
    Ok(())
}
