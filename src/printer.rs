//! Printer sinks
//!
//! Output between `CSI 5 i` and `CSI 4 i` is collected by the parser and
//! handed to the installed printer as one block.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use crate::error::{Error, Result};

/// File name used when an editor job names no file
const DEFAULT_JOB_NAME: &str = "print.txt";

/// Receives completed print jobs
pub trait Printer {
    fn print(&mut self, data: &[u8]);
}

impl<F> Printer for F
where
    F: FnMut(&[u8]),
{
    fn print(&mut self, data: &[u8]) {
        self(data)
    }
}

/// Writes each print job to a file, replacing what was there
#[derive(Debug, Clone)]
pub struct FilePrinter {
    path: PathBuf,
}

impl FilePrinter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Write one job to the file
    pub fn write_job(&self, data: &[u8]) -> Result<()> {
        std::fs::write(&self.path, data).map_err(|source| Error::Printer {
            path: self.path.clone(),
            source,
        })
    }
}

impl Printer for FilePrinter {
    fn print(&mut self, data: &[u8]) {
        if let Err(e) = self.write_job(data) {
            tracing::warn!("{}", e);
        }
    }
}

/// Shows a written print job to the user
pub type Opener = Arc<dyn Fn(&Path) -> io::Result<()> + Send + Sync>;

/// Open `path` with the desktop's default application. Does not wait for
/// the viewer to exit.
pub fn open_with_default_app(path: &Path) -> io::Result<()> {
    let mut command = if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else if cfg!(target_os = "macos") {
        Command::new("open")
    } else {
        Command::new("xdg-open")
    };
    let mut child = command.arg(path).spawn()?;
    std::thread::spawn(move || child.wait());
    Ok(())
}

/// Writes each print job into a fresh temporary directory and hands the
/// file to an opener, typically an editor or viewer.
///
/// Only the last component of the requested name is used. The directory is
/// left behind so the viewer can still read the file.
#[derive(Clone)]
pub struct EditorPrinter {
    file_name: PathBuf,
    opener: Opener,
}

impl fmt::Debug for EditorPrinter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorPrinter")
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

impl EditorPrinter {
    pub fn new(name: &str, opener: Opener) -> Self {
        let file_name = Path::new(name)
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_JOB_NAME));
        Self { file_name, opener }
    }

    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    /// Write one job and return where it landed
    pub fn write_job(&self, data: &[u8]) -> Result<PathBuf> {
        let dir = tempfile::Builder::new()
            .prefix("print-data")
            .tempdir()
            .map_err(|source| Error::Printer {
                path: std::env::temp_dir(),
                source,
            })?
            .into_path();
        let path = dir.join(&self.file_name);
        std::fs::write(&path, data).map_err(|source| Error::Printer {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

impl Printer for EditorPrinter {
    fn print(&mut self, data: &[u8]) {
        let path = match self.write_job(data) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("{}", e);
                return;
            }
        };
        tracing::debug!("Opening print job {}", path.display());
        if let Err(e) = (self.opener)(&path) {
            tracing::warn!("Failed to open {}: {}", path.display(), e);
        }
    }
}
