//! File interchange for strain comparison.
//!
//! - **VTK XML** PolyData (`.vtp`) and UnstructuredGrid (`.vtu`), ASCII
//!   encoding, for surfaces, wedge volumes and compiled results
//! - **Text report** listing the compared values point by point
//!
//! All writers write to a temporary file in the destination directory and
//! rename it into place, so a failed write never leaves partial output.
//!
//! # Format Detection
//!
//! ```no_run
//! use strain_io::{read_surface, write_surface};
//!
//! let surface = read_surface("receiver.vtp").unwrap();
//! write_surface(&surface, "receiver.vtu").unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod atomic;
mod error;
mod report;
mod vtk;

pub use error::{IoError, IoResult};
pub use report::{write_report, Report};
pub use vtk::{
    read_vtp, read_vtu, write_volume_vtu, write_vtp, write_vtu, VTK_TRIANGLE, VTK_WEDGE,
};

use std::path::Path;

use strain_types::Surface;

/// Supported surface file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// VTK XML PolyData.
    Vtp,
    /// VTK XML UnstructuredGrid.
    Vtu,
}

impl MeshFormat {
    /// Detect format from file extension.
    ///
    /// Returns `None` if the extension is not recognized.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "vtp" => Some(Self::Vtp),
            "vtu" => Some(Self::Vtu),
            _ => None,
        }
    }

    /// Get the canonical file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Vtp => "vtp",
            Self::Vtu => "vtu",
        }
    }
}

fn detect(path: &Path) -> IoResult<MeshFormat> {
    MeshFormat::from_path(path).ok_or_else(|| IoError::UnknownFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Load a surface, detecting the format from the extension.
///
/// # Errors
///
/// Returns an error if the extension is not recognized or the file cannot
/// be read.
pub fn read_surface<P: AsRef<Path>>(path: P) -> IoResult<Surface> {
    let path = path.as_ref();
    match detect(path)? {
        MeshFormat::Vtp => read_vtp(path),
        MeshFormat::Vtu => read_vtu(path),
    }
}

/// Save a surface, detecting the format from the extension.
///
/// # Errors
///
/// Returns an error if the extension is not recognized or the file cannot
/// be written.
pub fn write_surface<P: AsRef<Path>>(surface: &Surface, path: P) -> IoResult<()> {
    let path = path.as_ref();
    match detect(path)? {
        MeshFormat::Vtp => write_vtp(surface, path),
        MeshFormat::Vtu => write_vtu(surface, path),
    }
}
