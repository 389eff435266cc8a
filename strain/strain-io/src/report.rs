//! Plain-text comparison report.
//!
//! ```text
//! Receiver (Moving) File Name: receiver.vtp
//! Donor (Fixed) File Name: donor.vtp
//! Initial Transform. Translate (0,0,0). Rotate (0,0,0)
//! Point,Drop Tower Strain,Instron Strain,Diff,x,y,z
//! 0,0.1,0.15,0.05,1,2,3
//! ```

use std::io::Write;
use std::path::Path;

use strain_compile::CompiledSurface;
use strain_registration::InitialAlignment;
use tracing::debug;

use crate::atomic::write_atomic;
use crate::error::IoResult;

/// Inputs to a comparison report.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    /// Receiver file as given by the user.
    pub receiver_file: &'a Path,
    /// Donor file as given by the user.
    pub donor_file: &'a Path,
    /// Initial alignment used.
    pub initial: &'a InitialAlignment,
    /// Compiled comparison data.
    pub compiled: &'a CompiledSurface,
}

impl Report<'_> {
    /// Writes the report to any writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn write_to<W: Write>(&self, mut out: W) -> IoResult<()> {
        writeln!(
            out,
            "Receiver (Moving) File Name: {}",
            self.receiver_file.display()
        )?;
        writeln!(out, "Donor (Fixed) File Name: {}", self.donor_file.display())?;
        writeln!(out, "{}", self.initial)?;

        let [receiver, donor, _] = self.compiled.field_names();
        writeln!(out, "Point,{receiver},{donor},Diff,x,y,z")?;
        for row in self.compiled.rows() {
            writeln!(
                out,
                "{},{},{},{},{},{},{}",
                row.index,
                row.receiver,
                row.donor,
                row.delta,
                row.position.x,
                row.position.y,
                row.position.z
            )?;
        }
        Ok(())
    }
}

/// Writes a comparison report to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_report<P: AsRef<Path>>(report: &Report<'_>, path: P) -> IoResult<()> {
    let path = path.as_ref();
    let mut buffer = Vec::new();
    report.write_to(&mut buffer)?;
    write_atomic(path, &buffer)?;
    debug!(path = %path.display(), rows = report.compiled.point_count(), "wrote report");
    Ok(())
}
