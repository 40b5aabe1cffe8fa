//! Result file output for the CLI frontend.
//!
//! Each series goes to its own file in the output directory, one decimal
//! value per line in recording order.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

use crate::error::{Result, SimError};

use super::{ResultSeries, SeriesKind};

fn write_error(path: &Path, source: std::io::Error) -> SimError {
    SimError::OutputWrite {
        path: path.display().to_string(),
        source,
    }
}

/// Remove any result files left over from a previous run.
pub fn clear_files(dir: &Path) -> Result<()> {
    for kind in SeriesKind::ALL {
        let path = dir.join(kind.file_name());
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(write_error(&path, e)),
        }
    }
    Ok(())
}

/// Append every series to its file in `dir`, creating the directory if needed.
pub fn write_series(dir: &Path, series: &ResultSeries) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| write_error(dir, e))?;

    for kind in SeriesKind::ALL {
        let path = dir.join(kind.file_name());
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| write_error(&path, e))?;
        write_values(file, series.get(kind)).map_err(|e| write_error(&path, e))?;
    }
    Ok(())
}

fn write_values(file: File, values: &[f64]) -> std::io::Result<()> {
    let mut out = BufWriter::new(file);
    for v in values {
        writeln!(out, "{v}")?;
    }
    out.flush()
}
