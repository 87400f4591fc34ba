//! ---
//! ems_section: "11-simulation"
//! ems_subsection: "02-metering-fixtures"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Metering fixture synthesis and export."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
//! CSV export with the three-row header convention: UTF-8 byte-order mark,
//! machine column names, human-readable descriptions, then data rows.
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::errors::{FixtureError, Result};
use crate::schema::Record;

/// UTF-8 byte-order mark written ahead of every table.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes record tables into one output directory.
#[derive(Debug, Clone)]
pub struct TabularWriter {
    dir: PathBuf,
}

impl TabularWriter {
    /// Create `dir` (and parents) if missing.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| FixtureError::OutputDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for<R: Record>(&self) -> PathBuf {
        self.dir.join(R::TABLE.file_name())
    }

    /// Write `rows` to the table file for `R`, replacing any previous file.
    pub fn write<R: Record>(&self, rows: &[R]) -> Result<PathBuf> {
        let table = R::TABLE.file_name();
        let path = self.path_for::<R>();
        let io_err = |source| FixtureError::Io { table, source };
        let csv_err = |source| FixtureError::Csv { table, source };

        let mut buffer = BufWriter::new(File::create(&path).map_err(io_err)?);
        buffer.write_all(UTF8_BOM).map_err(io_err)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(buffer);
        writer.write_record(R::column_names()).map_err(csv_err)?;
        writer.write_record(R::column_descriptions()).map_err(csv_err)?;
        for row in rows {
            writer.serialize(row).map_err(csv_err)?;
        }
        writer.flush().map_err(io_err)?;
        Ok(path)
    }
}
