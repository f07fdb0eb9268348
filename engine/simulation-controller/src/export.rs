//! Flight path export

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::aircraft::AircraftTrack;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to create export directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Export collaborator receiving each aircraft's path history on stop
pub trait PathExporter: Send + Sync {
    /// Returns the files written
    fn export(&self, tracks: &[AircraftTrack]) -> Result<Vec<PathBuf>, ExportError>;
}

/// Writes one `visited-aircraft-{id}-{timestamp}.csv` file per aircraft
#[derive(Debug, Clone)]
pub struct CsvPathExporter {
    directory: PathBuf,
}

impl CsvPathExporter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }

    fn write_track(path: &Path, track: &AircraftTrack) -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "x,y,z")?;
        for point in &track.points {
            writeln!(writer, "{:.2},{:.2},{:.2}", point.x, point.y, point.z)?;
        }
        writer.flush()
    }
}

impl PathExporter for CsvPathExporter {
    fn export(&self, tracks: &[AircraftTrack]) -> Result<Vec<PathBuf>, ExportError> {
        fs::create_dir_all(&self.directory)
            .map_err(|source| ExportError::CreateDir { path: self.directory.clone(), source })?;

        let export_time = chrono::Local::now().format("%Y-%m-%d-%H-%M-%S");
        let mut written = Vec::with_capacity(tracks.len());

        for track in tracks {
            let path = self.directory.join(format!("visited-aircraft-{}-{}.csv", track.id, export_time));
            Self::write_track(&path, track)
                .map_err(|source| ExportError::Io { path: path.clone(), source })?;
            written.push(path);
        }

        Ok(written)
    }
}
