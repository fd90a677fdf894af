// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Sample file and manifest output.
//!
//! The CSV is one column with the header `ns` and one integer per line. The
//! manifest sits beside it at `<out>.json`.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::metrics::RunManifest;

/// Column header of every sample file.
pub const CSV_HEADER: &str = "ns";

/// Errors that can occur while writing or reading run output.
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{}:{line}: malformed sample {value:?}", path.display())]
    MalformedSample {
        path: PathBuf,
        line: usize,
        value: String,
    },

    #[error("{}: missing 'ns' header", path.display())]
    MissingHeader { path: PathBuf },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ReporterError + '_ {
    move |source| ReporterError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes the outputs of one run.
#[derive(Debug, Clone)]
pub struct SampleReporter {
    csv_path: PathBuf,
}

impl SampleReporter {
    /// Reporter for `csv_path`, creating its parent directory if needed.
    pub fn new(csv_path: impl AsRef<Path>) -> Result<Self, ReporterError> {
        let csv_path = csv_path.as_ref().to_path_buf();
        if let Some(parent) = csv_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }
        Ok(Self { csv_path })
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    /// Where the manifest for this CSV goes.
    pub fn manifest_path(&self) -> PathBuf {
        manifest_path_for(&self.csv_path)
    }

    /// Write the sample file, replacing any previous one.
    pub fn write_samples(&self, samples: &[u32]) -> Result<(), ReporterError> {
        let path = &self.csv_path;
        let file = File::create(path).map_err(io_err(path))?;
        let mut out = BufWriter::new(file);
        writeln!(out, "{CSV_HEADER}").map_err(io_err(path))?;
        for s in samples {
            writeln!(out, "{s}").map_err(io_err(path))?;
        }
        out.flush().map_err(io_err(path))?;

        tracing::debug!(path = %path.display(), rows = samples.len(), "wrote samples");
        Ok(())
    }

    /// Write the manifest beside the sample file.
    pub fn write_manifest(&self, manifest: &RunManifest) -> Result<PathBuf, ReporterError> {
        let path = self.manifest_path();
        let file = File::create(&path).map_err(io_err(&path))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, manifest)?;
        Ok(path)
    }
}

/// `<csv>.json`
pub fn manifest_path_for(csv_path: &Path) -> PathBuf {
    let mut name: OsString = csv_path.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

/// Read a sample file back.
pub fn read_samples(path: impl AsRef<Path>) -> Result<Vec<u32>, ReporterError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(io_err(path))?;
    let mut lines = BufReader::new(file).lines();

    match lines.next().transpose().map_err(io_err(path))? {
        Some(header) if header.trim() == CSV_HEADER => {}
        _ => {
            return Err(ReporterError::MissingHeader {
                path: path.to_path_buf(),
            })
        }
    }

    let mut samples = Vec::new();
    for (idx, line) in lines.enumerate() {
        let line = line.map_err(io_err(path))?;
        let value = line.trim();
        if value.is_empty() {
            continue;
        }
        let sample = value
            .parse()
            .map_err(|_| ReporterError::MalformedSample {
                path: path.to_path_buf(),
                line: idx + 2,
                value: value.to_string(),
            })?;
        samples.push(sample);
    }
    Ok(samples)
}

/// Load a manifest written by [`SampleReporter::write_manifest`].
pub fn load_manifest(path: impl AsRef<Path>) -> Result<RunManifest, ReporterError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(io_err(path))?;
    let manifest = serde_json::from_reader(BufReader::new(file))?;
    Ok(manifest)
}
