//! Data loader module for discovering and parsing sleep exports
//!
//! Sleep intervals are read from exported files:
//!
//! - `.jsonl`: one [`RawSleepRecord`] per line
//! - `.json`: a JSON array of [`RawSleepRecord`]s
//!
//! Search locations, in order:
//!
//! - paths passed explicitly (`--file`), which may be files or directories
//! - `$SLEEPSTAT_DATA_PATH`
//! - the platform data directory (`~/.local/share/sleepstat`,
//!   `~/Library/Application Support/sleepstat`, `%APPDATA%\sleepstat`)
//!
//! Lines and records that fail to parse, and `.json` files that are not
//! arrays, are skipped with a warning. Records with non-sleep stages are
//! dropped silently by [`SleepInterval::from_raw`].
//!
//! # Examples
//!
//! ```no_run
//! use sleepstat::data_loader::DataLoader;
//! use futures::StreamExt;
//!
//! # async fn example() -> sleepstat::Result<()> {
//! let data_loader = DataLoader::new().await?;
//!
//! let intervals = data_loader.load_intervals();
//! tokio::pin!(intervals);
//! while let Some(result) = intervals.next().await {
//!     let interval = result?;
//!     println!("{} {} -> {}", interval.source, interval.start, interval.end);
//! }
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, SleepstatError};
use crate::filters::DateWindow;
use crate::timezone::TimezoneConfig;
use crate::types::{RawSleepRecord, SleepInterval};
use futures::StreamExt;
use futures::stream::Stream;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// Environment variable overriding the data directory
pub const DATA_PATH_ENV: &str = "SLEEPSTAT_DATA_PATH";

/// Discovers export files and streams the intervals they contain
#[derive(Debug, Clone)]
pub struct DataLoader {
    data_paths: Vec<PathBuf>,
}

impl DataLoader {
    /// Create a DataLoader from `$SLEEPSTAT_DATA_PATH` or the platform data dir
    ///
    /// # Errors
    ///
    /// Returns [`SleepstatError::NoDataFound`] if no location exists
    pub async fn new() -> Result<Self> {
        let candidates = Self::default_paths();
        let paths: Vec<PathBuf> = candidates.iter().filter(|p| p.exists()).cloned().collect();
        if paths.is_empty() {
            return Err(SleepstatError::NoDataFound(Self::describe(&candidates)));
        }

        debug!("Discovered {} sleep data locations", paths.len());
        Ok(Self { data_paths: paths })
    }

    /// Create a DataLoader over explicit files or directories
    ///
    /// # Errors
    ///
    /// Returns [`SleepstatError::NoDataFound`] if none of the paths exist
    pub fn from_paths(paths: Vec<PathBuf>) -> Result<Self> {
        let (existing, missing): (Vec<PathBuf>, Vec<PathBuf>) =
            paths.into_iter().partition(|p| p.exists());
        for path in &missing {
            warn!("Data path does not exist: {}", path.display());
        }
        if existing.is_empty() {
            return Err(SleepstatError::NoDataFound(Self::describe(&missing)));
        }
        Ok(Self {
            data_paths: existing,
        })
    }

    fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Ok(custom_path) = std::env::var(DATA_PATH_ENV)
            && !custom_path.is_empty()
        {
            paths.push(PathBuf::from(custom_path));
        }
        if let Some(data_dir) = dirs::data_dir() {
            paths.push(data_dir.join("sleepstat"));
        }
        paths
    }

    fn describe(paths: &[PathBuf]) -> String {
        if paths.is_empty() {
            return format!("no data directory; set {DATA_PATH_ENV} or pass --file");
        }
        paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The locations this loader reads from
    pub fn paths(&self) -> &[PathBuf] {
        &self.data_paths
    }

    /// Find all `.jsonl` and `.json` files under the data paths, sorted
    pub async fn find_data_files(&self) -> Result<Vec<PathBuf>> {
        let mut data_files = Vec::new();

        for base_path in &self.data_paths {
            let path_clone = base_path.clone();
            let files = tokio::task::spawn_blocking(move || {
                use walkdir::WalkDir;
                let mut files = Vec::new();

                for entry in WalkDir::new(path_clone).into_iter().filter_map(|e| e.ok()) {
                    let path = entry.path();
                    if entry.file_type().is_file() && ExportFormat::of(path).is_some() {
                        files.push(path.to_path_buf());
                    }
                }
                files
            })
            .await
            .map_err(|e| SleepstatError::Io(std::io::Error::other(e.to_string())))?;

            data_files.extend(files);
        }

        data_files.sort();
        data_files.dedup();
        info!("Found {} sleep data files to process", data_files.len());
        Ok(data_files)
    }

    /// Stream every sleep interval from every data file
    pub fn load_intervals(&self) -> impl Stream<Item = Result<SleepInterval>> + '_ {
        async_stream::stream! {
            let files = match self.find_data_files().await {
                Ok(files) => files,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            for file_path in files {
                let intervals = Self::parse_file_stream(file_path);
                tokio::pin!(intervals);
                while let Some(result) = intervals.next().await {
                    yield result;
                }
            }
        }
    }

    /// Collect the intervals touching `window` in local time
    ///
    /// The window should already include the over-fetch margin.
    pub async fn load_window(
        &self,
        window: &DateWindow,
        tz: &TimezoneConfig,
    ) -> Result<Vec<SleepInterval>> {
        let stream = self.load_intervals();
        tokio::pin!(stream);

        let mut intervals = Vec::new();
        while let Some(result) = stream.next().await {
            let interval = result?;
            if window.overlaps_interval(&interval, tz) {
                intervals.push(interval);
            }
        }

        debug!("Loaded {} intervals in window", intervals.len());
        Ok(intervals)
    }

    fn parse_file_stream(path: PathBuf) -> impl Stream<Item = Result<SleepInterval>> {
        async_stream::stream! {
            match ExportFormat::of(&path) {
                Some(ExportFormat::JsonLines) => {
                    let file = match tokio::fs::File::open(&path).await {
                        Ok(f) => f,
                        Err(e) => {
                            yield Err(e.into());
                            return;
                        }
                    };

                    let mut reader = BufReader::new(file);
                    let mut buf = Vec::new();
                    let mut line_number = 0;

                    loop {
                        buf.clear();
                        match reader.read_until(b'\n', &mut buf).await {
                            Ok(0) => break,
                            Ok(_) => {}
                            Err(e) => {
                                warn!(
                                    "Stopped reading {} after line {}: {}",
                                    path.display(),
                                    line_number,
                                    e
                                );
                                break;
                            }
                        }
                        line_number += 1;

                        let line = match std::str::from_utf8(&buf) {
                            Ok(line) => line.trim(),
                            Err(e) => {
                                warn!(
                                    "Skipping line {} in {}: invalid UTF-8: {}",
                                    line_number,
                                    path.display(),
                                    e
                                );
                                continue;
                            }
                        };
                        if line.is_empty() {
                            continue;
                        }

                        match serde_json::from_str::<RawSleepRecord>(line) {
                            Ok(raw) => {
                                if let Some(interval) = SleepInterval::from_raw(raw) {
                                    yield Ok(interval);
                                }
                            }
                            Err(e) => {
                                warn!(
                                    "Failed to parse line {} in {}: {}",
                                    line_number,
                                    path.display(),
                                    e
                                );
                            }
                        }
                    }
                }
                Some(ExportFormat::JsonArray) => {
                    let content = match tokio::fs::read(&path).await {
                        Ok(c) => c,
                        Err(e) => {
                            yield Err(e.into());
                            return;
                        }
                    };

                    // Other JSON files may share the directory; only arrays hold records
                    let records: Vec<serde_json::Value> = match serde_json::from_slice(&content) {
                        Ok(records) => records,
                        Err(e) => {
                            warn!(
                                "Skipping {}: expected a JSON array of records: {}",
                                path.display(),
                                e
                            );
                            return;
                        }
                    };

                    for (index, value) in records.into_iter().enumerate() {
                        match serde_json::from_value::<RawSleepRecord>(value) {
                            Ok(raw) => {
                                if let Some(interval) = SleepInterval::from_raw(raw) {
                                    yield Ok(interval);
                                }
                            }
                            Err(e) => {
                                warn!(
                                    "Failed to parse record {} in {}: {}",
                                    index,
                                    path.display(),
                                    e
                                );
                            }
                        }
                    }
                }
                None => debug!("Ignoring unsupported file {}", path.display()),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    JsonLines,
    JsonArray,
}

impl ExportFormat {
    fn of(path: &Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("jsonl") => Some(Self::JsonLines),
            Some("json") => Some(Self::JsonArray),
            _ => None,
        }
    }
}
