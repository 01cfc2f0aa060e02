// Acquisition of the snapshot, from a local file or a remote endpoint.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::results::snapshot_reader::parse_snapshot;
use crate::results::*;

pub const DEFAULT_DATA_FILE: &str = "data/sample_data.json";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10);
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Where the snapshot comes from.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum DataSource {
    Remote(String),
    /// The candidate files, probed in order.
    Local(Vec<PathBuf>),
}

impl DataSource {
    /// A remote URL, when configured, takes precedence over the local file.
    pub fn from_settings(url: Option<String>, data_path: Option<String>) -> DataSource {
        match url {
            Some(u) if !u.trim().is_empty() => DataSource::Remote(u.trim().to_string()),
            _ => match data_path {
                Some(p) => DataSource::Local(vec![PathBuf::from(p)]),
                None => DataSource::Local(default_search_paths()),
            },
        }
    }
}

/// The usual locations of the data file: the working directory, then next to
/// the executable and its parent directory.
pub fn default_search_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        paths.push(cwd.join(DEFAULT_DATA_FILE));
    }
    if let Some(exe_dir) = env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
    {
        paths.push(exe_dir.join(DEFAULT_DATA_FILE));
        if let Some(parent) = exe_dir.parent() {
            paths.push(parent.join(DEFAULT_DATA_FILE));
        }
    }
    paths
}

/// A parsed snapshot, with the original JSON kept for the raw feed.
#[derive(PartialEq, Debug, Clone)]
pub struct LoadedSnapshot {
    pub origin: String,
    pub raw: JSValue,
    pub data: ElectionData,
}

pub fn load_snapshot(source: &DataSource) -> ResultsResult<LoadedSnapshot> {
    let (origin, contents) = match source {
        DataSource::Remote(url) => (url.clone(), fetch_remote(url)?),
        DataSource::Local(paths) => read_local(paths)?,
    };
    let (raw, data) = parse_snapshot(&contents, &origin)?;
    info!(
        "load_snapshot: {} municipalities from {}",
        data.municipalities.len(),
        origin
    );
    Ok(LoadedSnapshot { origin, raw, data })
}

fn read_local(paths: &[PathBuf]) -> ResultsResult<(String, String)> {
    let searched: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    for p in paths.iter() {
        debug!("read_local: probing {:?}", p);
        if !p.is_file() {
            continue;
        }
        let origin = p.display().to_string();
        return match fs::read_to_string(p) {
            Ok(contents) => Ok((origin, contents)),
            Err(e) => SourceUnavailableSnafu {
                reason: format!("{}: {}", origin, e),
                searched,
            }
            .fail(),
        };
    }
    SourceUnavailableSnafu {
        reason: "Data file not found",
        searched,
    }
    .fail()
}

fn fetch_remote(url: &str) -> ResultsResult<String> {
    info!("fetch_remote: {}", url);
    let unavailable = |reason: String| ResultsError::SourceUnavailable {
        reason,
        searched: vec![url.to_string()],
    };
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| unavailable(e.to_string()))?;
    let response = client
        .get(url)
        .send()
        .map_err(|e| unavailable(e.to_string()))?;
    if !response.status().is_success() {
        return Err(unavailable(format!("{} returned {}", url, response.status())));
    }
    response.text().map_err(|e| unavailable(e.to_string()))
}

/// Keeps the last snapshot for a fixed time.
///
/// The cache belongs to the caller and serves a single source. Failed loads
/// are not cached.
#[derive(Debug)]
pub struct SnapshotCache {
    ttl: Duration,
    entry: Option<(Instant, Arc<LoadedSnapshot>)>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> SnapshotCache {
        SnapshotCache { ttl, entry: None }
    }

    pub fn get_or_load(&mut self, source: &DataSource) -> ResultsResult<Arc<LoadedSnapshot>> {
        self.get_or_load_with(Instant::now(), || load_snapshot(source))
    }

    pub fn get_or_load_with<F>(&mut self, now: Instant, load: F) -> ResultsResult<Arc<LoadedSnapshot>>
    where
        F: FnOnce() -> ResultsResult<LoadedSnapshot>,
    {
        if let Some((fetched_at, snapshot)) = &self.entry {
            let age = now.saturating_duration_since(*fetched_at);
            if age < self.ttl {
                debug!("SnapshotCache: hit, fetched {:?} ago", age);
                return Ok(snapshot.clone());
            }
        }
        let snapshot = Arc::new(load()?);
        self.entry = Some((now, snapshot.clone()));
        Ok(snapshot)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
