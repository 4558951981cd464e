use std::{
    collections::BTreeSet,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, warn};
use tripflow_core::{
    progress::{decode_progress, encode_progress, progress_key, ProgressStore, DEFAULT_KEY_PREFIX},
    CoreError,
};
use tripflow_domain::{BookingId, WizardProgress, WizardStep};

const PROGRESS_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Filesystem-backed wizard progress: one JSON blob per booking.
#[derive(Debug, Clone)]
pub struct JsonProgressStore {
    progress_dir: PathBuf,
    prefix: String,
}

impl JsonProgressStore {
    pub fn new(progress_dir: PathBuf) -> Result<Self, CoreError> {
        Self::with_prefix(progress_dir, DEFAULT_KEY_PREFIX)
    }

    pub fn with_prefix(progress_dir: PathBuf, prefix: impl Into<String>) -> Result<Self, CoreError> {
        fs::create_dir_all(&progress_dir)?;
        Ok(Self {
            progress_dir,
            prefix: prefix.into(),
        })
    }

    pub fn progress_dir(&self) -> &Path {
        &self.progress_dir
    }

    pub fn progress_path(&self, booking_id: &BookingId) -> PathBuf {
        let key = progress_key(&self.prefix, booking_id);
        self.progress_dir
            .join(format!("{}.{}", file_stem(&key), PROGRESS_EXTENSION))
    }

    /// Stored keys (file stems), sorted.
    pub fn list_keys(&self) -> Result<Vec<String>, CoreError> {
        if !self.progress_dir.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.progress_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(PROGRESS_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

impl ProgressStore for JsonProgressStore {
    fn load(&self, booking_id: &BookingId) -> WizardProgress {
        let path = self.progress_path(booking_id);
        match fs::read_to_string(&path) {
            Ok(raw) => decode_progress(booking_id, &raw),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                WizardProgress::new(booking_id.clone())
            }
            Err(err) => {
                warn!(
                    booking = %booking_id,
                    path = %path.display(),
                    error = %err,
                    "unreadable wizard progress; starting fresh"
                );
                WizardProgress::new(booking_id.clone())
            }
        }
    }

    fn save(
        &self,
        booking_id: &BookingId,
        step: WizardStep,
        completed: &BTreeSet<WizardStep>,
    ) -> Result<(), CoreError> {
        let path = self.progress_path(booking_id);
        let blob = encode_progress(step, completed)?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &blob)?;
        fs::rename(&tmp, &path)?;
        debug!(booking = %booking_id, path = %path.display(), "wizard progress saved");
        Ok(())
    }

    fn clear(&self, booking_id: &BookingId) -> Result<(), CoreError> {
        let path = self.progress_path(booking_id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Keys already in canonical form are used as-is. Any other key gets `_<hex of the raw key>`
/// appended; canonical stems never contain `_`, so distinct keys never share a file.
fn file_stem(key: &str) -> String {
    let canonical = canonical_name(key);
    if canonical == key {
        return canonical;
    }
    let hex: String = key.bytes().map(|byte| format!("{:02x}", byte)).collect();
    format!("{}_{}", canonical, hex)
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches(|c| c == '_' || c == '-').is_empty() {
        "progress".into()
    } else {
        sanitized
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
