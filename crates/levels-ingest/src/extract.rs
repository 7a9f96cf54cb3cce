use crate::IngestError;
use levels_core::FileRoute;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug)]
pub(crate) struct Extracted {
    pub title: String,
    pub stored_path: Option<String>,
    pub text: Option<String>,
    pub meta: Map<String, Value>,
}

impl Extracted {
    fn titled(title: String) -> Self {
        Self {
            title,
            stored_path: None,
            text: None,
            meta: Map::new(),
        }
    }
}

pub(crate) fn extract_inbox_file(
    route: FileRoute,
    path: &Path,
    media_root: &Path,
    probe_program: &str,
) -> Result<Extracted, IngestError> {
    let mut extracted = Extracted::titled(file_stem(path));

    match route {
        FileRoute::Recording => {
            let dest = relocate(path, media_root, "recordings")?;
            let duration = probe_duration(probe_program, &dest)?;
            extracted
                .meta
                .insert("duration".to_string(), Value::from(duration));
            extracted.stored_path = Some(dest.display().to_string());
        }
        FileRoute::Note | FileRoute::Conversation => {
            extracted.text = Some(read_strict(path)?);
            extracted.stored_path = Some(path.display().to_string());
        }
        FileRoute::Repo => {
            extracted.text = Some(read_strict(path)?.trim().to_string());
            extracted.stored_path = Some(path.display().to_string());
        }
        FileRoute::Book => {
            let dest = relocate(path, media_root, "books")?;
            extracted.stored_path = Some(dest.display().to_string());
        }
        FileRoute::StudyNote => {
            // Study notes come from messy exports; replace bad bytes instead
            // of failing the file.
            extracted.text = Some(read_lossy(path)?);
            extracted.stored_path = Some(path.display().to_string());
        }
        FileRoute::ChallengeJson => {
            extracted.meta = read_json_object(path)?;
            extracted.stored_path = Some(path.display().to_string());
        }
        FileRoute::ChallengeText => {
            extracted.text = Some(read_strict(path)?);
            extracted.stored_path = Some(path.display().to_string());
        }
        FileRoute::Metric => {
            let meta = read_json_object(path)?;
            if let Some(week) = meta.get("week") {
                let app = meta.get("app").and_then(Value::as_str).unwrap_or("app");
                extracted.title = format!("{app}-{}", json_scalar(week));
            }
            extracted.meta = meta;
            extracted.stored_path = Some(path.display().to_string());
        }
    }

    Ok(extracted)
}

/// Move the source into the media store, creating the subdirectory on first
/// use. A move, not a copy: the vanished source is what makes re-runs no-ops
/// for relocated kinds.
fn relocate(path: &Path, media_root: &Path, subdir: &str) -> Result<PathBuf, IngestError> {
    let dest_dir = media_root.join(subdir);
    fs::create_dir_all(&dest_dir).map_err(|err| IngestError::io(&dest_dir, err))?;

    let name = path.file_name().ok_or_else(|| {
        IngestError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    let dest = dest_dir.join(name);
    fs::rename(path, &dest).map_err(|err| IngestError::Relocate {
        from: path.to_path_buf(),
        to: dest.clone(),
        source: err,
    })?;
    Ok(dest)
}

fn probe_duration(program: &str, path: &Path) -> Result<f64, IngestError> {
    let output = Command::new(program)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=nokey=1:noprint_wrappers=1",
        ])
        .arg(path)
        .output()
        .map_err(|err| IngestError::Probe {
            detail: format!("failed to launch '{program}': {err}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(IngestError::Probe {
            detail: format!("'{program}' exited with {}: {}", output.status, stderr.trim()),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let value = stdout.trim();
    value.parse::<f64>().map_err(|_| IngestError::Probe {
        detail: format!("non-numeric probe output '{value}'"),
    })
}

fn read_strict(path: &Path) -> Result<String, IngestError> {
    fs::read_to_string(path).map_err(|err| IngestError::io(path, err))
}

fn read_lossy(path: &Path) -> Result<String, IngestError> {
    let bytes = fs::read(path).map_err(|err| IngestError::io(path, err))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn read_json_object(path: &Path) -> Result<Map<String, Value>, IngestError> {
    let text = read_strict(path)?;
    serde_json::from_str(&text).map_err(|err| IngestError::Json {
        path: path.to_path_buf(),
        detail: err.to_string(),
    })
}

fn json_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
