use crate::ArtifactKind;
use std::path::Path;

/// How a classified inbox file gets turned into an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRoute {
    Recording,
    Note,
    Conversation,
    Repo,
    Book,
    StudyNote,
    ChallengeJson,
    ChallengeText,
    Metric,
}

impl FileRoute {
    pub fn kind(self) -> ArtifactKind {
        match self {
            FileRoute::Recording => ArtifactKind::Recording,
            FileRoute::Note => ArtifactKind::Note,
            FileRoute::Conversation => ArtifactKind::Conversation,
            FileRoute::Repo => ArtifactKind::Repo,
            FileRoute::Book => ArtifactKind::Book,
            FileRoute::StudyNote => ArtifactKind::StudyNote,
            FileRoute::ChallengeJson | FileRoute::ChallengeText => ArtifactKind::Challenge,
            FileRoute::Metric => ArtifactKind::Metric,
        }
    }

    /// Media-store subdirectory for routes that move the source file.
    pub fn media_subdir(self) -> Option<&'static str> {
        match self {
            FileRoute::Recording => Some("recordings"),
            FileRoute::Book => Some("books"),
            _ => None,
        }
    }
}

/// Classify a path relative to the inbox root.
///
/// Markers are matched as substrings of the slash-prefixed relative path, so
/// `/build/notes/` matches both a top-level `build/notes/a.md` and a nested
/// `phone/build/notes/a.md`. Rules run in priority order; the first match
/// wins, and a miss means the file is ignored outright.
pub fn classify_inbox(rel_path: &str) -> Option<FileRoute> {
    let rel = normalize(rel_path);
    let anchored = format!("/{rel}");
    let name = file_name(&rel);
    let ext = extension(&rel);

    if anchored.contains("/build/recordings/") && ext == Some("mp4") {
        return Some(FileRoute::Recording);
    }
    if anchored.contains("/build/notes/") && matches!(ext, Some("md" | "txt")) {
        return Some(FileRoute::Note);
    }
    if anchored.contains("/build/conversations/") && matches!(ext, Some("md" | "txt")) {
        return Some(FileRoute::Conversation);
    }
    if anchored.contains("/build/repos/") && ext == Some("txt") {
        return Some(FileRoute::Repo);
    }
    if anchored.contains("/study/books/") {
        let lower = ext.map(|e| e.to_ascii_lowercase());
        if matches!(lower.as_deref(), Some("pdf" | "epub" | "mobi")) {
            return Some(FileRoute::Book);
        }
    }
    if anchored.contains("/study/notes/") && matches!(ext, Some("md" | "txt" | "csv")) {
        return Some(FileRoute::StudyNote);
    }
    if anchored.contains("/study/challenges/") && name == "codewars.json" {
        return Some(FileRoute::ChallengeJson);
    }
    if anchored.contains("/study/challenges/") && name == "overthewire.md" {
        return Some(FileRoute::ChallengeText);
    }
    if rel.starts_with("metrics/") && ext == Some("json") {
        return Some(FileRoute::Metric);
    }

    None
}

/// Plan files live in the outbound tree and expand into task artifacts.
pub fn is_plan_file(rel_path: &str) -> bool {
    let rel = normalize(rel_path);
    format!("/{rel}").contains("/build/plans/") && extension(&rel) == Some("md")
}

fn normalize(rel_path: &str) -> String {
    rel_path.replace('\\', "/")
}

fn file_name(rel: &str) -> &str {
    rel.rsplit('/').next().unwrap_or(rel)
}

fn extension(rel: &str) -> Option<&str> {
    Path::new(rel).extension().and_then(|ext| ext.to_str())
}
