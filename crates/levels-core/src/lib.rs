use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod checklist;
pub mod classify;
pub mod week;

pub use checklist::{parse_checklist, ChecklistItem};
pub use classify::{classify_inbox, is_plan_file, FileRoute};
pub use week::WeekWindow;

#[derive(Debug, Error)]
pub enum DomainParseError {
    #[error("unknown artifact kind '{0}'")]
    ArtifactKind(String),
    #[error("unknown task status '{0}'")]
    TaskStatus(String),
    #[error("unknown session kind '{0}' (expected 'build' or 'study')")]
    SessionKind(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Recording,
    Note,
    Conversation,
    Repo,
    Book,
    StudyNote,
    Challenge,
    Task,
    Metric,
}

impl ArtifactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Recording => "recording",
            ArtifactKind::Note => "note",
            ArtifactKind::Conversation => "conversation",
            ArtifactKind::Repo => "repo",
            ArtifactKind::Book => "book",
            ArtifactKind::StudyNote => "study_note",
            ArtifactKind::Challenge => "challenge",
            ArtifactKind::Task => "task",
            ArtifactKind::Metric => "metric",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = DomainParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "recording" => Ok(ArtifactKind::Recording),
            "note" => Ok(ArtifactKind::Note),
            "conversation" => Ok(ArtifactKind::Conversation),
            "repo" => Ok(ArtifactKind::Repo),
            "book" => Ok(ArtifactKind::Book),
            "study_note" => Ok(ArtifactKind::StudyNote),
            "challenge" => Ok(ArtifactKind::Challenge),
            "task" => Ok(ArtifactKind::Task),
            "metric" => Ok(ArtifactKind::Metric),
            other => Err(DomainParseError::ArtifactKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Done,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = DomainParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(TaskStatus::Pending),
            "done" => Ok(TaskStatus::Done),
            other => Err(DomainParseError::TaskStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Build,
    Study,
}

impl SessionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Build => "build",
            SessionKind::Study => "study",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionKind {
    type Err = DomainParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "build" => Ok(SessionKind::Build),
            "study" => Ok(SessionKind::Study),
            other => Err(DomainParseError::SessionKind(other.to_string())),
        }
    }
}
