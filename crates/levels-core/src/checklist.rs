use crate::TaskStatus;
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistItem {
    pub title: String,
    pub points: u32,
    pub status: TaskStatus,
}

/// Parse plan-file checklist lines of the form `- [ ] (N) Title` or
/// `- [x] (N) Title`. The bracket holds a literal space or a lowercase `x`,
/// N is an unsigned point estimate. Lines that do not match are skipped.
pub fn parse_checklist(text: &str) -> Vec<ChecklistItem> {
    let pattern = Regex::new(r"^- \[( |x)\] \((\d+)\)\s*(.+)$").expect("valid regex");

    let mut items = Vec::new();
    for line in text.lines() {
        let Some(captures) = pattern.captures(line) else {
            continue;
        };
        let Ok(points) = captures[2].parse::<u32>() else {
            continue;
        };
        let status = if &captures[1] == "x" {
            TaskStatus::Done
        } else {
            TaskStatus::Pending
        };
        items.push(ChecklistItem {
            title: captures[3].trim().to_string(),
            points,
            status,
        });
    }

    items
}
