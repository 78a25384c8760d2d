/// Task data for the console app
///
/// Defines the `Task` struct, its `Priority` levels, and the validation
/// rules enforced at construction time. Unlike the API's task model, ids
/// are small sequential integers and timestamps use the machine's local
/// zone, since everything lives and dies inside one terminal session.
use chrono::{DateTime, Local};
use thiserror::Error;

/// Maximum title length in characters.
pub const TITLE_MAX_CHARS: usize = 200;

/// Maximum description length in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

/// Maximum number of tags per task.
pub const MAX_TAGS: usize = 5;

/// Maximum length of a single tag in characters.
pub const TAG_MAX_CHARS: usize = 20;

/// Validation failure when constructing or editing a task.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("Task title cannot be empty")]
    EmptyTitle,

    #[error("Task title too long: {0} chars (max 200)")]
    TitleTooLong(usize),

    #[error("Description too long: {0} chars (max 1000)")]
    DescriptionTooLong(usize),

    #[error("Too many tags: {0} (max 5)")]
    TooManyTags(usize),

    #[error("Tag too long: '{0}' (max 20 chars)")]
    TagTooLong(String),
}

/// Task priority level.
///
/// Declaration order doubles as sort order, so `High` compares greater
/// than `Medium`, which compares greater than `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Returns the display name ("High", "Medium", or "Low").
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    /// Parses user input, case-insensitively.
    ///
    /// Accepts the full names plus the single-letter shortcuts `h`, `m`,
    /// and `l`. Returns None for anything else.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "high" | "h" => Some(Priority::High),
            "medium" | "m" => Some(Priority::Medium),
            "low" | "l" => Some(Priority::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single todo task.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Sequential identifier, unique within a session.
    pub id: u32,

    /// Task title (1-200 characters, never blank).
    pub title: String,

    /// Free-form description (may be empty, max 1000 characters).
    pub description: String,

    /// Completion status.
    pub completed: bool,

    /// Priority level.
    pub priority: Priority,

    /// Category tags (max 5, each max 20 characters).
    pub tags: Vec<String>,

    /// When the task was created. Never changes after construction.
    pub created_at: DateTime<Local>,

    /// When the task was last modified.
    pub updated_at: DateTime<Local>,
}

impl Task {
    /// Creates a validated task.
    ///
    /// New tasks start pending with `created_at == updated_at`.
    ///
    /// # Errors
    ///
    /// Returns a `TaskError` when the title is blank or over 200
    /// characters, the description is over 1000 characters, there are
    /// more than 5 tags, or any tag is over 20 characters.
    pub fn new(
        id: u32,
        title: String,
        description: String,
        priority: Priority,
        tags: Vec<String>,
    ) -> Result<Self, TaskError> {
        validate_title(&title)?;
        validate_description(&description)?;
        validate_tags(&tags)?;

        let now = Local::now();
        Ok(Task {
            id,
            title,
            description,
            completed: false,
            priority,
            tags,
            created_at: now,
            updated_at: now,
        })
    }

    /// Refreshes `updated_at` after a mutation.
    pub(crate) fn touch(&mut self) {
        self.updated_at = Local::now();
    }
}

/// Checks that a title is non-blank and at most 200 characters.
pub fn validate_title(title: &str) -> Result<(), TaskError> {
    if title.trim().is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    let chars = title.chars().count();
    if chars > TITLE_MAX_CHARS {
        return Err(TaskError::TitleTooLong(chars));
    }
    Ok(())
}

/// Checks that a description is at most 1000 characters.
pub fn validate_description(description: &str) -> Result<(), TaskError> {
    let chars = description.chars().count();
    if chars > DESCRIPTION_MAX_CHARS {
        return Err(TaskError::DescriptionTooLong(chars));
    }
    Ok(())
}

/// Checks the tag count and per-tag length limits.
pub fn validate_tags(tags: &[String]) -> Result<(), TaskError> {
    if tags.len() > MAX_TAGS {
        return Err(TaskError::TooManyTags(tags.len()));
    }
    for tag in tags {
        if tag.chars().count() > TAG_MAX_CHARS {
            return Err(TaskError::TagTooLong(tag.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new(
            1,
            "Test Task".to_string(),
            String::new(),
            Priority::default(),
            vec![],
        )
        .unwrap();

        assert_eq!(task.id, 1);
        assert_eq!(task.title, "Test Task");
        assert_eq!(task.description, "");
        assert!(!task.completed);
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.tags.is_empty());
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_new_task_with_all_fields() {
        let task = Task::new(
            1,
            "Complete Task".to_string(),
            "Test description".to_string(),
            Priority::High,
            vec!["work".to_string(), "urgent".to_string()],
        )
        .unwrap();

        assert_eq!(task.title, "Complete Task");
        assert_eq!(task.description, "Test description");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.tags, vec!["work", "urgent"]);
    }

    #[test]
    fn test_empty_title_rejected() {
        let err = Task::new(1, String::new(), String::new(), Priority::Medium, vec![]);
        assert_eq!(err.unwrap_err(), TaskError::EmptyTitle);
    }

    #[test]
    fn test_whitespace_title_rejected() {
        let err = Task::new(
            1,
            "   ".to_string(),
            String::new(),
            Priority::Medium,
            vec![],
        );
        assert_eq!(err.unwrap_err(), TaskError::EmptyTitle);
    }

    #[test]
    fn test_title_length_boundary() {
        let ok = Task::new(
            1,
            "x".repeat(200),
            String::new(),
            Priority::Medium,
            vec![],
        );
        assert!(ok.is_ok());

        let err = Task::new(
            1,
            "x".repeat(201),
            String::new(),
            Priority::Medium,
            vec![],
        );
        assert_eq!(err.unwrap_err(), TaskError::TitleTooLong(201));
    }

    #[test]
    fn test_description_length_boundary() {
        let ok = Task::new(
            1,
            "Test".to_string(),
            "x".repeat(1000),
            Priority::Medium,
            vec![],
        );
        assert!(ok.is_ok());

        let err = Task::new(
            1,
            "Test".to_string(),
            "x".repeat(1001),
            Priority::Medium,
            vec![],
        );
        assert_eq!(err.unwrap_err(), TaskError::DescriptionTooLong(1001));
    }

    #[test]
    fn test_tag_count_boundary() {
        let five: Vec<String> = (1..=5).map(|n| format!("tag{n}")).collect();
        assert!(Task::new(1, "Test".to_string(), String::new(), Priority::Medium, five).is_ok());

        let six: Vec<String> = (1..=6).map(|n| format!("tag{n}")).collect();
        let err = Task::new(1, "Test".to_string(), String::new(), Priority::Medium, six);
        assert_eq!(err.unwrap_err(), TaskError::TooManyTags(6));
    }

    #[test]
    fn test_tag_length_boundary() {
        let ok = Task::new(
            1,
            "Test".to_string(),
            String::new(),
            Priority::Medium,
            vec!["x".repeat(20)],
        );
        assert!(ok.is_ok());

        let err = Task::new(
            1,
            "Test".to_string(),
            String::new(),
            Priority::Medium,
            vec!["x".repeat(21)],
        );
        assert_eq!(err.unwrap_err(), TaskError::TagTooLong("x".repeat(21)));
    }

    #[test]
    fn test_priority_parse() {
        assert_eq!(Priority::parse("High"), Some(Priority::High));
        assert_eq!(Priority::parse("medium"), Some(Priority::Medium));
        assert_eq!(Priority::parse(" LOW "), Some(Priority::Low));
        assert_eq!(Priority::parse("h"), Some(Priority::High));
        assert_eq!(Priority::parse("m"), Some(Priority::Medium));
        assert_eq!(Priority::parse("l"), Some(Priority::Low));
        assert_eq!(Priority::parse("Critical"), None);
        assert_eq!(Priority::parse(""), None);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }

    #[test]
    fn test_priority_display() {
        assert_eq!(Priority::High.to_string(), "High");
        assert_eq!(Priority::Medium.to_string(), "Medium");
        assert_eq!(Priority::Low.to_string(), "Low");
    }
}
