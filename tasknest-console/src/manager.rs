/// In-memory task store and query operations
///
/// `TaskManager` owns the task list for one session. There is no
/// persistence layer behind it; dropping the manager drops every task.
/// All operations are synchronous and single-threaded, which keeps the
/// console loop trivial.
///
/// # Id allocation
///
/// Ids are `max(existing ids) + 1`, so they are never reused within a
/// session even after deletions. Deleting task 2 out of {1, 2, 3} and
/// adding a new task yields id 4, not 2.
use crate::model::{validate_description, validate_title, Priority, Task, TaskError};

/// Completion-status filter for [`TaskManager::filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Pending => "pending",
            StatusFilter::Completed => "completed",
        }
    }

    /// Parses user input, case-insensitively. Returns None for unknown words.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "all" => Some(StatusFilter::All),
            "pending" => Some(StatusFilter::Pending),
            "completed" => Some(StatusFilter::Completed),
            _ => None,
        }
    }

    fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }
}

/// Sort key for [`TaskManager::sorted`].
///
/// Title comparison is case-insensitive. Priority sorts High over
/// Medium over Low when descending. Status sorts pending before done
/// when ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Id,
    Title,
    Priority,
    Created,
    Status,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Id => "id",
            SortBy::Title => "title",
            SortBy::Priority => "priority",
            SortBy::Created => "created",
            SortBy::Status => "status",
        }
    }

    /// Parses user input, case-insensitively. Returns None for unknown fields.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "id" => Some(SortBy::Id),
            "title" => Some(SortBy::Title),
            "priority" => Some(SortBy::Priority),
            "created" => Some(SortBy::Created),
            "status" => Some(SortBy::Status),
            _ => None,
        }
    }
}

impl std::fmt::Display for SortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task counts for the summary line under the task table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

/// Owner of the in-memory task list.
///
/// # Example
///
/// ```
/// use tasknest_console::manager::TaskManager;
/// use tasknest_console::model::Priority;
///
/// let mut manager = TaskManager::new();
/// let task = manager
///     .add("Write report".to_string(), String::new(), Priority::High, vec![])
///     .unwrap();
///
/// assert_eq!(task.id, 1);
/// assert_eq!(manager.stats().total, 1);
/// ```
#[derive(Debug, Default)]
pub struct TaskManager {
    tasks: Vec<Task>,
}

impl TaskManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        TaskManager { tasks: Vec::new() }
    }

    fn next_id(&self) -> u32 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    /// Creates a task and appends it to the list.
    ///
    /// Returns a copy of the stored task so the caller can report the
    /// assigned id.
    ///
    /// # Errors
    ///
    /// Returns a `TaskError` when any field fails validation; the list
    /// is left unchanged in that case.
    pub fn add(
        &mut self,
        title: String,
        description: String,
        priority: Priority,
        tags: Vec<String>,
    ) -> Result<Task, TaskError> {
        let task = Task::new(self.next_id(), title, description, priority, tags)?;
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// All tasks in insertion order.
    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    /// Looks up a task by id.
    pub fn get(&self, id: u32) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Updates the title and/or description of a task.
    ///
    /// Fields passed as None are left untouched. `created_at` is
    /// preserved; `updated_at` is refreshed on success.
    ///
    /// # Errors
    ///
    /// Returns a `TaskError` when a provided value fails validation.
    /// Otherwise returns Ok(true) if the id existed and Ok(false) if not.
    pub fn update(
        &mut self,
        id: u32,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<bool, TaskError> {
        if let Some(new_title) = title {
            validate_title(new_title)?;
        }
        if let Some(new_description) = description {
            validate_description(new_description)?;
        }

        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        if let Some(new_title) = title {
            task.title = new_title.to_string();
        }
        if let Some(new_description) = description {
            task.description = new_description.to_string();
        }
        task.touch();
        Ok(true)
    }

    /// Removes a task. Returns whether the id existed.
    pub fn delete(&mut self, id: u32) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() < before
    }

    /// Flips a task between pending and done. Returns whether the id existed.
    pub fn toggle_complete(&mut self, id: u32) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                task.touch();
                true
            }
            None => false,
        }
    }

    /// Case-insensitive substring search over titles and descriptions.
    pub fn search(&self, keyword: &str) -> Vec<Task> {
        let needle = keyword.to_lowercase();
        self.tasks
            .iter()
            .filter(|t| {
                t.title.to_lowercase().contains(&needle)
                    || t.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Filters by status, priority, and tag. Criteria combine conjunctively.
    pub fn filter(
        &self,
        status: StatusFilter,
        priority: Option<Priority>,
        tag: Option<&str>,
    ) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| status.matches(t))
            .filter(|t| priority.map_or(true, |p| t.priority == p))
            .filter(|t| tag.map_or(true, |wanted| t.tags.iter().any(|have| have == wanted)))
            .cloned()
            .collect()
    }

    /// Returns a sorted copy of the task list; the stored order is untouched.
    ///
    /// The sort is stable, so tasks with equal keys keep their insertion
    /// order in both directions.
    pub fn sorted(&self, by: SortBy, descending: bool) -> Vec<Task> {
        let mut out = self.tasks.clone();
        out.sort_by(|a, b| {
            let ord = match by {
                SortBy::Id => a.id.cmp(&b.id),
                SortBy::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
                SortBy::Priority => a.priority.cmp(&b.priority),
                SortBy::Created => a.created_at.cmp(&b.created_at),
                SortBy::Status => a.completed.cmp(&b.completed),
            };
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });
        out
    }

    /// Task counts by completion status.
    pub fn stats(&self) -> TaskStats {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        TaskStats {
            total,
            completed,
            pending: total - completed,
        }
    }
}
