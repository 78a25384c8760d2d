/// Menu loop and terminal rendering
///
/// The loop reads commands from any `BufRead` and writes to any `Write`,
/// so tests can drive whole sessions from a string and inspect the
/// transcript. `main` wires it to locked stdin/stdout.
///
/// Invalid input never aborts the session: bad menu choices, ids, and
/// field values print a message and fall back to the menu. EOF on any
/// prompt ends the session the same way the exit option does.
use std::io::{self, BufRead, Write};

use crate::manager::{SortBy, StatusFilter, TaskManager};
use crate::model::{Priority, Task, MAX_TAGS};

/// Whether the loop keeps going after a handler returns.
enum Flow {
    Continue,
    Quit,
}

/// Session-scoped sort applied by the view command.
#[derive(Debug, Clone, Copy, Default)]
struct SortPreference {
    by: SortBy,
    descending: bool,
}

/// Runs the interactive session until exit or EOF.
pub fn run<R: BufRead, W: Write>(
    manager: &mut TaskManager,
    mut input: R,
    mut output: W,
) -> io::Result<()> {
    let mut sort = SortPreference::default();

    writeln!(output, "TaskNest console")?;
    writeln!(output, "Tasks live in memory and are lost on exit.")?;

    loop {
        print_menu(&mut output)?;
        let Some(choice) = prompt(&mut input, &mut output, "Choose an option (1-9) [2]")? else {
            break;
        };
        let choice = if choice.is_empty() { "2" } else { choice.as_str() };

        let flow = match choice {
            "1" => add_task(manager, &mut input, &mut output)?,
            "2" => view_tasks(manager, sort, &mut output)?,
            "3" => update_task(manager, &mut input, &mut output)?,
            "4" => toggle_task(manager, &mut input, &mut output)?,
            "5" => delete_task(manager, &mut input, &mut output)?,
            "6" => search_tasks(manager, &mut input, &mut output)?,
            "7" => filter_tasks(manager, &mut input, &mut output)?,
            "8" => sort_tasks(manager, &mut sort, &mut input, &mut output)?,
            "9" => Flow::Quit,
            other => {
                warn(
                    &mut output,
                    &format!("Invalid choice: '{other}'. Pick a number between 1 and 9."),
                )?;
                Flow::Continue
            }
        };

        if let Flow::Quit = flow {
            break;
        }
    }

    writeln!(output, "Goodbye.")?;
    Ok(())
}

fn print_menu<W: Write>(output: &mut W) -> io::Result<()> {
    writeln!(output)?;
    writeln!(output, "1. Add task")?;
    writeln!(output, "2. View all tasks")?;
    writeln!(output, "3. Update task")?;
    writeln!(output, "4. Mark task complete/incomplete")?;
    writeln!(output, "5. Delete task")?;
    writeln!(output, "6. Search tasks")?;
    writeln!(output, "7. Filter tasks")?;
    writeln!(output, "8. Sort tasks")?;
    writeln!(output, "9. Exit")?;
    Ok(())
}

fn add_task<R: BufRead, W: Write>(
    manager: &mut TaskManager,
    input: &mut R,
    output: &mut W,
) -> io::Result<Flow> {
    writeln!(output, "\nAdd task")?;

    let Some(title) = prompt(input, output, "Enter task title")? else {
        return Ok(Flow::Quit);
    };
    let Some(description) = prompt(input, output, "Enter description (optional)")? else {
        return Ok(Flow::Quit);
    };
    let Some(priority_raw) = prompt(input, output, "Enter priority (High/Medium/Low) [Medium]")?
    else {
        return Ok(Flow::Quit);
    };
    let priority = if priority_raw.is_empty() {
        Priority::default()
    } else {
        match Priority::parse(&priority_raw) {
            Some(priority) => priority,
            None => {
                warn(output, "Invalid priority. Using Medium.")?;
                Priority::default()
            }
        }
    };
    let Some(tags_raw) = prompt(input, output, "Enter tags (comma-separated, max 5)")? else {
        return Ok(Flow::Quit);
    };
    let tags = parse_tags(&tags_raw, output)?;

    match manager.add(title, description, priority, tags) {
        Ok(task) => success(output, &format!("Task created successfully (ID: {}).", task.id))?,
        Err(err) => error(output, &format!("Could not create task: {err}"))?,
    }
    Ok(Flow::Continue)
}

fn view_tasks<W: Write>(
    manager: &TaskManager,
    sort: SortPreference,
    output: &mut W,
) -> io::Result<Flow> {
    if manager.all().is_empty() {
        info(output, "No tasks found. Add your first task to get started.")?;
        return Ok(Flow::Continue);
    }

    render_table(output, &manager.sorted(sort.by, sort.descending))?;

    let stats = manager.stats();
    writeln!(
        output,
        "Total: {}  Completed: {}  Pending: {}",
        stats.total, stats.completed, stats.pending
    )?;
    Ok(Flow::Continue)
}

fn update_task<R: BufRead, W: Write>(
    manager: &mut TaskManager,
    input: &mut R,
    output: &mut W,
) -> io::Result<Flow> {
    writeln!(output, "\nUpdate task")?;

    let Some(id) = prompt_id(input, output)? else {
        return Ok(Flow::Quit);
    };
    let Ok(id) = id else {
        return Ok(Flow::Continue);
    };

    let (current_title, current_description) = match manager.get(id) {
        Some(task) => (task.title.clone(), task.description.clone()),
        None => {
            error(output, &describe_missing(manager, id))?;
            return Ok(Flow::Continue);
        }
    };
    writeln!(output, "Current title: {current_title}")?;
    if current_description.is_empty() {
        writeln!(output, "Current description: (none)")?;
    } else {
        writeln!(output, "Current description: {current_description}")?;
    }
    writeln!(output, "Leave blank to keep the current value.")?;

    let Some(new_title) = prompt(input, output, "New title (optional)")? else {
        return Ok(Flow::Quit);
    };
    let Some(new_description) = prompt(input, output, "New description (optional)")? else {
        return Ok(Flow::Quit);
    };

    if new_title.is_empty() && new_description.is_empty() {
        info(output, "No changes made.")?;
        return Ok(Flow::Continue);
    }

    let title = (!new_title.is_empty()).then_some(new_title.as_str());
    let description = (!new_description.is_empty()).then_some(new_description.as_str());
    match manager.update(id, title, description) {
        Ok(true) => success(output, &format!("Task ID {id} updated."))?,
        Ok(false) => error(output, &describe_missing(manager, id))?,
        Err(err) => error(output, &format!("Could not update task: {err}"))?,
    }
    Ok(Flow::Continue)
}

fn toggle_task<R: BufRead, W: Write>(
    manager: &mut TaskManager,
    input: &mut R,
    output: &mut W,
) -> io::Result<Flow> {
    writeln!(output, "\nToggle task completion")?;

    let Some(id) = prompt_id(input, output)? else {
        return Ok(Flow::Quit);
    };
    let Ok(id) = id else {
        return Ok(Flow::Continue);
    };

    let (title, was_done) = match manager.get(id) {
        Some(task) => (task.title.clone(), task.completed),
        None => {
            error(output, &describe_missing(manager, id))?;
            return Ok(Flow::Continue);
        }
    };

    if manager.toggle_complete(id) {
        success(
            output,
            &format!(
                "Task '{title}' status changed from {} to {}.",
                status_word(was_done),
                status_word(!was_done)
            ),
        )?;
    } else {
        error(output, &describe_missing(manager, id))?;
    }
    Ok(Flow::Continue)
}

fn delete_task<R: BufRead, W: Write>(
    manager: &mut TaskManager,
    input: &mut R,
    output: &mut W,
) -> io::Result<Flow> {
    writeln!(output, "\nDelete task")?;

    let Some(id) = prompt_id(input, output)? else {
        return Ok(Flow::Quit);
    };
    let Ok(id) = id else {
        return Ok(Flow::Continue);
    };

    let title = match manager.get(id) {
        Some(task) => task.title.clone(),
        None => {
            error(output, &describe_missing(manager, id))?;
            return Ok(Flow::Continue);
        }
    };

    writeln!(output, "Task to delete: {title}")?;
    let Some(answer) = prompt(input, output, "Delete this task? (y/N)")? else {
        return Ok(Flow::Quit);
    };
    if !matches!(answer.to_lowercase().as_str(), "y" | "yes") {
        info(output, "Deletion cancelled.")?;
        return Ok(Flow::Continue);
    }

    if manager.delete(id) {
        success(output, &format!("Task '{title}' (ID: {id}) deleted."))?;
    } else {
        error(output, &describe_missing(manager, id))?;
    }
    Ok(Flow::Continue)
}

fn search_tasks<R: BufRead, W: Write>(
    manager: &TaskManager,
    input: &mut R,
    output: &mut W,
) -> io::Result<Flow> {
    writeln!(output, "\nSearch tasks")?;

    let Some(keyword) = prompt(input, output, "Enter search keyword")? else {
        return Ok(Flow::Quit);
    };

    let results = manager.search(&keyword);
    if results.is_empty() {
        warn(output, &format!("No tasks match your search: '{keyword}'"))?;
    } else {
        writeln!(output, "Found {} task(s) matching '{keyword}':", results.len())?;
        render_table(output, &results)?;
    }
    Ok(Flow::Continue)
}

fn filter_tasks<R: BufRead, W: Write>(
    manager: &TaskManager,
    input: &mut R,
    output: &mut W,
) -> io::Result<Flow> {
    writeln!(output, "\nFilter tasks")?;
    writeln!(output, "Leave blank to skip a filter.")?;

    let mut applied = Vec::new();

    let Some(status_raw) = prompt(input, output, "Filter by status (all/pending/completed)")?
    else {
        return Ok(Flow::Quit);
    };
    let status = if status_raw.is_empty() {
        StatusFilter::All
    } else {
        match StatusFilter::parse(&status_raw) {
            Some(status) => {
                applied.push(format!("status={}", status.as_str()));
                status
            }
            None => {
                warn(output, &format!("Unknown status '{status_raw}', showing all."))?;
                StatusFilter::All
            }
        }
    };

    let Some(priority_raw) = prompt(input, output, "Filter by priority (High/Medium/Low)")? else {
        return Ok(Flow::Quit);
    };
    let priority = if priority_raw.is_empty() {
        None
    } else {
        match Priority::parse(&priority_raw) {
            Some(priority) => {
                applied.push(format!("priority={priority}"));
                Some(priority)
            }
            None => {
                warn(output, &format!("Unknown priority '{priority_raw}', ignoring."))?;
                None
            }
        }
    };

    let Some(tag_raw) = prompt(input, output, "Filter by tag")? else {
        return Ok(Flow::Quit);
    };
    let tag = if tag_raw.is_empty() {
        None
    } else {
        applied.push(format!("tag={tag_raw}"));
        Some(tag_raw.as_str())
    };

    let results = manager.filter(status, priority, tag);
    if results.is_empty() {
        warn(output, "No tasks match your filter criteria.")?;
    } else {
        let description = if applied.is_empty() {
            "none".to_string()
        } else {
            applied.join(", ")
        };
        writeln!(
            output,
            "Found {} task(s) with filters: {description}",
            results.len()
        )?;
        render_table(output, &results)?;
    }
    Ok(Flow::Continue)
}

fn sort_tasks<R: BufRead, W: Write>(
    manager: &TaskManager,
    sort: &mut SortPreference,
    input: &mut R,
    output: &mut W,
) -> io::Result<Flow> {
    writeln!(output, "\nSort tasks")?;

    let Some(field_raw) = prompt(input, output, "Sort by (id/title/priority/created/status)")?
    else {
        return Ok(Flow::Quit);
    };
    let by = if field_raw.is_empty() {
        SortBy::default()
    } else {
        match SortBy::parse(&field_raw) {
            Some(by) => by,
            None => {
                error(output, &format!("Invalid sort field: {field_raw}"))?;
                return Ok(Flow::Continue);
            }
        }
    };

    let Some(order_raw) = prompt(input, output, "Order (asc/desc) [asc]")? else {
        return Ok(Flow::Quit);
    };
    let descending = order_raw.eq_ignore_ascii_case("desc");

    sort.by = by;
    sort.descending = descending;

    if manager.all().is_empty() {
        info(output, "No tasks to sort.")?;
        return Ok(Flow::Continue);
    }

    let order_word = if descending { "descending" } else { "ascending" };
    writeln!(output, "Tasks sorted by {by} ({order_word}):")?;
    render_table(output, &manager.sorted(by, descending))?;
    info(output, "Sort preference saved for this session.")?;
    Ok(Flow::Continue)
}

/// Prints a label, flushes, and reads one trimmed line.
///
/// Returns None on EOF.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> io::Result<Option<String>> {
    write!(output, "{label}: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(output)?;
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Prompts for a task id.
///
/// Outer None means EOF. Inner Err means the input was not a number;
/// a message has already been printed in that case.
fn prompt_id<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<Result<u32, ()>>> {
    let Some(raw) = prompt(input, output, "Enter task ID")? else {
        return Ok(None);
    };
    match raw.parse::<u32>() {
        Ok(id) => Ok(Some(Ok(id))),
        Err(_) => {
            error(output, "Invalid input. Please enter a numeric task ID.")?;
            Ok(Some(Err(())))
        }
    }
}

/// Splits comma-separated tags, dropping blanks and keeping at most five.
fn parse_tags<W: Write>(raw: &str, output: &mut W) -> io::Result<Vec<String>> {
    let mut tags: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect();
    if tags.len() > MAX_TAGS {
        warn(output, "Too many tags. Keeping the first 5.")?;
        tags.truncate(MAX_TAGS);
    }
    Ok(tags)
}

fn describe_missing(manager: &TaskManager, id: u32) -> String {
    let ids: Vec<String> = manager.all().iter().map(|t| t.id.to_string()).collect();
    if ids.is_empty() {
        "No tasks available.".to_string()
    } else {
        format!(
            "Task not found with ID: {id}. Available task IDs: {}",
            ids.join(", ")
        )
    }
}

fn status_word(completed: bool) -> &'static str {
    if completed {
        "done"
    } else {
        "pending"
    }
}

fn success<W: Write>(output: &mut W, message: &str) -> io::Result<()> {
    writeln!(output, "✓ {message}")
}

fn error<W: Write>(output: &mut W, message: &str) -> io::Result<()> {
    writeln!(output, "✗ {message}")
}

fn info<W: Write>(output: &mut W, message: &str) -> io::Result<()> {
    writeln!(output, "ℹ {message}")
}

fn warn<W: Write>(output: &mut W, message: &str) -> io::Result<()> {
    writeln!(output, "⚠ {message}")
}

/// Renders tasks as a bordered table.
///
/// Column widths grow with the content; long descriptions are truncated
/// at 32 characters to keep rows readable.
fn render_table<W: Write>(output: &mut W, tasks: &[Task]) -> io::Result<()> {
    const HEADERS: [&str; 6] = ["ID", "Title", "Description", "Status", "Priority", "Tags"];

    let rows: Vec<[String; 6]> = tasks.iter().map(row_cells).collect();
    let mut widths: [usize; 6] = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_separator(output, &widths)?;
    write_row(output, &widths, &HEADERS)?;
    write_separator(output, &widths)?;
    for row in &rows {
        write_row(output, &widths, row)?;
    }
    write_separator(output, &widths)?;
    Ok(())
}

fn row_cells(task: &Task) -> [String; 6] {
    let description = if task.description.is_empty() {
        "-".to_string()
    } else if task.description.chars().count() > 32 {
        let short: String = task.description.chars().take(32).collect();
        format!("{short}...")
    } else {
        task.description.clone()
    };
    let tags = if task.tags.is_empty() {
        "-".to_string()
    } else {
        task.tags.join(", ")
    };

    [
        task.id.to_string(),
        task.title.clone(),
        description,
        status_word(task.completed).to_string(),
        task.priority.to_string(),
        tags,
    ]
}

fn write_row<W: Write, S: AsRef<str>>(
    output: &mut W,
    widths: &[usize; 6],
    cells: &[S; 6],
) -> io::Result<()> {
    write!(output, "|")?;
    for (cell, width) in cells.iter().zip(widths) {
        let cell = cell.as_ref();
        // pad by chars, not bytes
        let padding = " ".repeat(width.saturating_sub(cell.chars().count()));
        write!(output, " {cell}{padding} |")?;
    }
    writeln!(output)
}

fn write_separator<W: Write>(output: &mut W, widths: &[usize; 6]) -> io::Result<()> {
    write!(output, "+")?;
    for width in widths {
        write!(output, "{}+", "-".repeat(width + 2))?;
    }
    writeln!(output)
}
