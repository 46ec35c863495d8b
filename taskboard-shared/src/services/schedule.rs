/// Date consistency rules for projects and tasks
///
/// A project's window is `[start_date, due_date]`. Both ends must be today or
/// later when the project is created, and the window must not be inverted.
/// A task's own window must sit inside its project's window and must not be
/// inverted either.
///
/// The checks are pure functions of their inputs; "today" is supplied by the
/// caller.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use taskboard_shared::services::schedule::{check_project_dates, DateRangeError};
///
/// let today = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
/// let start = NaiveDate::from_ymd_opt(2030, 1, 10).unwrap();
/// let due = NaiveDate::from_ymd_opt(2030, 1, 5).unwrap();
///
/// assert_eq!(
///     check_project_dates(start, due, today),
///     Err(DateRangeError::ProjectDueBeforeStart)
/// );
/// ```

use chrono::NaiveDate;

use crate::models::project::Project;

/// A violated scheduling rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DateRangeError {
    #[error("Project start date cannot be in the past.")]
    ProjectStartInPast,

    #[error("Project due date cannot be in the past.")]
    ProjectDueInPast,

    #[error("Project due date cannot be before start date.")]
    ProjectDueBeforeStart,

    #[error("Task start date must be within the project's start and due dates.")]
    TaskStartOutsideProject,

    #[error("Task due date must be within the project's start and due dates.")]
    TaskDueOutsideProject,

    #[error("Task due date cannot be before start date.")]
    TaskDueBeforeStart,
}

/// Validates the window of a new project
///
/// Rules are checked in order: start not in the past, due not in the past,
/// due not before start.
pub fn check_project_dates(
    start_date: NaiveDate,
    due_date: NaiveDate,
    today: NaiveDate,
) -> Result<(), DateRangeError> {
    if start_date < today {
        return Err(DateRangeError::ProjectStartInPast);
    }
    if due_date < today {
        return Err(DateRangeError::ProjectDueInPast);
    }
    if due_date < start_date {
        return Err(DateRangeError::ProjectDueBeforeStart);
    }
    Ok(())
}

/// Validates a task window against its project
///
/// Rules are checked in order: start inside the project, due inside the
/// project, due not before start.
pub fn check_task_dates(
    project: &Project,
    start_date: NaiveDate,
    due_date: NaiveDate,
) -> Result<(), DateRangeError> {
    if !project.contains(start_date) {
        return Err(DateRangeError::TaskStartOutsideProject);
    }
    if !project.contains(due_date) {
        return Err(DateRangeError::TaskDueOutsideProject);
    }
    if due_date < start_date {
        return Err(DateRangeError::TaskDueBeforeStart);
    }
    Ok(())
}
