//! Task list state container.
//!
//! # Responsibility
//! - Hold the ordered task records plus the current edit selection.
//! - Apply add/update/delete/toggle actions and status filtering.
//!
//! # Invariants
//! - Records are ordered newest first.
//! - Task ids are unique within the list.
//! - The edit selection always refers to an existing, not-completed task.

use crate::model::task::{TaskDraft, TaskId, TaskRecord};
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub type TaskResult<T> = Result<T, TaskError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    NotFound(TaskId),
    /// Completed tasks are read-only until toggled back.
    Completed(TaskId),
    UnknownFilter(String),
}

impl Display for TaskError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::Completed(id) => write!(f, "task {id} is completed and cannot be edited"),
            Self::UnknownFilter(value) => write!(
                f,
                "unknown task filter `{value}`; expected all|active|completed"
            ),
        }
    }
}

impl Error for TaskError {}

/// Status filter for list views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TaskFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    pub fn matches(self, task: &TaskRecord) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

impl FromStr for TaskFilter {
    type Err = TaskError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(TaskError::UnknownFilter(other.to_string())),
        }
    }
}

/// In-memory task list plus the task currently loaded into the edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<TaskRecord>,
    editing: Option<TaskId>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps records loaded from storage, keeping their order.
    pub fn from_records(tasks: Vec<TaskRecord>) -> Self {
        Self {
            tasks,
            editing: None,
        }
    }

    pub fn records(&self) -> &[TaskRecord] {
        &self.tasks
    }

    pub fn into_records(self) -> Vec<TaskRecord> {
        self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TaskRecord> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Adds a task at the front of the list.
    ///
    /// The id is `now` in epoch milliseconds, bumped forward until unique.
    pub fn add(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> &TaskRecord {
        let id = self.next_id(now);
        let description = draft.normalized_description();
        self.tasks.insert(
            0,
            TaskRecord {
                id,
                title: draft.title,
                description,
                completed: false,
                created_at: now,
            },
        );
        &self.tasks[0]
    }

    /// Replaces title and description of an active task.
    pub fn update(&mut self, id: &str, draft: TaskDraft) -> TaskResult<&TaskRecord> {
        let description = draft.normalized_description();
        let task = self.find_mut(id)?;
        if task.completed {
            return Err(TaskError::Completed(id.to_string()));
        }
        task.title = draft.title;
        task.description = description;
        Ok(&*task)
    }

    /// Removes a task, clearing the edit selection when it pointed at it.
    pub fn delete(&mut self, id: &str) -> TaskResult<TaskRecord> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
        Ok(self.tasks.remove(index))
    }

    /// Flips the completion flag and returns the new value.
    pub fn toggle(&mut self, id: &str) -> TaskResult<bool> {
        let task = self.find_mut(id)?;
        task.completed = !task.completed;
        let completed = task.completed;
        if completed && self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
        Ok(completed)
    }

    pub fn filtered(&self, filter: TaskFilter) -> Vec<&TaskRecord> {
        self.tasks.iter().filter(|task| filter.matches(task)).collect()
    }

    pub fn count(&self, filter: TaskFilter) -> usize {
        self.tasks.iter().filter(|task| filter.matches(task)).count()
    }

    /// Loads a task into the edit form.
    pub fn begin_edit(&mut self, id: &str) -> TaskResult<&TaskRecord> {
        let task = self
            .tasks
            .iter()
            .find(|task| task.id == id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
        if task.completed {
            return Err(TaskError::Completed(id.to_string()));
        }
        self.editing = Some(task.id.clone());
        Ok(task)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn editing(&self) -> Option<&TaskRecord> {
        self.editing.as_deref().and_then(|id| self.get(id))
    }

    /// Form submit: updates the task being edited, otherwise adds a new one.
    ///
    /// Clears the edit selection either way.
    pub fn submit(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> TaskResult<&TaskRecord> {
        match self.editing.take() {
            Some(id) => self.update(&id, draft),
            None => Ok(self.add(draft, now)),
        }
    }

    fn find_mut(&mut self, id: &str) -> TaskResult<&mut TaskRecord> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))
    }

    fn next_id(&self, now: DateTime<Utc>) -> TaskId {
        let mut candidate = now.timestamp_millis();
        while self.get(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{TaskError, TaskFilter, TaskList};
    use crate::model::task::TaskDraft;
    use chrono::{DateTime, Utc};

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    #[test]
    fn add_inserts_newest_first_with_time_derived_ids() {
        let mut list = TaskList::new();
        list.add(TaskDraft::new("first", None), at(1_000));
        list.add(TaskDraft::new("second", Some(String::new())), at(2_000));

        let ids: Vec<&str> = list.records().iter().map(|task| task.id.as_str()).collect();
        assert_eq!(ids, ["2000", "1000"]);
        assert_eq!(list.records()[0].description, None);
        assert!(!list.records()[0].completed);
    }

    #[test]
    fn add_within_same_millisecond_keeps_ids_unique() {
        let mut list = TaskList::new();
        list.add(TaskDraft::new("a", None), at(5_000));
        list.add(TaskDraft::new("b", None), at(5_000));
        list.add(TaskDraft::new("c", None), at(5_000));

        let mut ids: Vec<String> = list.records().iter().map(|task| task.id.clone()).collect();
        ids.sort();
        assert_eq!(ids, ["5000", "5001", "5002"]);
    }

    #[test]
    fn any_title_is_accepted() {
        let mut list = TaskList::new();
        let task = list.add(TaskDraft::new("", None), at(1));
        assert_eq!(task.title, "");
    }

    #[test]
    fn toggle_flips_and_filters_follow() {
        let mut list = TaskList::new();
        let id = list.add(TaskDraft::new("a", None), at(1)).id.clone();
        list.add(TaskDraft::new("b", None), at(2));

        assert!(list.toggle(&id).unwrap());
        assert_eq!(list.count(TaskFilter::All), 2);
        assert_eq!(list.count(TaskFilter::Completed), 1);
        assert_eq!(list.filtered(TaskFilter::Active)[0].title, "b");

        assert!(!list.toggle(&id).unwrap());
        assert_eq!(list.count(TaskFilter::Completed), 0);
    }

    #[test]
    fn update_replaces_fields_but_rejects_completed_tasks() {
        let mut list = TaskList::new();
        let id = list.add(TaskDraft::new("a", None), at(1)).id.clone();

        let updated = list
            .update(&id, TaskDraft::new("renamed", Some("details".to_string())))
            .unwrap();
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.description.as_deref(), Some("details"));

        list.toggle(&id).unwrap();
        let err = list.update(&id, TaskDraft::new("again", None)).unwrap_err();
        assert_eq!(err, TaskError::Completed(id));
    }

    #[test]
    fn missing_ids_report_not_found() {
        let mut list = TaskList::new();
        assert_eq!(
            list.toggle("404").unwrap_err(),
            TaskError::NotFound("404".to_string())
        );
        assert!(list.delete("404").is_err());
        assert!(list.update("404", TaskDraft::default()).is_err());
    }

    #[test]
    fn submit_updates_edited_task_then_returns_to_add_mode() {
        let mut list = TaskList::new();
        let id = list.add(TaskDraft::new("a", None), at(1)).id.clone();

        list.begin_edit(&id).unwrap();
        assert_eq!(list.editing().map(|task| task.id.as_str()), Some(id.as_str()));

        list.submit(TaskDraft::new("edited", None), at(2)).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.records()[0].title, "edited");
        assert!(list.editing().is_none());

        list.submit(TaskDraft::new("new", None), at(3)).unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn deleting_or_completing_the_edited_task_clears_selection() {
        let mut list = TaskList::new();
        let first = list.add(TaskDraft::new("a", None), at(1)).id.clone();
        let second = list.add(TaskDraft::new("b", None), at(2)).id.clone();

        list.begin_edit(&first).unwrap();
        list.delete(&first).unwrap();
        assert!(list.editing().is_none());

        list.begin_edit(&second).unwrap();
        list.toggle(&second).unwrap();
        assert!(list.editing().is_none());
        assert!(matches!(
            list.begin_edit(&second),
            Err(TaskError::Completed(_))
        ));
    }

    #[test]
    fn filter_parses_known_names() {
        assert_eq!("ALL".parse::<TaskFilter>().unwrap(), TaskFilter::All);
        assert_eq!(" active ".parse::<TaskFilter>().unwrap(), TaskFilter::Active);
        assert_eq!(
            "completed".parse::<TaskFilter>().unwrap(),
            TaskFilter::Completed
        );
        assert!("pending".parse::<TaskFilter>().is_err());
    }
}
