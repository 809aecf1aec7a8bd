//! Timed to-do list for the current user.

use std::sync::Arc;
use uuid::Uuid;

use super::messages::{
    TASKS_FETCH_FAILED, TASK_ADDED, TASK_ADD_FAILED, TASK_DELETED, TASK_DELETE_FAILED,
    TASK_UPDATE_FAILED,
};
use super::Outcome;
use crate::error::{InputError, StoreResult};
use crate::models::{NewTask, Task};
use crate::notify::Notifier;
use crate::store::{from_record, patch, to_record, Collection, Filter, Order, RecordStore};
use crate::user::UserContext;

pub const DEFAULT_MINUTES: &str = "30";

/// Raw form inputs, validated on submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub description: String,
    pub minutes: String,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            description: String::new(),
            minutes: DEFAULT_MINUTES.to_string(),
        }
    }
}

impl TaskForm {
    /// Trimmed description and whole minutes, or why the input is unusable
    pub fn validate(&self) -> Result<(String, u32), InputError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(InputError::EmptyDescription);
        }
        let minutes = parse_minutes(&self.minutes)?;
        Ok((description.to_string(), minutes))
    }
}

/// Accepts any positive finite number; fractions round up to whole minutes.
pub fn parse_minutes(input: &str) -> Result<u32, InputError> {
    let invalid = || InputError::InvalidDuration(input.to_string());

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }
    let value: f64 = trimmed.parse().map_err(|_| invalid())?;
    if !value.is_finite() || value <= 0.0 || value.ceil() > u32::MAX as f64 {
        return Err(invalid());
    }
    Ok(value.ceil() as u32)
}

pub struct TaskList {
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
    user: UserContext,
    tasks: Vec<Task>,
    form: TaskForm,
    loading: bool,
}

impl TaskList {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>, user: UserContext) -> Self {
        Self {
            store,
            notifier,
            user,
            tasks: Vec::new(),
            form: TaskForm::default(),
            loading: true,
        }
    }

    pub async fn mount(
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        user: UserContext,
    ) -> Self {
        let mut list = Self::new(store, notifier, user);
        list.load_all().await;
        list
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Newest first
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    pub fn form(&self) -> &TaskForm {
        &self.form
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.form.description = description.into();
    }

    pub fn set_minutes(&mut self, minutes: impl Into<String>) {
        self.form.minutes = minutes.into();
    }

    /// Resolve a full UUID or a unique id prefix
    pub fn find(&self, identifier: &str) -> Option<&Task> {
        let identifier = identifier.trim().to_lowercase();
        if identifier.is_empty() {
            return None;
        }
        if let Ok(id) = Uuid::parse_str(&identifier) {
            return self.tasks.iter().find(|t| t.id == id);
        }
        let mut matches = self
            .tasks
            .iter()
            .filter(|t| t.id.to_string().starts_with(&identifier));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Some(task),
            _ => None,
        }
    }

    async fn fetch(&self, owner: &str) -> StoreResult<Vec<Task>> {
        let records = self
            .store
            .query(
                Collection::Tasks,
                &Filter::new().eq("owner", owner),
                Some(&Order::desc("created_at")),
            )
            .await?;
        records.into_iter().map(from_record::<Task>).collect()
    }

    /// Replace the list with the owner's tasks; on failure the list is kept.
    pub async fn load_all(&mut self) -> Outcome {
        let owner = self.user.owner_name();
        let outcome = match self.fetch(&owner).await {
            Ok(tasks) => {
                tracing::debug!(owner = %owner, count = tasks.len(), "loaded tasks");
                self.tasks = tasks;
                Outcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch tasks");
                self.notifier.error(TASKS_FETCH_FAILED);
                Outcome::Failed
            }
        };
        self.loading = false;
        outcome
    }

    /// Submit the form. Invalid input never reaches the store; on success
    /// the form resets and the list is refetched.
    pub async fn add(&mut self) -> Outcome {
        let (description, minutes) = match self.form.validate() {
            Ok(valid) => valid,
            Err(e) => {
                self.notifier.error(&e.to_string());
                return Outcome::Rejected;
            }
        };

        let owner = self.user.owner_name();
        let result = match to_record(&NewTask::new(&owner, &description, minutes)) {
            Ok(record) => self.store.insert(Collection::Tasks, record).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(_) => {
                self.form = TaskForm::default();
                self.load_all().await;
                self.notifier.success(TASK_ADDED);
                Outcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to add task");
                self.notifier.error(TASK_ADD_FAILED);
                Outcome::Failed
            }
        }
    }

    /// Set the completed flag. Local state changes only after the store
    /// confirms, so a failure needs no rollback.
    pub async fn toggle(&mut self, id: Uuid, completed: bool) -> Outcome {
        match self
            .store
            .update(Collection::Tasks, id, patch("completed", completed))
            .await
        {
            Ok(()) => {
                if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
                    task.completed = completed;
                }
                Outcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, %id, "failed to update task");
                self.notifier.error(TASK_UPDATE_FAILED);
                Outcome::Failed
            }
        }
    }

    pub async fn remove(&mut self, id: Uuid) -> Outcome {
        match self.store.delete(Collection::Tasks, id).await {
            Ok(()) => {
                self.tasks.retain(|t| t.id != id);
                self.notifier.success(TASK_DELETED);
                Outcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, %id, "failed to delete task");
                self.notifier.error(TASK_DELETE_FAILED);
                Outcome::Failed
            }
        }
    }

    pub async fn refresh_if_user_changed(&mut self) -> bool {
        if !self.user.take_change() {
            return false;
        }
        self.tasks.clear();
        self.loading = true;
        self.load_all().await;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::BufferedNotifier;
    use crate::testing::{error, harness, success, RecordingStore};
    use crate::user::UserHandle;
    use serde_json::json;

    async fn mount(store: &Arc<RecordingStore>, notifier: &Arc<BufferedNotifier>) -> TaskList {
        TaskList::mount(store.clone(), notifier.clone(), UserContext::fixed("ada")).await
    }

    async fn seed(store: &RecordingStore, owner: &str, description: &str) -> Uuid {
        let record = to_record(&NewTask::new(owner, description, 30)).unwrap();
        let created = store.seed(Collection::Tasks, record).await;
        Uuid::parse_str(created["id"].as_str().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_add_lands_first_and_resets_form() {
        let (store, notifier) = harness();
        seed(&store, "ada", "Older").await;
        let mut list = mount(&store, &notifier).await;
        assert_eq!(list.tasks().len(), 1);

        list.set_description("Write report");
        list.set_minutes("45");
        assert_eq!(list.add().await, Outcome::Applied);

        assert_eq!(store.inserts(), 1);
        let first = &list.tasks()[0];
        assert_eq!(first.description, "Write report");
        assert_eq!(first.estimated_minutes, 45);
        assert!(!first.completed);
        assert_eq!(first.owner, "ada");
        assert!(first.due_date.is_some());
        assert_eq!(list.tasks()[1].description, "Older");
        assert_eq!(list.form(), &TaskForm::default());
        assert_eq!(list.pending_count(), 2);
        assert_eq!(notifier.drain(), vec![success(TASK_ADDED)]);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_store() {
        let (store, notifier) = harness();
        let mut list = mount(&store, &notifier).await;

        list.set_description("Write report");
        list.set_minutes("abc");
        assert_eq!(list.add().await, Outcome::Rejected);

        list.set_description("  ");
        list.set_minutes("45");
        assert_eq!(list.add().await, Outcome::Rejected);

        assert_eq!(store.inserts(), 0);
        assert!(list.tasks().is_empty());
        assert_eq!(list.form().minutes, "45");
        assert_eq!(
            notifier.drain(),
            vec![
                error("Please enter a valid duration"),
                error("Please enter a task description"),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_add_keeps_form() {
        let (store, notifier) = harness();
        let mut list = mount(&store, &notifier).await;

        store.set_offline(true);
        list.set_description("Write report");
        assert_eq!(list.add().await, Outcome::Failed);
        assert_eq!(list.form().description, "Write report");
        assert!(list.tasks().is_empty());
        assert_eq!(notifier.drain(), vec![error(TASK_ADD_FAILED)]);
    }

    #[tokio::test]
    async fn test_toggle_round_trip() {
        let (store, notifier) = harness();
        let id = seed(&store, "ada", "Write report").await;
        let mut list = mount(&store, &notifier).await;

        assert_eq!(list.toggle(id, true).await, Outcome::Applied);
        assert!(list.tasks()[0].completed);
        assert_eq!(list.pending_count(), 0);
        assert_eq!(store.all(Collection::Tasks).await[0]["completed"], json!(true));

        assert_eq!(list.toggle(id, false).await, Outcome::Applied);
        assert!(!list.tasks()[0].completed);
        assert_eq!(store.all(Collection::Tasks).await[0]["completed"], json!(false));

        assert_eq!(store.updates(), 2);
        assert!(notifier.drain().is_empty());
    }

    #[tokio::test]
    async fn test_failed_toggle_changes_nothing() {
        let (store, notifier) = harness();
        let id = seed(&store, "ada", "Write report").await;
        let mut list = mount(&store, &notifier).await;

        store.set_offline(true);
        assert_eq!(list.toggle(id, true).await, Outcome::Failed);
        assert!(!list.tasks()[0].completed);
        assert_eq!(notifier.drain(), vec![error(TASK_UPDATE_FAILED)]);
    }

    #[tokio::test]
    async fn test_remove_only_matching_task() {
        let (store, notifier) = harness();
        let keep = seed(&store, "ada", "Keep").await;
        let gone = seed(&store, "ada", "Drop").await;
        let mut list = mount(&store, &notifier).await;

        assert_eq!(list.remove(gone).await, Outcome::Applied);
        assert_eq!(list.tasks().len(), 1);
        assert_eq!(list.tasks()[0].id, keep);
        assert_eq!(store.all(Collection::Tasks).await.len(), 1);
        assert_eq!(notifier.drain(), vec![success(TASK_DELETED)]);

        store.set_offline(true);
        assert_eq!(list.remove(keep).await, Outcome::Failed);
        assert_eq!(list.tasks().len(), 1);
        assert_eq!(store.deletes(), 2);
        assert_eq!(notifier.drain(), vec![error(TASK_DELETE_FAILED)]);
    }

    #[tokio::test]
    async fn test_list_is_per_owner() {
        let (store, notifier) = harness();
        seed(&store, "grace", "Not mine").await;
        seed(&store, "ada", "Mine").await;

        let list = mount(&store, &notifier).await;
        assert_eq!(list.tasks().len(), 1);
        assert_eq!(list.tasks()[0].description, "Mine");
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_list() {
        let (store, notifier) = harness();
        seed(&store, "ada", "Mine").await;
        let mut list = mount(&store, &notifier).await;

        store.set_offline(true);
        assert_eq!(list.load_all().await, Outcome::Failed);
        assert_eq!(list.tasks().len(), 1);
        assert!(!list.is_loading());
        assert_eq!(notifier.drain(), vec![error(TASKS_FETCH_FAILED)]);
    }

    #[tokio::test]
    async fn test_find_by_prefix() {
        let (store, notifier) = harness();
        let id = seed(&store, "ada", "Write report").await;
        let list = mount(&store, &notifier).await;

        let full = id.to_string();
        assert_eq!(list.find(&full).map(|t| t.id), Some(id));
        assert_eq!(list.find(&full[..8]).map(|t| t.id), Some(id));
        assert_eq!(list.find(&full[..8].to_uppercase()).map(|t| t.id), Some(id));
        assert!(list.find("").is_none());
        assert!(list.find("zzzz").is_none());
    }

    #[tokio::test]
    async fn test_user_change_reloads() {
        let (store, notifier) = harness();
        seed(&store, "grace", "Grace's task").await;
        let users = UserHandle::new("ada");
        let mut list = TaskList::mount(store.clone(), notifier.clone(), users.subscribe()).await;
        assert!(list.tasks().is_empty());

        users.set("grace");
        assert!(list.refresh_if_user_changed().await);
        assert_eq!(list.tasks()[0].description, "Grace's task");
        assert!(!list.refresh_if_user_changed().await);
    }

    #[test]
    fn test_parse_minutes_accepts_positive_numbers() {
        assert_eq!(parse_minutes("45"), Ok(45));
        assert_eq!(parse_minutes(" 30 "), Ok(30));
        assert_eq!(parse_minutes("1.5"), Ok(2));
        assert_eq!(parse_minutes("0.1"), Ok(1));
    }

    #[test]
    fn test_parse_minutes_rejects() {
        for bad in ["", "   ", "abc", "0", "-5", "NaN", "inf", "12abc", "1e20"] {
            assert!(
                matches!(parse_minutes(bad), Err(InputError::InvalidDuration(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_form_validation_order() {
        let form = TaskForm {
            description: "  ".into(),
            minutes: "abc".into(),
        };
        assert_eq!(form.validate(), Err(InputError::EmptyDescription));

        let form = TaskForm {
            description: " Write report ".into(),
            minutes: "45".into(),
        };
        assert_eq!(form.validate(), Ok(("Write report".to_string(), 45)));
    }

    #[test]
    fn test_form_defaults() {
        let form = TaskForm::default();
        assert_eq!(form.description, "");
        assert_eq!(form.minutes, "30");
    }
}
