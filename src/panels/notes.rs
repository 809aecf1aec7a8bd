//! Morning and evening reflections for the current day.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;

use super::messages::{NOTES_FETCH_FAILED, NOTE_SAVED, NOTE_SAVE_FAILED};
use super::Outcome;
use crate::error::StoreResult;
use crate::models::{NewNote, Note, NoteKind};
use crate::notify::Notifier;
use crate::store::{from_record, patch, to_record, Collection, Filter, Order, RecordStore};
use crate::user::UserContext;

/// Identity of "the" note for one owner, kind and local calendar day
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DayKey {
    pub owner: String,
    pub kind: NoteKind,
    pub day: NaiveDate,
}

impl DayKey {
    pub fn new(owner: &str, kind: NoteKind, day: NaiveDate) -> Self {
        Self {
            owner: owner.to_string(),
            kind,
            day,
        }
    }
}

/// UTC instant of local midnight at the start of `day`
fn local_midnight(day: NaiveDate) -> DateTime<Utc> {
    let naive = day.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// `[start of day, start of next day)` in UTC
pub fn day_window(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let next = day.succ_opt().unwrap_or(day);
    (local_midnight(day), local_midnight(next))
}

pub struct NotesPanel {
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
    user: UserContext,
    morning_text: String,
    evening_text: String,
    /// Notes found by the last successful load
    current: HashMap<DayKey, Note>,
    loading: bool,
}

impl NotesPanel {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>, user: UserContext) -> Self {
        Self {
            store,
            notifier,
            user,
            morning_text: String::new(),
            evening_text: String::new(),
            current: HashMap::new(),
            loading: true,
        }
    }

    /// Construct and run the initial fetch
    pub async fn mount(
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        user: UserContext,
    ) -> Self {
        let mut panel = Self::new(store, notifier, user);
        panel.load_today().await;
        panel
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn text(&self, kind: NoteKind) -> &str {
        match kind {
            NoteKind::Morning => &self.morning_text,
            NoteKind::Evening => &self.evening_text,
        }
    }

    pub fn set_text(&mut self, kind: NoteKind, text: impl Into<String>) {
        let text = text.into();
        match kind {
            NoteKind::Morning => self.morning_text = text,
            NoteKind::Evening => self.evening_text = text,
        }
    }

    /// Today's stored note of `kind` for the current owner, as of the last load
    pub fn current_note(&self, kind: NoteKind) -> Option<&Note> {
        let key = DayKey::new(&self.user.owner_name(), kind, Local::now().date_naive());
        self.current.get(&key)
    }

    async fn fetch_day(&self, owner: &str, day: NaiveDate) -> StoreResult<Vec<Note>> {
        let (start, end) = day_window(day);
        let filter = Filter::new()
            .eq("owner", owner)
            .between("created_at", start, end);
        let records = self
            .store
            .query(Collection::Notes, &filter, Some(&Order::asc("created_at")))
            .await?;
        records.into_iter().map(from_record::<Note>).collect()
    }

    /// Fetch today's notes and seed the buffers from them.
    ///
    /// A buffer is only overwritten when a note of its kind exists, so text
    /// typed into the other buffer survives the reload after a save.
    pub async fn load_today(&mut self) -> Outcome {
        let owner = self.user.owner_name();
        let day = Local::now().date_naive();

        let outcome = match self.fetch_day(&owner, day).await {
            Ok(notes) => {
                self.current.clear();
                for note in notes {
                    // First one wins if the store holds duplicates
                    self.current
                        .entry(DayKey::new(&owner, note.kind, day))
                        .or_insert(note);
                }
                for kind in NoteKind::ALL {
                    if let Some(note) = self.current.get(&DayKey::new(&owner, kind, day)) {
                        let content = note.content.clone();
                        self.set_text(kind, content);
                    }
                }
                tracing::debug!(owner = %owner, found = self.current.len(), "loaded notes");
                Outcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch notes");
                self.notifier.error(NOTES_FETCH_FAILED);
                Outcome::Failed
            }
        };

        self.loading = false;
        outcome
    }

    /// Persist the buffer for `kind`: update today's note if the last load
    /// found one, insert otherwise. The buffer is left as typed on failure.
    pub async fn save(&mut self, kind: NoteKind) -> Outcome {
        let content = self.text(kind).to_string();
        if content.trim().is_empty() {
            return Outcome::Unchanged;
        }

        let owner = self.user.owner_name();
        let key = DayKey::new(&owner, kind, Local::now().date_naive());

        let result = match self.current.get(&key) {
            Some(note) => {
                self.store
                    .update(Collection::Notes, note.id, patch("content", content))
                    .await
            }
            None => match to_record(&NewNote::new(&owner, kind, content)) {
                Ok(record) => self.store.insert(Collection::Notes, record).await.map(|_| ()),
                Err(e) => Err(e),
            },
        };

        match result {
            Ok(()) => {
                self.notifier.success(NOTE_SAVED);
                self.load_today().await;
                Outcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, %kind, "failed to save note");
                self.notifier.error(NOTE_SAVE_FAILED);
                Outcome::Failed
            }
        }
    }

    /// Re-run the initial fetch if the active user changed since the last call
    pub async fn refresh_if_user_changed(&mut self) -> bool {
        if !self.user.take_change() {
            return false;
        }
        self.morning_text.clear();
        self.evening_text.clear();
        self.current.clear();
        self.loading = true;
        self.load_today().await;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::BufferedNotifier;
    use crate::store::{timestamp, Record};
    use crate::testing::{error, harness, success, RecordingStore};
    use crate::user::UserHandle;
    use serde_json::json;

    async fn mount(store: &Arc<RecordingStore>, notifier: &Arc<BufferedNotifier>) -> NotesPanel {
        NotesPanel::mount(store.clone(), notifier.clone(), UserContext::fixed("ada")).await
    }

    fn note_record(owner: &str, kind: NoteKind, content: &str) -> Record {
        to_record(&NewNote::new(owner, kind, content.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_first_save_inserts_then_updates_in_place() {
        let (store, notifier) = harness();
        let mut panel = mount(&store, &notifier).await;
        assert!(!panel.is_loading());
        assert_eq!(panel.text(NoteKind::Morning), "");

        panel.set_text(NoteKind::Morning, "Plan the day");
        assert_eq!(panel.save(NoteKind::Morning).await, Outcome::Applied);
        assert_eq!(store.inserts(), 1);
        assert!(panel.current_note(NoteKind::Morning).is_some());

        panel.set_text(NoteKind::Morning, "Plan the day, then review");
        assert_eq!(panel.save(NoteKind::Morning).await, Outcome::Applied);
        panel.set_text(NoteKind::Morning, "Plan the day, then review twice");
        assert_eq!(panel.save(NoteKind::Morning).await, Outcome::Applied);
        assert_eq!(store.inserts(), 1);
        assert_eq!(store.updates(), 2);

        let rows = store.all(Collection::Notes).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["content"], json!("Plan the day, then review twice"));
        assert_eq!(rows[0]["kind"], json!("morning"));
        assert_eq!(rows[0]["owner"], json!("ada"));
        assert_eq!(notifier.drain(), vec![success(NOTE_SAVED); 3]);
    }

    #[tokio::test]
    async fn test_mount_seeds_buffers_from_todays_notes() {
        let (store, notifier) = harness();
        store
            .seed(Collection::Notes, note_record("ada", NoteKind::Evening, "Went well"))
            .await;
        store
            .seed(Collection::Notes, note_record("grace", NoteKind::Morning, "Not mine"))
            .await;

        let panel = mount(&store, &notifier).await;
        assert_eq!(panel.text(NoteKind::Evening), "Went well");
        assert_eq!(panel.text(NoteKind::Morning), "");
        assert!(panel.current_note(NoteKind::Morning).is_none());
        assert!(notifier.drain().is_empty());
    }

    #[tokio::test]
    async fn test_yesterdays_note_is_not_today() {
        let (store, notifier) = harness();
        store
            .seed(Collection::Notes, note_record("ada", NoteKind::Morning, "Old"))
            .await;
        // Backdate the seeded row past the start of today
        let (start, _) = day_window(Local::now().date_naive());
        let yesterday = timestamp(start - chrono::Duration::hours(1));
        store.exec_sql(&format!("UPDATE notes SET created_at = '{}'", yesterday));

        let mut panel = mount(&store, &notifier).await;
        assert_eq!(panel.text(NoteKind::Morning), "");

        panel.set_text(NoteKind::Morning, "Fresh");
        panel.save(NoteKind::Morning).await;
        assert_eq!(store.inserts(), 1);
        assert_eq!(store.updates(), 0);
        assert_eq!(store.all(Collection::Notes).await.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_notes_first_created_wins() {
        let (store, notifier) = harness();
        let first = store
            .seed(Collection::Notes, note_record("ada", NoteKind::Morning, "First"))
            .await;
        store
            .seed(Collection::Notes, note_record("ada", NoteKind::Morning, "Second"))
            .await;

        let panel = mount(&store, &notifier).await;
        assert_eq!(panel.text(NoteKind::Morning), "First");
        let id = panel.current_note(NoteKind::Morning).map(|n| n.id.to_string());
        assert_eq!(id.as_deref(), first["id"].as_str());
    }

    #[tokio::test]
    async fn test_save_keeps_unsaved_text_in_other_buffer() {
        let (store, notifier) = harness();
        let mut panel = mount(&store, &notifier).await;

        panel.set_text(NoteKind::Evening, "Draft, not saved");
        panel.set_text(NoteKind::Morning, "Plan the day");
        panel.save(NoteKind::Morning).await;

        assert_eq!(panel.text(NoteKind::Morning), "Plan the day");
        assert_eq!(panel.text(NoteKind::Evening), "Draft, not saved");
        assert!(panel.current_note(NoteKind::Evening).is_none());
    }

    #[tokio::test]
    async fn test_blank_save_does_nothing() {
        let (store, notifier) = harness();
        let mut panel = mount(&store, &notifier).await;

        panel.set_text(NoteKind::Morning, "   \n ");
        assert_eq!(panel.save(NoteKind::Morning).await, Outcome::Unchanged);
        assert_eq!(store.inserts(), 0);
        assert_eq!(store.updates(), 0);
        assert!(notifier.drain().is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_buffer() {
        let (store, notifier) = harness();
        let mut panel = mount(&store, &notifier).await;

        store.set_offline(true);
        panel.set_text(NoteKind::Morning, "Plan the day");
        assert_eq!(panel.save(NoteKind::Morning).await, Outcome::Failed);

        assert_eq!(panel.text(NoteKind::Morning), "Plan the day");
        assert!(panel.current_note(NoteKind::Morning).is_none());
        assert_eq!(notifier.drain(), vec![error(NOTE_SAVE_FAILED)]);

        store.set_offline(false);
        assert_eq!(panel.save(NoteKind::Morning).await, Outcome::Applied);
        assert_eq!(store.all(Collection::Notes).await.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_notifies_and_stops_loading() {
        let (store, notifier) = harness();
        store.set_offline(true);

        let panel = mount(&store, &notifier).await;
        assert!(!panel.is_loading());
        assert_eq!(panel.text(NoteKind::Morning), "");
        assert_eq!(notifier.drain(), vec![error(NOTES_FETCH_FAILED)]);
    }

    #[tokio::test]
    async fn test_user_change_reloads() {
        let (store, notifier) = harness();
        store
            .seed(Collection::Notes, note_record("grace", NoteKind::Morning, "Grace's plan"))
            .await;

        let users = UserHandle::new("ada");
        let mut panel = NotesPanel::mount(store.clone(), notifier.clone(), users.subscribe()).await;
        panel.set_text(NoteKind::Morning, "Ada typing");
        assert!(!panel.refresh_if_user_changed().await);
        let queries = store.queries();

        users.set("grace");
        assert!(panel.refresh_if_user_changed().await);
        assert_eq!(store.queries(), queries + 1);
        assert_eq!(panel.text(NoteKind::Morning), "Grace's plan");
        assert!(!panel.refresh_if_user_changed().await);
    }

    #[test]
    fn test_day_window_is_one_day_wide() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let (start, end) = day_window(day);
        assert!(start < end);
        let hours = (end - start).num_hours();
        // 23 or 25 across a DST switch
        assert!((23..=25).contains(&hours));
        assert_eq!(start.with_timezone(&Local).date_naive(), day);
    }

    #[test]
    fn test_day_key_equality() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(
            DayKey::new("ada", NoteKind::Morning, day),
            DayKey::new("ada", NoteKind::Morning, day)
        );
        assert_ne!(
            DayKey::new("ada", NoteKind::Morning, day),
            DayKey::new("ada", NoteKind::Evening, day)
        );
    }
}
