//! Repository implementation over a shared key-value table.

use async_trait::async_trait;

use planzoco_core::poll::{EntityType, Event, PollOption, Question};
use planzoco_core::storage::{
    attr, decode, encode, item_to_event, item_to_option, item_to_question, make_key, AttrValue,
    DeletionRecovery, EventRepository, Index, IndexQuery, Item, ItemKey, KeyValueStore,
    OptionRepository, PendingDeletion, QuestionRepository, Record, RepositoryError, Result,
};

/// Event, question and option repositories over one [`KeyValueStore`].
///
/// The store handle is created once at startup and shared by every
/// operation; the repository itself holds no other state.
#[derive(Debug, Clone)]
pub struct SingleTableRepository<S> {
    store: S,
}

impl<S: KeyValueStore> SingleTableRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Writes a record as a whole item.
    ///
    /// A `deleting` marker on the stored item is carried over so an
    /// interrupted cascade stays visible to recovery.
    async fn write(&self, record: &Record, operation: &'static str) -> Result<()> {
        let key = record.key();
        let entity_type = record.entity_type().label();
        let mut item = encode(record);

        let existing = self
            .store
            .get_item(&key)
            .await
            .map_err(|e| e.context(operation, entity_type))?;
        if let Some(marker) = existing.as_ref().and_then(|i| i.get(attr::DELETING)) {
            item.insert(attr::DELETING.to_string(), marker.clone());
        }

        self.store
            .put_item(item)
            .await
            .map_err(|e| e.context(operation, entity_type))
    }

    /// Finds one item of a type by id through the type index.
    ///
    /// Needed where the sort key (the parent's key) is unknown. More than one
    /// match for the computed `pk` is reported rather than resolved.
    async fn find_by_type(&self, entity_type: EntityType, id: &str) -> Result<Option<Item>> {
        let query = IndexQuery::new(Index::EntityType, entity_type.as_str())
            .with_sort(make_key(entity_type, id));
        let mut items = self
            .store
            .query(&query)
            .await
            .map_err(|e| e.context("find", entity_type.label()))?;

        match items.len() {
            0 => Ok(None),
            1 => Ok(items.pop()),
            count => Err(RepositoryError::DuplicateRecord {
                entity_type: entity_type.label(),
                id: id.to_string(),
                count,
            }),
        }
    }

    async fn load_event(&self, id: &str) -> Result<Option<Event>> {
        self.store
            .get_item(&ItemKey::event(id))
            .await
            .map_err(|e| e.context("get", "Event"))?
            .map(|item| item_to_event(&item))
            .transpose()
    }

    async fn load_question(&self, id: &str) -> Result<Option<Question>> {
        self.find_by_type(EntityType::Question, id)
            .await?
            .map(|item| item_to_question(&item))
            .transpose()
    }

    async fn load_option(&self, id: &str) -> Result<Option<PollOption>> {
        self.find_by_type(EntityType::Option, id)
            .await?
            .map(|item| item_to_option(&item))
            .transpose()
    }

    /// Question records of an event, without their options.
    async fn question_records(&self, event_id: &str) -> Result<Vec<Question>> {
        let query = IndexQuery::new(Index::EventId, event_id)
            .filter(attr::ENTITY_TYPE, EntityType::Question.as_str());
        let items = self
            .store
            .query(&query)
            .await
            .map_err(|e| e.context("list", "Question"))?;

        items.iter().map(item_to_question).collect()
    }

    async fn option_records(&self, question_id: &str) -> Result<Vec<PollOption>> {
        let query = IndexQuery::new(Index::QuestionId, question_id)
            .filter(attr::ENTITY_TYPE, EntityType::Option.as_str());
        let items = self
            .store
            .query(&query)
            .await
            .map_err(|e| e.context("list", "Option"))?;

        items.iter().map(item_to_option).collect()
    }

    /// Items of a type still carrying the deletion marker.
    async fn marked(&self, entity_type: EntityType) -> Result<Vec<Item>> {
        let query = IndexQuery::new(Index::EntityType, entity_type.as_str())
            .filter(attr::DELETING, AttrValue::Bool(true));
        self.store
            .query(&query)
            .await
            .map_err(|e| e.context("list marked", entity_type.label()))
    }

    /// Flags a cascade root before any child is touched.
    async fn mark_deleting(&self, key: &ItemKey, entity_type: EntityType, id: &str) -> Result<()> {
        let mut marker = Item::new();
        marker.insert(attr::DELETING.to_string(), AttrValue::Bool(true));

        let found = self
            .store
            .set_attributes(key, marker)
            .await
            .map_err(|e| e.context("mark", entity_type.label()))?;
        if !found {
            return Err(RepositoryError::NotFound {
                entity_type: entity_type.label(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Deletes a question's options, then the question itself.
    async fn cascade_question(&self, question: &Question) -> Result<()> {
        for option in self.option_records(&question.id).await? {
            self.store
                .delete_item(&ItemKey::option(&option.id, &option.question_id))
                .await
                .map_err(|e| e.context("delete", "Option"))?;
        }

        self.store
            .delete_item(&ItemKey::question(&question.id, &question.event_id))
            .await
            .map_err(|e| e.context("delete", "Question"))
    }

    /// Deletes an event's questions (each with its options), then the event.
    async fn cascade_event(&self, id: &str) -> Result<()> {
        for question in self.question_records(id).await? {
            self.cascade_question(&question).await?;
        }

        self.store
            .delete_item(&ItemKey::event(id))
            .await
            .map_err(|e| e.context("delete", "Event"))
    }
}

// ============================================================================
// EventRepository implementation
// ============================================================================

#[async_trait]
impl<S: KeyValueStore> EventRepository for SingleTableRepository<S> {
    async fn create_event(&self, event: &Event) -> Result<Event> {
        let mut stored = event.clone();
        stored.key = Some(ItemKey::event(&event.id));

        self.write(&Record::Event(stored.clone()), "create").await?;

        tracing::info!(event_id = %event.id, "Created event");
        Ok(stored)
    }

    async fn get_event(&self, id: &str) -> Result<Option<Event>> {
        tracing::debug!(event_id = %id, "Getting event");

        let Some(mut event) = self.load_event(id).await? else {
            return Ok(None);
        };
        event.questions = self.list_questions_by_event(id).await?;
        Ok(Some(event))
    }

    async fn update_event(&self, event: &Event) -> Result<Event> {
        let mut stored = event.clone();
        stored.key = Some(ItemKey::event(&event.id));

        self.write(&Record::Event(stored.clone()), "update").await?;

        tracing::info!(event_id = %event.id, "Updated event");
        Ok(stored)
    }

    async fn delete_event(&self, id: &str) -> Result<()> {
        self.mark_deleting(&ItemKey::event(id), EntityType::Event, id)
            .await?;

        if let Err(e) = self.cascade_event(id).await {
            tracing::warn!(event_id = %id, error = %e, "Event cascade interrupted");
            return Err(e);
        }

        tracing::info!(event_id = %id, "Deleted event");
        Ok(())
    }

    async fn list_events(&self) -> Result<Vec<Event>> {
        let query = IndexQuery::new(Index::EntityType, EntityType::Event.as_str());
        let items = self
            .store
            .query(&query)
            .await
            .map_err(|e| e.context("list", "Event"))?;

        let mut events = items.iter().map(item_to_event).collect::<Result<Vec<_>>>()?;
        for event in &mut events {
            match self.list_questions_by_event(&event.id).await {
                Ok(questions) => event.questions = questions,
                Err(e) => {
                    tracing::warn!(event_id = %event.id, error = %e, "Failed to fetch questions");
                }
            }
        }

        tracing::debug!(count = events.len(), "Listed events");
        Ok(events)
    }
}

// ============================================================================
// QuestionRepository implementation
// ============================================================================

#[async_trait]
impl<S: KeyValueStore> QuestionRepository for SingleTableRepository<S> {
    async fn add_question(&self, event_id: &str, question: &Question) -> Result<Question> {
        let stored = Question {
            event_id: event_id.to_string(),
            key: Some(ItemKey::question(&question.id, event_id)),
            ..question.clone()
        };

        self.write(&Record::Question(stored.clone()), "create")
            .await?;

        tracing::info!(question_id = %stored.id, event_id = %event_id, "Added question");
        Ok(stored)
    }

    async fn get_question(&self, id: &str) -> Result<Option<Question>> {
        tracing::debug!(question_id = %id, "Getting question");

        let Some(mut question) = self.load_question(id).await? else {
            return Ok(None);
        };
        question.options = self.list_options_by_question(id).await?;
        Ok(Some(question))
    }

    async fn get_question_with_event(
        &self,
        id: &str,
    ) -> Result<Option<(Question, Option<Event>)>> {
        let Some(question) = self.get_question(id).await? else {
            return Ok(None);
        };
        let event = self.get_event(&question.event_id).await?;
        Ok(Some((question, event)))
    }

    async fn update_question(&self, question: &Question) -> Result<Question> {
        let stored = match question.key {
            Some(_) => Question {
                key: Some(ItemKey::question(&question.id, &question.event_id)),
                ..question.clone()
            },
            None => {
                let existing = self.get_question(&question.id).await?.ok_or_else(|| {
                    RepositoryError::NotFound {
                        entity_type: "Question",
                        id: question.id.clone(),
                    }
                })?;
                Question {
                    text: question.text.clone(),
                    ..existing
                }
            }
        };

        self.write(&Record::Question(stored.clone()), "update")
            .await?;

        tracing::info!(question_id = %stored.id, "Updated question");
        Ok(stored)
    }

    async fn delete_question(&self, id: &str) -> Result<()> {
        let question = self
            .load_question(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound {
                entity_type: "Question",
                id: id.to_string(),
            })?;

        let key = ItemKey::question(&question.id, &question.event_id);
        self.mark_deleting(&key, EntityType::Question, id).await?;

        if let Err(e) = self.cascade_question(&question).await {
            tracing::warn!(question_id = %id, error = %e, "Question cascade interrupted");
            return Err(e);
        }

        tracing::info!(question_id = %id, "Deleted question");
        Ok(())
    }

    async fn list_questions_by_event(&self, event_id: &str) -> Result<Vec<Question>> {
        let mut questions = self.question_records(event_id).await?;

        for question in &mut questions {
            match self.option_records(&question.id).await {
                Ok(options) => question.options = options,
                Err(e) => {
                    tracing::warn!(
                        question_id = %question.id,
                        error = %e,
                        "Failed to fetch options"
                    );
                }
            }
        }

        Ok(questions)
    }
}

// ============================================================================
// OptionRepository implementation
// ============================================================================

#[async_trait]
impl<S: KeyValueStore> OptionRepository for SingleTableRepository<S> {
    async fn add_option(&self, question_id: &str, option: &PollOption) -> Result<PollOption> {
        let stored = PollOption {
            question_id: question_id.to_string(),
            votes: 0,
            key: Some(ItemKey::option(&option.id, question_id)),
            ..option.clone()
        };

        self.write(&Record::Option(stored.clone()), "create").await?;

        tracing::info!(option_id = %stored.id, question_id = %question_id, "Added option");
        Ok(stored)
    }

    async fn get_option(&self, id: &str) -> Result<Option<PollOption>> {
        tracing::debug!(option_id = %id, "Getting option");
        self.load_option(id).await
    }

    async fn update_option(&self, option: &PollOption) -> Result<PollOption> {
        let not_found = || RepositoryError::NotFound {
            entity_type: "Option",
            id: option.id.clone(),
        };

        let key = match option.key {
            Some(_) => ItemKey::option(&option.id, &option.question_id),
            None => {
                let existing = self.load_option(&option.id).await?.ok_or_else(not_found)?;
                ItemKey::option(&existing.id, &existing.question_id)
            }
        };

        // Text only: the vote count belongs to vote_option.
        let mut attributes = Item::new();
        attributes.insert(attr::TEXT.to_string(), AttrValue::S(option.text.clone()));
        let found = self
            .store
            .set_attributes(&key, attributes)
            .await
            .map_err(|e| e.context("update", "Option"))?;
        if !found {
            return Err(not_found());
        }

        let item = self
            .store
            .get_item(&key)
            .await
            .map_err(|e| e.context("get", "Option"))?
            .ok_or_else(not_found)?;

        tracing::info!(option_id = %option.id, "Updated option");
        item_to_option(&item)
    }

    async fn delete_option(&self, id: &str) -> Result<()> {
        let option = self
            .load_option(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound {
                entity_type: "Option",
                id: id.to_string(),
            })?;

        self.store
            .delete_item(&ItemKey::option(&option.id, &option.question_id))
            .await
            .map_err(|e| e.context("delete", "Option"))?;

        tracing::info!(option_id = %id, "Deleted option");
        Ok(())
    }

    async fn vote_option(&self, id: &str) -> Result<PollOption> {
        let not_found = || RepositoryError::NotFound {
            entity_type: "Option",
            id: id.to_string(),
        };

        let mut option = self.load_option(id).await?.ok_or_else(not_found)?;
        let key = ItemKey::option(&option.id, &option.question_id);

        let votes = self
            .store
            .increment(&key, attr::VOTES, 1)
            .await
            .map_err(|e| e.context("vote", "Option"))?
            .ok_or_else(not_found)?;
        option.votes = u64::try_from(votes)
            .map_err(|_| RepositoryError::MalformedRecord(format!("Negative vote count: {votes}")))?;

        tracing::info!(option_id = %id, votes = option.votes, "Recorded vote");
        Ok(option)
    }

    async fn list_options_by_question(&self, question_id: &str) -> Result<Vec<PollOption>> {
        self.option_records(question_id).await
    }
}

// ============================================================================
// DeletionRecovery implementation
// ============================================================================

#[async_trait]
impl<S: KeyValueStore> DeletionRecovery for SingleTableRepository<S> {
    async fn pending_deletions(&self) -> Result<Vec<PendingDeletion>> {
        let mut items = self.marked(EntityType::Event).await?;
        items.extend(self.marked(EntityType::Question).await?);

        items
            .iter()
            .map(|item| {
                let record = decode(item)?;
                Ok(PendingDeletion {
                    entity_type: record.entity_type(),
                    id: record.id().to_string(),
                })
            })
            .collect()
    }

    async fn resume_deletions(&self) -> Result<usize> {
        let mut completed = 0;

        for item in self.marked(EntityType::Event).await? {
            let event = item_to_event(&item)?;
            self.cascade_event(&event.id).await?;
            tracing::info!(event_id = %event.id, "Resumed event deletion");
            completed += 1;
        }

        // Queried after the event cascades, which may already have removed some.
        for item in self.marked(EntityType::Question).await? {
            let question = item_to_question(&item)?;
            self.cascade_question(&question).await?;
            tracing::info!(question_id = %question.id, "Resumed question deletion");
            completed += 1;
        }

        Ok(completed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::storage::inmemory::InMemoryStore;
    use planzoco_core::storage::question_to_item;

    /// Wraps the in-memory store with switchable failures.
    #[derive(Clone, Default)]
    struct FlakyStore {
        inner: InMemoryStore,
        failing_index: Arc<Mutex<Option<Index>>>,
        failing_delete_pk: Arc<Mutex<Option<String>>>,
    }

    impl FlakyStore {
        fn fail_queries_on(&self, index: Option<Index>) {
            *self.failing_index.lock().unwrap() = index;
        }

        fn fail_deletes_of(&self, pk: Option<&str>) {
            *self.failing_delete_pk.lock().unwrap() = pk.map(str::to_string);
        }
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn put_item(&self, item: Item) -> Result<()> {
            self.inner.put_item(item).await
        }

        async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>> {
            self.inner.get_item(key).await
        }

        async fn delete_item(&self, key: &ItemKey) -> Result<()> {
            let failing = self.failing_delete_pk.lock().unwrap().clone();
            if failing.as_deref() == Some(key.pk()) {
                return Err(RepositoryError::StoreUnavailable("connection reset".to_string()));
            }
            self.inner.delete_item(key).await
        }

        async fn query(&self, query: &IndexQuery) -> Result<Vec<Item>> {
            let failing = *self.failing_index.lock().unwrap();
            if failing == Some(query.index) {
                return Err(RepositoryError::StoreUnavailable("timeout".to_string()));
            }
            self.inner.query(query).await
        }

        async fn set_attributes(&self, key: &ItemKey, attributes: Item) -> Result<bool> {
            self.inner.set_attributes(key, attributes).await
        }

        async fn increment(
            &self,
            key: &ItemKey,
            attribute: &str,
            delta: i64,
        ) -> Result<Option<i64>> {
            self.inner.increment(key, attribute, delta).await
        }
    }

    fn repo() -> SingleTableRepository<InMemoryStore> {
        SingleTableRepository::new(InMemoryStore::new())
    }

    /// Event ev1 with question q1 holding options o1 and o2.
    async fn seed<S: KeyValueStore>(repo: &SingleTableRepository<S>) {
        repo.create_event(&Event::draft("ev1", "Team offsite"))
            .await
            .unwrap();
        repo.add_question("ev1", &Question::draft("q1", "Where?"))
            .await
            .unwrap();
        repo.add_option("q1", &PollOption::draft("o1", "Lisbon"))
            .await
            .unwrap();
        repo.add_option("q1", &PollOption::draft("o2", "Porto"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_event_create_and_get() {
        let repo = repo();
        let created = repo
            .create_event(&Event::draft("ev1", "Team offsite"))
            .await
            .unwrap();
        assert_eq!(created.key, Some(ItemKey::event("ev1")));

        let fetched = repo.get_event("ev1").await.unwrap().unwrap();
        assert_eq!(fetched.id, "ev1");
        assert_eq!(fetched.name, "Team offsite");
        assert!(fetched.questions.is_empty());
    }

    #[tokio::test]
    async fn test_event_get_nonexistent() {
        let repo = repo();
        assert!(repo.get_event("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_event_create_overwrites() {
        let repo = repo();
        repo.create_event(&Event::draft("ev1", "First")).await.unwrap();
        repo.create_event(&Event::draft("ev1", "Second")).await.unwrap();

        let events = repo.list_events().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Second");
    }

    #[tokio::test]
    async fn test_event_update_replaces_name() {
        let repo = repo();
        seed(&repo).await;

        repo.update_event(&Event::new("ev1", "Renamed")).await.unwrap();

        let fetched = repo.get_event("ev1").await.unwrap().unwrap();
        assert_eq!(fetched.name, "Renamed");
        assert_eq!(fetched.questions.len(), 1);
    }

    #[tokio::test]
    async fn test_get_event_fans_out_two_levels() {
        let repo = repo();
        seed(&repo).await;

        let event = repo.get_event("ev1").await.unwrap().unwrap();
        assert_eq!(event.questions.len(), 1);
        assert_eq!(event.questions[0].event_id, "ev1");

        let option_ids: Vec<_> = event.questions[0].options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(option_ids, vec!["o1", "o2"]);
    }

    #[tokio::test]
    async fn test_question_get_returns_event_id_and_options() {
        let repo = repo();
        seed(&repo).await;

        let question = repo.get_question("q1").await.unwrap().unwrap();
        assert_eq!(question.event_id, "ev1");
        assert_eq!(question.text, "Where?");
        assert_eq!(question.options.len(), 2);
        assert!(repo.get_question("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_question_with_event() {
        let repo = repo();
        seed(&repo).await;

        let (question, event) = repo.get_question_with_event("q1").await.unwrap().unwrap();
        assert_eq!(question.id, "q1");
        assert_eq!(event.unwrap().name, "Team offsite");

        assert!(repo.get_question_with_event("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_question_with_missing_event() {
        let repo = repo();
        repo.add_question("gone", &Question::draft("q1", "Orphan?"))
            .await
            .unwrap();

        let (question, event) = repo.get_question_with_event("q1").await.unwrap().unwrap();
        assert_eq!(question.event_id, "gone");
        assert!(event.is_none());
    }

    #[tokio::test]
    async fn test_question_get_duplicate_is_reported() {
        let repo = repo();
        seed(&repo).await;
        // Same pk under a second event: unreachable through the public API.
        repo.store()
            .put_item(question_to_item(&Question::new("q1", "ev2", "Copy")))
            .await
            .unwrap();

        let result = repo.get_question("q1").await;
        assert!(matches!(
            result,
            Err(RepositoryError::DuplicateRecord { count: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_question_update_without_key_preserves_parent_and_options() {
        let repo = repo();
        seed(&repo).await;

        let updated = repo
            .update_question(&Question::draft("q1", "Where exactly?"))
            .await
            .unwrap();
        assert_eq!(updated.event_id, "ev1");
        assert_eq!(updated.options.len(), 2);

        let fetched = repo.get_question("q1").await.unwrap().unwrap();
        assert_eq!(fetched.text, "Where exactly?");
        assert_eq!(fetched.event_id, "ev1");
        assert_eq!(fetched.options.len(), 2);
    }

    #[tokio::test]
    async fn test_question_update_without_key_nonexistent() {
        let repo = repo();
        let result = repo.update_question(&Question::draft("nope", "Text")).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_question_delete_cascades_to_options() {
        let repo = repo();
        seed(&repo).await;

        repo.delete_question("q1").await.unwrap();

        assert!(repo.get_question("q1").await.unwrap().is_none());
        assert!(repo.get_option("o1").await.unwrap().is_none());
        assert!(repo.get_option("o2").await.unwrap().is_none());
        let event = repo.get_event("ev1").await.unwrap().unwrap();
        assert!(event.questions.is_empty());
        assert_eq!(repo.store().len().await, 1);
    }

    #[tokio::test]
    async fn test_question_delete_nonexistent() {
        let repo = repo();
        let result = repo.delete_question("nope").await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_option_add_starts_at_zero_votes() {
        let repo = repo();
        seed(&repo).await;

        let added = repo
            .add_option("q1", &PollOption::draft("o3", "Faro").with_votes(9))
            .await
            .unwrap();
        assert_eq!(added.votes, 0);
        assert_eq!(added.question_id, "q1");
        assert_eq!(repo.get_option("o3").await.unwrap().unwrap().votes, 0);
    }

    #[tokio::test]
    async fn test_option_vote_increments() {
        let repo = repo();
        seed(&repo).await;

        let voted = repo.vote_option("o1").await.unwrap();
        assert_eq!(voted.votes, 1);

        for _ in 0..4 {
            repo.vote_option("o1").await.unwrap();
        }
        assert_eq!(repo.get_option("o1").await.unwrap().unwrap().votes, 5);
        assert_eq!(repo.get_option("o2").await.unwrap().unwrap().votes, 0);
    }

    #[tokio::test]
    async fn test_option_concurrent_votes_are_not_lost() {
        let repo = Arc::new(repo());
        seed(repo.as_ref()).await;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.vote_option("o2").await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(repo.get_option("o2").await.unwrap().unwrap().votes, 10);
    }

    #[tokio::test]
    async fn test_option_vote_nonexistent() {
        let repo = repo();
        let result = repo.vote_option("nope").await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_option_update_keeps_votes() {
        let repo = repo();
        seed(&repo).await;
        repo.vote_option("o1").await.unwrap();
        repo.vote_option("o1").await.unwrap();

        let updated = repo
            .update_option(&PollOption::draft("o1", "Lisbon, Alfama"))
            .await
            .unwrap();
        assert_eq!(updated.text, "Lisbon, Alfama");
        assert_eq!(updated.votes, 2);
        assert_eq!(updated.question_id, "q1");

        // A keyed payload with a stale count still never touches votes.
        let keyed = PollOption::new("o1", "q1", "Lisbon").with_votes(0);
        let updated = repo.update_option(&keyed).await.unwrap();
        assert_eq!(updated.votes, 2);
    }

    #[tokio::test]
    async fn test_option_update_nonexistent() {
        let repo = repo();

        let result = repo.update_option(&PollOption::draft("nope", "Text")).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));

        let result = repo.update_option(&PollOption::new("nope", "q1", "Text")).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
        assert!(repo.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_option_delete() {
        let repo = repo();
        seed(&repo).await;

        repo.delete_option("o1").await.unwrap();

        assert!(repo.get_option("o1").await.unwrap().is_none());
        let options = repo.list_options_by_question("q1").await.unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].id, "o2");
    }

    #[tokio::test]
    async fn test_option_delete_nonexistent() {
        let repo = repo();
        let result = repo.delete_option("nope").await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_event_delete_cascades() {
        let repo = repo();
        seed(&repo).await;
        repo.create_event(&Event::draft("ev2", "Other")).await.unwrap();

        repo.delete_event("ev1").await.unwrap();

        assert!(repo.get_event("ev1").await.unwrap().is_none());
        assert!(repo.get_question("q1").await.unwrap().is_none());
        assert!(repo.get_option("o1").await.unwrap().is_none());
        assert!(repo.get_option("o2").await.unwrap().is_none());
        assert_eq!(repo.store().len().await, 1);
        assert!(repo.pending_deletions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_event_delete_nonexistent() {
        let repo = repo();
        let result = repo.delete_event("nope").await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_events_degrades_when_fan_out_fails() {
        let store = FlakyStore::default();
        let repo = SingleTableRepository::new(store.clone());
        seed(&repo).await;

        store.fail_queries_on(Some(Index::EventId));
        let events = repo.list_events().await.unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].questions.is_empty());

        // A single-entity read does not swallow the same failure.
        let result = repo.get_event("ev1").await;
        assert!(matches!(
            result.unwrap_err().root(),
            RepositoryError::StoreUnavailable(_)
        ));
    }

    #[tokio::test]
    async fn test_list_questions_degrades_when_options_fail() {
        let store = FlakyStore::default();
        let repo = SingleTableRepository::new(store.clone());
        seed(&repo).await;

        store.fail_queries_on(Some(Index::QuestionId));
        let questions = repo.list_questions_by_event("ev1").await.unwrap();
        assert_eq!(questions.len(), 1);
        assert!(questions[0].options.is_empty());
    }

    #[tokio::test]
    async fn test_store_failures_carry_context() {
        let store = FlakyStore::default();
        let repo = SingleTableRepository::new(store.clone());
        seed(&repo).await;

        store.fail_queries_on(Some(Index::EntityType));
        let error = repo.get_option("o1").await.unwrap_err();
        assert_eq!(
            error.to_string(),
            "Failed to find Option: Store unavailable: timeout"
        );
    }

    #[tokio::test]
    async fn test_interrupted_event_cascade_is_resumable() {
        let store = FlakyStore::default();
        let repo = SingleTableRepository::new(store.clone());
        seed(&repo).await;

        store.fail_deletes_of(Some("OPTION#o2"));
        assert!(repo.delete_event("ev1").await.is_err());

        let pending = repo.pending_deletions().await.unwrap();
        assert_eq!(
            pending,
            vec![PendingDeletion {
                entity_type: EntityType::Event,
                id: "ev1".to_string(),
            }]
        );

        store.fail_deletes_of(None);
        assert_eq!(repo.resume_deletions().await.unwrap(), 1);
        assert!(repo.pending_deletions().await.unwrap().is_empty());
        assert!(store.inner.is_empty().await);
    }

    #[tokio::test]
    async fn test_interrupted_question_cascade_is_resumable() {
        let store = FlakyStore::default();
        let repo = SingleTableRepository::new(store.clone());
        seed(&repo).await;

        store.fail_deletes_of(Some("OPTION#o1"));
        assert!(repo.delete_question("q1").await.is_err());

        let pending = repo.pending_deletions().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].entity_type, EntityType::Question);

        store.fail_deletes_of(None);
        assert_eq!(repo.resume_deletions().await.unwrap(), 1);
        assert!(repo.get_question("q1").await.unwrap().is_none());
        assert!(repo.get_event("ev1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_keeps_marker_of_interrupted_question_delete() {
        let store = FlakyStore::default();
        let repo = SingleTableRepository::new(store.clone());
        seed(&repo).await;

        store.fail_deletes_of(Some("OPTION#o2"));
        assert!(repo.delete_question("q1").await.is_err());

        repo.update_question(&Question::draft("q1", "Where now?"))
            .await
            .unwrap();

        let pending = repo.pending_deletions().await.unwrap();
        assert_eq!(
            pending,
            vec![PendingDeletion {
                entity_type: EntityType::Question,
                id: "q1".to_string(),
            }]
        );

        store.fail_deletes_of(None);
        assert_eq!(repo.resume_deletions().await.unwrap(), 1);
        assert!(repo.get_question("q1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_keeps_marker_of_interrupted_event_delete() {
        let store = FlakyStore::default();
        let repo = SingleTableRepository::new(store.clone());
        seed(&repo).await;

        store.fail_deletes_of(Some("OPTION#o2"));
        assert!(repo.delete_event("ev1").await.is_err());

        repo.update_event(&Event::new("ev1", "Renamed")).await.unwrap();

        let pending = repo.pending_deletions().await.unwrap();
        assert_eq!(
            pending,
            vec![PendingDeletion {
                entity_type: EntityType::Event,
                id: "ev1".to_string(),
            }]
        );

        store.fail_deletes_of(None);
        assert_eq!(repo.resume_deletions().await.unwrap(), 1);
        assert!(store.inner.is_empty().await);
    }

    #[tokio::test]
    async fn test_update_of_unmarked_event_writes_no_marker() {
        let repo = repo();
        seed(&repo).await;

        repo.update_event(&Event::new("ev1", "Renamed")).await.unwrap();

        let item = repo.store().get_item(&ItemKey::event("ev1")).await.unwrap().unwrap();
        assert!(!item.contains_key(attr::DELETING));
        assert!(repo.pending_deletions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_question_with_event_surfaces_event_lookup_failure() {
        let store = FlakyStore::default();
        let repo = SingleTableRepository::new(store.clone());
        seed(&repo).await;

        // The question read succeeds; the event's fan-out hits the failing index.
        store.fail_queries_on(Some(Index::EventId));
        let error = repo.get_question_with_event("q1").await.unwrap_err();
        assert!(matches!(error.root(), RepositoryError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_resume_with_nothing_pending() {
        let repo = repo();
        seed(&repo).await;
        assert_eq!(repo.resume_deletions().await.unwrap(), 0);
    }
}
