//! Integration tests for the message pipeline.
//!
//! These tests drive the application handlers end to end:
//! 1. A message is routed to brainstorm, decide or export
//! 2. The (mock) language model reply is parsed
//! 3. Proposed ideas and decisions are reconciled against the canonical set
//! 4. Admitted items are committed under the project lock
//!
//! Uses in-memory implementations so no network or disk is needed,
//! except for the file store round trip at the end.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use brainstorm_core::adapters::ai::MockAIProvider;
use brainstorm_core::adapters::quality::{LexicalQualityChecker, MockQualityChecker};
use brainstorm_core::adapters::storage::{FileItemStore, InMemoryItemStore};
use brainstorm_core::application::{
    HandleMessageCommand, HandleMessageHandler, ProjectLocks, ReconcileCandidatesCommand,
    ReconcileCandidatesHandler, TransitionItemStateCommand, TransitionItemStateHandler,
};
use brainstorm_core::domain::conversation::Mode;
use brainstorm_core::domain::export::{ExportFormat, NOTHING_TO_EXPORT_MESSAGE};
use brainstorm_core::domain::foundation::{ErrorCode, ProjectId};
use brainstorm_core::domain::item::{CandidateIdea, Item, ItemState};
use brainstorm_core::domain::reconciliation::{
    Conflict, ReconciliationEngine, ReconciliationMode,
};
use brainstorm_core::domain::similarity::Recommendation;
use brainstorm_core::ports::{CommitMode, ItemSnapshot, ItemStore, ItemStoreError};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Ten qualifying tokens; the near duplicate adds an eleventh (similarity 10/11).
const CANONICAL: &str = "use postgres database for storing every customer order record safely";
const NEAR_DUPLICATE: &str =
    "use postgres database for storing every customer order record safely today";

fn reconcile_handler(store: Arc<dyn ItemStore>, locks: Arc<ProjectLocks>) -> ReconcileCandidatesHandler {
    ReconcileCandidatesHandler::new(store, locks, ReconciliationEngine::default())
        .with_quality_checker(Arc::new(LexicalQualityChecker::default()))
}

fn message_handler(ai: &MockAIProvider, store: Arc<dyn ItemStore>) -> HandleMessageHandler {
    let reconcile = reconcile_handler(store.clone(), Arc::new(ProjectLocks::new()));
    HandleMessageHandler::new(Arc::new(ai.clone()), store, reconcile)
}

fn message(project_id: ProjectId, text: &str) -> HandleMessageCommand {
    HandleMessageCommand {
        project_id,
        project_title: "Order tracker".to_string(),
        message: text.to_string(),
        history: Vec::new(),
    }
}

/// Store that lets another writer sneak in a commit right after the first read.
struct RacingStore {
    inner: InMemoryItemStore,
    raced: AtomicBool,
}

impl RacingStore {
    fn new() -> Self {
        Self {
            inner: InMemoryItemStore::new(),
            raced: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ItemStore for RacingStore {
    async fn load_snapshot(&self, project_id: ProjectId) -> Result<ItemSnapshot, ItemStoreError> {
        let snapshot = self.inner.load_snapshot(project_id).await?;
        if !self.raced.swap(true, Ordering::SeqCst) {
            let intruder = Item::new("Written by another process", ItemState::Exploring).unwrap();
            self.inner
                .commit_items(project_id, vec![intruder], CommitMode::Append, None)
                .await?;
        }
        Ok(snapshot)
    }

    async fn commit_items(
        &self,
        project_id: ProjectId,
        items: Vec<Item>,
        mode: CommitMode,
        expected_version: Option<u64>,
    ) -> Result<u64, ItemStoreError> {
        self.inner
            .commit_items(project_id, items, mode, expected_version)
            .await
    }
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn export_of_an_empty_project_never_calls_the_model() {
    let ai = MockAIProvider::new();
    let store = Arc::new(InMemoryItemStore::new());
    let handler = message_handler(&ai, store);

    let result = handler
        .handle(message(ProjectId::new(), "/prd"))
        .await
        .unwrap();

    assert_eq!(result.mode, Mode::Export);
    assert_eq!(result.reply, NOTHING_TO_EXPORT_MESSAGE);
    assert_eq!(result.export_format, Some(ExportFormat::Prd));
    assert_eq!(ai.call_count(), 0);
}

#[tokio::test]
async fn export_sees_items_captured_earlier_in_the_session() {
    let ai = MockAIProvider::new().with_responses([
        "Nice. <decision>Use Stripe for payments</decision>",
        "- [ ] Integrate Stripe",
    ]);
    let store = Arc::new(InMemoryItemStore::new());
    let handler = message_handler(&ai, store);
    let project = ProjectId::new();

    handler
        .handle(message(project, "let's go with Stripe"))
        .await
        .unwrap();
    let export = handler
        .handle(message(project, "generate a task list"))
        .await
        .unwrap();

    assert_eq!(export.export_format, Some(ExportFormat::Tasks));
    assert_eq!(export.reply, "- [ ] Integrate Stripe");
    let prompt = ai.last_call().unwrap().system_prompt.unwrap();
    assert!(prompt.contains("1. Use Stripe for payments"));
}

// =============================================================================
// Reconciliation modes
// =============================================================================

#[tokio::test]
async fn verified_mode_drops_what_quick_mode_admits() {
    let project = ProjectId::new();
    let decided = Item::new(CANONICAL, ItemState::Decided).unwrap();
    let candidate = CandidateIdea::new(NEAR_DUPLICATE).unwrap();

    let verified_store = Arc::new(InMemoryItemStore::new());
    verified_store.seed(project, vec![decided.clone()]).await;
    let verified = reconcile_handler(verified_store.clone(), Arc::new(ProjectLocks::new()))
        .handle(ReconcileCandidatesCommand {
            project_id: project,
            candidates: vec![candidate.clone()],
            mode: ReconciliationMode::Verified,
        })
        .await
        .unwrap();

    let quick_store = Arc::new(InMemoryItemStore::new());
    quick_store.seed(project, vec![decided]).await;
    let quick = reconcile_handler(quick_store.clone(), Arc::new(ProjectLocks::new()))
        .handle(ReconcileCandidatesCommand {
            project_id: project,
            candidates: vec![candidate],
            mode: ReconciliationMode::Quick,
        })
        .await
        .unwrap();

    assert!(verified.reconciliation.admitted.is_empty());
    assert_eq!(verified_store.get_items(project).await.unwrap().len(), 1);
    assert_eq!(quick.reconciliation.admitted.len(), 1);
    assert_eq!(quick_store.get_items(project).await.unwrap().len(), 2);
    assert_eq!(
        quick.reconciliation.matches[0].recommendation,
        Recommendation::Skip
    );
}

#[tokio::test]
async fn reconcile_is_idempotent_over_the_same_snapshot() {
    let engine = ReconciliationEngine::default();
    let canonical = vec![
        Item::new(CANONICAL, ItemState::Decided).unwrap(),
        Item::new("ship a mobile app for couriers", ItemState::Exploring).unwrap(),
    ];
    let candidates = vec![
        CandidateIdea::new(NEAR_DUPLICATE).unwrap(),
        CandidateIdea::new("ship a mobile app for couriers soon").unwrap(),
        CandidateIdea::new("weekly revenue dashboard").unwrap(),
    ];

    let first = engine.reconcile(&candidates, &canonical, ReconciliationMode::Verified);
    let second = engine.reconcile(&candidates, &canonical, ReconciliationMode::Verified);

    assert_eq!(first.admitted, second.admitted);
    assert_eq!(first.matches, second.matches);
}

#[tokio::test]
async fn quality_findings_never_block_admission() {
    let project = ProjectId::new();
    let store = Arc::new(InMemoryItemStore::new());
    let rejected = Item::new("native desktop client", ItemState::Rejected).unwrap();
    store.seed(project, vec![rejected.clone()]).await;
    let checker = MockQualityChecker::new()
        .with_assumption("probably", "hedged")
        .with_conflict(Conflict {
            item_id: rejected.id,
            item_state: ItemState::Rejected,
            description: "revives a rejected idea".to_string(),
        });
    let handler = ReconcileCandidatesHandler::new(
        store.clone(),
        Arc::new(ProjectLocks::new()),
        ReconciliationEngine::default(),
    )
    .with_quality_checker(Arc::new(checker));

    let result = handler
        .handle(ReconcileCandidatesCommand {
            project_id: project,
            candidates: vec![CandidateIdea::new("probably a desktop app").unwrap()],
            mode: ReconciliationMode::Verified,
        })
        .await
        .unwrap();

    let report = result.reconciliation.quality.unwrap();
    assert_eq!(report.assumption_count(), 1);
    assert_eq!(report.conflict_count(), 1);
    assert_eq!(store.get_items(project).await.unwrap().len(), 2);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn concurrent_identical_decisions_commit_once() {
    let project = ProjectId::new();
    let store = Arc::new(InMemoryItemStore::new());
    let handler = Arc::new(reconcile_handler(store.clone(), Arc::new(ProjectLocks::new())));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                let candidate = CandidateIdea::new(CANONICAL)
                    .unwrap()
                    .with_state(ItemState::Decided);
                handler
                    .handle(ReconcileCandidatesCommand {
                        project_id: project,
                        candidates: vec![candidate],
                        mode: ReconciliationMode::Verified,
                    })
                    .await
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let items = store.get_items(project).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].state, ItemState::Decided);
}

#[tokio::test]
async fn write_during_the_model_call_is_seen_by_reconciliation() {
    let ai = MockAIProvider::new().with_response("<idea>Loyalty points</idea>");
    let store = Arc::new(RacingStore::new());
    let reconcile = ReconcileCandidatesHandler::new(
        store.clone(),
        Arc::new(ProjectLocks::new()),
        ReconciliationEngine::default(),
    );
    let handler = HandleMessageHandler::new(Arc::new(ai), store.clone(), reconcile);
    let project = ProjectId::new();

    // The foreign write lands right after the context read, before the
    // model replies; reconciliation re-reads under the lock and commits.
    let result = handler
        .handle(message(project, "any retention ideas?"))
        .await
        .unwrap();

    assert_eq!(result.committed.len(), 1);
    let texts: Vec<String> = store
        .get_items(project)
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.text)
        .collect();
    assert_eq!(texts, vec!["Written by another process", "Loyalty points"]);
}

#[tokio::test]
async fn stale_reconciliation_is_reported_and_commits_nothing() {
    let store = Arc::new(RacingStore::new());
    let handler = ReconcileCandidatesHandler::new(
        store.clone(),
        Arc::new(ProjectLocks::new()),
        ReconciliationEngine::default(),
    );
    let project = ProjectId::new();

    let err = handler
        .handle(ReconcileCandidatesCommand {
            project_id: project,
            candidates: vec![CandidateIdea::new("Loyalty points").unwrap()],
            mode: ReconciliationMode::Quick,
        })
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::StaleReconciliation);
    let items = store.get_items(project).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].text, "Written by another process");
}

// =============================================================================
// Lifecycle and persistence
// =============================================================================

#[tokio::test]
async fn decided_item_can_be_reopened_and_redecided() {
    let ai = MockAIProvider::new().with_response("Done. <decision>Use Stripe</decision>");
    let store = Arc::new(InMemoryItemStore::new());
    let locks = Arc::new(ProjectLocks::new());
    let handler = message_handler(&ai, store.clone());
    let transitions = TransitionItemStateHandler::new(store.clone(), locks);
    let project = ProjectId::new();

    let result = handler
        .handle(message(project, "/decide stripe"))
        .await
        .unwrap();
    let item_id = result.committed[0].id;

    let reopened = transitions
        .handle(TransitionItemStateCommand {
            project_id: project,
            item_id,
            target: ItemState::Exploring,
        })
        .await
        .unwrap();
    assert_eq!(reopened.previous_state, ItemState::Decided);

    let parked = transitions
        .handle(TransitionItemStateCommand {
            project_id: project,
            item_id,
            target: ItemState::Parked,
        })
        .await
        .unwrap();
    assert_eq!(parked.item.state, ItemState::Parked);
    assert_eq!(store.get_items(project).await.unwrap().len(), 1);
}

#[tokio::test]
async fn replayed_batch_keeps_a_later_decision() {
    let store = Arc::new(InMemoryItemStore::new());
    let locks = Arc::new(ProjectLocks::new());
    let reconcile = reconcile_handler(store.clone(), locks.clone());
    let transitions = TransitionItemStateHandler::new(store.clone(), locks);
    let project = ProjectId::new();
    let batch = vec![CandidateIdea::new("offline sync for mobile users").unwrap()];

    let first = reconcile
        .handle(ReconcileCandidatesCommand {
            project_id: project,
            candidates: batch.clone(),
            mode: ReconciliationMode::Quick,
        })
        .await
        .unwrap();
    transitions
        .handle(TransitionItemStateCommand {
            project_id: project,
            item_id: first.reconciliation.admitted[0].id,
            target: ItemState::Decided,
        })
        .await
        .unwrap();

    let replay = reconcile
        .handle(ReconcileCandidatesCommand {
            project_id: project,
            candidates: batch.clone(),
            mode: ReconciliationMode::Quick,
        })
        .await
        .unwrap();

    assert!(replay.reconciliation.admitted.is_empty());
    assert!(replay.reconciliation.was_already_admitted(batch[0].id));
    let items = store.get_items(project).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].state, ItemState::Decided);
}

#[tokio::test]
async fn near_duplicate_cannot_be_promoted_next_to_a_decision() {
    let store = Arc::new(InMemoryItemStore::new());
    let project = ProjectId::new();
    let decided = Item::new(CANONICAL, ItemState::Decided).unwrap();
    let twin = Item::new(NEAR_DUPLICATE, ItemState::Exploring).unwrap();
    store.seed(project, vec![decided.clone(), twin.clone()]).await;
    let transitions = TransitionItemStateHandler::new(store.clone(), Arc::new(ProjectLocks::new()));

    let err = transitions
        .handle(TransitionItemStateCommand {
            project_id: project,
            item_id: twin.id,
            target: ItemState::Decided,
        })
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::ValidationFailed);
    let states: Vec<ItemState> = store
        .get_items(project)
        .await
        .unwrap()
        .iter()
        .map(|item| item.state)
        .collect();
    assert_eq!(states, vec![ItemState::Decided, ItemState::Exploring]);
}

#[tokio::test]
async fn file_store_keeps_items_across_handler_instances() {
    let temp_dir = TempDir::new().unwrap();
    let project = ProjectId::new();

    {
        let ai = MockAIProvider::new().with_response("<idea>Frost date alerts</idea>");
        let store: Arc<dyn ItemStore> = Arc::new(FileItemStore::new(temp_dir.path()));
        message_handler(&ai, store)
            .handle(message(project, "what else?"))
            .await
            .unwrap();
    }

    let ai = MockAIProvider::new().with_response("# Summary\nAlerts.");
    let store: Arc<dyn ItemStore> = Arc::new(FileItemStore::new(temp_dir.path()));
    let result = message_handler(&ai, store.clone())
        .handle(message(project, "/summary"))
        .await
        .unwrap();

    assert_eq!(result.reply, "# Summary\nAlerts.");
    assert_eq!(ai.call_count(), 1);
    assert_eq!(store.get_items(project).await.unwrap()[0].text, "Frost date alerts");
}
