//! Reading session state machine
//!
//! Owns the record list, the per-record session side-table, the search
//! index and the persisted progress table. At most one record is open for
//! reading at a time.
//!
//! Document loads happen without holding the state lock. Activations take a
//! ticket when issued and only the most recently issued one is committed
//! when its load resolves; page turns are dropped if their session was
//! closed or reopened while the load was pending.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use super::events::{EventBus, ReaderEvent};
use super::progress::{ProgressMap, ProgressStore, SavedProgress};
use super::types::{
    ReadingSession, ReadingStatus, Record, RecordId, SearchJump, ToggleOutcome,
};
use super::view::RecordView;
use crate::config::{check_page_size, ReaderConfig};
use crate::document::{ContentCache, Document, FileStats};
use crate::error::{ReaderError, Result};
use crate::pagination::{page_content, page_of_offset, total_pages};
use crate::search::{SearchHit, SearchIndex};

/// The reader engine
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct ReadingSessionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    cache: ContentCache,
    progress_store: Arc<dyn ProgressStore>,
    events: EventBus,
    config: RwLock<ReaderConfig>,
    state: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    records: Vec<Record>,
    sessions: HashMap<RecordId, ReadingSession>,
    progress: ProgressMap,
    search: SearchIndex,
    hidden: bool,
    next_ticket: u64,
    /// Most recently issued activation that has not resolved yet
    pending_activation: Option<(RecordId, u64)>,
}

impl StoreState {
    fn record(&self, id: &RecordId) -> Result<&Record> {
        self.records
            .iter()
            .find(|r| &r.id == id)
            .ok_or_else(|| ReaderError::RecordNotFound(id.to_string()))
    }

    fn active_session(&self, id: &RecordId) -> Option<&ReadingSession> {
        self.sessions.get(id).filter(|s| s.is_active)
    }

    /// Remember the position in `document`; empty documents are not tracked
    fn remember_progress(&mut self, document: &str, current_page: usize, total_pages: usize) -> bool {
        if total_pages == 0 {
            return false;
        }
        self.progress.insert(
            document.to_string(),
            SavedProgress {
                current_page,
                total_pages,
            },
        );
        true
    }
}

/// A freshly loaded document and its page geometry
struct Loaded {
    document: Arc<Document>,
    page_size: usize,
    total_pages: usize,
}

impl Loaded {
    fn page(&self, page: usize) -> String {
        page_content(&self.document.text, page, self.page_size).to_string()
    }
}

impl ReadingSessionStore {
    /// Create the engine and load persisted progress once
    pub async fn new(
        cache: ContentCache,
        progress_store: Arc<dyn ProgressStore>,
        config: ReaderConfig,
    ) -> Result<Self> {
        if let Some(problem) = check_page_size(config.page_size) {
            return Err(ReaderError::InvalidConfig(problem));
        }

        let progress = progress_store.load().await?;
        tracing::info!(documents = progress.len(), "Loaded reading progress");

        Ok(Self {
            inner: Arc::new(StoreInner {
                cache,
                progress_store,
                events: EventBus::new(),
                config: RwLock::new(config),
                state: RwLock::new(StoreState {
                    progress,
                    ..StoreState::default()
                }),
            }),
        })
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<ReaderEvent> {
        self.inner.events.subscribe()
    }

    /// The document cache used by this engine
    pub fn cache(&self) -> &ContentCache {
        &self.inner.cache
    }

    pub async fn config(&self) -> ReaderConfig {
        self.inner.config.read().await.clone()
    }

    /// Replace the reader settings
    ///
    /// An open session is re-paginated with the new page size.
    pub async fn reconfigure(&self, config: ReaderConfig) -> Result<()> {
        if let Some(problem) = check_page_size(config.page_size) {
            return Err(ReaderError::InvalidConfig(problem));
        }

        tracing::info!(
            txt_file_path = ?config.txt_file_path,
            page_size = config.page_size,
            "Reader configuration updated"
        );
        *self.inner.config.write().await = config;

        if let Some(id) = self.current_reading_record().await {
            self.turn_page(&id, |session, total| {
                Some(session.current_page.min(total).max(1))
            })
            .await?;
        }

        Ok(())
    }

    // ========================================================================
    // Records
    // ========================================================================

    /// Replace the record list
    ///
    /// Sessions of records that are still present survive, so an open
    /// record keeps reading across a refresh.
    pub async fn set_records(&self, records: Vec<Record>) {
        {
            let mut state = self.inner.state.write().await;
            let ids: HashSet<&RecordId> = records.iter().map(|r| &r.id).collect();

            state.sessions.retain(|id, _| ids.contains(id));
            if matches!(&state.pending_activation, Some((id, _)) if !ids.contains(id)) {
                state.pending_activation = None;
            }
            state.records = records;

            tracing::debug!(records = state.records.len(), "Record list replaced");
        }
        self.inner.events.emit(ReaderEvent::RecordsReplaced);
    }

    pub async fn records(&self) -> Vec<Record> {
        self.inner.state.read().await.records.clone()
    }

    /// Session attached to a record, if it was ever opened
    pub async fn session(&self, id: &RecordId) -> Option<ReadingSession> {
        self.inner.state.read().await.sessions.get(id).cloned()
    }

    /// Record currently open for reading
    pub async fn current_reading_record(&self) -> Option<RecordId> {
        let state = self.inner.state.read().await;
        state
            .sessions
            .iter()
            .find(|(_, s)| s.is_active)
            .map(|(id, _)| id.clone())
    }

    pub async fn reading_status(&self, id: &RecordId) -> Result<ReadingStatus> {
        let state = self.inner.state.read().await;
        state.record(id)?;

        let session = state.sessions.get(id).cloned().unwrap_or_default();
        Ok(ReadingStatus {
            is_reading: session.is_active,
            current_page: session.current_page,
            total_pages: session.total_pages,
        })
    }

    // ========================================================================
    // Presentation
    // ========================================================================

    /// Switch hidden mode; returns the new value
    pub async fn toggle_hidden_mode(&self) -> bool {
        let hidden = {
            let mut state = self.inner.state.write().await;
            state.hidden = !state.hidden;
            state.hidden
        };
        self.inner.events.emit(ReaderEvent::HiddenModeChanged(hidden));
        hidden
    }

    pub async fn is_hidden(&self) -> bool {
        self.inner.state.read().await.hidden
    }

    pub async fn view(&self, id: &RecordId) -> Result<RecordView> {
        let state = self.inner.state.read().await;
        let record = state.record(id)?;
        Ok(RecordView::project(record, state.sessions.get(id), state.hidden))
    }

    /// Views of every record, in list order
    pub async fn views(&self) -> Vec<RecordView> {
        let state = self.inner.state.read().await;
        state
            .records
            .iter()
            .map(|r| RecordView::project(r, state.sessions.get(&r.id), state.hidden))
            .collect()
    }

    // ========================================================================
    // Session Lifecycle
    // ========================================================================

    /// Open a record for reading, or advance a page if it is already open
    ///
    /// Opening restores the saved position for the record's document and
    /// closes whichever record was open before.
    pub async fn toggle_display(&self, id: &RecordId) -> Result<ToggleOutcome> {
        let config = self.config().await;

        let (ticket, document_key) = {
            let mut state = self.inner.state.write().await;

            if state.hidden {
                state.hidden = false;
                self.inner.events.emit(ReaderEvent::HiddenModeChanged(false));
            }

            let record = state.record(id)?;
            if state.active_session(id).is_some() {
                drop(state);
                let advanced = self.next_page(id).await?;
                return Ok(ToggleOutcome::Advanced(advanced));
            }

            let document_key = record
                .document
                .clone()
                .or_else(|| config.txt_file_path.clone())
                .ok_or_else(|| ReaderError::NoDocument(id.to_string()))?;

            state.next_ticket += 1;
            let ticket = state.next_ticket;
            state.pending_activation = Some((id.clone(), ticket));
            (ticket, document_key)
        };

        let loaded = match self.load(&document_key).await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(record = %id, document = %document_key, error = %e, "Failed to open text");
                let mut state = self.inner.state.write().await;
                if state.pending_activation == Some((id.clone(), ticket)) {
                    state.pending_activation = None;
                }
                return Err(e);
            }
        };

        let mut state = self.inner.state.write().await;
        if state.pending_activation != Some((id.clone(), ticket)) {
            tracing::debug!(record = %id, ticket, "Discarding superseded activation");
            return Ok(ToggleOutcome::Superseded);
        }
        state.pending_activation = None;

        let total = loaded.total_pages;
        let page = state
            .progress
            .get(&document_key)
            .map(|saved| saved.current_page.min(total).max(1))
            .unwrap_or(1);

        let mut closed = Vec::new();
        for (other, session) in state.sessions.iter_mut() {
            if session.is_active && other != id {
                session.close();
                closed.push(other.clone());
            }
        }

        state.sessions.insert(
            id.clone(),
            ReadingSession {
                document: Some(document_key.clone()),
                is_active: true,
                current_page: page,
                total_pages: total,
                visible_text: loaded.page(page),
                generation: ticket,
            },
        );

        let snapshot = state
            .remember_progress(&document_key, page, total)
            .then(|| state.progress.clone());
        drop(state);

        if let Some(progress) = snapshot {
            self.persist(&progress).await;
        }

        tracing::info!(record = %id, document = %document_key, page, total_pages = total, "Opened reading session");

        for other in closed {
            self.inner.events.emit(ReaderEvent::RecordChanged(other));
        }
        self.inner.events.emit(ReaderEvent::RecordChanged(id.clone()));

        Ok(ToggleOutcome::Opened {
            page,
            total_pages: total,
        })
    }

    /// Close a record; its saved position is kept, its search is dropped
    pub async fn stop_reading(&self, id: &RecordId) -> Result<bool> {
        let was_open = {
            let mut state = self.inner.state.write().await;
            state.record(id)?;

            if matches!(&state.pending_activation, Some((pending, _)) if pending == id) {
                state.pending_activation = None;
            }

            let closed = match state.sessions.get_mut(id) {
                Some(session) if session.is_active => {
                    let document = session.document.clone();
                    session.close();
                    Some(document)
                }
                _ => None,
            };

            // The last query is forgotten with the session
            if let Some(Some(document)) = &closed {
                state.search.clear(document);
            }
            closed.is_some()
        };

        if was_open {
            tracing::info!(record = %id, "Stopped reading");
            self.inner.events.emit(ReaderEvent::RecordChanged(id.clone()));
        }
        Ok(was_open)
    }

    // ========================================================================
    // Page Navigation
    // ========================================================================

    pub async fn next_page(&self, id: &RecordId) -> Result<bool> {
        self.turn_page(id, |session, total| {
            (session.current_page < total).then(|| session.current_page + 1)
        })
        .await
    }

    pub async fn previous_page(&self, id: &RecordId) -> Result<bool> {
        self.turn_page(id, |session, total| {
            (session.current_page > 1 && session.current_page - 1 <= total)
                .then(|| session.current_page - 1)
        })
        .await
    }

    /// Jump to `page`; out-of-range pages are ignored
    pub async fn go_to_page(&self, id: &RecordId, page: usize) -> Result<bool> {
        self.turn_page(id, move |_, total| (1..=total).contains(&page).then_some(page))
            .await
    }

    pub async fn first_page(&self, id: &RecordId) -> Result<bool> {
        self.go_to_page(id, 1).await
    }

    pub async fn last_page(&self, id: &RecordId) -> Result<bool> {
        self.turn_page(id, |_, total| (total >= 1).then_some(total))
            .await
    }

    /// Move an open session to the page chosen by `target`
    ///
    /// `target` sees the session and the freshly computed page count and
    /// returns the new page, or `None` to leave the session as it is.
    async fn turn_page<F>(&self, id: &RecordId, target: F) -> Result<bool>
    where
        F: FnOnce(&ReadingSession, usize) -> Option<usize>,
    {
        let (document_key, generation) = {
            let state = self.inner.state.read().await;
            state.record(id)?;

            match state.active_session(id) {
                Some(ReadingSession {
                    document: Some(document),
                    generation,
                    ..
                }) => (document.clone(), *generation),
                _ => return Ok(false),
            }
        };

        let loaded = self.load(&document_key).await.map_err(|e| {
            tracing::warn!(record = %id, document = %document_key, error = %e, "Failed to turn page");
            e
        })?;

        let mut state = self.inner.state.write().await;
        let Some(session) = state
            .sessions
            .get_mut(id)
            .filter(|s| s.is_active && s.generation == generation)
        else {
            tracing::debug!(record = %id, "Session changed while loading, dropping page turn");
            return Ok(false);
        };

        // The file may have changed length since the last turn
        let total = loaded.total_pages;
        let clamped = session.current_page.min(total).max(1);
        let stale = clamped != session.current_page || total != session.total_pages;
        if stale {
            tracing::debug!(record = %id, page = clamped, total_pages = total, "Document length changed");
            session.current_page = clamped;
            session.total_pages = total;
        }

        let page = match target(session, total) {
            Some(page) => page,
            None if stale => clamped,
            None => return Ok(false),
        };

        session.current_page = page;
        session.visible_text = loaded.page(page);

        let snapshot = state
            .remember_progress(&document_key, page, total)
            .then(|| state.progress.clone());
        drop(state);

        if let Some(progress) = snapshot {
            self.persist(&progress).await;
        }

        tracing::debug!(record = %id, page, total_pages = total, "Turned page");
        self.inner.events.emit(ReaderEvent::RecordChanged(id.clone()));
        Ok(true)
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Search the open document and jump to the first match
    ///
    /// Returns `None` when the query does not occur.
    pub async fn search_first(&self, id: &RecordId, query: &str) -> Result<Option<SearchJump>> {
        let document_key = self.reading_document(id).await?;
        let loaded = self.load(&document_key).await?;

        let hit = {
            let mut state = self.inner.state.write().await;
            state.search.search(&document_key, &loaded.document.text, query)?
        };

        self.jump_to(id, hit, loaded.page_size).await
    }

    /// Jump to the next match of the last query, wrapping around
    pub async fn search_next(&self, id: &RecordId) -> Result<Option<SearchJump>> {
        let document_key = self.reading_document(id).await?;
        let hit = self.inner.state.write().await.search.next(&document_key);
        let page_size = self.inner.config.read().await.page_size;

        self.jump_to(id, hit, page_size).await
    }

    /// Jump to the previous match of the last query, wrapping around
    pub async fn search_previous(&self, id: &RecordId) -> Result<Option<SearchJump>> {
        let document_key = self.reading_document(id).await?;
        let hit = self.inner.state.write().await.search.previous(&document_key);
        let page_size = self.inner.config.read().await.page_size;

        self.jump_to(id, hit, page_size).await
    }

    async fn jump_to(
        &self,
        id: &RecordId,
        hit: Option<SearchHit>,
        page_size: usize,
    ) -> Result<Option<SearchJump>> {
        let Some(hit) = hit else {
            return Ok(None);
        };

        let page = page_of_offset(hit.offset, page_size);
        let moved = self.go_to_page(id, page).await?;

        Ok(Some(SearchJump { hit, page, moved }))
    }

    /// Document of an open record
    async fn reading_document(&self, id: &RecordId) -> Result<String> {
        let state = self.inner.state.read().await;
        state.record(id)?;

        state
            .active_session(id)
            .and_then(|s| s.document.clone())
            .ok_or_else(|| ReaderError::NotReading(id.to_string()))
    }

    // ========================================================================
    // Documents & Persistence
    // ========================================================================

    /// Load a document and paginate it with the current page size
    ///
    /// Every load of a degraded document is reported, including cache hits.
    async fn load(&self, document_key: &str) -> Result<Loaded> {
        let page_size = self.inner.config.read().await.page_size;
        let document = self.inner.cache.load(document_key).await?;
        let total_pages = total_pages(&document.text, page_size)?;

        if document.degraded {
            self.inner.events.emit(ReaderEvent::DecodeDegraded {
                path: document_key.to_string(),
            });
        }

        Ok(Loaded {
            document,
            page_size,
            total_pages,
        })
    }

    /// Size and line count of a document
    pub async fn file_stats(&self, path: &str) -> Result<FileStats> {
        Ok(self.inner.cache.file_stats(path).await?)
    }

    pub async fn clear_cache(&self) {
        self.inner.cache.clear().await;
    }

    /// Saved position for a document
    pub async fn saved_progress(&self, document: &str) -> Option<SavedProgress> {
        self.inner.state.read().await.progress.get(document).copied()
    }

    async fn persist(&self, progress: &ProgressMap) {
        if let Err(e) = self.inner.progress_store.save(progress).await {
            tracing::error!(error = %e, "Failed to save reading progress");
        }
    }

    /// Flush the progress table to storage
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Shutting down reader engine...");
        let progress = self.inner.state.read().await.progress.clone();
        self.inner.progress_store.save(&progress).await
    }
}
