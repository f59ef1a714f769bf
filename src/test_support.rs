//! Fixtures shared by the service unit tests.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU32, AtomicUsize, Ordering},
    },
};

use futures::future::BoxFuture;

use crate::{
    dao::{
        models::{NewPlayerEntity, NewSessionEntity, PlayerEntity, SessionChanges, SessionEntity, SessionId},
        session_store::{
            SessionStore,
            sqlite::{SqliteConfig, SqliteSessionStore},
        },
        storage::{StorageError, StorageResult},
    },
    services::allocator::SessionCodeAllocator,
    slides::{PresentationProvider, ProviderError, ProviderResult, SlideContent},
    state::{AppState, SharedState},
};

/// In-memory presentation provider that counts every call.
#[derive(Default)]
pub struct FakeSlides {
    decks: HashMap<String, Vec<String>>,
    list_calls: AtomicUsize,
    content_calls: AtomicUsize,
}

impl FakeSlides {
    pub fn with_deck(mut self, presentation_id: &str, slide_ids: &[&str]) -> Self {
        self.decks.insert(
            presentation_id.to_owned(),
            slide_ids.iter().map(|id| (*id).to_owned()).collect(),
        );
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn content_calls(&self) -> usize {
        self.content_calls.load(Ordering::SeqCst)
    }
}

impl PresentationProvider for FakeSlides {
    fn list_slide_ids(&self, presentation_id: String) -> BoxFuture<'static, ProviderResult<Vec<String>>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let slides = self.decks.get(&presentation_id).cloned();
        Box::pin(async move {
            slides.ok_or(ProviderError::RequestStatus {
                path: format!("presentations/{presentation_id}"),
                status: reqwest::StatusCode::NOT_FOUND,
            })
        })
    }

    fn slide_content(
        &self,
        _presentation_id: String,
        slide_id: String,
    ) -> BoxFuture<'static, ProviderResult<SlideContent>> {
        self.content_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            Ok(SlideContent {
                background_image_url: Some(format!("https://img.test/{slide_id}.png")),
                element_image_urls: Vec::new(),
                object_id: slide_id,
            })
        })
    }
}

pub async fn memory_store() -> Arc<dyn SessionStore> {
    let store = SqliteSessionStore::connect(SqliteConfig::in_memory())
        .await
        .expect("open in-memory sqlite");
    Arc::new(store)
}

/// State without a presentation provider.
pub async fn state() -> SharedState {
    AppState::new(memory_store().await, None, SessionCodeAllocator::default())
}

/// State backed by `slides`, returned alongside it for call assertions.
pub async fn state_with_slides(slides: FakeSlides) -> (SharedState, Arc<FakeSlides>) {
    let slides = Arc::new(slides);
    let state = AppState::new(
        memory_store().await,
        Some(slides.clone()),
        SessionCodeAllocator::default(),
    );
    (state, slides)
}

/// Store wrapper that replays interleavings a shared database can produce.
pub struct RacingStore {
    inner: Arc<dyn SessionStore>,
    hide_existing: bool,
    forced_conflicts: AtomicU32,
    insert_calls: AtomicU32,
    shrink_before_move: Mutex<Option<Vec<String>>>,
}

impl RacingStore {
    pub fn new(inner: Arc<dyn SessionStore>) -> Self {
        Self {
            inner,
            hide_existing: false,
            forced_conflicts: AtomicU32::new(0),
            insert_calls: AtomicU32::new(0),
            shrink_before_move: Mutex::new(None),
        }
    }

    /// Existence checks always answer "free", as if every row was written
    /// after the check.
    pub fn hiding_existing_codes(mut self) -> Self {
        self.hide_existing = true;
        self
    }

    /// The next `count` session inserts fail with a conflict.
    pub fn with_forced_conflicts(self, count: u32) -> Self {
        self.forced_conflicts.store(count, Ordering::SeqCst);
        self
    }

    /// Before the next slide move, another writer resets the cache and
    /// refills it with `slide_ids`.
    pub fn shrinking_before_move(self, slide_ids: &[&str]) -> Self {
        let slide_ids = slide_ids.iter().map(|id| (*id).to_owned()).collect();
        *self.shrink_before_move.lock().unwrap() = Some(slide_ids);
        self
    }

    pub fn insert_calls(&self) -> u32 {
        self.insert_calls.load(Ordering::SeqCst)
    }
}

impl SessionStore for RacingStore {
    fn insert_session(&self, session: NewSessionEntity) -> BoxFuture<'static, StorageResult<SessionEntity>> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let forced = self
            .forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if forced {
            let message = format!("session `{}` already exists", session.id);
            return Box::pin(async move { Err(StorageError::Conflict { message }) });
        }
        self.inner.insert_session(session)
    }

    fn find_session(&self, id: SessionId) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
        self.inner.find_session(id)
    }

    fn session_exists(&self, id: SessionId) -> BoxFuture<'static, StorageResult<bool>> {
        if self.hide_existing {
            return Box::pin(async { Ok(false) });
        }
        self.inner.session_exists(id)
    }

    fn update_session(
        &self,
        id: SessionId,
        changes: SessionChanges,
    ) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
        self.inner.update_session(id, changes)
    }

    fn cache_slide_ids(
        &self,
        id: SessionId,
        presentation_id: String,
        slide_ids: Vec<String>,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        self.inner.cache_slide_ids(id, presentation_id, slide_ids)
    }

    fn reset_slide_cache(&self, id: SessionId) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
        self.inner.reset_slide_cache(id)
    }

    fn set_slide_index(
        &self,
        id: SessionId,
        index: usize,
    ) -> BoxFuture<'static, StorageResult<Option<SessionEntity>>> {
        let inner = self.inner.clone();
        let shrink = self.shrink_before_move.lock().unwrap().take();
        Box::pin(async move {
            if let Some(slide_ids) = shrink {
                if let Some(session) = inner.reset_slide_cache(id.clone()).await? {
                    let presentation_id = session.presentation_id.unwrap_or_default();
                    inner
                        .cache_slide_ids(id.clone(), presentation_id, slide_ids)
                        .await?;
                }
            }
            inner.set_slide_index(id, index).await
        })
    }

    fn delete_session(&self, id: SessionId) -> BoxFuture<'static, StorageResult<bool>> {
        self.inner.delete_session(id)
    }

    fn insert_player(&self, player: NewPlayerEntity) -> BoxFuture<'static, StorageResult<PlayerEntity>> {
        self.inner.insert_player(player)
    }

    fn find_player_by_name(
        &self,
        session_id: SessionId,
        name: String,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        self.inner.find_player_by_name(session_id, name)
    }

    fn update_player_answer(
        &self,
        player_id: i64,
        session_id: SessionId,
        answer: Option<String>,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        self.inner.update_player_answer(player_id, session_id, answer)
    }

    fn clear_answers(&self, session_id: SessionId) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        self.inner.clear_answers(session_id)
    }

    fn list_players(&self, session_id: SessionId) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        self.inner.list_players(session_id)
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.health_check()
    }
}
