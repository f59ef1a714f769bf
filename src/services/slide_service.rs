//! Current slide of a session, backed by a lazily filled slide-ID cache.
//!
//! The ordered slide IDs of the linked presentation are fetched from the
//! provider on first use and persisted on the session row. Slide content is
//! always fetched fresh.

use tracing::debug;

use crate::{
    dao::models::SessionEntity,
    dto::slide::{CurrentSlideResponse, SetSlideIndexRequest},
    error::ServiceError,
    services::session_service::{parse_session_id, session_not_found},
    slides::ProviderError,
    state::SharedState,
};

/// Return the session with its slide IDs populated. The provider is only
/// called when the cache is empty, and the returned row is always the one
/// re-read after caching.
pub async fn resolve_slide_ids(
    state: &SharedState,
    session: SessionEntity,
) -> Result<SessionEntity, ServiceError> {
    if !session.slide_ids.is_empty() {
        return Ok(session);
    }
    let presentation_id = session
        .presentation_id
        .clone()
        .ok_or(ServiceError::PresentationNotLinked)?;

    let slide_ids = state
        .require_slides()?
        .list_slide_ids(presentation_id.clone())
        .await?;
    if slide_ids.is_empty() {
        return Err(ProviderError::NoSlides { presentation_id }.into());
    }

    let store = state.store();
    let stored = store
        .cache_slide_ids(session.id.clone(), presentation_id, slide_ids)
        .await?;
    if stored {
        debug!(session_id = %session.id, "slide ids cached");
    } else {
        debug!(session_id = %session.id, "slide cache changed concurrently");
    }

    store
        .find_session(session.id)
        .await?
        .ok_or_else(session_not_found)
}

fn checked_index(requested: i64, len: usize) -> Result<usize, ServiceError> {
    usize::try_from(requested)
        .ok()
        .filter(|index| *index < len)
        .ok_or(ServiceError::IndexOutOfRange {
            index: requested,
            len,
        })
}

/// Fetch the content of the slide at the session's current index.
async fn current_slide(
    state: &SharedState,
    session: &SessionEntity,
) -> Result<CurrentSlideResponse, ServiceError> {
    let presentation_id = session
        .presentation_id
        .clone()
        .ok_or(ServiceError::PresentationNotLinked)?;
    let slide_id = session
        .slide_ids
        .get(session.slide_index)
        .cloned()
        .ok_or(ServiceError::IndexOutOfRange {
            index: session.slide_index as i64,
            len: session.slide_ids.len(),
        })?;

    let slide = state
        .require_slides()?
        .slide_content(presentation_id, slide_id)
        .await?;
    Ok(CurrentSlideResponse {
        slide_index: session.slide_index,
        slide,
    })
}

/// Content of the slide the session currently shows, filling the cache first.
pub async fn get_current_slide(
    state: &SharedState,
    id: &str,
) -> Result<CurrentSlideResponse, ServiceError> {
    let id = parse_session_id(id)?;
    let session = state
        .store()
        .find_session(id)
        .await?
        .ok_or_else(session_not_found)?;
    if session.presentation_id.is_none() {
        return Err(ServiceError::PresentationNotLinked);
    }

    let session = resolve_slide_ids(state, session).await?;
    current_slide(state, &session).await
}

/// Move the session to another slide. The index is left unchanged when the
/// request is rejected.
pub async fn set_slide_index(
    state: &SharedState,
    id: &str,
    request: SetSlideIndexRequest,
) -> Result<CurrentSlideResponse, ServiceError> {
    let id = parse_session_id(id)?;
    let requested = request.slide_index.ok_or_else(|| {
        ServiceError::InvalidInput("slideIndex is required and must be a number".into())
    })?;

    let store = state.store();
    let session = store
        .find_session(id.clone())
        .await?
        .ok_or_else(session_not_found)?;
    let session = resolve_slide_ids(state, session).await?;
    let index = checked_index(requested, session.slide_ids.len())?;

    let Some(session) = store.set_slide_index(id.clone(), index).await? else {
        // Deleted, or the slide list shrank since it was checked.
        let current = store.find_session(id).await?.ok_or_else(session_not_found)?;
        return Err(ServiceError::IndexOutOfRange {
            index: requested,
            len: current.slide_ids.len(),
        });
    };
    debug!(session_id = %session.id, slide_index = index, "slide index moved");
    current_slide(state, &session).await
}

/// Forget the cached slide IDs so the next read refetches them.
pub async fn reset_slide_cache(state: &SharedState, id: &str) -> Result<(), ServiceError> {
    let id = parse_session_id(id)?;
    let session = state
        .store()
        .reset_slide_cache(id)
        .await?
        .ok_or_else(session_not_found)?;
    debug!(session_id = %session.id, "slide cache reset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dto::session::{CreateSessionRequest, UpdateSessionRequest},
        services::{allocator::SessionCodeAllocator, session_service},
        state::AppState,
        test_support::{self, FakeSlides, RacingStore},
    };

    async fn open_session(state: &SharedState, presentation_id: Option<&str>) -> String {
        session_service::create_session(
            state,
            CreateSessionRequest {
                host_name: "Ada".into(),
                session_name: "Friday quiz".into(),
                presentation_id: presentation_id.map(str::to_owned),
            },
        )
        .await
        .unwrap()
        .id
    }

    fn move_to(index: i64) -> SetSlideIndexRequest {
        SetSlideIndexRequest {
            slide_index: Some(index),
        }
    }

    #[test]
    fn index_bounds() {
        assert_eq!(checked_index(0, 3).unwrap(), 0);
        assert_eq!(checked_index(2, 3).unwrap(), 2);
        assert!(checked_index(3, 3).is_err());
        assert!(checked_index(-1, 3).is_err());
        assert!(checked_index(0, 0).is_err());
    }

    #[tokio::test]
    async fn warm_cache_skips_the_provider() {
        let (state, slides) =
            test_support::state_with_slides(FakeSlides::default().with_deck("deck", &["s1", "s2", "s3"]))
                .await;
        let id = open_session(&state, Some("deck")).await;

        let first = get_current_slide(&state, &id).await.unwrap();
        assert_eq!(first.slide_index, 0);
        assert_eq!(first.slide.object_id, "s1");
        assert_eq!(slides.list_calls(), 1);

        let moved = set_slide_index(&state, &id, move_to(2)).await.unwrap();
        assert_eq!(moved.slide.object_id, "s3");
        let again = get_current_slide(&state, &id).await.unwrap();
        assert_eq!(again.slide_index, 2);

        assert_eq!(slides.list_calls(), 1);
        assert_eq!(slides.content_calls(), 3);
    }

    #[tokio::test]
    async fn out_of_range_index_leaves_the_session_untouched() {
        let (state, _slides) =
            test_support::state_with_slides(FakeSlides::default().with_deck("deck", &["s1", "s2"]))
                .await;
        let id = open_session(&state, Some("deck")).await;
        set_slide_index(&state, &id, move_to(1)).await.unwrap();

        for index in [2, 5, -1] {
            let err = set_slide_index(&state, &id, move_to(index)).await.unwrap_err();
            assert!(matches!(err, ServiceError::IndexOutOfRange { len: 2, .. }));
        }
        let missing = set_slide_index(&state, &id, SetSlideIndexRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(missing, ServiceError::InvalidInput(_)));

        let current = get_current_slide(&state, &id).await.unwrap();
        assert_eq!(current.slide_index, 1);
    }

    #[tokio::test]
    async fn shrinking_deck_during_a_move_is_out_of_range() {
        let store = RacingStore::new(test_support::memory_store().await).shrinking_before_move(&["x1"]);
        let slides = Arc::new(FakeSlides::default().with_deck("deck", &["s1", "s2", "s3"]));
        let state = AppState::new(Arc::new(store), Some(slides), SessionCodeAllocator::default());
        let id = open_session(&state, Some("deck")).await;
        get_current_slide(&state, &id).await.unwrap();

        let err = set_slide_index(&state, &id, move_to(2)).await.unwrap_err();
        assert!(matches!(err, ServiceError::IndexOutOfRange { index: 2, len: 1 }));

        let current = get_current_slide(&state, &id).await.unwrap();
        assert_eq!(current.slide_index, 0);
        assert_eq!(current.slide.object_id, "x1");
    }

    #[tokio::test]
    async fn set_index_on_a_cold_cache_resolves_first() {
        let (state, slides) =
            test_support::state_with_slides(FakeSlides::default().with_deck("deck", &["s1", "s2"]))
                .await;
        let id = open_session(&state, Some("deck")).await;

        let moved = set_slide_index(&state, &id, move_to(1)).await.unwrap();
        assert_eq!(moved.slide.object_id, "s2");
        assert_eq!(slides.list_calls(), 1);
    }

    #[tokio::test]
    async fn unlinked_session_has_no_current_slide() {
        let (state, slides) = test_support::state_with_slides(FakeSlides::default()).await;
        let id = open_session(&state, None).await;

        let err = get_current_slide(&state, &id).await.unwrap_err();
        assert!(matches!(err, ServiceError::PresentationNotLinked));
        let err = set_slide_index(&state, &id, move_to(0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::PresentationNotLinked));
        assert_eq!(slides.list_calls(), 0);
    }

    #[tokio::test]
    async fn empty_presentation_is_unavailable() {
        let (state, _slides) =
            test_support::state_with_slides(FakeSlides::default().with_deck("empty", &[])).await;
        let id = open_session(&state, Some("empty")).await;

        let err = get_current_slide(&state, &id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::PresentationUnavailable(ProviderError::NoSlides { .. })
        ));
    }

    #[tokio::test]
    async fn provider_failure_is_unavailable() {
        let (state, _slides) = test_support::state_with_slides(FakeSlides::default()).await;
        let id = open_session(&state, Some("missing-deck")).await;

        let err = get_current_slide(&state, &id).await.unwrap_err();
        assert!(matches!(err, ServiceError::PresentationUnavailable(_)));
    }

    #[tokio::test]
    async fn missing_provider_is_reported() {
        let state = test_support::state().await;
        let id = open_session(&state, Some("deck")).await;

        let err = get_current_slide(&state, &id).await.unwrap_err();
        assert!(matches!(err, ServiceError::ProviderNotConfigured));
    }

    #[tokio::test]
    async fn relink_and_reset_force_a_refetch() {
        let (state, slides) = test_support::state_with_slides(
            FakeSlides::default()
                .with_deck("deck-a", &["a1", "a2"])
                .with_deck("deck-b", &["b1"]),
        )
        .await;
        let id = open_session(&state, Some("deck-a")).await;
        set_slide_index(&state, &id, move_to(1)).await.unwrap();

        session_service::update_session(
            &state,
            &id,
            UpdateSessionRequest {
                live: None,
                presentation_id: Some(Some("deck-b".into())),
            },
        )
        .await
        .unwrap();
        let current = get_current_slide(&state, &id).await.unwrap();
        assert_eq!(current.slide_index, 0);
        assert_eq!(current.slide.object_id, "b1");
        assert_eq!(slides.list_calls(), 2);

        reset_slide_cache(&state, &id).await.unwrap();
        get_current_slide(&state, &id).await.unwrap();
        assert_eq!(slides.list_calls(), 3);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let (state, _slides) = test_support::state_with_slides(FakeSlides::default()).await;
        assert!(matches!(
            get_current_slide(&state, "4321").await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
        assert!(matches!(
            reset_slide_cache(&state, "4321").await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }
}
