//! Session lifecycle: creation with code allocation, lookup, live toggle and
//! presentation linking, deletion.

use tracing::{info, warn};

use crate::{
    dao::models::{NewSessionEntity, SessionChanges, SessionId},
    dto::session::{
        CreateSessionRequest, SessionCreatedResponse, SessionUpdatedResponse, SessionView,
        UpdateSessionRequest,
    },
    error::ServiceError,
    state::SharedState,
};

/// Inserts retried when a freshly allocated code was taken in the meantime.
const CREATE_ATTEMPTS: u32 = 3;

pub(crate) fn parse_session_id(raw: &str) -> Result<SessionId, ServiceError> {
    Ok(raw.parse::<SessionId>()?)
}

pub(crate) fn session_not_found() -> ServiceError {
    ServiceError::NotFound("Session not found".into())
}

/// Blank presentation IDs mean "no presentation".
fn normalize_presentation_id(value: Option<String>) -> Option<String> {
    value.filter(|id| !id.trim().is_empty())
}

/// Open a session under a freshly allocated code.
pub async fn create_session(
    state: &SharedState,
    request: CreateSessionRequest,
) -> Result<SessionCreatedResponse, ServiceError> {
    if request.host_name.trim().is_empty() || request.session_name.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "hostName and sessionName are required".into(),
        ));
    }

    let store = state.store();
    let presentation_id = normalize_presentation_id(request.presentation_id);

    for attempt in 1..=CREATE_ATTEMPTS {
        let id = state
            .allocator()
            .allocate(|candidate| store.session_exists(candidate))
            .await?;

        let new_session = NewSessionEntity {
            id: id.clone(),
            host_name: request.host_name.clone(),
            session_name: request.session_name.clone(),
            presentation_id: presentation_id.clone(),
        };
        match store.insert_session(new_session).await {
            Ok(session) => {
                info!(session_id = %session.id, "session created");
                return Ok(SessionCreatedResponse {
                    id: session.id.into(),
                });
            }
            Err(err) if err.is_conflict() => {
                warn!(session_id = %id, attempt, "allocated session code was taken before insert");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Err(ServiceError::AllocationExhausted {
        attempts: CREATE_ATTEMPTS,
    })
}

/// Look up a session by its code.
pub async fn get_session(state: &SharedState, id: &str) -> Result<SessionView, ServiceError> {
    let id = parse_session_id(id)?;
    let session = state
        .store()
        .find_session(id)
        .await?
        .ok_or_else(session_not_found)?;
    Ok(session.into())
}

/// Toggle live and/or relink the presentation. Relinking drops the slide cache.
pub async fn update_session(
    state: &SharedState,
    id: &str,
    request: UpdateSessionRequest,
) -> Result<SessionUpdatedResponse, ServiceError> {
    let id = parse_session_id(id)?;
    let changes = SessionChanges {
        live: request.live,
        presentation_id: request.presentation_id.map(normalize_presentation_id),
    };
    if changes.is_empty() {
        return Err(ServiceError::InvalidInput("No valid fields to update".into()));
    }

    let session = state
        .store()
        .update_session(id, changes)
        .await?
        .ok_or_else(session_not_found)?;
    info!(
        session_id = %session.id,
        live = session.live,
        presentation_id = ?session.presentation_id,
        "session updated"
    );
    Ok(session.into())
}

/// Remove the session and, through the cascade, all of its players.
pub async fn delete_session(state: &SharedState, id: &str) -> Result<(), ServiceError> {
    let id = parse_session_id(id)?;
    if !state.store().delete_session(id.clone()).await? {
        return Err(session_not_found());
    }
    info!(session_id = %id, "session deleted");
    Ok(())
}
