//! Player membership and the live-gated answer flow.

use tracing::{debug, info};

use crate::{
    dao::models::NewPlayerEntity,
    dto::player::{
        AnswerView, ClearAnswersRequest, ClearAnswersResponse, JoinSessionRequest,
        JoinSessionResponse, PlayerView, SubmitAnswerRequest,
    },
    error::ServiceError,
    services::session_service::{parse_session_id, session_not_found},
    state::SharedState,
};

/// Blank answers are stored as "no answer".
pub(crate) fn normalize_answer(answer: Option<String>) -> Option<String> {
    answer.filter(|text| !text.trim().is_empty())
}

/// Join a session by name. Joining twice with the same name returns the
/// existing player; the boolean tells whether a new player was created.
pub async fn join_session(
    state: &SharedState,
    request: JoinSessionRequest,
) -> Result<(JoinSessionResponse, bool), ServiceError> {
    if request.name.trim().is_empty() {
        return Err(ServiceError::InvalidInput("sessionId and name are required".into()));
    }
    let session_id = parse_session_id(&request.session_id)?;

    let store = state.store();
    let session = store
        .find_session(session_id.clone())
        .await?
        .ok_or_else(session_not_found)?;

    let new_player = NewPlayerEntity {
        session_id: session_id.clone(),
        name: request.name.clone(),
        answer: normalize_answer(request.answer),
    };
    let (player, created) = match store.insert_player(new_player).await {
        Ok(player) => (player, true),
        Err(err) if err.is_conflict() => {
            let existing = store
                .find_player_by_name(session_id.clone(), request.name)
                .await?
                .ok_or(ServiceError::Storage(err))?;
            (existing, false)
        }
        Err(err) => return Err(err.into()),
    };

    if created {
        info!(session_id = %session_id, player_id = player.id, "player joined");
    } else {
        debug!(session_id = %session_id, player_id = player.id, "player rejoined");
    }

    Ok((
        JoinSessionResponse {
            player: player.into(),
            session_name: session.session_name,
        },
        created,
    ))
}

/// Record a player's answer while the session is live.
pub async fn submit_answer(
    state: &SharedState,
    player_id: &str,
    request: SubmitAnswerRequest,
) -> Result<PlayerView, ServiceError> {
    let player_id: i64 = player_id
        .parse()
        .map_err(|_| ServiceError::InvalidInput("Invalid player ID".into()))?;
    let Some(answer) = request.answer else {
        return Err(ServiceError::InvalidInput("answer field is required".into()));
    };
    let Some(game_id) = request.game_id else {
        return Err(ServiceError::InvalidInput("gameId field is required".into()));
    };
    let session_id = parse_session_id(&game_id)?;

    let store = state.store();
    // A missing session counts as closed.
    let live = store
        .find_session(session_id.clone())
        .await?
        .is_some_and(|session| session.live);
    if !live {
        return Err(ServiceError::PollingClosed);
    }

    let player = store
        .update_player_answer(player_id, session_id.clone(), normalize_answer(answer))
        .await?
        .ok_or_else(|| ServiceError::PlayerNotFound {
            player_id,
            session_id: session_id.to_string(),
        })?;
    debug!(session_id = %session_id, player_id, "answer recorded");

    Ok(player.into())
}

/// Answer board of a session, in join order. Unknown sessions yield an empty board.
pub async fn list_answers(state: &SharedState, session_id: &str) -> Result<Vec<AnswerView>, ServiceError> {
    let session_id = parse_session_id(session_id)?;
    let players = state.store().list_players(session_id).await?;
    Ok(players.into_iter().map(AnswerView::from).collect())
}

/// Reset every answer of the session to null.
pub async fn clear_answers(
    state: &SharedState,
    request: ClearAnswersRequest,
) -> Result<ClearAnswersResponse, ServiceError> {
    let session_id = parse_session_id(&request.session_id)?;
    let players = state.store().clear_answers(session_id.clone()).await?;
    let count = players.len();
    info!(session_id = %session_id, count, "answers cleared");

    Ok(ClearAnswersResponse {
        message: format!("Cleared answers for {count} player(s)"),
        count,
        players: players.into_iter().map(PlayerView::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::session::{CreateSessionRequest, UpdateSessionRequest},
        services::session_service,
        test_support,
    };

    async fn open_session(state: &SharedState) -> String {
        session_service::create_session(
            state,
            CreateSessionRequest {
                host_name: "Ada".into(),
                session_name: "Friday quiz".into(),
                presentation_id: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn set_live(state: &SharedState, session_id: &str, live: bool) {
        session_service::update_session(
            state,
            session_id,
            UpdateSessionRequest {
                live: Some(live),
                presentation_id: None,
            },
        )
        .await
        .unwrap();
    }

    async fn join(state: &SharedState, session_id: &str, name: &str) -> (JoinSessionResponse, bool) {
        join_session(
            state,
            JoinSessionRequest {
                session_id: session_id.into(),
                name: name.into(),
                answer: None,
            },
        )
        .await
        .unwrap()
    }

    fn submit(answer: Option<&str>, game_id: &str) -> SubmitAnswerRequest {
        SubmitAnswerRequest {
            answer: Some(answer.map(str::to_owned)),
            game_id: Some(game_id.into()),
        }
    }

    #[test]
    fn blank_answers_normalize_to_none() {
        assert_eq!(normalize_answer(None), None);
        assert_eq!(normalize_answer(Some(String::new())), None);
        assert_eq!(normalize_answer(Some("  ".into())), None);
        assert_eq!(normalize_answer(Some("B".into())).as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn joining_twice_returns_the_same_player() {
        let state = test_support::state().await;
        let session_id = open_session(&state).await;

        let (first, created) = join(&state, &session_id, "Bob").await;
        assert!(created);
        assert_eq!(first.session_name, "Friday quiz");

        let (second, created) = join(&state, &session_id, "Bob").await;
        assert!(!created);
        assert_eq!(second.player.id, first.player.id);
    }

    #[tokio::test]
    async fn joining_an_unknown_session_fails() {
        let state = test_support::state().await;
        let err = join_session(
            &state,
            JoinSessionRequest {
                session_id: "4321".into(),
                name: "Bob".into(),
                answer: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn answers_are_rejected_while_polling_is_closed() {
        let state = test_support::state().await;
        let session_id = open_session(&state).await;
        let (bob, _) = join(&state, &session_id, "Bob").await;

        let err = submit_answer(&state, &bob.player.id.to_string(), submit(Some("B"), &session_id))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PollingClosed));

        let board = list_answers(&state, &session_id).await.unwrap();
        assert_eq!(board[0].answer, None);
    }

    #[tokio::test]
    async fn unknown_session_on_submit_counts_as_closed() {
        let state = test_support::state().await;
        let err = submit_answer(&state, "1", submit(Some("B"), "4321"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PollingClosed));
    }

    #[tokio::test]
    async fn submit_requires_answer_and_game_id() {
        let state = test_support::state().await;
        let missing_answer = SubmitAnswerRequest {
            answer: None,
            game_id: Some("1234".into()),
        };
        let err = submit_answer(&state, "1", missing_answer).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let missing_game = SubmitAnswerRequest {
            answer: Some(Some("B".into())),
            game_id: None,
        };
        let err = submit_answer(&state, "1", missing_game).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let err = submit_answer(&state, "abc", submit(Some("B"), "1234"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn player_from_another_session_is_not_found() {
        let state = test_support::state().await;
        let first = open_session(&state).await;
        let second = open_session(&state).await;
        set_live(&state, &second, true).await;
        let (bob, _) = join(&state, &first, "Bob").await;

        let err = submit_answer(&state, &bob.player.id.to_string(), submit(Some("B"), &second))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PlayerNotFound { .. }));
    }

    #[tokio::test]
    async fn live_flow_records_then_clears_answers() {
        let state = test_support::state().await;
        let session_id = open_session(&state).await;
        let (bob, _) = join(&state, &session_id, "Bob").await;
        let (eve, _) = join(&state, &session_id, "Eve").await;
        set_live(&state, &session_id, true).await;

        let updated = submit_answer(&state, &bob.player.id.to_string(), submit(Some("B"), &session_id))
            .await
            .unwrap();
        assert_eq!(updated.answer.as_deref(), Some("B"));
        let updated = submit_answer(&state, &eve.player.id.to_string(), submit(Some(""), &session_id))
            .await
            .unwrap();
        assert_eq!(updated.answer, None);

        let board = list_answers(&state, &session_id).await.unwrap();
        let names: Vec<_> = board.iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, ["Bob", "Eve"]);
        assert_eq!(board[0].answer.as_deref(), Some("B"));

        let cleared = clear_answers(
            &state,
            ClearAnswersRequest {
                session_id: session_id.clone(),
            },
        )
        .await
        .unwrap();
        assert_eq!(cleared.count, 2);
        assert!(cleared.players.iter().all(|player| player.answer.is_none()));
    }

    #[tokio::test]
    async fn unknown_session_has_an_empty_board() {
        let state = test_support::state().await;
        assert!(list_answers(&state, "4321").await.unwrap().is_empty());
    }
}
