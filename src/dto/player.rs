//! Payloads of the player-facing `/api/players` and `/api/answers` routes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::PlayerEntity,
    dto::validation::{validate_not_blank, validate_session_code},
};

/// Payload sent by a player joining a session.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionRequest {
    /// Four digit code of the session to join.
    #[validate(custom(function = "validate_session_code"))]
    pub session_id: String,
    /// Display name, unique within the session.
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    /// Initial answer, stored only when the player is created.
    #[serde(default)]
    pub answer: Option<String>,
}

/// Public projection of a player.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    /// Player ID used when submitting answers.
    pub id: i64,
    /// Session the player joined.
    pub session_id: String,
    /// Display name.
    pub name: String,
    /// Current answer, `null` when none.
    pub answer: Option<String>,
}

impl From<PlayerEntity> for PlayerView {
    fn from(player: PlayerEntity) -> Self {
        Self {
            id: player.id,
            session_id: player.session_id.into(),
            name: player.name,
            answer: player.answer,
        }
    }
}

/// Player record along with the name of the session joined.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionResponse {
    /// The joined (or existing) player.
    pub player: PlayerView,
    /// Display name of the session.
    pub session_name: String,
}

/// Answer submission. `answer` must be present, `null` clears it.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    /// New answer; blank and `null` store no answer.
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub answer: Option<Option<String>>,
    /// Session the player belongs to.
    #[serde(default, alias = "sessionId")]
    pub game_id: Option<String>,
}

/// Request to wipe every answer of a session.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClearAnswersRequest {
    /// Four digit code of the session.
    #[validate(custom(function = "validate_session_code"))]
    pub session_id: String,
}

/// Players of the session after their answers were cleared.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClearAnswersResponse {
    /// Human readable summary.
    pub message: String,
    /// Number of players whose answers were cleared.
    pub count: usize,
    /// Players after the clear.
    pub players: Vec<PlayerView>,
}

/// One row of the host's answer board.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerView {
    /// Player name.
    pub name: String,
    /// Submitted answer, `null` when none.
    pub answer: Option<String>,
}

impl From<PlayerEntity> for AnswerView {
    fn from(player: PlayerEntity) -> Self {
        Self {
            name: player.name,
            answer: player.answer,
        }
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[test]
    fn submit_distinguishes_missing_answer_from_null() {
        let missing: SubmitAnswerRequest = serde_json::from_str(r#"{"gameId":"1234"}"#).unwrap();
        assert_eq!(missing.answer, None);

        let null: SubmitAnswerRequest =
            serde_json::from_str(r#"{"answer":null,"gameId":"1234"}"#).unwrap();
        assert_eq!(null.answer, Some(None));
        assert_eq!(null.game_id.as_deref(), Some("1234"));

        let aliased: SubmitAnswerRequest =
            serde_json::from_str(r#"{"answer":"B","sessionId":"1234"}"#).unwrap();
        assert_eq!(aliased.game_id.as_deref(), Some("1234"));
    }

    #[test]
    fn join_requires_a_four_digit_code() {
        let request: JoinSessionRequest =
            serde_json::from_str(r#"{"sessionId":"12","name":"Bob"}"#).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("session_id"));
    }
}
