//! Payloads of the host-facing `/api/sessions` routes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{dao::models::SessionEntity, dto::validation::validate_not_blank};

/// Payload used by a host to open a new session.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    /// Display name of the host.
    #[validate(custom(function = "validate_not_blank"))]
    pub host_name: String,
    /// Display name of the round.
    #[validate(custom(function = "validate_not_blank"))]
    pub session_name: String,
    /// Google Slides presentation to link. Blank is treated as absent.
    #[serde(default)]
    pub presentation_id: Option<String>,
}

/// Code allocated to the new session.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionCreatedResponse {
    /// Four digit session code.
    pub id: String,
}

/// Full view of a session row.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    /// Four digit session code.
    pub id: String,
    /// Display name of the host.
    pub host_name: String,
    /// Display name of the round.
    pub session_name: String,
    /// Whether answers are accepted.
    pub live: bool,
    /// Linked presentation, if any.
    pub presentation_id: Option<String>,
    /// Index of the slide currently shown.
    pub slide_index: usize,
    /// Cached slide object IDs, empty until first resolved.
    pub slide_ids: Vec<String>,
}

impl From<SessionEntity> for SessionView {
    fn from(session: SessionEntity) -> Self {
        Self {
            id: session.id.into(),
            host_name: session.host_name,
            session_name: session.session_name,
            live: session.live,
            presentation_id: session.presentation_id,
            slide_index: session.slide_index,
            slide_ids: session.slide_ids,
        }
    }
}

/// Partial update of a session. At least one field must be present.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    /// Opens or closes answer submission.
    #[serde(default)]
    pub live: Option<bool>,
    /// If not specified, keeps the current link.
    /// If null or blank, unlinks the presentation.
    /// If a string is specified, links that presentation.
    /// Any change drops the cached slide list.
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub presentation_id: Option<Option<String>>,
}

/// Session state after an update.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUpdatedResponse {
    /// Whether answers are accepted.
    pub is_session_live: bool,
    /// Linked presentation, if any.
    pub presentation_id: Option<String>,
}

impl From<SessionEntity> for SessionUpdatedResponse {
    fn from(session: SessionEntity) -> Self {
        Self {
            is_session_live: session.live,
            presentation_id: session.presentation_id,
        }
    }
}

/// Generic action acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    /// Outcome of the action.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[test]
    fn update_distinguishes_absent_from_null() {
        let absent: UpdateSessionRequest = serde_json::from_str(r#"{"live":true}"#).unwrap();
        assert_eq!(absent.live, Some(true));
        assert_eq!(absent.presentation_id, None);

        let null: UpdateSessionRequest =
            serde_json::from_str(r#"{"presentationId":null}"#).unwrap();
        assert_eq!(null.presentation_id, Some(None));

        let set: UpdateSessionRequest =
            serde_json::from_str(r#"{"presentationId":"deck"}"#).unwrap();
        assert_eq!(set.presentation_id, Some(Some("deck".into())));
    }

    #[test]
    fn create_rejects_blank_names() {
        let request: CreateSessionRequest =
            serde_json::from_str(r#"{"hostName":" ","sessionName":"Quiz"}"#).unwrap();
        assert!(request.validate().is_err());

        let request: CreateSessionRequest =
            serde_json::from_str(r#"{"hostName":"Ada","sessionName":"Quiz"}"#).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.presentation_id, None);
    }
}
