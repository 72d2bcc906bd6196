use serde::{Deserialize, Serialize};

use crate::error::domain_error::DomainError;
use crate::error::Error;

/// Frames the server sends on its own, next to the game broadcasts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WsMessageOut {
    Error {
        #[serde(rename = "errorContent")]
        error_content: ErrorContent,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorContent {
    pub code: String,
    pub title: String,
    pub detail: String,
}

impl From<&Error> for ErrorContent {
    fn from(error: &Error) -> Self {
        let (code, title) = match error {
            Error::Domain(
                DomainError::GameDoesNotExist(_) | DomainError::GameCodeDoesNotExist(_),
            ) => {
                ("GAME_DOES_NOT_EXIST", "The game does not exist")
            }
            Error::Domain(DomainError::PlayerNotInGame(_)) => {
                ("PLAYER_NOT_IN_GAME", "The player is not part of the game")
            }
            Error::Domain(DomainError::NoCurrentQuestion(_)) => {
                ("NO_CURRENT_QUESTION", "The game has no current question")
            }
            Error::Domain(DomainError::NotGameCreator(_)) => {
                ("NOT_GAME_CREATOR", "Only the creator can conduct the game")
            }
            Error::Domain(_) => ("ACTION_NOT_ALLOWED", "The action is not allowed"),
            Error::UnprocessableMessage(_, _) => {
                ("UNPROCESSABLE_MESSAGE", "The message could not be processed")
            }
            Error::Internal(_) => ("INTERNAL_SERVER", "Internal Server error"),
            Error::WebsocketClosed(_) => ("WEBSOCKET_CLOSED", "The websocket is closed"),
        };

        ErrorContent {
            code: code.to_string(),
            title: title.to_string(),
            detail: error.to_string(),
        }
    }
}

impl From<&Error> for WsMessageOut {
    fn from(error: &Error) -> Self {
        WsMessageOut::Error {
            error_content: error.into(),
        }
    }
}
