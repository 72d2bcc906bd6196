use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::game::id::OptionId;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerAction {
    Join,
    Answer,
    Leave,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum CreatorAction {
    #[serde(rename = "next")]
    NextQuestion,
    #[serde(rename = "finish")]
    FinishGame,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(rename = "optionID")]
    pub option_id: OptionId,
}

/// A validated message sent by a player. Only `Answer` carries a payload.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerMessage {
    Join,
    Answer(Answer),
    Leave,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct CreatorMessage {
    pub action: CreatorAction,
}

#[derive(Deserialize)]
struct RawPlayerMessage {
    action: PlayerAction,
    #[serde(default)]
    content: Option<Value>,
}

impl PlayerMessage {
    /// Parses `{"action": ..., "content": ...}`. Unknown actions, a missing answer payload and a
    /// nil `optionID` are rejected here so they never reach the coordinator.
    pub fn parse(message: &str) -> Result<PlayerMessage, Error> {
        let raw: RawPlayerMessage = serde_json::from_str(message)
            .map_err(|error| Error::UnprocessableMessage(error.to_string(), message.to_string()))?;

        match raw.action {
            PlayerAction::Join => Ok(PlayerMessage::Join),
            PlayerAction::Leave => Ok(PlayerMessage::Leave),
            PlayerAction::Answer => {
                let content = raw.content.ok_or_else(|| {
                    Error::UnprocessableMessage(
                        "An answer requires content".to_string(),
                        message.to_string(),
                    )
                })?;
                let answer: Answer = serde_json::from_value(content).map_err(|error| {
                    Error::UnprocessableMessage(error.to_string(), message.to_string())
                })?;
                if answer.option_id.is_nil() {
                    return Err(Error::UnprocessableMessage(
                        "The optionID of an answer is required".to_string(),
                        message.to_string(),
                    ));
                }
                Ok(PlayerMessage::Answer(answer))
            }
        }
    }

    pub fn action(&self) -> PlayerAction {
        match self {
            PlayerMessage::Join => PlayerAction::Join,
            PlayerMessage::Answer(_) => PlayerAction::Answer,
            PlayerMessage::Leave => PlayerAction::Leave,
        }
    }
}

impl CreatorMessage {
    pub fn parse(message: &str) -> Result<CreatorMessage, Error> {
        serde_json::from_str(message)
            .map_err(|error| Error::UnprocessableMessage(error.to_string(), message.to_string()))
    }
}
