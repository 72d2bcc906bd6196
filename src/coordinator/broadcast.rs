use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::id::{PlayerId, QuestionId};
use crate::game::{Creator, Player};

/// A state change pushed to every subscriber of a game.
///
/// Serialized with a `type` tag and exactly one content field matching it:
///
/// ```json
/// {"type": "next", "nextQuestionContent": {"questionID": "..."}}
/// {"type": "finish"}
/// {"type": "answered", "playerAnsweredContent": {"playerID": "..."}}
/// {"type": "participants", "participantsContent": {"creator": null, "players": []}}
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BroadcastMessage {
    #[serde(rename = "participants")]
    ParticipantsChanged {
        #[serde(rename = "participantsContent")]
        content: ParticipantsContent,
    },
    #[serde(rename = "next")]
    NextQuestion {
        #[serde(rename = "nextQuestionContent")]
        content: NextQuestionContent,
    },
    #[serde(rename = "finish")]
    FinishGame,
    #[serde(rename = "answered")]
    PlayerAnswered {
        #[serde(rename = "playerAnsweredContent")]
        content: PlayerAnsweredContent,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticipantsContent {
    pub creator: Option<Participant>,
    pub players: Vec<Participant>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NextQuestionContent {
    #[serde(rename = "questionID")]
    pub question_id: QuestionId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerAnsweredContent {
    #[serde(rename = "playerID")]
    pub player_id: PlayerId,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    pub id: Uuid,
    pub nickname: String,
}

impl BroadcastMessage {
    pub fn participants_changed(creator: Option<Participant>, players: Vec<Participant>) -> Self {
        BroadcastMessage::ParticipantsChanged {
            content: ParticipantsContent { creator, players },
        }
    }

    pub fn next_question(question_id: QuestionId) -> Self {
        BroadcastMessage::NextQuestion {
            content: NextQuestionContent { question_id },
        }
    }

    pub fn player_answered(player_id: PlayerId) -> Self {
        BroadcastMessage::PlayerAnswered {
            content: PlayerAnsweredContent { player_id },
        }
    }

    /// The wire tag, as found in the `type` field.
    pub fn kind(&self) -> &'static str {
        match self {
            BroadcastMessage::ParticipantsChanged { .. } => "participants",
            BroadcastMessage::NextQuestion { .. } => "next",
            BroadcastMessage::FinishGame => "finish",
            BroadcastMessage::PlayerAnswered { .. } => "answered",
        }
    }
}

impl From<&Player> for Participant {
    fn from(player: &Player) -> Self {
        Participant {
            id: *player.id.as_uuid(),
            nickname: player.nickname.clone(),
        }
    }
}

impl From<&Creator> for Participant {
    fn from(creator: &Creator) -> Self {
        Participant {
            id: *creator.id.as_uuid(),
            nickname: creator.nickname.clone(),
        }
    }
}
