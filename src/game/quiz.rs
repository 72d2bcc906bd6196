use std::time::Duration;

use serde::Serialize;

use crate::game::id::{OptionId, QuestionId};
use crate::game::Creator;

/// A quiz authored by a creator, played through one or more games.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub name: String,
    pub creator: Creator,
    pub questions: Vec<Question>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub title: String,
    #[serde(serialize_with = "serialize_seconds", rename = "durationInSeconds")]
    pub duration: Duration,
    pub order: i32,
    pub options: Vec<QuestionOption>,
}

#[derive(Clone, Debug, Serialize)]
pub struct QuestionOption {
    pub id: OptionId,
    pub text: String,
}

impl Quiz {
    /// Returns the question that follows `current` in `order`, or the first question when nothing was asked yet.
    pub fn next_question(&self, current: Option<QuestionId>) -> Option<&Question> {
        let mut ordered: Vec<&Question> = self.questions.iter().collect();
        ordered.sort_by_key(|question| question.order);

        match current {
            None => ordered.first().copied(),
            Some(current) => ordered
                .iter()
                .position(|question| question.id == current)
                .and_then(|index| ordered.get(index + 1))
                .copied(),
        }
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }
}

impl Question {
    pub fn has_option(&self, option_id: OptionId) -> bool {
        self.options.iter().any(|option| option.id == option_id)
    }
}

fn serialize_seconds<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_secs())
}
