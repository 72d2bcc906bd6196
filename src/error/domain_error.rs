use thiserror::Error;

use crate::game::game_fsm::GameFsmState;
use crate::game::id::{CreatorId, GameId, OptionId, PlayerId, QuestionId};

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("The game does not exist. GameId: '{0}'.")]
    GameDoesNotExist(GameId),
    #[error("No game uses the join code. Code: '{0}'.")]
    GameCodeDoesNotExist(String),
    #[error("The game has already been started. GameId: '{0}'.")]
    GameAlreadyStarted(GameId),
    #[error("The game has not been started. GameId: '{0}'.")]
    GameNotStarted(GameId),
    #[error("The game has already finished. GameId: '{0}'.")]
    GameAlreadyFinished(GameId),
    #[error("The game is not in progress. ActualState: '{0}'.")]
    GameNotInProgress(GameFsmState),
    #[error("Not enough players to continue the game. ActualPlayers: '{0}', MinimumPlayers: '{1}'.")]
    NotEnoughPlayers(usize, usize),
    #[error("The game has no current question. GameId: '{0}'.")]
    NoCurrentQuestion(GameId),
    #[error("The question duration is too long. QuestionId: '{0}'.")]
    QuestionDurationTooLong(QuestionId),
    #[error("The quiz has no more questions.")]
    NoMoreQuestions,
    #[error("A quiz needs at least one question.")]
    QuizHasNoQuestions,
    #[error("The question is not the current question. QuestionId: '{0}'.")]
    NotCurrentQuestion(QuestionId),
    #[error("The deadline of the question has passed. QuestionId: '{0}'.")]
    DeadlinePassed(QuestionId),
    #[error("The player is not part of the game. PlayerId: '{0}'.")]
    PlayerNotInGame(PlayerId),
    #[error("The player already answered the question. PlayerId: '{0}', QuestionId: '{1}'.")]
    PlayerAlreadyAnswered(PlayerId, QuestionId),
    #[error("The option does not belong to the question. OptionId: '{0}', QuestionId: '{1}'.")]
    UnknownOption(OptionId, QuestionId),
    #[error("The game is full. PlayerLimit: '{0}'.")]
    PlayerLimitReached(usize),
    #[error("Only the creator of the quiz can conduct the game. CreatorId: '{0}'.")]
    NotGameCreator(CreatorId),
}
