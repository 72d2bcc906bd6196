pub mod game_fsm;
pub mod id;
pub mod quiz;
pub mod service;

use std::time::Instant;

use rand::{thread_rng, Rng};
use rust_fsm::StateMachineImpl;
use serde::Serialize;

use crate::error::domain_error::DomainError;
use crate::error::Error;
use crate::game::game_fsm::{GameFsm, GameFsmInput, GameFsmState};
use crate::game::id::{CreatorId, GameId, OptionId, PlayerId, QuestionId};
use crate::game::quiz::{Question, Quiz};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    pub nickname: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Creator {
    pub id: CreatorId,
    pub nickname: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameAnswer {
    pub player_id: PlayerId,
    pub question_id: QuestionId,
    pub option_id: OptionId,
}

/// One play-through of a quiz.
#[derive(Clone, Debug)]
pub struct Game {
    id: GameId,
    state: GameFsmState,
    pub quiz: Quiz,
    /// Join code, generated when the game starts
    pub code: Option<String>,
    pub player_limit: usize,
    pub current_question: Option<QuestionId>,
    /// Past this instant no answers are accepted for the current question
    pub current_deadline: Option<Instant>,
    pub players: Vec<Player>,
    pub answers: Vec<GameAnswer>,
}

impl Game {
    const MINIMUM_PLAYERS: usize = 2;
    const CODE_LENGTH: usize = 6;
    const CODE_CHARS: &'static [u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    pub fn new(quiz: Quiz, player_limit: usize) -> Self {
        Self {
            id: GameId::new_random(),
            state: GameFsmState::Created,
            quiz,
            code: None,
            player_limit,
            current_question: None,
            current_deadline: None,
            players: Vec::default(),
            answers: Vec::default(),
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn state(&self) -> GameFsmState {
        self.state
    }

    pub fn creator(&self) -> &Creator {
        &self.quiz.creator
    }

    pub fn is_in_progress(&self) -> bool {
        self.state == GameFsmState::Started
    }

    /// The question currently open for answers, if any.
    pub fn active_question(&self) -> Option<&Question> {
        self.current_question
            .and_then(|question_id| self.quiz.question(question_id))
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == player_id)
    }

    pub fn start(&mut self) -> Result<(), Error> {
        self.process_event(&GameFsmInput::Start)
            .ok_or(DomainError::GameAlreadyStarted(self.id))?;
        self.code = Some(Game::generate_code());
        Ok(())
    }

    pub fn add_player(&mut self, nickname: &str) -> Result<Player, Error> {
        if !self.is_in_progress() {
            return Err(DomainError::GameNotInProgress(self.state).into());
        }
        if self.players.len() >= self.player_limit {
            return Err(DomainError::PlayerLimitReached(self.player_limit).into());
        }

        let player = Player {
            id: PlayerId::new_random(),
            nickname: nickname.to_string(),
        };
        self.players.push(player.clone());
        Ok(player)
    }

    pub fn next(&mut self) -> Result<(), Error> {
        if !self.is_in_progress() {
            return Err(DomainError::GameNotInProgress(self.state).into());
        }
        if self.players.len() < Game::MINIMUM_PLAYERS {
            return Err(
                DomainError::NotEnoughPlayers(self.players.len(), Game::MINIMUM_PLAYERS).into(),
            );
        }

        let (question_id, duration) = self
            .quiz
            .next_question(self.current_question)
            .map(|question| (question.id, question.duration))
            .ok_or(DomainError::NoMoreQuestions)?;

        let deadline = Instant::now()
            .checked_add(duration)
            .ok_or(DomainError::QuestionDurationTooLong(question_id))?;

        self.current_question = Some(question_id);
        self.current_deadline = Some(deadline);
        Ok(())
    }

    pub fn finish(&mut self) -> Result<(), Error> {
        match self.state {
            GameFsmState::Created => Err(DomainError::GameNotStarted(self.id).into()),
            GameFsmState::Finished => Err(DomainError::GameAlreadyFinished(self.id).into()),
            GameFsmState::Started => self.process_event(&GameFsmInput::Finish).ok_or_else(|| {
                Error::log_and_create_internal(&format!(
                    "The game fsm refused to finish a started game. GameId: '{}'.",
                    self.id
                ))
            }),
        }
    }

    pub fn answer_question(
        &mut self,
        player_id: PlayerId,
        question_id: QuestionId,
        option_id: OptionId,
    ) -> Result<GameAnswer, Error> {
        if self.current_question != Some(question_id) {
            return Err(DomainError::NotCurrentQuestion(question_id).into());
        }
        if self
            .current_deadline
            .is_some_and(|deadline| deadline < Instant::now())
        {
            return Err(DomainError::DeadlinePassed(question_id).into());
        }
        if self.player(player_id).is_none() {
            return Err(DomainError::PlayerNotInGame(player_id).into());
        }
        if self
            .answers
            .iter()
            .any(|answer| answer.question_id == question_id && answer.player_id == player_id)
        {
            return Err(DomainError::PlayerAlreadyAnswered(player_id, question_id).into());
        }
        let has_option = self
            .quiz
            .question(question_id)
            .is_some_and(|question| question.has_option(option_id));
        if !has_option {
            return Err(DomainError::UnknownOption(option_id, question_id).into());
        }

        let answer = GameAnswer {
            player_id,
            question_id,
            option_id,
        };
        self.answers.push(answer.clone());
        Ok(answer)
    }

    fn process_event(&mut self, event: &GameFsmInput) -> Option<()> {
        GameFsm::transition(&self.state, event).map(|state| self.state = state)
    }

    fn generate_code() -> String {
        let mut rng = thread_rng();
        (0..Game::CODE_LENGTH)
            .map(|_| Game::CODE_CHARS[rng.gen_range(0..Game::CODE_CHARS.len())] as char)
            .collect()
    }
}
