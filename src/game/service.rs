use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::domain_error::DomainError;
use crate::error::Error;
use crate::game::id::{GameId, OptionId, PlayerId, QuestionId};
use crate::game::quiz::Quiz;
use crate::game::{Game, Player};
use crate::metrics::LIVE_GAMES;

/// Durable game state and the business rules around it.
///
/// Every method either accepts the operation or rejects it with an [`Error`]; callers treat any
/// error as "the operation did not happen".
#[async_trait]
pub trait GameService: Send + Sync {
    async fn get_by_id(&self, game_id: GameId) -> Result<Game, Error>;

    /// Looks up a started game by its join code.
    async fn get_by_code(&self, code: &str) -> Result<Game, Error>;

    async fn create(&self, quiz: Quiz, player_limit: usize) -> Result<Game, Error>;

    async fn start(&self, game: Game) -> Result<Game, Error>;

    async fn add_player(&self, game_id: GameId, nickname: &str) -> Result<Player, Error>;

    /// Moves the game to its next question and returns the game as stored afterwards.
    async fn next(&self, game: Game) -> Result<Game, Error>;

    async fn finish(&self, game: Game) -> Result<Game, Error>;

    async fn answer_question(
        &self,
        game: &Game,
        question_id: QuestionId,
        player_id: PlayerId,
        option_id: OptionId,
    ) -> Result<(), Error>;
}

/// Keeps games in process memory. Mutations are applied to the stored copy under the write lock,
/// the passed-in game only identifies which one.
#[derive(Default)]
pub struct InMemoryGameService {
    games: RwLock<HashMap<GameId, Game>>,
}

impl InMemoryGameService {
    pub fn new() -> Self {
        Self::default()
    }

    async fn update<T, F>(&self, game_id: GameId, operation: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Game) -> Result<T, Error> + Send,
        T: Send,
    {
        let mut games = self.games.write().await;
        let game = games
            .get_mut(&game_id)
            .ok_or(DomainError::GameDoesNotExist(game_id))?;

        // Apply on a copy so a rejected operation leaves the stored game untouched
        let mut updated = game.clone();
        let result = operation(&mut updated)?;
        *game = updated;
        Ok(result)
    }
}

#[async_trait]
impl GameService for InMemoryGameService {
    async fn get_by_id(&self, game_id: GameId) -> Result<Game, Error> {
        self.games
            .read()
            .await
            .get(&game_id)
            .cloned()
            .ok_or_else(|| DomainError::GameDoesNotExist(game_id).into())
    }

    async fn get_by_code(&self, code: &str) -> Result<Game, Error> {
        self.games
            .read()
            .await
            .values()
            .find(|game| game.code.as_deref() == Some(code))
            .cloned()
            .ok_or_else(|| DomainError::GameCodeDoesNotExist(code.to_string()).into())
    }

    async fn create(&self, quiz: Quiz, player_limit: usize) -> Result<Game, Error> {
        if quiz.questions.is_empty() {
            return Err(DomainError::QuizHasNoQuestions.into());
        }

        let game = Game::new(quiz, player_limit);
        self.games.write().await.insert(game.id(), game.clone());
        LIVE_GAMES.inc();
        log::info!(
            "Game created. GameId: '{}', Questions: '{}'.",
            game.id(),
            game.quiz.questions.len()
        );
        Ok(game)
    }

    async fn start(&self, game: Game) -> Result<Game, Error> {
        self.update(game.id(), |game| {
            game.start()?;
            Ok(game.clone())
        })
        .await
    }

    async fn add_player(&self, game_id: GameId, nickname: &str) -> Result<Player, Error> {
        let nickname = nickname.to_string();
        self.update(game_id, move |game| game.add_player(&nickname))
            .await
    }

    async fn next(&self, game: Game) -> Result<Game, Error> {
        self.update(game.id(), |game| {
            game.next()?;
            Ok(game.clone())
        })
        .await
    }

    async fn finish(&self, game: Game) -> Result<Game, Error> {
        let finished = self
            .update(game.id(), |game| {
                game.finish()?;
                Ok(game.clone())
            })
            .await?;
        LIVE_GAMES.dec();
        Ok(finished)
    }

    async fn answer_question(
        &self,
        game: &Game,
        question_id: QuestionId,
        player_id: PlayerId,
        option_id: OptionId,
    ) -> Result<(), Error> {
        self.update(game.id(), |game| {
            game.answer_question(player_id, question_id, option_id)
                .map(|_| ())
        })
        .await
    }
}
