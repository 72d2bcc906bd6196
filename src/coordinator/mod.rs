pub mod broadcast;
pub mod message;
pub mod registry;

use std::sync::Arc;

use crate::coordinator::broadcast::BroadcastMessage;
use crate::coordinator::message::{CreatorAction, CreatorMessage, PlayerMessage};
use crate::coordinator::registry::SubscriptionRegistry;
use crate::game::id::{GameId, PlayerId};
use crate::game::service::GameService;

/// Applies player and creator actions through the [`GameService`] and broadcasts the outcome.
///
/// Handlers never return errors: a failed lookup or a rejected action is logged and nothing is
/// broadcast.
pub struct GameCoordinator {
    game_service: Arc<dyn GameService>,
    registry: Arc<SubscriptionRegistry>,
}

impl GameCoordinator {
    pub fn new(game_service: Arc<dyn GameService>, registry: Arc<SubscriptionRegistry>) -> Self {
        Self {
            game_service,
            registry,
        }
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    pub fn game_service(&self) -> &dyn GameService {
        self.game_service.as_ref()
    }

    pub async fn handle_player_message(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        message: PlayerMessage,
    ) {
        let game = match self.game_service.get_by_id(game_id).await {
            Ok(game) => game,
            Err(error) => {
                log::error!("Failed to get the game for a player message. GameId: '{game_id}', PlayerId: '{player_id}', Error: '{error}'.");
                return;
            }
        };

        match message {
            PlayerMessage::Answer(answer) => {
                let Some(question_id) = game.current_question else {
                    log::error!("Received an answer but no question is in progress. GameId: '{game_id}', PlayerId: '{player_id}'.");
                    return;
                };
                if let Err(error) = self
                    .game_service
                    .answer_question(&game, question_id, player_id, answer.option_id)
                    .await
                {
                    log::error!("Failed to answer the question. GameId: '{game_id}', PlayerId: '{player_id}', QuestionId: '{question_id}', Error: '{error}'.");
                    return;
                }
                self.registry
                    .broadcast(game_id, &BroadcastMessage::player_answered(player_id));
            }
            PlayerMessage::Join | PlayerMessage::Leave => {
                log::debug!(
                    "Ignoring player action. GameId: '{game_id}', PlayerId: '{player_id}', Action: '{:?}'.",
                    message.action()
                );
            }
        }
    }

    pub async fn handle_creator_message(&self, game_id: GameId, message: CreatorMessage) {
        let game = match self.game_service.get_by_id(game_id).await {
            Ok(game) => game,
            Err(error) => {
                log::error!("Failed to get the game for a creator message. GameId: '{game_id}', Error: '{error}'.");
                return;
            }
        };

        let broadcast = match message.action {
            CreatorAction::FinishGame => match self.game_service.finish(game).await {
                Ok(_) => BroadcastMessage::FinishGame,
                Err(error) => {
                    log::error!("Failed to finish the game. GameId: '{game_id}', Error: '{error}'.");
                    return;
                }
            },
            CreatorAction::NextQuestion => match self.game_service.next(game).await {
                Ok(updated) => match updated.current_question {
                    Some(question_id) => BroadcastMessage::next_question(question_id),
                    None => {
                        log::error!("The game moved to the next question but has no current question. GameId: '{game_id}'.");
                        return;
                    }
                },
                Err(error) => {
                    log::error!("Failed to move to the next question. GameId: '{game_id}', Error: '{error}'.");
                    return;
                }
            },
        };

        self.registry.broadcast(game_id, &broadcast);
    }
}
