use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use prometheus::IntGauge;
use tokio::select;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::error::Elapsed;
use tokio::time::timeout;

use crate::coordinator::broadcast::BroadcastMessage;
use crate::coordinator::message::{CreatorMessage, PlayerMessage};
use crate::coordinator::registry::{BroadcastCallback, SubscriptionId};
use crate::coordinator::GameCoordinator;
use crate::error::domain_error::DomainError;
use crate::error::Error;
use crate::game::id::{CreatorId, GameId, PlayerId};
use crate::game::{Creator, Player};
use crate::metrics::{CONNECTED_CREATORS, CONNECTED_PLAYERS};
use crate::websocket::{close, send_error, send_error_and_close, send_message, send_message_string};

/// Who is on the other end of the websocket.
#[derive(Clone, Debug, PartialEq)]
pub enum Role {
    Player(Player),
    Creator(Creator),
}

impl Role {
    fn gauge(&self) -> &'static IntGauge {
        match self {
            Role::Player(_) => &*CONNECTED_PLAYERS,
            Role::Creator(_) => &*CONNECTED_CREATORS,
        }
    }

    fn nickname(&self) -> &str {
        match self {
            Role::Player(player) => &player.nickname,
            Role::Creator(creator) => &creator.nickname,
        }
    }
}

/// Runs one websocket connection: forwards the game broadcasts to the socket and the socket
/// messages to the coordinator, until the game finishes or the connection is lost.
pub struct ConnectionActor {
    game_id: GameId,
    role: Role,
    subscription: SubscriptionId,
    coordinator: Arc<GameCoordinator>,
    broadcast_receiver: UnboundedReceiver<BroadcastMessage>,
    websocket: WebSocket,
    inactivity_timeout: Duration,
}

impl ConnectionActor {
    pub async fn connect_player(
        coordinator: Arc<GameCoordinator>,
        game_id: GameId,
        player_id: PlayerId,
        websocket: WebSocket,
        inactivity_timeout: Duration,
    ) {
        match ConnectionActor::find_player(&coordinator, game_id, player_id).await {
            Ok(player) => {
                ConnectionActor::create(
                    coordinator,
                    game_id,
                    Role::Player(player),
                    websocket,
                    inactivity_timeout,
                )
                .start()
                .await
            }
            Err(error) => {
                log::info!("Refused player connection. GameId: '{game_id}', PlayerId: '{player_id}', Error: '{error}'.");
                send_error_and_close(websocket, &error).await;
            }
        }
    }

    pub async fn connect_creator(
        coordinator: Arc<GameCoordinator>,
        game_id: GameId,
        creator_id: CreatorId,
        websocket: WebSocket,
        inactivity_timeout: Duration,
    ) {
        match ConnectionActor::find_creator(&coordinator, game_id, creator_id).await {
            Ok(creator) => {
                ConnectionActor::create(
                    coordinator,
                    game_id,
                    Role::Creator(creator),
                    websocket,
                    inactivity_timeout,
                )
                .start()
                .await
            }
            Err(error) => {
                log::info!("Refused creator connection. GameId: '{game_id}', CreatorId: '{creator_id}', Error: '{error}'.");
                send_error_and_close(websocket, &error).await;
            }
        }
    }

    async fn find_player(
        coordinator: &GameCoordinator,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<Player, Error> {
        let game = coordinator.game_service().get_by_id(game_id).await?;
        game.player(player_id)
            .cloned()
            .ok_or_else(|| DomainError::PlayerNotInGame(player_id).into())
    }

    async fn find_creator(
        coordinator: &GameCoordinator,
        game_id: GameId,
        creator_id: CreatorId,
    ) -> Result<Creator, Error> {
        let game = coordinator.game_service().get_by_id(game_id).await?;
        if game.creator().id != creator_id {
            return Err(DomainError::NotGameCreator(creator_id).into());
        }
        Ok(game.creator().clone())
    }

    /// Subscribes the participant. Broadcasts are queued until the actor writes them out.
    fn create(
        coordinator: Arc<GameCoordinator>,
        game_id: GameId,
        role: Role,
        websocket: WebSocket,
        inactivity_timeout: Duration,
    ) -> ConnectionActor {
        let (sender, broadcast_receiver) = mpsc::unbounded_channel();
        let callback: BroadcastCallback = Arc::new(move |message: &BroadcastMessage| {
            if sender.send(message.clone()).is_err() {
                log::debug!("Dropped a broadcast for a closed connection. GameId: '{game_id}'.");
            }
        });

        let subscription = match &role {
            Role::Player(player) => {
                coordinator
                    .registry()
                    .subscribe_player(game_id, player, callback)
            }
            Role::Creator(creator) => {
                coordinator
                    .registry()
                    .subscribe_creator(game_id, creator, callback)
            }
        };

        ConnectionActor {
            game_id,
            role,
            subscription,
            coordinator,
            broadcast_receiver,
            websocket,
            inactivity_timeout,
        }
    }

    async fn start(mut self) {
        self.role.gauge().inc();
        log::info!(
            "Connection opened. GameId: '{}', Nickname: '{}'.",
            self.game_id,
            self.role.nickname()
        );

        loop {
            select! {
                broadcast = self.broadcast_receiver.recv() => {
                    match self.receive_broadcast(broadcast).await {
                        Ok(true) => {},
                        Ok(false) => break,
                        Err(error) => {
                            log::info!("Could not forward a broadcast. GameId: '{}', Error: '{error}'.", self.game_id);
                            break;
                        }
                    }
                },
                websocket_message = timeout(self.inactivity_timeout, self.websocket.recv()) => {
                    if let Err(error) = self.receive_websocket_message(websocket_message).await {
                        if !matches!(error, Error::WebsocketClosed(_)) {
                            send_error(&mut self.websocket, &error).await;
                        }
                        if ConnectionActor::should_close_websocket(&error) {
                            break;
                        }
                    }
                },
            }
        }

        let registry = self.coordinator.registry();
        match &self.role {
            Role::Player(player) => {
                registry.release_player(self.game_id, player.id, self.subscription)
            }
            Role::Creator(_) => registry.release_creator(self.game_id, self.subscription),
        };
        close(self.websocket).await;
        self.role.gauge().dec();
    }

    fn should_close_websocket(error: &Error) -> bool {
        match error {
            Error::Internal(_) => true,
            Error::WebsocketClosed(_) => true,
            Error::UnprocessableMessage(_, _) => false,
            Error::Domain(_) => false,
        }
    }

    /// Writes the broadcast out. Returns whether the connection should stay open.
    async fn receive_broadcast(
        &mut self,
        broadcast: Option<BroadcastMessage>,
    ) -> Result<bool, Error> {
        match broadcast {
            Some(message) => {
                send_message(&mut self.websocket, &message).await?;
                Ok(message != BroadcastMessage::FinishGame)
            }
            None => Ok(false),
        }
    }

    async fn receive_websocket_message(
        &mut self,
        websocket_message: Result<Option<Result<Message, axum::Error>>, Elapsed>,
    ) -> Result<(), Error> {
        match websocket_message {
            Ok(Some(Ok(Message::Text(text)))) => match text.as_str() {
                "ping" => send_message_string(&mut self.websocket, "pong").await,
                message => self.dispatch(message).await,
            },
            Ok(Some(Ok(Message::Ping(_) | Message::Pong(_)))) => Ok(()),
            // browser said "close"
            Ok(Some(Ok(Message::Close(_)))) => {
                Err(self.connection_lost("browser sent 'Close' websocket frame"))
            }
            // websocket was closed
            Ok(None) => Err(self.connection_lost("other end of websocket was closed abruptly")),
            // timeout without receiving anything
            Err(_) => Err(self.connection_lost("connection timed out; missing 'ping' messages")),
            Ok(Some(Err(error))) => {
                Err(self.connection_lost(&format!("websocket error '{error}'")))
            }
            Ok(Some(Ok(Message::Binary(_)))) => Err(Error::UnprocessableMessage(
                "Unsupported message type".to_string(),
                "Binary".to_string(),
            )),
        }
    }

    async fn dispatch(&mut self, message: &str) -> Result<(), Error> {
        match &self.role {
            Role::Player(player) => {
                let message = PlayerMessage::parse(message)?;
                log::debug!(
                    "Player message received. GameId: '{}', PlayerId: '{}', Action: '{:?}'.",
                    self.game_id,
                    player.id,
                    message.action()
                );
                self.coordinator
                    .handle_player_message(self.game_id, player.id, message)
                    .await;
            }
            Role::Creator(_) => {
                let message = CreatorMessage::parse(message)?;
                log::debug!(
                    "Creator message received. GameId: '{}', Action: '{:?}'.",
                    self.game_id,
                    message.action
                );
                self.coordinator
                    .handle_creator_message(self.game_id, message)
                    .await;
            }
        }
        Ok(())
    }

    fn connection_lost(&self, reason: &str) -> Error {
        log::info!(
            "Connection with {} lost due to: {}. GameId: '{}'.",
            self.role.nickname(),
            reason,
            self.game_id
        );
        Error::WebsocketClosed(reason.to_string())
    }
}
