//! Live subscriptions per game and the broadcast primitive.
//!
//! Each game owns a [`GameSubscriptions`] behind its own mutex. The mutex is held for a mutation
//! and for the broadcast it triggers, so every subscriber of a game observes the same order of
//! messages. Callbacks run while that lock is held and must not call back into the registry for
//! the same game.

use std::collections::{BTreeMap, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::coordinator::broadcast::{BroadcastMessage, Participant};
use crate::game::id::GameId;
use crate::game::id::PlayerId;
use crate::game::{Creator, Player};
use crate::metrics::{BROADCASTS, FAILED_DELIVERIES};

/// Delivers one message to one connected endpoint. Best effort, no acknowledgement.
pub type BroadcastCallback = Arc<dyn Fn(&BroadcastMessage) + Send + Sync>;

/// Identifies one subscription, so a connection only ever releases its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionId(u64);

struct Subscriber {
    subscription: SubscriptionId,
    participant: Participant,
    callback: BroadcastCallback,
}

#[derive(Default)]
struct GameSubscriptions {
    creator: Option<Subscriber>,
    players: BTreeMap<PlayerId, Subscriber>,
}

impl GameSubscriptions {
    fn participants_changed(&self) -> BroadcastMessage {
        BroadcastMessage::participants_changed(
            self.creator
                .as_ref()
                .map(|creator| creator.participant.clone()),
            self.players
                .values()
                .map(|player| player.participant.clone())
                .collect(),
        )
    }

    fn deliver(&self, game_id: GameId, message: &BroadcastMessage) -> usize {
        let delivered = self
            .players
            .values()
            .chain(self.creator.iter())
            .filter(|subscriber| Self::invoke(game_id, subscriber, message))
            .count();
        BROADCASTS.inc();
        log::debug!(
            "Broadcast delivered. GameId: '{game_id}', Type: '{}', Delivered: '{delivered}'.",
            message.kind()
        );
        delivered
    }

    fn invoke(game_id: GameId, subscriber: &Subscriber, message: &BroadcastMessage) -> bool {
        let callback = &subscriber.callback;
        match panic::catch_unwind(AssertUnwindSafe(|| callback(message))) {
            Ok(()) => true,
            Err(_) => {
                FAILED_DELIVERIES.inc();
                log::error!(
                    "A subscriber callback panicked, skipping it. GameId: '{game_id}', ParticipantId: '{}', Type: '{}'.",
                    subscriber.participant.id,
                    message.kind()
                );
                false
            }
        }
    }
}

/// Process-wide bookkeeping of who is connected to which game.
#[derive(Default)]
pub struct SubscriptionRegistry {
    games: Mutex<HashMap<GameId, Arc<Mutex<GameSubscriptions>>>>,
    next_subscription: AtomicU64,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the player's callback, replacing any previous one for the same player, and
    /// broadcasts the new participants to everybody including the player.
    pub fn subscribe_player(
        &self,
        game_id: GameId,
        player: &Player,
        callback: BroadcastCallback,
    ) -> SubscriptionId {
        let subscription = self.next_subscription_id();
        let game = self.game_or_create(game_id);
        let mut subscriptions = lock(&game);
        subscriptions.players.insert(
            player.id,
            Subscriber {
                subscription,
                participant: player.into(),
                callback,
            },
        );
        log::info!(
            "Player subscribed. GameId: '{game_id}', PlayerId: '{}', Players: '{}'.",
            player.id,
            subscriptions.players.len()
        );
        let message = subscriptions.participants_changed();
        subscriptions.deliver(game_id, &message);
        subscription
    }

    /// Removing an absent player is not an error; the participants are broadcast either way.
    pub fn unsubscribe_player(&self, game_id: GameId, player_id: PlayerId) {
        let Some(game) = self.game(game_id) else {
            log::debug!("Unsubscribed a player from a game without subscriptions. GameId: '{game_id}', PlayerId: '{player_id}'.");
            return;
        };
        let mut subscriptions = lock(&game);
        if subscriptions.players.remove(&player_id).is_some() {
            log::info!("Player unsubscribed. GameId: '{game_id}', PlayerId: '{player_id}'.");
        }
        let message = subscriptions.participants_changed();
        subscriptions.deliver(game_id, &message);
    }

    /// Like [`Self::unsubscribe_player`], but only when the player's subscription is still
    /// `subscription`. A connection replaced by a newer one leaves the newer one alone. Returns
    /// whether anything was removed; participants are broadcast only in that case.
    pub fn release_player(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        subscription: SubscriptionId,
    ) -> bool {
        let Some(game) = self.game(game_id) else {
            return false;
        };
        let mut subscriptions = lock(&game);
        let owned = subscriptions
            .players
            .get(&player_id)
            .is_some_and(|subscriber| subscriber.subscription == subscription);
        if !owned {
            log::debug!("Kept a newer player subscription. GameId: '{game_id}', PlayerId: '{player_id}'.");
            return false;
        }
        subscriptions.players.remove(&player_id);
        log::info!("Player unsubscribed. GameId: '{game_id}', PlayerId: '{player_id}'.");
        let message = subscriptions.participants_changed();
        subscriptions.deliver(game_id, &message);
        true
    }

    /// The last creator to subscribe wins.
    pub fn subscribe_creator(
        &self,
        game_id: GameId,
        creator: &Creator,
        callback: BroadcastCallback,
    ) -> SubscriptionId {
        let subscription = self.next_subscription_id();
        let game = self.game_or_create(game_id);
        let mut subscriptions = lock(&game);
        if subscriptions.creator.is_some() {
            log::warn!("Replacing the creator subscription. GameId: '{game_id}', CreatorId: '{}'.", creator.id);
        }
        subscriptions.creator = Some(Subscriber {
            subscription,
            participant: creator.into(),
            callback,
        });
        log::info!("Creator subscribed. GameId: '{game_id}', CreatorId: '{}'.", creator.id);
        let message = subscriptions.participants_changed();
        subscriptions.deliver(game_id, &message);
        subscription
    }

    pub fn unsubscribe_creator(&self, game_id: GameId) {
        let Some(game) = self.game(game_id) else {
            log::debug!("Unsubscribed a creator from a game without subscriptions. GameId: '{game_id}'.");
            return;
        };
        let mut subscriptions = lock(&game);
        if subscriptions.creator.take().is_some() {
            log::info!("Creator unsubscribed. GameId: '{game_id}'.");
        }
        let message = subscriptions.participants_changed();
        subscriptions.deliver(game_id, &message);
    }

    /// Clears the creator only when it is still `subscription`. Returns whether it was cleared.
    pub fn release_creator(&self, game_id: GameId, subscription: SubscriptionId) -> bool {
        let Some(game) = self.game(game_id) else {
            return false;
        };
        let mut subscriptions = lock(&game);
        let owned = subscriptions
            .creator
            .as_ref()
            .is_some_and(|creator| creator.subscription == subscription);
        if !owned {
            log::debug!("Kept a newer creator subscription. GameId: '{game_id}'.");
            return false;
        }
        subscriptions.creator = None;
        log::info!("Creator unsubscribed. GameId: '{game_id}'.");
        let message = subscriptions.participants_changed();
        subscriptions.deliver(game_id, &message);
        true
    }

    /// Delivers `message` to every player and then to the creator, synchronously. Returns how
    /// many callbacks completed without panicking.
    pub fn broadcast(&self, game_id: GameId, message: &BroadcastMessage) -> usize {
        match self.game(game_id) {
            Some(game) => lock(&game).deliver(game_id, message),
            None => {
                log::warn!(
                    "Nobody is subscribed to the game, dropping the broadcast. GameId: '{game_id}', Type: '{}'.",
                    message.kind()
                );
                0
            }
        }
    }

    /// Snapshot of the participants currently subscribed to a game.
    pub fn participants(&self, game_id: GameId) -> Option<BroadcastMessage> {
        self.game(game_id)
            .map(|game| lock(&game).participants_changed())
    }

    fn next_subscription_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed))
    }

    fn game(&self, game_id: GameId) -> Option<Arc<Mutex<GameSubscriptions>>> {
        lock(&self.games).get(&game_id).cloned()
    }

    fn game_or_create(&self, game_id: GameId) -> Arc<Mutex<GameSubscriptions>> {
        Arc::clone(lock(&self.games).entry(game_id).or_default())
    }
}

// Callbacks are isolated with catch_unwind, so a poisoned lock still holds consistent data
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
