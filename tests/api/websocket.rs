use crate::helpers::test_app::TestApp;
use crate::helpers::test_connection::{
    NextQuestionContent, PlayerAnsweredContent, TestConnection, WsMessageIn,
};
use crate::helpers::test_game::TestGame;

/// Connects the creator and then every player, draining the participant broadcasts on the way.
async fn connect_everybody(
    game: &TestGame,
    player_ids: &[String],
) -> (TestConnection, Vec<TestConnection>) {
    let mut creator = game.connect_creator().await;
    let participants = creator.receive_participants().await;
    assert_eq!(participants.creator.unwrap().id, game.creator_id());
    assert!(participants.players.is_empty());

    let mut players: Vec<TestConnection> = vec![];
    for player_id in player_ids {
        let mut player = game.connect_player(player_id).await;
        let participants = player.receive_participants().await;
        assert_eq!(participants.players.len(), players.len() + 1);
        assert!(participants
            .players
            .iter()
            .any(|player| &player.id == player_id));
        for other in players.iter_mut() {
            assert_eq!(other.receive_participants().await, participants);
        }
        assert_eq!(creator.receive_participants().await, participants);
        players.push(player);
    }

    (creator, players)
}

#[tokio::test]
async fn participants_are_broadcast_on_connection() {
    let (game, player_ids) = TestApp::create_started_game().await;

    let mut p1 = game.connect_player(&player_ids[0]).await;
    let participants = p1.receive_participants().await;
    assert!(participants.creator.is_none());
    assert_eq!(participants.players.len(), 1);
    assert_eq!(participants.players[0].nickname, "p1");

    let mut creator = game.connect_creator().await;
    let participants = creator.receive_participants().await;
    assert_eq!(p1.receive_participants().await, participants);
    assert_eq!(
        participants.creator.unwrap().nickname,
        "Grumpy Walrus".to_string()
    );
    assert_eq!(participants.players.len(), 1);
}

#[tokio::test]
async fn a_whole_game_can_be_played() {
    let (game, player_ids) = TestApp::create_started_game().await;
    let (mut creator, mut players) = connect_everybody(&game, &player_ids).await;
    let first_question = &game.game.quiz.questions[0];

    creator.next_question().await;
    let expected = WsMessageIn::Next {
        content: NextQuestionContent {
            question_id: first_question.id.clone(),
        },
    };
    assert_eq!(creator.receive().await.unwrap(), expected);
    for player in players.iter_mut() {
        assert_eq!(player.receive().await.unwrap(), expected);
    }

    players[0].answer(&first_question.options[1].id).await;
    let expected = WsMessageIn::Answered {
        content: PlayerAnsweredContent {
            player_id: player_ids[0].clone(),
        },
    };
    assert_eq!(creator.receive().await.unwrap(), expected);
    for player in players.iter_mut() {
        assert_eq!(player.receive().await.unwrap(), expected);
    }

    creator.finish().await;
    assert_eq!(creator.receive().await.unwrap(), WsMessageIn::Finish);
    creator.assert_closed().await;
    for player in players.iter_mut() {
        assert_eq!(player.receive().await.unwrap(), WsMessageIn::Finish);
        player.assert_closed().await;
    }
}

#[tokio::test]
async fn rejected_actions_are_not_broadcast() {
    let (game, player_ids) = TestApp::create_started_game().await;
    let (mut creator, mut players) = connect_everybody(&game, &player_ids).await;
    let question = &game.game.quiz.questions[0];

    // No question is in progress yet, the pong tells the answer was handled
    players[0].answer(&question.options[0].id).await;
    players[0].send_text("ping").await;
    assert_eq!(players[0].receive_text().await.unwrap(), "pong");

    creator.next_question().await;
    let expected = WsMessageIn::Next {
        content: NextQuestionContent {
            question_id: question.id.clone(),
        },
    };
    assert_eq!(players[0].receive().await.unwrap(), expected);

    let answered = |player_id: &String| WsMessageIn::Answered {
        content: PlayerAnsweredContent {
            player_id: player_id.clone(),
        },
    };
    players[0].answer(&question.options[0].id).await;
    assert_eq!(players[0].receive().await.unwrap(), answered(&player_ids[0]));

    // A second answer to the same question is refused
    players[0].answer(&question.options[1].id).await;
    players[0].send_text("ping").await;
    assert_eq!(players[0].receive_text().await.unwrap(), "pong");

    players[1].answer(&question.options[2].id).await;
    assert_eq!(players[0].receive().await.unwrap(), answered(&player_ids[1]));

    assert_eq!(creator.receive().await.unwrap(), expected);
    assert_eq!(creator.receive().await.unwrap(), answered(&player_ids[0]));
    assert_eq!(creator.receive().await.unwrap(), answered(&player_ids[1]));
}

#[tokio::test]
async fn unknown_player_is_refused() {
    let (game, _) = TestApp::create_started_game().await;

    let mut stranger = game
        .connect_player("1f0c4d2e-8b9a-4c6d-9e3f-5a7b1c2d3e4f")
        .await;

    assert_eq!(stranger.receive_error().await, "PLAYER_NOT_IN_GAME");
    stranger.assert_closed().await;
}

#[tokio::test]
async fn wrong_creator_is_refused() {
    let (game, _) = TestApp::create_started_game().await;

    let mut impostor = TestConnection::new(
        game.app
            .open_websocket(&format!(
                "/game/{}/creator/1f0c4d2e-8b9a-4c6d-9e3f-5a7b1c2d3e4f/ws",
                game.id()
            ))
            .await
            .unwrap(),
    );

    assert_eq!(impostor.receive_error().await, "NOT_GAME_CREATOR");
    impostor.assert_closed().await;
}

#[tokio::test]
async fn unknown_game_is_refused() {
    let app = TestApp::spawn_app().await;

    let mut connection = TestConnection::new(
        app.open_websocket(
            "/game/7a6c5b2e-51b0-4e4b-9a8e-0a3c77f1a2d4/players/1f0c4d2e-8b9a-4c6d-9e3f-5a7b1c2d3e4f/ws",
        )
        .await
        .unwrap(),
    );

    assert_eq!(connection.receive_error().await, "GAME_DOES_NOT_EXIST");
    connection.assert_closed().await;
}

#[tokio::test]
async fn invalid_messages_get_an_error_and_keep_the_connection() {
    let (game, player_ids) = TestApp::create_started_game().await;
    let mut player = game.connect_player(&player_ids[0]).await;
    let _ = player.receive_participants().await;

    player.send_text(r#"{"action":"dance"}"#).await;
    assert_eq!(player.receive_error().await, "UNPROCESSABLE_MESSAGE");

    player.send_text(r#"{"action":"answer"}"#).await;
    assert_eq!(player.receive_error().await, "UNPROCESSABLE_MESSAGE");

    player
        .send_text(
            r#"{"action":"answer","content":{"optionID":"00000000-0000-0000-0000-000000000000"}}"#,
        )
        .await;
    assert_eq!(player.receive_error().await, "UNPROCESSABLE_MESSAGE");

    player.send_text("ping").await;
    assert_eq!(player.receive_text().await.unwrap(), "pong");
}

#[tokio::test]
async fn inactive_connections_are_unsubscribed() {
    let (game, player_ids) = TestApp::create_started_game().await;
    let mut p1 = game.connect_player(&player_ids[0]).await;
    let _ = p1.receive_participants().await;

    tokio::time::sleep(game.app.inactivity_timeout * 2).await;
    p1.assert_closed().await;

    let mut p2 = game.connect_player(&player_ids[1]).await;
    let participants = p2.receive_participants().await;
    assert_eq!(participants.players.len(), 1);
    assert_eq!(participants.players[0].id, player_ids[1]);
}

#[tokio::test]
async fn ping_keeps_the_connection_alive() {
    let (game, player_ids) = TestApp::create_started_game().await;
    let mut p1 = game.connect_player(&player_ids[0]).await;
    let _ = p1.receive_participants().await;

    for _ in 0..4 {
        tokio::time::sleep(game.app.inactivity_timeout / 2).await;
        p1.send_text("ping").await;
        assert_eq!(p1.receive_text().await.unwrap(), "pong");
    }

    let mut p2 = game.connect_player(&player_ids[1]).await;
    let participants = p2.receive_participants().await;
    assert_eq!(participants.players.len(), 2);
    assert_eq!(p1.receive_participants().await, participants);
}

#[tokio::test]
async fn leaving_player_is_removed_from_participants() {
    let (game, player_ids) = TestApp::create_started_game().await;
    let (mut creator, mut players) = connect_everybody(&game, &player_ids).await;

    let leaving = players.remove(0);
    drop(leaving);

    let participants = creator.receive_participants().await;
    assert_eq!(participants.players.len(), 1);
    assert_eq!(participants.players[0].id, player_ids[1]);
    assert_eq!(players[0].receive_participants().await, participants);
}

#[tokio::test]
async fn reconnecting_creator_keeps_the_subscription() {
    let (game, player_ids) = TestApp::create_started_game().await;
    let mut p1 = game.connect_player(&player_ids[0]).await;
    let _ = p1.receive_participants().await;

    let mut first = game.connect_creator().await;
    let _ = first.receive_participants().await;
    let _ = p1.receive_participants().await;

    let mut second = game.connect_creator().await;
    let participants = second.receive_participants().await;
    assert_eq!(p1.receive_participants().await, participants);

    // The replaced connection ends without touching the new subscription
    first.assert_closed().await;

    second.finish().await;
    assert_eq!(second.receive().await.unwrap(), WsMessageIn::Finish);
    assert_eq!(p1.receive().await.unwrap(), WsMessageIn::Finish);
}

#[tokio::test]
async fn reconnecting_player_keeps_the_subscription() {
    let (game, player_ids) = TestApp::create_started_game().await;
    let mut creator = game.connect_creator().await;
    let _ = creator.receive_participants().await;

    let mut first = game.connect_player(&player_ids[0]).await;
    let _ = first.receive_participants().await;
    let _ = creator.receive_participants().await;

    let mut second = game.connect_player(&player_ids[0]).await;
    let participants = second.receive_participants().await;
    assert_eq!(participants.players.len(), 1);
    assert_eq!(creator.receive_participants().await, participants);

    first.assert_closed().await;

    creator.finish().await;
    assert_eq!(creator.receive().await.unwrap(), WsMessageIn::Finish);
    assert_eq!(second.receive().await.unwrap(), WsMessageIn::Finish);
}
