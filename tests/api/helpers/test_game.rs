use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use super::test_app::TestApp;
use super::test_connection::TestConnection;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub id: String,
    pub code: Option<String>,
    pub state: String,
    pub player_limit: usize,
    pub quiz: QuizResponse,
    pub players: Vec<ParticipantResponse>,
    pub current_question: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub name: String,
    pub creator: ParticipantResponse,
    pub questions: Vec<QuestionResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: String,
    pub title: String,
    pub duration_in_seconds: u64,
    pub order: i32,
    pub options: Vec<OptionResponse>,
}

#[derive(Debug, Deserialize)]
pub struct OptionResponse {
    pub id: String,
    pub text: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ParticipantResponse {
    pub id: String,
    pub nickname: String,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub title: String,
    pub detail: String,
}

pub struct TestGame {
    pub app: TestApp,
    pub game: GameResponse,
}

impl TestGame {
    pub fn id(&self) -> &str {
        &self.game.id
    }

    pub fn creator_id(&self) -> &str {
        &self.game.quiz.creator.id
    }

    pub async fn start(&mut self) -> Result<(), (StatusCode, ErrorResponse)> {
        let response = self
            .app
            .post(&format!("/game/{}/start", self.id()), &json!({}))
            .await;
        if !response.status().is_success() {
            return Err(TestGame::error(response).await);
        }

        self.game = response.json().await.expect("Failed to parse the GameResponse.");
        assert_eq!(self.game.state, "Started");
        Ok(())
    }

    pub async fn add_player(
        &self,
        nickname: &str,
    ) -> Result<ParticipantResponse, (StatusCode, ErrorResponse)> {
        let response = self
            .app
            .post(
                &format!("/game/{}/players", self.id()),
                &json!({ "nickname": nickname }),
            )
            .await;
        if !response.status().is_success() {
            return Err(TestGame::error(response).await);
        }

        let player: ParticipantResponse = response
            .json()
            .await
            .expect("Failed to parse the player.");
        assert_eq!(player.nickname, nickname);
        Ok(player)
    }

    pub async fn connect_player(&self, player_id: &str) -> TestConnection {
        TestConnection::new(
            self.app
                .open_websocket(&format!("/game/{}/players/{player_id}/ws", self.id()))
                .await
                .unwrap(),
        )
    }

    pub async fn connect_creator(&self) -> TestConnection {
        TestConnection::new(
            self.app
                .open_websocket(&format!(
                    "/game/{}/creator/{}/ws",
                    self.id(),
                    self.creator_id()
                ))
                .await
                .unwrap(),
        )
    }

    async fn error(response: reqwest::Response) -> (StatusCode, ErrorResponse) {
        let status = response.status();
        let error: ErrorResponse = response
            .json()
            .await
            .expect("Failed to parse the ErrorResponse.");
        assert!(!error.title.is_empty());
        assert!(!error.detail.is_empty());
        (status, error)
    }
}
