use std::time::Duration;

use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};

use super::test_game::ParticipantResponse;

const RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum WsMessageIn {
    #[serde(rename = "participants")]
    Participants {
        #[serde(rename = "participantsContent")]
        content: ParticipantsContent,
    },
    #[serde(rename = "next")]
    Next {
        #[serde(rename = "nextQuestionContent")]
        content: NextQuestionContent,
    },
    #[serde(rename = "answered")]
    Answered {
        #[serde(rename = "playerAnsweredContent")]
        content: PlayerAnsweredContent,
    },
    #[serde(rename = "finish")]
    Finish,
    #[serde(rename = "error")]
    Error {
        #[serde(rename = "errorContent")]
        content: ErrorContent,
    },
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct ParticipantsContent {
    pub creator: Option<ParticipantResponse>,
    pub players: Vec<ParticipantResponse>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct NextQuestionContent {
    #[serde(rename = "questionID")]
    pub question_id: String,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct PlayerAnsweredContent {
    #[serde(rename = "playerID")]
    pub player_id: String,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct ErrorContent {
    pub code: String,
    pub title: String,
    pub detail: String,
}

pub struct TestConnection {
    pub tx: SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>,
    pub rx: SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>,
}

impl TestConnection {
    pub fn new(websocket: WebSocketStream<MaybeTlsStream<TcpStream>>) -> TestConnection {
        let (tx, rx) = websocket.split();
        TestConnection { tx, rx }
    }

    pub async fn receive_text(&mut self) -> Result<String, String> {
        match timeout(RECEIVE_TIMEOUT, self.rx.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => Ok(text),
            Ok(Some(Ok(message))) => Err(format!("Received an unexpected frame {message:?}")),
            Ok(Some(Err(error))) => Err(format!("Websocket returned an error {error}")),
            Ok(None) => Err("Websocket closed before expected.".to_string()),
            Err(_) => Err("Timed out waiting for a message.".to_string()),
        }
    }

    pub async fn receive(&mut self) -> Result<WsMessageIn, String> {
        let text = self.receive_text().await?;
        serde_json::from_str(&text)
            .map_err(|error| format!("Could not parse the message. Error: '{error}'."))
    }

    pub async fn receive_participants(&mut self) -> ParticipantsContent {
        match self.receive().await {
            Ok(WsMessageIn::Participants { content }) => content,
            other => panic!("Expected participants, received {other:?}"),
        }
    }

    /// Returns the error code of the next frame.
    pub async fn receive_error(&mut self) -> String {
        match self.receive().await {
            Ok(WsMessageIn::Error { content }) => {
                assert!(!content.title.is_empty());
                assert!(!content.detail.is_empty());
                content.code
            }
            other => panic!("Expected an error, received {other:?}"),
        }
    }

    /// The server ends the connection: either a close frame or the end of the stream.
    pub async fn assert_closed(&mut self) {
        match timeout(RECEIVE_TIMEOUT, self.rx.next()).await {
            Ok(None) | Ok(Some(Ok(Message::Close(_)))) | Ok(Some(Err(_))) => {}
            other => panic!("Expected the websocket to be closed, received {other:?}"),
        }
    }

    pub async fn send_text(&mut self, text: &str) {
        self.tx
            .send(Message::Text(text.to_string()))
            .await
            .expect("Could not send message");
    }

    pub async fn send_json(&mut self, value: Value) {
        self.send_text(&value.to_string()).await;
    }

    pub async fn answer(&mut self, option_id: &str) {
        self.send_json(json!({"action": "answer", "content": {"optionID": option_id}}))
            .await;
    }

    pub async fn next_question(&mut self) {
        self.send_json(json!({"action": "next"})).await;
    }

    pub async fn finish(&mut self) {
        self.send_json(json!({"action": "finish"})).await;
    }
}
