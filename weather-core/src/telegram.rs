//! Minimal Telegram Bot API client: long polling and plain text replies.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{fmt::Debug, time::Duration};

const API_BASE: &str = "https://api.telegram.org";

/// Extra time given to a long poll on top of the server-side wait.
const POLL_MARGIN: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("failed to call Telegram {method}: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Telegram {method} failed: {description}")]
    Api {
        method: &'static str,
        description: String,
    },

    #[error("failed to parse Telegram {method} response: {source}")]
    Decode {
        method: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: String,
}

impl User {
    /// Username if the user has one, otherwise the first name.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.first_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Body of a `sendMessage` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
}

impl Reply {
    pub fn plain(chat_id: i64, text: impl Into<String>) -> Self {
        Self { chat_id, text: text.into(), reply_to_message_id: None }
    }

    /// A reply threaded under the message it answers.
    pub fn to(message: &Message, text: impl Into<String>) -> Self {
        Self {
            chat_id: message.chat.id,
            text: text.into(),
            reply_to_message_id: Some(message.message_id),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[async_trait]
pub trait Messenger: Send + Sync + Debug {
    async fn send_message(&self, reply: &Reply) -> Result<(), TelegramError>;
}

#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: Client,
    api_url: String,
}

impl TelegramClient {
    pub fn new(bot_token: &str) -> Self {
        Self::with_base_url(bot_token, API_BASE)
    }

    pub fn with_base_url(bot_token: &str, base_url: &str) -> Self {
        Self {
            http: Client::new(),
            api_url: format!("{}/bot{}", base_url.trim_end_matches('/'), bot_token),
        }
    }

    /// The bot's own account.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &serde_json::json!({}), None).await
    }

    /// Long-poll for updates with `update_id >= offset`, waiting up to `timeout_secs`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        let wait = Duration::from_secs(timeout_secs) + POLL_MARGIN;

        self.call("getUpdates", &request, Some(wait)).await
    }

    async fn call<B, T>(
        &self,
        method: &'static str,
        body: &B,
        timeout: Option<Duration>,
    ) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.http.post(format!("{}/{}", self.api_url, method)).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response_text = request
            .send()
            .await
            .map_err(|source| TelegramError::Transport {
                method,
                source: source.without_url(),
            })?
            .text()
            .await
            .map_err(|source| TelegramError::Transport {
                method,
                source: source.without_url(),
            })?;

        // Error statuses still carry an `ok: false` envelope.
        let response: ApiResponse<T> = serde_json::from_str(&response_text)
            .map_err(|source| TelegramError::Decode { method, source })?;

        if !response.ok {
            return Err(TelegramError::Api {
                method,
                description: response.description.unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        response.result.ok_or_else(|| TelegramError::Api {
            method,
            description: "response has no result".to_string(),
        })
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_message(&self, reply: &Reply) -> Result<(), TelegramError> {
        let _: serde_json::Value = self.call("sendMessage", reply, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn get_updates_parses_messages() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/botTOKEN/getUpdates"))
            .and(body_partial_json(serde_json::json!({"offset": 10, "timeout": 0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": [
                    {
                        "update_id": 10,
                        "message": {
                            "message_id": 3,
                            "from": {"id": 42, "is_bot": false, "first_name": "Ann", "username": "ann"},
                            "chat": {"id": 42, "type": "private"},
                            "date": 0,
                            "text": "/weather"
                        }
                    },
                    {"update_id": 11}
                ]
            })))
            .mount(&server)
            .await;

        let client = TelegramClient::with_base_url("TOKEN", &server.uri());
        let updates = client.get_updates(10, 0).await.unwrap();

        assert_eq!(updates.len(), 2);
        let message = updates[0].message.as_ref().unwrap();
        assert_eq!(message.text.as_deref(), Some("/weather"));
        assert_eq!(message.from.as_ref().unwrap().display_name(), "ann");
        assert!(updates[1].message.is_none());
    }

    #[tokio::test]
    async fn send_message_posts_reply() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .and(body_json(serde_json::json!({
                "chat_id": 42,
                "text": "hi",
                "reply_to_message_id": 3
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": {"message_id": 4}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = TelegramClient::with_base_url("TOKEN", &server.uri());
        let reply = Reply { chat_id: 42, text: "hi".into(), reply_to_message_id: Some(3) };

        client.send_message(&reply).await.unwrap();
    }

    #[tokio::test]
    async fn api_errors_carry_description() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .mount(&server)
            .await;

        let client = TelegramClient::with_base_url("TOKEN", &server.uri());
        let err = client.send_message(&Reply::plain(1, "hi")).await.unwrap_err();

        assert!(matches!(err, TelegramError::Api { .. }));
        assert!(err.to_string().contains("chat not found"));
    }

    #[tokio::test]
    async fn get_me_returns_bot_account() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/botTOKEN/getMe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": true,
                "result": {"id": 1, "is_bot": true, "first_name": "Weather", "username": "weather_bot"}
            })))
            .mount(&server)
            .await;

        let client = TelegramClient::with_base_url("TOKEN", &server.uri());
        let me = client.get_me().await.unwrap();

        assert_eq!(me.username.as_deref(), Some("weather_bot"));
    }

    #[tokio::test]
    async fn transport_errors_do_not_leak_the_token() {
        let client = TelegramClient::with_base_url("SECRET_BOT_TOKEN", "http://127.0.0.1:1");

        let err = client.get_updates(0, 0).await.unwrap_err();

        assert!(matches!(err, TelegramError::Transport { method: "getUpdates", .. }));
        assert!(!err.to_string().contains("SECRET_BOT_TOKEN"));
        assert!(!format!("{err:?}").contains("SECRET_BOT_TOKEN"));
    }

    #[test]
    fn plain_replies_are_not_threaded() {
        let json = serde_json::to_value(Reply::plain(5, "hello")).unwrap();
        assert_eq!(json, serde_json::json!({"chat_id": 5, "text": "hello"}));
    }
}
