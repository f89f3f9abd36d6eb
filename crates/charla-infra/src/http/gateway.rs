//! HttpGateway -- concrete [`ChatGateway`] implementation over reqwest.
//!
//! Sends requests to the remote assistant service and classifies every
//! failure into a [`GatewayError`]: transport failures become
//! `NetworkUnreachable`, HTTP statuses map onto the typed variants, and a
//! `success: false` envelope on a 2xx response is treated as a rejection
//! with the server-supplied error as detail.
//!
//! The bearer token is attached opportunistically: when the
//! [`BearerSource`] has no valid token the request goes out without an
//! `Authorization` header and the server answers 401 on protected routes.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use charla_core::gateway::{BearerSource, ChatGateway};
use charla_types::chat::{ChatId, ChatMessage, ChatSummary};
use charla_types::config::ClientConfig;
use charla_types::error::GatewayError;
use charla_types::wire::{
    AckResponse, AnonymousSendRequest, AuthPayload, AuthResponse, AuthenticatedSendRequest,
    ChatsResponse, CreateChatResponse, CreatedChat, LoginRequest, MessagesResponse,
    RegisterRequest, SendReply, SendResponse,
};

/// Reqwest-backed client for the remote assistant service.
pub struct HttpGateway<B: BearerSource> {
    client: reqwest::Client,
    chat_base_url: String,
    auth_base_url: String,
    bearer: Arc<B>,
}

impl<B: BearerSource> HttpGateway<B> {
    pub fn new(config: &ClientConfig, bearer: Arc<B>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            chat_base_url: config.chat_base_url.trim_end_matches('/').to_string(),
            auth_base_url: config.auth_base_url.trim_end_matches('/').to_string(),
            bearer,
        }
    }

    /// Override both base URLs (useful for tests against a local server).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.chat_base_url = base_url.trim_end_matches('/').to_string();
        self.auth_base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn chat_url(&self, path: &str) -> String {
        format!("{}{path}", self.chat_base_url)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}{path}", self.auth_base_url)
    }

    /// Attach the bearer token when one is available.
    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.bearer.bearer() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Send a prepared request, classify the status, and decode the body.
    async fn execute<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = req
            .send()
            .await
            .map_err(|e| GatewayError::NetworkUnreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "Assistant service returned an error status");
            return Err(classify_status(status.as_u16(), &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Malformed(format!("failed to parse response: {e}")))
    }

    async fn post_json<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        url: String,
        body: &Req,
        authorized: bool,
    ) -> Result<Resp, GatewayError> {
        let mut req = self.client.post(&url).json(body);
        if authorized {
            req = self.authorize(req);
        }
        self.execute(req).await
    }
}

impl<B: BearerSource> ChatGateway for HttpGateway<B> {
    async fn register(&self, req: RegisterRequest) -> Result<AuthPayload, GatewayError> {
        let resp: AuthResponse = self
            .post_json(self.auth_url("/register/"), &req, false)
            .await?;
        into_auth_payload(resp)
    }

    async fn login(&self, req: LoginRequest) -> Result<AuthPayload, GatewayError> {
        let resp: AuthResponse = self.post_json(self.auth_url("/login/"), &req, false).await?;
        into_auth_payload(resp)
    }

    async fn logout(&self) -> Result<(), GatewayError> {
        let req = self.authorize(self.client.post(self.auth_url("/logout/")));
        let resp: AckResponse = self.execute(req).await?;
        into_ack(resp)
    }

    async fn send_anonymous(&self, req: AnonymousSendRequest) -> Result<SendReply, GatewayError> {
        let resp: SendResponse = self
            .post_json(self.chat_url("/chat/nologin"), &req, false)
            .await?;
        into_send_reply(resp)
    }

    async fn send_authenticated(
        &self,
        req: AuthenticatedSendRequest,
    ) -> Result<SendReply, GatewayError> {
        let resp: SendResponse = self.post_json(self.chat_url("/chat/"), &req, true).await?;
        into_send_reply(resp)
    }

    async fn list_chats(&self) -> Result<Vec<ChatSummary>, GatewayError> {
        let req = self.authorize(self.client.get(self.chat_url("/chats/")));
        let resp: ChatsResponse = self.execute(req).await?;
        into_summaries(resp)
    }

    async fn list_messages(&self, chat_id: &ChatId) -> Result<Vec<ChatMessage>, GatewayError> {
        let url = self.chat_url(&format!("/chats/{chat_id}/messages/"));
        let req = self.authorize(self.client.get(url));
        let resp: MessagesResponse = self.execute(req).await?;
        into_messages(resp)
    }

    async fn create_chat(&self) -> Result<CreatedChat, GatewayError> {
        let req = self.authorize(self.client.post(self.chat_url("/chats/new/")));
        let resp: CreateChatResponse = self.execute(req).await?;
        into_created_chat(resp)
    }

    async fn delete_chat(&self, chat_id: &ChatId) -> Result<(), GatewayError> {
        let url = self.chat_url(&format!("/chats/{chat_id}/"));
        let req = self.authorize(self.client.delete(url));
        let resp: AckResponse = self.execute(req).await?;
        into_ack(resp)
    }
}

// ---------------------------------------------------------------------------
// Status and envelope classification
// ---------------------------------------------------------------------------

/// Map a non-2xx status to its typed error.
fn classify_status(status: u16, body: &str) -> GatewayError {
    match status {
        401 => GatewayError::Unauthorized,
        404 => GatewayError::NotFound,
        400 => GatewayError::BadRequest(error_detail(body)),
        _ => GatewayError::ServerError {
            status,
            detail: error_detail(body),
        },
    }
}

/// Pull the `error` field out of a JSON error body, falling back to the raw
/// text (truncated) when the body is not the expected shape.
fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(error) = value.get("error").and_then(|e| e.as_str())
    {
        return error.to_string();
    }
    let mut detail = body.trim().to_string();
    if detail.chars().count() > 200 {
        detail = detail.chars().take(200).collect();
    }
    if detail.is_empty() {
        "request failed".to_string()
    } else {
        detail
    }
}

/// A `success: false` envelope on a 2xx response.
fn rejection(error: Option<String>) -> GatewayError {
    GatewayError::BadRequest(error.unwrap_or_else(|| "request rejected by server".to_string()))
}

fn into_auth_payload(resp: AuthResponse) -> Result<AuthPayload, GatewayError> {
    if !resp.success {
        return Err(rejection(resp.error));
    }
    match (resp.user, resp.tokens) {
        (Some(user), Some(tokens)) => Ok(AuthPayload { user, tokens }),
        _ => Err(GatewayError::Malformed(
            "auth response missing user or tokens".to_string(),
        )),
    }
}

fn into_send_reply(resp: SendResponse) -> Result<SendReply, GatewayError> {
    if !resp.success {
        return Err(rejection(resp.error));
    }
    match resp.response {
        Some(response) => Ok(SendReply {
            response,
            chat_id: resp.chat_id,
        }),
        None => Err(GatewayError::Malformed(
            "send response missing assistant reply".to_string(),
        )),
    }
}

fn into_summaries(resp: ChatsResponse) -> Result<Vec<ChatSummary>, GatewayError> {
    if !resp.success {
        return Err(rejection(resp.error));
    }
    Ok(resp.chats.into_iter().map(|c| c.into_summary()).collect())
}

fn into_messages(resp: MessagesResponse) -> Result<Vec<ChatMessage>, GatewayError> {
    if !resp.success {
        return Err(rejection(resp.error));
    }
    Ok(resp
        .messages
        .into_iter()
        .map(|m| m.into_message())
        .collect())
}

fn into_created_chat(resp: CreateChatResponse) -> Result<CreatedChat, GatewayError> {
    if !resp.success {
        return Err(rejection(resp.error));
    }
    match resp.chat_id {
        Some(chat_id) => Ok(CreatedChat {
            chat_id,
            was_created: resp.was_created,
        }),
        None => Err(GatewayError::Malformed(
            "create response missing chat id".to_string(),
        )),
    }
}

fn into_ack(resp: AckResponse) -> Result<(), GatewayError> {
    if !resp.success {
        return Err(rejection(resp.error));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoToken;

    impl BearerSource for NoToken {
        fn bearer(&self) -> Option<String> {
            None
        }
    }

    fn make_gateway() -> HttpGateway<NoToken> {
        HttpGateway::new(&ClientConfig::default(), Arc::new(NoToken))
    }

    #[test]
    fn test_url_building() {
        let gw = make_gateway().with_base_url("http://localhost:9999/");
        assert_eq!(gw.chat_url("/chat/nologin"), "http://localhost:9999/chat/nologin");
        assert_eq!(
            gw.chat_url(&format!("/chats/{}/messages/", ChatId::from("c1"))),
            "http://localhost:9999/chats/c1/messages/"
        );
        assert_eq!(gw.auth_url("/login/"), "http://localhost:9999/login/");
    }

    #[test]
    fn test_default_config_splits_auth_base() {
        let gw = make_gateway();
        assert_eq!(gw.chat_url("/chats/"), "http://localhost:8080/chats/");
        assert_eq!(
            gw.auth_url("/register/"),
            "http://localhost:8080/api/auth/register/"
        );
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(401, ""), GatewayError::Unauthorized);
        assert_eq!(classify_status(404, ""), GatewayError::NotFound);
        assert_eq!(
            classify_status(400, r#"{"error": "bad email"}"#),
            GatewayError::BadRequest("bad email".to_string())
        );
        assert_eq!(
            classify_status(503, "unavailable"),
            GatewayError::ServerError {
                status: 503,
                detail: "unavailable".to_string()
            }
        );
    }

    #[test]
    fn test_error_detail_falls_back_to_raw_body() {
        assert_eq!(error_detail(r#"{"error": "nope"}"#), "nope");
        assert_eq!(error_detail("plain text"), "plain text");
        assert_eq!(error_detail(""), "request failed");
        assert_eq!(error_detail(r#"{"detail": "other shape"}"#), r#"{"detail": "other shape"}"#);
    }

    #[test]
    fn test_success_false_envelope_is_rejection() {
        let resp = SendResponse {
            success: false,
            error: Some("model overloaded".to_string()),
            response: None,
            session_id: None,
            chat_id: None,
        };
        assert_eq!(
            into_send_reply(resp).unwrap_err(),
            GatewayError::BadRequest("model overloaded".to_string())
        );
    }

    #[test]
    fn test_success_without_reply_is_malformed() {
        let resp = SendResponse {
            success: true,
            error: None,
            response: None,
            session_id: None,
            chat_id: None,
        };
        assert!(matches!(
            into_send_reply(resp).unwrap_err(),
            GatewayError::Malformed(_)
        ));
    }

    #[test]
    fn test_auth_payload_requires_user_and_tokens() {
        let resp = AuthResponse {
            success: true,
            error: None,
            user: None,
            tokens: None,
        };
        assert!(matches!(
            into_auth_payload(resp).unwrap_err(),
            GatewayError::Malformed(_)
        ));
    }

    #[test]
    fn test_created_chat_requires_id() {
        let resp = CreateChatResponse {
            success: true,
            error: None,
            chat_id: None,
            was_created: true,
        };
        assert!(matches!(
            into_created_chat(resp).unwrap_err(),
            GatewayError::Malformed(_)
        ));
    }
}
