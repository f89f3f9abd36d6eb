//! Transport abstraction over the remote assistant service.
//!
//! One method per remote operation. Inputs arrive already validated; every
//! method returns a typed outcome and never lets transport or decoding
//! failures escape as anything but [`GatewayError`]. Uses RPITIT (native
//! async fn in traits, Rust 2024 edition). The HTTP implementation lives in
//! charla-infra.

use charla_types::chat::{ChatId, ChatMessage, ChatSummary};
use charla_types::error::GatewayError;
use charla_types::wire::{
    AnonymousSendRequest, AuthPayload, AuthenticatedSendRequest, CreatedChat, LoginRequest,
    RegisterRequest, SendReply,
};

/// Source of the current `Authorization: Bearer` value.
///
/// Implemented by the token store; returning `None` makes the gateway send
/// the request without an auth header, so callers merge it unconditionally.
pub trait BearerSource: Send + Sync {
    fn bearer(&self) -> Option<String>;
}

/// Stateless client for the remote assistant service.
pub trait ChatGateway: Send + Sync {
    /// Create an account. On success the server also logs the user in.
    fn register(
        &self,
        req: RegisterRequest,
    ) -> impl std::future::Future<Output = Result<AuthPayload, GatewayError>> + Send;

    /// Exchange credentials for a token pair.
    fn login(
        &self,
        req: LoginRequest,
    ) -> impl std::future::Future<Output = Result<AuthPayload, GatewayError>> + Send;

    /// Invalidate the server-side session. Requires auth.
    fn logout(&self) -> impl std::future::Future<Output = Result<(), GatewayError>> + Send;

    /// Send a message in the anonymous, non-persisted scope.
    fn send_anonymous(
        &self,
        req: AnonymousSendRequest,
    ) -> impl std::future::Future<Output = Result<SendReply, GatewayError>> + Send;

    /// Send a message as the authenticated user. Requires auth. When
    /// `req.chat_id` is absent the server may create a conversation and echo
    /// its id back in the reply.
    fn send_authenticated(
        &self,
        req: AuthenticatedSendRequest,
    ) -> impl std::future::Future<Output = Result<SendReply, GatewayError>> + Send;

    /// List the user's conversations, most recent first. Requires auth.
    fn list_chats(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSummary>, GatewayError>> + Send;

    /// Full message history of one conversation, in server order. Requires auth.
    fn list_messages(
        &self,
        chat_id: &ChatId,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, GatewayError>> + Send;

    /// Create a new empty conversation, or reuse an existing empty one --
    /// the server decides and reports which via `was_created`. Requires auth.
    fn create_chat(
        &self,
    ) -> impl std::future::Future<Output = Result<CreatedChat, GatewayError>> + Send;

    /// Delete a conversation. Requires auth.
    fn delete_chat(
        &self,
        chat_id: &ChatId,
    ) -> impl std::future::Future<Output = Result<(), GatewayError>> + Send;
}
