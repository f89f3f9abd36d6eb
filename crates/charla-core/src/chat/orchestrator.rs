//! The chat orchestrator: the one component the presentation layer talks to.
//!
//! Receives user input, decides whether the anonymous or authenticated flow
//! applies, drives gateway calls, and keeps the registry and message store
//! consistent with the remote side. Every remote failure produces an
//! observable effect: a transcript-visible synthetic assistant notice, or
//! (for an expired session) a delayed redirect-to-login signal.
//!
//! Suspension only happens at gateway boundaries; all local mutation is done
//! synchronously under one lock once a response is in hand. The one shared
//! resource needing explicit discipline is the per-conversation in-flight
//! send flag: a second send while one is pending is rejected, never queued.
//! There is no cancellation for an in-flight send and no automatic token
//! refresh; an expired token fails fast with `ChatError::Unauthenticated`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use charla_types::chat::{ChatId, ChatMessage, ChatSummary, ConversationKey};
use charla_types::error::{AuthError, ChatError, GatewayError};
use charla_types::identity::User;
use charla_types::wire::{
    AnonymousSendRequest, AuthenticatedSendRequest, LoginRequest, NO_MESSAGES, RegisterRequest,
};
use chrono::Utc;
use dashmap::DashMap;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info, warn};

use crate::auth::token_store::TokenStore;
use crate::auth::validate::{non_empty_message, validate_login, validate_registration};
use crate::chat::messages::MessageStore;
use crate::chat::registry::ChatRegistry;
use crate::gateway::ChatGateway;
use crate::session::AnonymousSession;
use crate::signal::{SignalBus, UiSignal};
use crate::storage::AuthVault;

/// How long after an expired-session notice the redirect signal fires,
/// giving the user time to read the notice.
pub const LOGIN_REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// Title given to a placeholder summary when the post-send list refresh
/// fails (the registry must never be missing the active conversation).
const PLACEHOLDER_TITLE: &str = "New chat";

/// User-facing classification of a failed send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 401: the token was rejected; a login redirect will follow.
    SessionExpired,
    /// 404: the conversation or endpoint is gone / backend unreachable.
    BackendMissing,
    /// Anything else: generic connectivity trouble.
    Connectivity,
}

impl FailureKind {
    pub fn classify(err: &GatewayError) -> Self {
        match err {
            GatewayError::Unauthorized => FailureKind::SessionExpired,
            GatewayError::NotFound => FailureKind::BackendMissing,
            _ => FailureKind::Connectivity,
        }
    }

    /// The synthetic assistant message appended to the transcript.
    pub fn notice(&self) -> &'static str {
        match self {
            FailureKind::SessionExpired => "Your session has expired. Redirecting to login...",
            FailureKind::BackendMissing => {
                "The assistant service could not be reached. Is the backend running?"
            }
            FailureKind::Connectivity => "Connection error. Please try again later.",
        }
    }
}

/// Result of a send that made it past local validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The assistant replied; the transcript holds the exchange.
    Replied,
    /// The send failed; a synthetic notice was appended to the transcript.
    Failed(FailureKind),
}

/// Registry and message store, mutated together under one lock.
#[derive(Default)]
struct ChatState {
    registry: ChatRegistry,
    messages: MessageStore,
}

/// Releases the per-conversation in-flight flag when the send resolves.
struct SendGuard<'a> {
    in_flight: &'a DashMap<String, ()>,
    key: String,
}

impl Drop for SendGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
    }
}

/// Coordinator over the token store, anonymous session, conversation
/// registry, and message store.
///
/// Generic over [`ChatGateway`] and [`AuthVault`] so transport and
/// persistence stay swappable (charla-core never depends on charla-infra).
pub struct ChatOrchestrator<G: ChatGateway, V: AuthVault> {
    gateway: G,
    tokens: Arc<TokenStore<V>>,
    session: AnonymousSession,
    state: Mutex<ChatState>,
    in_flight: DashMap<String, ()>,
    signals: SignalBus,
    redirect_pending: AtomicBool,
}

impl<G: ChatGateway, V: AuthVault> ChatOrchestrator<G, V> {
    pub fn new(gateway: G, tokens: Arc<TokenStore<V>>, signals: SignalBus) -> Self {
        Self {
            gateway,
            tokens,
            session: AnonymousSession::new(),
            state: Mutex::new(ChatState::default()),
            in_flight: DashMap::new(),
            signals,
            redirect_pending: AtomicBool::new(false),
        }
    }

    // --- Read access for the presentation layer ---

    /// Snapshot of one conversation's transcript.
    pub async fn transcript(&self, key: &ConversationKey) -> Vec<ChatMessage> {
        self.state.lock().await.messages.for_conversation(key).to_vec()
    }

    /// Snapshot of the conversation list, in server order.
    pub async fn chats(&self) -> Vec<ChatSummary> {
        self.state.lock().await.registry.list().to_vec()
    }

    pub async fn active_id(&self) -> Option<ChatId> {
        self.state.lock().await.registry.active_id().cloned()
    }

    /// Transcript key for the authenticated view: the active conversation,
    /// or the draft partition when composing a brand-new one.
    pub async fn active_key(&self) -> ConversationKey {
        match self.active_id().await {
            Some(id) => ConversationKey::Chat(id),
            None => ConversationKey::Draft,
        }
    }

    /// Transcript key for the anonymous view.
    pub fn anonymous_key(&self) -> ConversationKey {
        ConversationKey::Anonymous(self.session.ensure_id())
    }

    pub fn current_user(&self) -> Option<User> {
        self.tokens.current_user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_valid()
    }

    /// Subscribe to out-of-band UI signals (login redirect).
    pub fn subscribe(&self) -> broadcast::Receiver<UiSignal> {
        self.signals.subscribe()
    }

    // --- Auth flows ---

    /// Create an account and install the returned identity.
    pub async fn register_user(
        &self,
        username: &str,
        email: &str,
        password: &SecretString,
        confirm: &SecretString,
    ) -> Result<User, AuthError> {
        validate_registration(
            username,
            email,
            password.expose_secret(),
            confirm.expose_secret(),
        )?;
        let payload = self
            .gateway
            .register(RegisterRequest {
                username: username.to_string(),
                email: email.to_string(),
                password: password.expose_secret().to_string(),
            })
            .await?;
        self.tokens
            .set_tokens(payload.tokens, payload.user.clone())
            .await?;
        self.redirect_pending.store(false, Ordering::SeqCst);
        info!(username = %payload.user.username, "Registered and logged in");
        Ok(payload.user)
    }

    /// Exchange credentials for an identity.
    pub async fn login_user(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<User, AuthError> {
        validate_login(username, password.expose_secret())?;
        let payload = self
            .gateway
            .login(LoginRequest {
                username: username.to_string(),
                password: password.expose_secret().to_string(),
            })
            .await?;
        self.tokens
            .set_tokens(payload.tokens, payload.user.clone())
            .await?;
        self.redirect_pending.store(false, Ordering::SeqCst);
        info!(username = %payload.user.username, "Logged in");
        Ok(payload.user)
    }

    /// End the session. Local identity and chat state are cleared even when
    /// the server-side logout fails.
    pub async fn logout(&self) -> Result<(), AuthError> {
        if let Err(err) = self.gateway.logout().await {
            warn!(error = %err, "Server logout failed; clearing local identity anyway");
        }
        self.tokens.clear().await?;
        *self.state.lock().await = ChatState::default();
        info!("Logged out");
        Ok(())
    }

    // --- Sends ---

    /// Send in the anonymous scope, creating the session id on first use.
    ///
    /// The user's message is appended optimistically before the network call
    /// resolves; on failure a synthetic notice follows it, so the transcript
    /// always shows the user's own message.
    pub async fn start_anonymous(&self, text: &str) -> Result<SendOutcome, ChatError> {
        let message = non_empty_message(text)?;
        let session_id = self.session.ensure_id();
        let key = ConversationKey::Anonymous(session_id.clone());
        let _guard = self.begin_send(&key)?;

        self.state
            .lock()
            .await
            .messages
            .append(&key, ChatMessage::user(message.clone()));

        match self
            .gateway
            .send_anonymous(AnonymousSendRequest {
                message,
                session_id,
            })
            .await
        {
            Ok(reply) => {
                self.state
                    .lock()
                    .await
                    .messages
                    .append(&key, ChatMessage::assistant(reply.response));
                Ok(SendOutcome::Replied)
            }
            // Anonymous sends carry no token, so no redirect is scheduled.
            Err(err) => Ok(self.record_send_failure(&key, &err, false).await),
        }
    }

    /// First authenticated send. Fails fast with `Unauthenticated` when no
    /// valid token is held; the caller decides how to route to login.
    pub async fn start_authenticated(&self, text: &str) -> Result<SendOutcome, ChatError> {
        if !self.tokens.is_valid() {
            return Err(ChatError::Unauthenticated);
        }
        self.send_authenticated_flow(text).await
    }

    /// Send to the active conversation (or the draft when none is active).
    ///
    /// A 401 here surfaces as an expired-session notice plus a delayed
    /// redirect signal; 404 as a backend-missing notice; anything else as a
    /// generic connectivity notice.
    pub async fn send_to_active(&self, text: &str) -> Result<SendOutcome, ChatError> {
        self.send_authenticated_flow(text).await
    }

    async fn send_authenticated_flow(&self, text: &str) -> Result<SendOutcome, ChatError> {
        let message = non_empty_message(text)?;
        let (key, chat_id) = {
            let state = self.state.lock().await;
            match state.registry.active_id() {
                Some(id) => (ConversationKey::Chat(id.clone()), Some(id.clone())),
                None => (ConversationKey::Draft, None),
            }
        };
        let _guard = self.begin_send(&key)?;

        self.state
            .lock()
            .await
            .messages
            .append(&key, ChatMessage::user(message.clone()));

        let result = self
            .gateway
            .send_authenticated(AuthenticatedSendRequest {
                message: message.clone(),
                chat_id,
            })
            .await;

        match result {
            Ok(reply) => {
                let new_id = {
                    let mut state = self.state.lock().await;
                    match (&key, reply.chat_id.clone()) {
                        (ConversationKey::Draft, Some(id)) => {
                            // Promote the draft partition to its
                            // server-assigned conversation id.
                            let mut history = state.messages.for_conversation(&key).to_vec();
                            history.push(ChatMessage::assistant(reply.response));
                            state
                                .messages
                                .replace(&ConversationKey::Chat(id.clone()), history);
                            state.messages.clear(&key);
                            state.registry.set_active(Some(id.clone()));
                            Some(id)
                        }
                        _ => {
                            state
                                .messages
                                .append(&key, ChatMessage::assistant(reply.response));
                            None
                        }
                    }
                };
                if let Some(id) = new_id {
                    info!(chat_id = %id, "Server assigned a conversation to this send");
                    self.refresh_chats_or_placeholder(&id, &message).await;
                }
                Ok(SendOutcome::Replied)
            }
            Err(err) => Ok(self.record_send_failure(&key, &err, true).await),
        }
    }

    // --- Conversation management ---

    /// Full conversation-list refresh, superseding local summaries.
    pub async fn refresh_chats(&self) -> Result<(), GatewayError> {
        let chats = self.gateway.list_chats().await?;
        debug!(count = chats.len(), "Conversation list refreshed");
        self.state.lock().await.registry.replace_all(chats);
        Ok(())
    }

    /// Make a conversation active and load its authoritative history.
    ///
    /// Returns whether the conversation is "started" (has a non-empty
    /// transcript). The active pointer moves even when the history fetch
    /// fails, so the caller's view tracks the selection.
    pub async fn select_conversation(&self, id: ChatId) -> Result<bool, GatewayError> {
        self.state
            .lock()
            .await
            .registry
            .set_active(Some(id.clone()));
        let history = self.gateway.list_messages(&id).await?;
        let started = !history.is_empty();
        self.state
            .lock()
            .await
            .messages
            .replace(&ConversationKey::Chat(id.clone()), history);
        debug!(chat_id = %id, started, "Selected conversation");
        Ok(started)
    }

    /// Ask the server for a fresh empty conversation (or an existing empty
    /// one -- the server decides) and make it active with an empty
    /// transcript. The registry is only re-fetched when the server reports
    /// an actual creation.
    pub async fn start_new_conversation(&self) -> Result<ChatId, GatewayError> {
        let created = self.gateway.create_chat().await?;
        {
            let mut state = self.state.lock().await;
            state.messages.clear(&ConversationKey::Draft);
            state
                .messages
                .clear(&ConversationKey::Chat(created.chat_id.clone()));
            state.registry.set_active(Some(created.chat_id.clone()));
        }
        if created.was_created {
            info!(chat_id = %created.chat_id, "Server created a new conversation");
            self.refresh_chats_or_placeholder(&created.chat_id, NO_MESSAGES)
                .await;
        } else {
            debug!(chat_id = %created.chat_id, "Server reused an existing empty conversation");
        }
        Ok(created.chat_id)
    }

    /// Delete a conversation. A server-side 404 counts as already deleted
    /// and still removes the local copy. When the deleted conversation was
    /// active, the first remaining conversation takes over; with none left,
    /// a new conversation is started.
    pub async fn delete_conversation(&self, id: &ChatId) -> Result<(), GatewayError> {
        match self.gateway.delete_chat(id).await {
            Ok(()) => {}
            Err(GatewayError::NotFound) => {
                debug!(chat_id = %id, "Conversation already gone server-side; removing locally");
            }
            Err(err) => return Err(err),
        }

        let (was_active, next) = {
            let mut state = self.state.lock().await;
            state.registry.remove(id);
            state.messages.clear(&ConversationKey::Chat(id.clone()));
            let was_active = state.registry.active_id() == Some(id);
            let next = state.registry.first_id();
            if was_active {
                state.registry.set_active(None);
            }
            (was_active, next)
        };
        info!(chat_id = %id, "Conversation deleted");

        if was_active {
            match next {
                Some(next_id) => {
                    if let Err(err) = self.select_conversation(next_id.clone()).await {
                        warn!(chat_id = %next_id, error = %err,
                            "History refresh for reassigned conversation failed");
                    }
                }
                None => {
                    self.start_new_conversation().await?;
                }
            }
        }
        Ok(())
    }

    // --- Internals ---

    /// Claim the in-flight flag for a conversation, or reject the send.
    fn begin_send(&self, key: &ConversationKey) -> Result<SendGuard<'_>, ChatError> {
        use dashmap::mapref::entry::Entry;
        match self.in_flight.entry(key.to_string()) {
            Entry::Occupied(_) => Err(ChatError::SendInFlight),
            Entry::Vacant(slot) => {
                let key = slot.key().clone();
                slot.insert(());
                Ok(SendGuard {
                    in_flight: &self.in_flight,
                    key,
                })
            }
        }
    }

    /// Append the synthetic failure notice and, for an expired session,
    /// schedule the one-shot delayed redirect signal.
    async fn record_send_failure(
        &self,
        key: &ConversationKey,
        err: &GatewayError,
        allow_redirect: bool,
    ) -> SendOutcome {
        let kind = FailureKind::classify(err);
        warn!(conversation = %key, error = %err, ?kind, "Send failed");
        self.state
            .lock()
            .await
            .messages
            .append(key, ChatMessage::assistant(kind.notice()));
        if allow_redirect && kind == FailureKind::SessionExpired {
            self.schedule_login_redirect();
        }
        SendOutcome::Failed(kind)
    }

    /// Fire `RedirectToLogin` once after the fixed delay. Repeated expiry
    /// failures collapse into a single signal; the flag resets on the next
    /// successful login or registration.
    fn schedule_login_redirect(&self) {
        if self.redirect_pending.swap(true, Ordering::SeqCst) {
            return;
        }
        let signals = self.signals.clone();
        tokio::spawn(async move {
            tokio::time::sleep(LOGIN_REDIRECT_DELAY).await;
            signals.publish(UiSignal::RedirectToLogin);
        });
    }

    /// Refresh the registry after the server assigned a new conversation.
    /// When the refresh itself fails, a placeholder summary keeps the
    /// registry consistent with the active pointer; the next successful
    /// refresh supersedes it.
    async fn refresh_chats_or_placeholder(&self, id: &ChatId, preview: &str) {
        match self.gateway.list_chats().await {
            Ok(chats) => {
                self.state.lock().await.registry.replace_all(chats);
            }
            Err(err) => {
                warn!(chat_id = %id, error = %err,
                    "Conversation list refresh failed; installing placeholder summary");
                let mut state = self.state.lock().await;
                if !state.registry.contains(id) {
                    state.registry.upsert(ChatSummary {
                        id: id.clone(),
                        title: PLACEHOLDER_TITLE.to_string(),
                        last_message: preview.to_string(),
                        last_activity: Utc::now(),
                    });
                }
            }
        }
    }
}
