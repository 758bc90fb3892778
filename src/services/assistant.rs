//! Assistant service: coder, tutor, and artist panels.
//!
//! DESIGN
//! ======
//! Each panel is one LLM round trip framed by store operations:
//! - coder: replay the coder history plus the new turn, persist both turns
//! - tutor: same on the tutor panel, with recent coder turns folded into the
//!   system prompt as learning context
//! - artist: generate Mermaid from a prompt, clean it with
//!   [`crate::mermaid::sanitize`], and persist it as a diagram
//!
//! Every call is admitted by `admit` before anything is written: the token
//! estimate is reserved and the request counted against the per-user and
//! global limits. A rejected call leaves no stored turn and no recorded
//! request. The reservation is settled against the usage the provider
//! reports.

use std::sync::{Arc, OnceLock};

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::llm::LlmChat;
use crate::llm::types::{ChatRequest, ChatResponse, LlmError, Message, Role};
use crate::mermaid;
use crate::rate_limit::RateLimitError;
use crate::state::AppState;

use super::store::{self, ChatMessage, Diagram, NewDiagram, Panel, StoreError};

const DEFAULT_AI_MAX_TOKENS: u32 = 2048;
const MAX_INPUT_CHARS: usize = 20_000;
/// Most recent turns replayed to the model.
const HISTORY_LIMIT: usize = 40;
const CONTEXT_MESSAGES: usize = 5;
const CONTEXT_SNIPPET_CHARS: usize = 200;

const CHAT_TEMPERATURE: f32 = 0.7;
const DIAGRAM_TEMPERATURE: f32 = 0.5;

pub const CODER_SYSTEM_PROMPT: &str = "You are an expert coding assistant. Help users write code, debug issues, \
and learn programming concepts. Provide clear explanations and code examples. Be concise but thorough.";

pub const TUTOR_SYSTEM_PROMPT: &str = "You are a personalized learning assistant. Provide clear explanations, \
tutorials, and guidance. Be patient and adapt your teaching to the learner's level.";

pub const ARTIST_SYSTEM_PROMPT: &str = "You are an expert at creating diagrams using Mermaid.js syntax. When given \
a description, generate valid Mermaid.js code for flowcharts, sequence diagrams, class diagrams, or other diagram \
types. Only respond with the Mermaid code, no explanations or markdown code blocks.";

pub const EMPTY_REPLY: &str = "I apologize, but I couldn't generate a response.";

/// Stored when sanitizing the model output leaves nothing.
pub const FALLBACK_DIAGRAM: &str = "graph TD\n    A[Error] --> B[\"Could not generate diagram\"]";

fn ai_max_tokens() -> u32 {
    static VALUE: OnceLock<u32> = OnceLock::new();
    *VALUE.get_or_init(|| {
        std::env::var("AI_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_AI_MAX_TOKENS)
    })
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("LLM not configured")]
    LlmNotConfigured,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("rate limited: {0}")]
    RateLimited(#[from] RateLimitError),
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The stored user turn and the stored reply.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelExchange {
    pub user_message: ChatMessage,
    pub assistant_message: ChatMessage,
}

// =============================================================================
// REQUEST BUILDING
// =============================================================================

fn clean_input(field: &str, raw: &str) -> Result<String, AssistantError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AssistantError::InvalidInput(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > MAX_INPUT_CHARS {
        return Err(AssistantError::InvalidInput(format!("{field} exceeds {MAX_INPUT_CHARS} characters")));
    }
    Ok(trimmed.to_string())
}

/// Stored turns followed by the new user turn, capped to [`HISTORY_LIMIT`].
fn history_messages(history: &[ChatMessage], latest: &str) -> Vec<Message> {
    let skip = (history.len() + 1).saturating_sub(HISTORY_LIMIT);
    history
        .iter()
        .skip(skip)
        .map(|m| Message { role: m.role, content: m.content.clone() })
        .chain(std::iter::once(Message::user(latest)))
        .collect()
}

fn snippet(content: &str) -> String {
    content.chars().take(CONTEXT_SNIPPET_CHARS).collect()
}

/// Summarize the last few coder turns, one `role: text` line each.
pub(crate) fn coder_context(coder_history: &[ChatMessage]) -> Option<String> {
    let skip = coder_history.len().saturating_sub(CONTEXT_MESSAGES);
    let lines: Vec<String> = coder_history
        .iter()
        .skip(skip)
        .map(|m| format!("{}: {}", m.role.as_str(), snippet(&m.content)))
        .collect();
    if lines.is_empty() { None } else { Some(lines.join("\n")) }
}

pub(crate) fn coder_request(history: &[ChatMessage], latest: &str) -> ChatRequest {
    ChatRequest {
        system: CODER_SYSTEM_PROMPT.to_string(),
        messages: history_messages(history, latest),
        max_tokens: ai_max_tokens(),
        temperature: CHAT_TEMPERATURE,
    }
}

pub(crate) fn tutor_system_prompt(coder_history: &[ChatMessage]) -> String {
    match coder_context(coder_history) {
        Some(context) => format!("{TUTOR_SYSTEM_PROMPT}\n\nContext from the user's recent coding work:\n{context}"),
        None => TUTOR_SYSTEM_PROMPT.to_string(),
    }
}

pub(crate) fn tutor_request(
    tutor_history: &[ChatMessage],
    coder_history: &[ChatMessage],
    latest: &str,
) -> ChatRequest {
    ChatRequest {
        system: tutor_system_prompt(coder_history),
        messages: history_messages(tutor_history, latest),
        max_tokens: ai_max_tokens(),
        temperature: CHAT_TEMPERATURE,
    }
}

pub(crate) fn artist_request(prompt: &str, coder_history: &[ChatMessage]) -> ChatRequest {
    let content = match coder_context(coder_history) {
        Some(context) => format!("Context from the user's recent coding work:\n{context}\n\nDiagram request: {prompt}"),
        None => prompt.to_string(),
    };
    ChatRequest {
        system: ARTIST_SYSTEM_PROMPT.to_string(),
        messages: vec![Message::user(content)],
        max_tokens: ai_max_tokens(),
        temperature: DIAGRAM_TEMPERATURE,
    }
}

/// Sanitized Mermaid source for a completion, or [`FALLBACK_DIAGRAM`].
#[must_use]
pub fn diagram_code(completion: &str) -> String {
    let code = mermaid::sanitize(completion);
    if code.is_empty() { FALLBACK_DIAGRAM.to_string() } else { code }
}

fn reply_text(completion: &str) -> &str {
    let trimmed = completion.trim();
    if trimmed.is_empty() { EMPTY_REPLY } else { trimmed }
}

/// Token reservation for a request: the output cap plus roughly four
/// characters per prompt token.
pub(crate) fn estimate_tokens(request: &ChatRequest) -> u64 {
    let chars = request.system.len() + request.messages.iter().map(|m| m.content.len()).sum::<usize>();
    u64::from(request.max_tokens).saturating_add(u64::try_from(chars / 4).unwrap_or(u64::MAX))
}

// =============================================================================
// LLM CALL
// =============================================================================

fn llm_client(state: &AppState) -> Result<Arc<dyn LlmChat>, AssistantError> {
    state.llm.clone().ok_or(AssistantError::LlmNotConfigured)
}

/// Reserve tokens for `request` and count it against the request limits.
/// Returns the reservation to settle once the call finishes.
///
/// # Errors
///
/// Returns [`AssistantError::RateLimited`] with nothing reserved or recorded.
pub(crate) fn admit(state: &AppState, user_id: Uuid, request: &ChatRequest) -> Result<u64, AssistantError> {
    let reserved = estimate_tokens(request);
    state.rate_limiter.reserve_tokens(user_id, reserved)?;
    if let Err(e) = state.rate_limiter.check_and_record(user_id) {
        state.rate_limiter.release_tokens(user_id, reserved);
        return Err(e.into());
    }
    Ok(reserved)
}

/// Run one rate-limited completion on behalf of `user_id`.
///
/// # Errors
///
/// Returns [`AssistantError::RateLimited`] before calling the provider when a
/// limit is hit, or the provider's [`LlmError`].
pub async fn complete(state: &AppState, user_id: Uuid, request: &ChatRequest) -> Result<ChatResponse, AssistantError> {
    let llm = llm_client(state)?;
    let reserved = admit(state, user_id, request)?;
    call_admitted(state, llm.as_ref(), user_id, request, reserved).await
}

async fn call_admitted(
    state: &AppState,
    llm: &dyn LlmChat,
    user_id: Uuid,
    request: &ChatRequest,
    reserved: u64,
) -> Result<ChatResponse, AssistantError> {
    match llm.chat(request).await {
        Ok(response) => {
            state
                .rate_limiter
                .record_tokens(user_id, response.total_tokens(), reserved);
            info!(
                %user_id,
                model = %response.model,
                input_tokens = response.input_tokens,
                output_tokens = response.output_tokens,
                "llm completion"
            );
            Ok(response)
        }
        Err(e) => {
            state.rate_limiter.release_tokens(user_id, reserved);
            warn!(%user_id, error = %e, retryable = e.retryable(), "llm completion failed");
            Err(e.into())
        }
    }
}

// =============================================================================
// PANELS
// =============================================================================

async fn chat_panel(
    state: &AppState,
    user_id: Uuid,
    workspace_id: Uuid,
    panel: Panel,
    message: &str,
) -> Result<PanelExchange, AssistantError> {
    let llm = llm_client(state)?;
    let message = clean_input("message", message)?;
    let pool = &state.pool;

    let history = store::list_messages(pool, user_id, workspace_id, panel).await?;
    let request = match panel {
        Panel::Coder => coder_request(&history, &message),
        Panel::Tutor => {
            let coder_history = store::list_messages(pool, user_id, workspace_id, Panel::Coder).await?;
            tutor_request(&history, &coder_history, &message)
        }
    };

    let reserved = admit(state, user_id, &request)?;
    let user_message =
        match store::create_message(pool, user_id, workspace_id, panel, Role::User, &message).await {
            Ok(stored) => stored,
            Err(e) => {
                state.rate_limiter.release_tokens(user_id, reserved);
                return Err(e.into());
            }
        };

    let response = call_admitted(state, llm.as_ref(), user_id, &request, reserved).await?;
    let reply = reply_text(&response.text);
    let assistant_message =
        store::create_message(pool, user_id, workspace_id, panel, Role::Assistant, reply).await?;

    Ok(PanelExchange { user_message, assistant_message })
}

/// Coder panel turn.
///
/// # Errors
///
/// See [`AssistantError`].
pub async fn coder(
    state: &AppState,
    user_id: Uuid,
    workspace_id: Uuid,
    message: &str,
) -> Result<PanelExchange, AssistantError> {
    chat_panel(state, user_id, workspace_id, Panel::Coder, message).await
}

/// Tutor panel turn, informed by recent coder activity.
///
/// # Errors
///
/// See [`AssistantError`].
pub async fn tutor(
    state: &AppState,
    user_id: Uuid,
    workspace_id: Uuid,
    message: &str,
) -> Result<PanelExchange, AssistantError> {
    chat_panel(state, user_id, workspace_id, Panel::Tutor, message).await
}

/// Generate, sanitize, and store a diagram.
///
/// # Errors
///
/// See [`AssistantError`].
pub async fn artist(
    state: &AppState,
    user_id: Uuid,
    workspace_id: Uuid,
    prompt: &str,
    include_context: bool,
) -> Result<Diagram, AssistantError> {
    llm_client(state)?;
    let prompt = clean_input("prompt", prompt)?;
    let pool = &state.pool;

    let coder_history = if include_context {
        store::list_messages(pool, user_id, workspace_id, Panel::Coder).await?
    } else {
        store::ensure_workspace(pool, user_id, workspace_id).await?;
        Vec::new()
    };

    let request = artist_request(&prompt, &coder_history);
    let response = complete(state, user_id, &request).await?;
    let mermaid_code = diagram_code(&response.text);
    if mermaid_code == FALLBACK_DIAGRAM {
        warn!(%workspace_id, raw_len = response.text.len(), "no diagram in completion; storing fallback");
    }

    let diagram = store::create_diagram(
        pool,
        user_id,
        NewDiagram { workspace_id, prompt: &prompt, mermaid_code: &mermaid_code },
    )
    .await?;
    info!(%workspace_id, diagram_id = %diagram.id, code_len = mermaid_code.len(), "diagram stored");
    Ok(diagram)
}

#[cfg(test)]
#[path = "assistant_test.rs"]
mod tests;
