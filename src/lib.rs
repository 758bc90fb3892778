//! Fusion: a multi-panel AI workspace server.
//!
//! SYSTEM CONTEXT
//! ==============
//! Users own workspaces with three assistant panels. The coder and tutor
//! panels are persisted chats; the artist panel turns prompts into Mermaid
//! diagrams, cleaned by [`mermaid::sanitize`] before they are stored.
//! Reminders hang off the user, optionally tagged with a workspace.

pub mod db;
pub mod llm;
pub mod mermaid;
pub mod rate_limit;
pub mod routes;
pub mod services;
pub mod state;
