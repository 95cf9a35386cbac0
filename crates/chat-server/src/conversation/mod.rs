//! Per-session chat transcripts and the turn-taking around them.

mod manager;
mod store;
mod transcript;

#[cfg(test)]
pub(crate) mod test_utils;

pub(crate) use manager::ConversationManager;
pub(crate) use store::SessionStore;
pub(crate) use transcript::Transcript;
