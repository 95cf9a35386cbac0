use protocol::{Role, Turn};

pub(crate) const SESSION_PREAMBLE: &str =
    "This is a ZAP security analysis chatbot. Ask me about vulnerabilities.";

/// Append-only turn history for one session.
///
/// Always starts with the system preamble. Turns are only ever added as a
/// complete user/assistant pair, so a stored user turn always has its reply.
#[derive(Debug, Clone)]
pub(crate) struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub(crate) fn seeded(summary: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::system(SESSION_PREAMBLE), Turn::assistant(summary)],
        }
    }

    pub(crate) fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub(crate) fn len(&self) -> usize {
        self.turns.len()
    }

    /// The full history followed by `user`, as sent to the model.
    pub(crate) fn request_with(&self, user: &Turn) -> Vec<Turn> {
        let mut request = Vec::with_capacity(self.turns.len() + 1);
        request.extend_from_slice(&self.turns);
        request.push(user.clone());
        request
    }

    pub(crate) fn push_exchange(&mut self, user: Turn, assistant: Turn) {
        debug_assert_eq!(user.role, Role::User);
        debug_assert_eq!(assistant.role, Role::Assistant);
        self.turns.push(user);
        self.turns.push(assistant);
    }
}
