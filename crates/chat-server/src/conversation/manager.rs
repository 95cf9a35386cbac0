use std::sync::Arc;
use std::time::Instant;

use inference::InferenceClient;
use protocol::api::SessionView;
use protocol::{Finding, Turn};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::prompt::build_analysis_prompt;

use super::{SessionStore, Transcript};

#[derive(Debug, Clone)]
pub(crate) struct StartedSession {
    pub(crate) session_id: String,
    pub(crate) analysis: String,
}

/// Owns the session store and drives every exchange with the model.
pub(crate) struct ConversationManager {
    store: SessionStore,
    client: Arc<dyn InferenceClient>,
}

impl ConversationManager {
    pub(crate) fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self {
            store: SessionStore::new(),
            client,
        }
    }

    /// Asks the model for an analysis of `findings` and opens a session
    /// seeded with it. Nothing is stored if the model call fails.
    pub(crate) async fn start_session(
        &self,
        findings: &[Finding],
    ) -> Result<StartedSession, ServiceError> {
        let prompt = build_analysis_prompt(findings);
        let started = Instant::now();
        let summary = self
            .client
            .complete(&[Turn::system(prompt)])
            .await
            .map_err(|err| {
                warn!(findings = findings.len(), error = %err, "analysis request failed");
                err
            })?;

        let session_id = Uuid::new_v4().to_string();
        let analysis = summary.content;
        self.store
            .insert(session_id.clone(), Transcript::seeded(analysis.clone()))
            .await;
        info!(
            session_id = %session_id,
            findings = findings.len(),
            analysis_len = analysis.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "session started"
        );
        Ok(StartedSession {
            session_id,
            analysis,
        })
    }

    /// Sends the whole transcript plus `message` and records the exchange.
    ///
    /// The session stays locked for the duration of the model call. On
    /// failure the transcript is left exactly as it was.
    pub(crate) async fn chat(
        &self,
        session_id: &str,
        message: String,
    ) -> Result<String, ServiceError> {
        let Some(session) = self.store.get(session_id).await else {
            warn!(session_id = %session_id, "chat for unknown session");
            return Err(ServiceError::SessionNotFound);
        };

        let mut transcript = session.transcript.lock().await;
        let user = Turn::user(message);
        let request = transcript.request_with(&user);
        let started = Instant::now();
        let reply = match self.client.complete(&request).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(
                    session_id = %session_id,
                    turns = request.len(),
                    error = %err,
                    "chat request failed"
                );
                return Err(err.into());
            }
        };

        let content = reply.content;
        transcript.push_exchange(user, Turn::assistant(content.clone()));
        info!(
            session_id = %session_id,
            turns = transcript.len(),
            response_len = content.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "chat exchange recorded"
        );
        Ok(content)
    }

    pub(crate) async fn session_view(&self, session_id: &str) -> Option<SessionView> {
        let session = self.store.get(session_id).await?;
        let turns = session.transcript.lock().await.turns().to_vec();
        Some(SessionView {
            session_id: session_id.to_string(),
            created_at: humantime::format_rfc3339_seconds(session.created_at).to_string(),
            turns,
        })
    }

    pub(crate) async fn session_count(&self) -> usize {
        self.store.len().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::test_utils::ScriptedClient;
    use crate::conversation::transcript::SESSION_PREAMBLE;
    use inference::InferenceError;
    use protocol::Role;
    use std::time::Duration;

    fn sql_injection() -> Finding {
        Finding {
            name: "SQL Injection".to_string(),
            risk: "High".to_string(),
            description: "No description available".to_string(),
            solution: "No solution available".to_string(),
            reference: "No reference provided".to_string(),
        }
    }

    fn roles(turns: &[Turn]) -> Vec<Role> {
        turns.iter().map(|turn| turn.role).collect()
    }

    #[tokio::test]
    async fn start_session_sends_single_system_turn() {
        let client = Arc::new(ScriptedClient::replying(&["analysis"]));
        let manager = ConversationManager::new(client.clone());

        let started = manager
            .start_session(&[sql_injection()])
            .await
            .expect("session");
        assert_eq!(started.analysis, "analysis");

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].len(), 1);
        assert_eq!(requests[0][0].role, Role::System);
        assert!(requests[0][0].content.contains("SQL Injection"));

        let view = manager
            .session_view(&started.session_id)
            .await
            .expect("view");
        assert_eq!(
            view.turns,
            vec![Turn::system(SESSION_PREAMBLE), Turn::assistant("analysis")]
        );
    }

    #[tokio::test]
    async fn chat_sends_full_history_and_appends_exchange() {
        let client = Arc::new(ScriptedClient::replying(&["analysis", "use prepared statements"]));
        let manager = ConversationManager::new(client.clone());
        let started = manager.start_session(&[]).await.expect("session");

        let reply = manager
            .chat(&started.session_id, "how do I fix it?".to_string())
            .await
            .expect("reply");
        assert_eq!(reply, "use prepared statements");

        let sent = &client.requests()[1];
        assert_eq!(roles(sent), vec![Role::System, Role::Assistant, Role::User]);
        assert_eq!(sent[0].content, SESSION_PREAMBLE);
        assert_eq!(sent[2].content, "how do I fix it?");

        let view = manager
            .session_view(&started.session_id)
            .await
            .expect("view");
        assert_eq!(
            roles(&view.turns),
            vec![Role::System, Role::Assistant, Role::User, Role::Assistant]
        );
        assert_eq!(view.turns[3].content, "use prepared statements");
    }

    #[tokio::test]
    async fn unknown_session_is_not_found_and_changes_nothing() {
        let client = Arc::new(ScriptedClient::replying(&["analysis"]));
        let manager = ConversationManager::new(client.clone());
        let started = manager.start_session(&[]).await.expect("session");

        let err = manager
            .chat("user_session", "hello".to_string())
            .await
            .expect_err("unknown session");
        assert!(matches!(err, ServiceError::SessionNotFound));
        assert!(err.to_string().starts_with("Session not found"));
        assert_eq!(manager.session_count().await, 1);
        assert_eq!(client.requests().len(), 1);
        let view = manager
            .session_view(&started.session_id)
            .await
            .expect("view");
        assert_eq!(view.turns.len(), 2);
    }

    #[tokio::test]
    async fn failed_analysis_creates_no_session() {
        let client = Arc::new(ScriptedClient::new(vec![Err(InferenceError::Timeout(10))]));
        let manager = ConversationManager::new(client);

        let err = manager.start_session(&[]).await.expect_err("failure");
        assert!(matches!(err, ServiceError::Inference(InferenceError::Timeout(10))));
        assert_eq!(manager.session_count().await, 0);
    }

    #[tokio::test]
    async fn failed_chat_leaves_transcript_untouched() {
        let client = Arc::new(ScriptedClient::new(vec![
            Ok("analysis".to_string()),
            Err(InferenceError::MissingContent),
            Ok("second try".to_string()),
        ]));
        let manager = ConversationManager::new(client.clone());
        let started = manager.start_session(&[]).await.expect("session");

        let err = manager
            .chat(&started.session_id, "first".to_string())
            .await
            .expect_err("failure");
        assert!(matches!(err, ServiceError::Inference(_)));
        let view = manager
            .session_view(&started.session_id)
            .await
            .expect("view");
        assert_eq!(view.turns.len(), 2);

        manager
            .chat(&started.session_id, "again".to_string())
            .await
            .expect("reply");
        let sent = &client.requests()[2];
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[2].content, "again");
    }

    #[tokio::test]
    async fn each_upload_gets_its_own_session() {
        let client = Arc::new(ScriptedClient::replying(&["first", "second"]));
        let manager = ConversationManager::new(client);

        let a = manager.start_session(&[]).await.expect("a");
        let b = manager.start_session(&[]).await.expect("b");
        assert_ne!(a.session_id, b.session_id);
        assert_eq!(manager.session_count().await, 2);

        let a_view = manager.session_view(&a.session_id).await.expect("a view");
        assert_eq!(a_view.turns[1].content, "first");
    }

    #[tokio::test]
    async fn concurrent_chats_on_one_session_are_serialized() {
        let client = Arc::new(
            ScriptedClient::replying(&["analysis", "r1", "r2"])
                .with_delay(Duration::from_millis(20)),
        );
        let manager = ConversationManager::new(client.clone());
        let started = manager.start_session(&[]).await.expect("session");
        let id = started.session_id.as_str();

        let (first, second) = tokio::join!(
            manager.chat(id, "q1".to_string()),
            manager.chat(id, "q2".to_string())
        );
        first.expect("first");
        second.expect("second");

        let requests = client.requests();
        assert_eq!(requests[1].len(), 3);
        assert_eq!(requests[2].len(), 5);

        let view = manager.session_view(id).await.expect("view");
        assert_eq!(
            roles(&view.turns),
            vec![
                Role::System,
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant
            ]
        );
        // Each reply sits right after the question it answered.
        assert_eq!(view.turns[3].content, "r1");
        assert_eq!(view.turns[2].content, "q1");
        assert_eq!(view.turns[4].content, "q2");
        assert_eq!(view.turns[5].content, "r2");
    }
}
