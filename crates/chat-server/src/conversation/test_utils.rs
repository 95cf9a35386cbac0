use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use inference::{InferenceClient, InferenceError};
use protocol::Turn;

/// Inference client that replays canned replies and records every request.
pub(crate) struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, InferenceError>>>,
    requests: Mutex<Vec<Vec<Turn>>>,
    delay: Option<Duration>,
}

impl ScriptedClient {
    pub(crate) fn new(replies: Vec<Result<String, InferenceError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub(crate) fn replying(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|reply| Ok(reply.to_string())).collect())
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn requests(&self) -> Vec<Vec<Turn>> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl InferenceClient for ScriptedClient {
    async fn complete(&self, turns: &[Turn]) -> Result<Turn, InferenceError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(turns.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self
            .replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .unwrap_or_else(|| Err(InferenceError::Request("no scripted reply".to_string())));
        reply.map(Turn::assistant)
    }
}
