//! Test doubles shared by the analysis and route tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::llm_client::{LlmError, TextGenerator};

/// A model that plays back scripted replies in order and records every call.
/// Once the script runs out it fails with `LlmError::EmptyContent`.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<(String, String)>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedModel {
    pub fn replying<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self::new(replies.into_iter().map(|r| Ok(r.into())).collect(), None))
    }

    pub fn failing(error: LlmError) -> Arc<Self> {
        Arc::new(Self::new(VecDeque::from([Err(error)]), None))
    }

    /// Replies only after `delay`, for timeout tests under a paused clock.
    pub fn slow(delay: Duration, reply: &str) -> Arc<Self> {
        Arc::new(Self::new(VecDeque::from([Ok(reply.to_string())]), Some(delay)))
    }

    fn new(replies: VecDeque<Result<String, LlmError>>, delay: Option<Duration>) -> Self {
        Self {
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            delay,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().map(|(p, _)| p.clone())
    }

    pub fn last_system(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().map(|(_, s)| s.clone())
    }
}

#[async_trait]
impl TextGenerator for ScriptedModel {
    async fn generate(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), system.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or(Err(LlmError::EmptyContent))
    }
}
