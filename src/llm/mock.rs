use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{ChatBackend, ChatRequest};
use crate::error::AnalystError;

/// What the scripted backend answers with next.
#[derive(Clone, Debug)]
pub enum Reply {
    Text(String),
    Fail(String),
}

/// Test double that replays canned replies and records every request.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    /// Key the backend was built with
    pub api_key: String,
    replies: Arc<Mutex<VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl ScriptedBackend {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            ..Default::default()
        }
    }

    pub fn reply(self, text: &str) -> Self {
        self.replies.lock().unwrap().push_back(Reply::Text(text.to_string()));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.replies.lock().unwrap().push_back(Reply::Fail(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<String, AnalystError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(message)) => Err(AnalystError::Transport(message)),
            None => Err(AnalystError::Transport("no scripted reply left".to_string())),
        }
    }
}
