//! Recording mail sender.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use remedy_core::mail::{MailMessage, MailProvider};
use remedy_core::{Error, Result};

#[derive(Debug, Default)]
struct State {
    sent: Vec<MailMessage>,
    rejected: HashSet<String>,
}

/// Mail sender that keeps sent messages in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingMailer {
    inner: Arc<Mutex<State>>,
}

impl RecordingMailer {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Makes delivery to `address` fail.
    pub fn reject(&self, address: &str) {
        self.lock().rejected.insert(address.to_owned());
    }

    /// Messages sent so far.
    pub fn sent(&self) -> Vec<MailMessage> {
        self.lock().sent.clone()
    }

    /// Recipients of the messages sent so far.
    pub fn recipients(&self) -> Vec<String> {
        self.lock().sent.iter().map(|m| m.to.clone()).collect()
    }
}

#[async_trait::async_trait]
impl MailProvider for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        let mut state = self.lock();
        if state.rejected.contains(&message.to) {
            return Err(Error::invalid_input().with_message("recipient rejected"));
        }
        state.sent.push(message.clone());
        Ok(())
    }
}
