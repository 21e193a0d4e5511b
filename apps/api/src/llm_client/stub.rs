//! In-process `LanguageModel` doubles for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{LanguageModel, LlmError, MODEL};

type Responder = Box<dyn Fn() -> Result<String, LlmError> + Send + Sync>;

pub struct StubModel {
    respond: Responder,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl StubModel {
    pub fn replying(text: &str) -> Arc<Self> {
        let text = text.to_string();
        Self::with(Box::new(move || Ok(text.clone())))
    }

    pub fn failing(make_error: impl Fn() -> LlmError + Send + Sync + 'static) -> Arc<Self> {
        Self::with(Box::new(move || Err(make_error())))
    }

    fn with(respond: Responder) -> Arc<Self> {
        Arc::new(Self {
            respond,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        (self.respond)()
    }

    fn model(&self) -> &str {
        MODEL
    }
}
