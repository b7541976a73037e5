//! Scripted completer for tests. Records every prompt it receives.

use std::sync::Mutex;

use async_trait::async_trait;

use super::TextCompleter;

type Responder = Box<dyn Fn(&str) -> String + Send + Sync>;

pub struct ScriptedCompleter {
    responder: Responder,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompleter {
    pub fn new(responder: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answers every prompt with the same text.
    pub fn constant(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| text.clone())
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextCompleter for ScriptedCompleter {
    async fn complete(&self, prompt: &str) -> String {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.responder)(prompt)
    }
}
