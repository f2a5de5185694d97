//! Mock generation adapter for studio tests.

#![allow(dead_code)]

use async_trait::async_trait;
use cineforge::{
    AdapterConfig, Blueprint, CineforgeResult, GenerationAdapter, GenerationParams,
    GenerationResult, ModelCapabilities, Modality, Narration, ProviderError, ProviderErrorKind,
    Studio,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Behavior configuration for mock responses.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Always return success with the given text
    Success(String),
    /// Always return the specified error
    Error(ProviderErrorKind),
    /// Return a sequence of responses (errors or success)
    Sequence(Vec<MockResponse>),
}

/// A single mock response (success or error).
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success(String),
    Error(ProviderErrorKind),
}

/// Mock adapter that records every request it receives.
#[derive(Clone)]
pub struct MockAdapter {
    behavior: MockBehavior,
    call_count: Arc<Mutex<usize>>,
    requests: Arc<Mutex<Vec<GenerationParams>>>,
    delay: Option<Duration>,
}

impl MockAdapter {
    pub fn new_with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(Mutex::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Always succeeds with the given text.
    pub fn new_success(text: impl Into<String>) -> Self {
        Self::new_with_behavior(MockBehavior::Success(text.into()))
    }

    /// Always fails with the given error.
    pub fn new_error(error: ProviderErrorKind) -> Self {
        Self::new_with_behavior(MockBehavior::Error(error))
    }

    /// Answers successive calls with successive texts.
    pub fn new_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new_with_behavior(MockBehavior::Sequence(
            texts
                .into_iter()
                .map(|t| MockResponse::Success(t.into()))
                .collect(),
        ))
    }

    /// Sleeps before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times generate() was called.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Every request received, in call order.
    pub fn requests(&self) -> Vec<GenerationParams> {
        self.requests.lock().unwrap().clone()
    }

    fn next_response(&self, params: &GenerationParams) -> CineforgeResult<GenerationResult> {
        let mut count = self.call_count.lock().unwrap();
        let current = *count;
        *count += 1;
        self.requests.lock().unwrap().push(params.clone());

        let response = match &self.behavior {
            MockBehavior::Success(text) => MockResponse::Success(text.clone()),
            MockBehavior::Error(kind) => MockResponse::Error(kind.clone()),
            MockBehavior::Sequence(responses) => match responses.get(current) {
                Some(response) => response.clone(),
                None => MockResponse::Error(ProviderErrorKind::Transport(format!(
                    "Mock sequence exhausted (call {} beyond {} responses)",
                    current + 1,
                    responses.len()
                ))),
            },
        };
        match response {
            MockResponse::Success(text) => Ok(GenerationResult::text("mock-model", text)),
            MockResponse::Error(kind) => Err(ProviderError::new(kind).into()),
        }
    }
}

#[async_trait]
impl GenerationAdapter for MockAdapter {
    async fn generate(&self, params: &GenerationParams) -> CineforgeResult<GenerationResult> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next_response(params)
    }

    fn capabilities(&self) -> ModelCapabilities {
        ModelCapabilities::new(Modality::Text, Some(8000), &["text"], Some(10))
    }

    async fn validate(&self) -> bool {
        true
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Credential the tests pass explicitly.
pub const TEST_KEY: &str = "sk-test";

/// Default text model of a blueprint.
pub const TEST_MODEL: &str = "anthropic/claude-3.5-sonnet";

/// Registers `adapter` as the studio's text adapter for the test credential.
pub fn install(studio: &Studio, adapter: &MockAdapter) {
    studio.factory().insert(
        &AdapterConfig::openrouter(TEST_MODEL, TEST_KEY),
        Arc::new(adapter.clone()),
    );
}

/// `count` words of filler with no style-rule triggers.
pub fn filler_words(count: usize) -> String {
    const WORDS: [&str; 8] = ["the", "lamp", "glows", "over", "a", "quiet", "grey", "harbour"];
    (0..count)
        .map(|i| WORDS[i % WORDS.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

/// A well-formed story response with `scene_words` words per scene.
pub fn story_response(title: &str, scene_words: &[usize]) -> String {
    let total: usize = scene_words.iter().sum();
    let scenes = scene_words
        .iter()
        .enumerate()
        .map(|(i, words)| format!("Scene {}: {}", i + 1, filler_words(*words)))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "STORY TITLE: {}\n\nCONSTRAINT CONFIRMATION: {} scenes, Ava and Leo only.\n\nSTORY:\n{}\n\nWORD COUNT: {}\n",
        title,
        scene_words.len(),
        scenes,
        total
    )
}

/// Lighthouse blueprint with Ava and Leo.
pub fn blueprint(scene_count: u32, word_count: u32) -> Blueprint {
    Blueprint::builder()
        .core_idea("A lighthouse keeper finds a message in a bottle")
        .genre("Drama")
        .tone_mood("Melancholic")
        .word_count(word_count)
        .narration(Narration::ThirdPerson)
        .scene_count(scene_count)
        .characters(vec!["Ava".to_string(), "Leo".to_string()])
        .build()
        .unwrap()
}
