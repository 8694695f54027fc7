//! Classification router
//!
//! Tries tiers in a fixed order and returns the first answer:
//!
//! 1. deterministic rules (compound contrast, achievement, family context)
//! 2. keyword table
//! 3. local LLM (Ollama), when the startup ping succeeded
//! 4. hosted LLM (Gemini), when a key is configured
//! 5. local pretrained classifier, confidence capped at 0.55
//! 6. a `default` verdict carrying every tier's error
//!
//! `classify` never fails. Apart from the cached local-LLM availability the
//! router holds no mutable state, so one instance is shared behind `Arc`.

use crate::classifier::Classifier;
use crate::keywords::KeywordTable;
use crate::llm::{build_prompt, LabelParser, LlmBackend};
use crate::rules::apply_rules;
use hinglish_core::{Method, Result, Task, Verdict};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Confidence of a parsed local-LLM answer
pub const LLAMA_CONFIDENCE: f32 = 0.75;

/// Confidence of a parsed hosted-LLM answer
pub const GEMINI_CONFIDENCE: f32 = 0.60;

/// Upper bound on local-model confidence
pub const ML_MODEL_CONFIDENCE_CAP: f32 = 0.55;

/// Tiered classification router
pub struct Router {
    sentiment_keywords: KeywordTable,
    category_keywords: KeywordTable,
    parser: LabelParser,
    local_llm: Option<Arc<dyn LlmBackend>>,
    local_llm_available: AtomicBool,
    hosted_llm: Option<Arc<dyn LlmBackend>>,
    sentiment_model: Option<Arc<dyn Classifier>>,
    category_model: Option<Arc<dyn Classifier>>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    /// Classify `text` for `task`; always returns a verdict
    pub async fn classify(&self, task: Task, text: &str) -> Verdict {
        let start = Instant::now();
        let verdict = self.route(task, text).await;

        metrics::counter!(
            "hinglish_verdicts_total",
            "task" => task.as_str(),
            "method" => verdict.method.as_str()
        )
        .increment(1);

        debug!(
            task = %task,
            method = %verdict.method,
            label = %verdict.label,
            confidence = verdict.confidence,
            latency_us = start.elapsed().as_micros() as u64,
            "Routed"
        );

        verdict
    }

    pub async fn classify_sentiment(&self, text: &str) -> Verdict {
        self.classify(Task::Sentiment, text).await
    }

    pub async fn classify_category(&self, text: &str) -> Verdict {
        self.classify(Task::Category, text).await
    }

    /// Verdict from the rule and keyword tiers alone
    pub fn classify_deterministic(&self, task: Task, text: &str) -> Option<Verdict> {
        if let Some((rule, verdict)) = apply_rules(task, text) {
            debug!(task = %task, rule, "Rule matched");
            return Some(verdict);
        }
        self.keywords(task).lookup(text)
    }

    async fn route(&self, task: Task, text: &str) -> Verdict {
        if let Some(verdict) = self.classify_deterministic(task, text) {
            return verdict;
        }

        let mut errors: Vec<String> = Vec::new();

        if let Some(backend) = &self.local_llm {
            if self.local_llm_available() {
                match self.ask(backend.as_ref(), task, text).await {
                    Ok(label) => return Verdict::new(label, LLAMA_CONFIDENCE, Method::Llama),
                    Err(e) => errors.push(tier_failed("llama", task, &e)),
                }
            } else {
                errors.push("llama: unavailable".to_string());
            }
        }

        if let Some(backend) = &self.hosted_llm {
            match self.ask(backend.as_ref(), task, text).await {
                Ok(label) => return Verdict::new(label, GEMINI_CONFIDENCE, Method::Gemini),
                Err(e) => errors.push(tier_failed("gemini", task, &e)),
            }
        }

        if let Some(model) = self.model(task) {
            match model.classify(text).await {
                Ok(result) if task.is_valid_label(&result.label) => {
                    return Verdict::new(result.label, result.score, Method::MlModel)
                        .capped(ML_MODEL_CONFIDENCE_CAP);
                }
                Ok(result) => {
                    let e = hinglish_core::Error::model(format!(
                        "{} returned unknown {} label '{}'",
                        model.name(),
                        task,
                        result.label
                    ));
                    errors.push(tier_failed("ml_model", task, &e));
                }
                Err(e) => errors.push(tier_failed("ml_model", task, &e)),
            }
        }

        if errors.is_empty() {
            errors.push("no classifier available".to_string());
        }
        warn!(task = %task, errors = ?errors, "All tiers failed, using default verdict");
        Verdict::fallback(task, errors.join("; "))
    }

    async fn ask(&self, backend: &dyn LlmBackend, task: Task, text: &str) -> Result<&'static str> {
        let prompt = build_prompt(task, text);
        let answer = backend.complete(&prompt).await?;

        self.parser.parse(task, &answer).ok_or_else(|| {
            hinglish_core::Error::classifier(format!(
                "unparseable answer from {}: {:?}",
                backend.name(),
                answer.lines().last().unwrap_or_default()
            ))
        })
    }

    fn keywords(&self, task: Task) -> &KeywordTable {
        match task {
            Task::Sentiment => &self.sentiment_keywords,
            Task::Category => &self.category_keywords,
        }
    }

    fn model(&self, task: Task) -> Option<&Arc<dyn Classifier>> {
        match task {
            Task::Sentiment => self.sentiment_model.as_ref(),
            Task::Category => self.category_model.as_ref(),
        }
    }

    /// Ping the local LLM and cache the outcome
    pub async fn refresh_availability(&self) -> bool {
        let Some(backend) = &self.local_llm else {
            return false;
        };

        let available = match backend.ping().await {
            Ok(()) => {
                info!(backend = backend.name(), "Local LLM reachable");
                true
            }
            Err(e) => {
                warn!(backend = backend.name(), error = %e, "Local LLM unreachable, tier disabled");
                false
            }
        };
        self.local_llm_available.store(available, Ordering::Relaxed);
        available
    }

    pub fn local_llm_available(&self) -> bool {
        self.local_llm.is_some() && self.local_llm_available.load(Ordering::Relaxed)
    }

    pub fn has_hosted_llm(&self) -> bool {
        self.hosted_llm.is_some()
    }

    pub fn local_model(&self, task: Task) -> Option<&Arc<dyn Classifier>> {
        self.model(task)
    }
}

fn tier_failed(tier: &'static str, task: Task, error: &hinglish_core::Error) -> String {
    warn!(tier, task = %task, error = %error, "Tier failed");
    metrics::counter!("hinglish_tier_failures_total", "tier" => tier).increment(1);
    format!("{}: {}", tier, error)
}

/// Builder for [`Router`]
#[derive(Default)]
pub struct RouterBuilder {
    sentiment_keywords: Option<KeywordTable>,
    category_keywords: Option<KeywordTable>,
    local_llm: Option<Arc<dyn LlmBackend>>,
    hosted_llm: Option<Arc<dyn LlmBackend>>,
    sentiment_model: Option<Arc<dyn Classifier>>,
    category_model: Option<Arc<dyn Classifier>>,
}

impl RouterBuilder {
    /// Local inference server tier (`llama`)
    pub fn with_local_llm(mut self, backend: Arc<dyn LlmBackend>) -> Self {
        self.local_llm = Some(backend);
        self
    }

    /// Hosted LLM tier (`gemini`)
    pub fn with_hosted_llm(mut self, backend: Arc<dyn LlmBackend>) -> Self {
        self.hosted_llm = Some(backend);
        self
    }

    /// Local pretrained classifier tier (`ml_model`) for `task`
    pub fn with_local_model(mut self, task: Task, classifier: Arc<dyn Classifier>) -> Self {
        match task {
            Task::Sentiment => self.sentiment_model = Some(classifier),
            Task::Category => self.category_model = Some(classifier),
        }
        self
    }

    /// Replace the built-in keyword table of the table's task
    pub fn with_keyword_table(mut self, table: KeywordTable) -> Self {
        match table.task() {
            Task::Sentiment => self.sentiment_keywords = Some(table),
            Task::Category => self.category_keywords = Some(table),
        }
        self
    }

    /// Build the router.
    ///
    /// The local LLM is assumed reachable until
    /// [`Router::refresh_availability`] says otherwise.
    pub fn build(self) -> Result<Router> {
        let sentiment_keywords = match self.sentiment_keywords {
            Some(table) => table,
            None => KeywordTable::sentiment()?,
        };
        let category_keywords = match self.category_keywords {
            Some(table) => table,
            None => KeywordTable::category()?,
        };

        Ok(Router {
            sentiment_keywords,
            category_keywords,
            parser: LabelParser::new()?,
            local_llm_available: AtomicBool::new(self.local_llm.is_some()),
            local_llm: self.local_llm,
            hosted_llm: self.hosted_llm,
            sentiment_model: self.sentiment_model,
            category_model: self.category_model,
        })
    }
}
