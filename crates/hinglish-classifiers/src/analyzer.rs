//! Full analysis of one input: sentiment, toxicity and categories

use crate::embedding::TemplateCategoryClassifier;
use crate::router::{Router, ML_MODEL_CONFIDENCE_CAP};
use crate::text::prepare;
use crate::toxicity::ToxicityAnalyzer;
use hinglish_core::{AnalysisReport, Method, Verdict};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Runs the router and the toxicity analyzer over one input
pub struct Analyzer {
    router: Arc<Router>,
    toxicity: Arc<ToxicityAnalyzer>,
    templates: Option<Arc<TemplateCategoryClassifier>>,
}

impl Analyzer {
    pub fn new(router: Arc<Router>, toxicity: Arc<ToxicityAnalyzer>) -> Self {
        Self {
            router,
            toxicity,
            templates: None,
        }
    }

    /// Report up to two template categories when the category route ends at the local model
    pub fn with_category_templates(mut self, templates: Arc<TemplateCategoryClassifier>) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn toxicity(&self) -> &Arc<ToxicityAnalyzer> {
        &self.toxicity
    }

    pub fn templates(&self) -> Option<&Arc<TemplateCategoryClassifier>> {
        self.templates.as_ref()
    }

    /// Analyze `text`. Never fails; degraded tiers show up in the method tags.
    pub async fn analyze(&self, text: &str) -> AnalysisReport {
        self.analyze_prepared(&prepare(text)).await
    }

    /// Analyze text that has already been through [`prepare`]
    pub async fn analyze_prepared(&self, text: &str) -> AnalysisReport {
        let start = Instant::now();

        let (sentiment, category, toxicity) = tokio::join!(
            self.router.classify_sentiment(text),
            self.router.classify_category(text),
            self.toxicity.analyze(text),
        );

        let categories = self.categories(text, category).await;

        let latency_us = start.elapsed().as_micros() as u64;
        metrics::histogram!("hinglish_analysis_latency_us").record(latency_us as f64);
        debug!(
            sentiment = %sentiment.label,
            toxicity = %toxicity.label,
            categories = categories.len(),
            latency_us,
            "Analysis complete"
        );

        AnalysisReport {
            sentiment,
            toxicity,
            categories,
        }
    }

    async fn categories(&self, text: &str, routed: Verdict) -> Vec<Verdict> {
        if routed.method != Method::MlModel {
            return vec![routed];
        }
        let Some(templates) = &self.templates else {
            return vec![routed];
        };

        match templates.top_categories(text).await {
            Ok(top) if !top.is_empty() => top
                .into_iter()
                .map(|v| v.capped(ML_MODEL_CONFIDENCE_CAP))
                .collect(),
            Ok(_) => vec![routed],
            Err(e) => {
                warn!(error = %e, "Template categories failed, keeping routed category");
                vec![routed]
            }
        }
    }
}
