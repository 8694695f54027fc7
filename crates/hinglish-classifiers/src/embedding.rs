//! Category classification by template similarity
//!
//! Each category owns a list of short template phrases. The input is
//! embedded once and scored against every template; a category's score is
//! its best cosine similarity. This is the local (`ml_model`) tier of the
//! category route.

use crate::classifier::{ClassificationMetadata, ClassificationResult, Classifier, ClassifierKind};
use async_trait::async_trait;
use hinglish_core::{types::round2, Method, Result, Task, Verdict};
use std::sync::Arc;
use std::time::Instant;

/// Similarity a category must exceed to be reported
pub const DEFAULT_CATEGORY_THRESHOLD: f32 = 0.40;

/// Categories reported by the similarity tier
pub const DEFAULT_MAX_CATEGORIES: usize = 2;

/// Trait for sentence embedders
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed each text into a vector; all vectors share one dimension
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn name(&self) -> &str;

    fn kind(&self) -> ClassifierKind;
}

const CAREER_TEMPLATES: &[&str] = &[
    "job nahi mil rahi", "interview fail", "interview achha gaya", "interview mein selected",
    "interview diya", "job interview", "promotion nahi mila", "career growth", "work stress",
    "office problems", "boss issues", "salary problem", "job search", "unemployment",
    "fired from job", "office politics", "work pressure", "colleague issue", "office ja raha",
    "meeting hai", "appraisal", "team lead", "naukri mil gayi", "naukri", "kaam",
    "naukri nahin mil rahi", "kaam mein pareshaani", "naukri ki talaash",
];

const LOVE_LIFE_TEMPLATES: &[&str] = &[
    "girlfriend breakup", "boyfriend left", "relationship problems", "love marriage",
    "propose karna hai", "pyaar mein dhoka", "breakup ho gaya", "partner cheating",
    "love failure", "shaadi nahi ho rahi", "marriage", "wedding", "girlfriend ne choda",
    "boyfriend issue", "dating problem", "rishte ki samasya",
];

const FAMILY_TEMPLATES: &[&str] = &[
    "papa se fight", "mummy naraz", "family problems", "parents issue", "sibling fight",
    "ghar mein kalesh", "family tension", "parents divorce", "family conflict", "home issues",
    "ghar par hun", "papa khush", "brother se ladai", "sister", "parivaar mein jhagda",
    "ghar ki samasya", "father angry", "mother upset", "brother sister fight",
];

const HEALTH_TEMPLATES: &[&str] = &[
    "bimar hun", "health problem", "pain hai", "doctor ke paas", "medicine", "hospital",
    "illness", "disease", "surgery", "chronic pain", "medical issue", "body ache", "fever",
    "headache", "stomach pain", "tabiyat", "dard hai",
];

const MOOD_TEMPLATES: &[&str] = &[
    "depressed", "sad", "anxiety", "mental health", "tension", "stress", "worried", "upset",
    "lonely", "suicidal thoughts", "panic attack", "emotional", "feeling low", "not happy",
    "crying", "hopeless", "udaas hun", "dukhi hun", "khush nahi hun", "bahut tension hai",
    "depressed hun", "sad hun", "anxiety hai", "stress mein hun", "worried hun", "akela hun",
    "lonely feel kar raha hun", "khush hun", "happy hun", "mast hun", "badiya hai",
    "achha feel kar raha hun", "perfect hai", "theek hai", "pareshan hun", "bura lag raha hai",
    "galat ho raha hai", "kuch achha nahi", "sab kuch bura",
];

/// Built-in template phrases, in category label order
pub fn default_templates() -> Vec<(&'static str, &'static [&'static str])> {
    vec![
        ("career", CAREER_TEMPLATES),
        ("love_life", LOVE_LIFE_TEMPLATES),
        ("family", FAMILY_TEMPLATES),
        ("health", HEALTH_TEMPLATES),
        ("mood", MOOD_TEMPLATES),
    ]
}

/// Cosine similarity; zero for empty or mismatched vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Bag of hashed character trigrams and words.
///
/// Needs no model files. Robust to the spelling drift of romanized Hindi
/// ("achha" / "acha" / "accha" share most trigrams).
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(16),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// FNV-1a, stable across runs and platforms
    fn bucket(&self, feature: &[u8]) -> usize {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in feature {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        (hash % self.dimensions as u64) as usize
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lower = text.to_lowercase();

        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vector[self.bucket(word.as_bytes())] += 1.0;

            let padded: Vec<char> = format!(" {} ", word).chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                vector[self.bucket(trigram.as_bytes())] += 1.0;
            }
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn name(&self) -> &str {
        "hashed-trigrams"
    }

    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Lexicon
    }
}

struct CategoryTemplates {
    label: String,
    embeddings: Vec<Vec<f32>>,
}

/// Template-similarity category classifier
pub struct TemplateCategoryClassifier {
    name: String,
    embedder: Arc<dyn Embedder>,
    categories: Vec<CategoryTemplates>,
    threshold: f32,
    max_categories: usize,
}

impl TemplateCategoryClassifier {
    /// Build with the built-in templates, embedding them up front
    pub async fn new(embedder: Arc<dyn Embedder>) -> Result<Self> {
        let templates = default_templates()
            .into_iter()
            .map(|(label, phrases)| {
                (
                    label.to_string(),
                    phrases.iter().map(|p| p.to_string()).collect(),
                )
            })
            .collect();
        Self::with_templates(embedder, templates).await
    }

    /// Build with custom templates
    pub async fn with_templates(
        embedder: Arc<dyn Embedder>,
        templates: Vec<(String, Vec<String>)>,
    ) -> Result<Self> {
        let mut categories = Vec::with_capacity(templates.len());

        for (label, phrases) in templates {
            if !Task::Category.is_valid_label(&label) {
                return Err(hinglish_core::Error::config(format!(
                    "Unknown category '{}' in templates",
                    label
                )));
            }
            if phrases.is_empty() {
                return Err(hinglish_core::Error::config(format!(
                    "Category '{}' has no template phrases",
                    label
                )));
            }

            let embeddings = embedder.embed(&phrases).await?;
            categories.push(CategoryTemplates { label, embeddings });
        }

        tracing::debug!(
            embedder = embedder.name(),
            categories = categories.len(),
            "Category templates embedded"
        );

        Ok(Self {
            name: format!("category-templates/{}", embedder.name()),
            embedder,
            categories,
            threshold: DEFAULT_CATEGORY_THRESHOLD,
            max_categories: DEFAULT_MAX_CATEGORIES,
        })
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_max_categories(mut self, max: usize) -> Self {
        self.max_categories = max.max(1);
        self
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Best template similarity per category, in template order
    pub async fn scores(&self, text: &str) -> Result<Vec<(String, f32)>> {
        let embedded = self.embedder.embed(&[text.to_string()]).await?;
        let query = embedded
            .first()
            .ok_or_else(|| hinglish_core::Error::model("Embedder returned no vectors"))?;

        Ok(self
            .categories
            .iter()
            .map(|category| {
                let best = category
                    .embeddings
                    .iter()
                    .map(|template| cosine_similarity(query, template))
                    .fold(0.0f32, f32::max);
                (category.label.clone(), best)
            })
            .collect())
    }

    /// Categories above the threshold, best first, at most `max_categories`
    pub async fn top_categories(&self, text: &str) -> Result<Vec<Verdict>> {
        let mut scores = self.scores(text).await?;
        scores.retain(|(_, score)| *score > self.threshold);
        scores.sort_by(|a, b| b.1.total_cmp(&a.1));
        scores.truncate(self.max_categories);

        Ok(scores
            .into_iter()
            .map(|(label, score)| Verdict::new(label, round2(score), Method::MlModel))
            .collect())
    }
}

#[async_trait]
impl Classifier for TemplateCategoryClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();

        let top = self.top_categories(text).await?;
        let (label, score) = top
            .first()
            .map(|v| (v.label.clone(), v.confidence))
            .unwrap_or_else(|| (Task::Category.default_label().to_string(), 0.5));

        Ok(ClassificationResult {
            label,
            score,
            metadata: ClassificationMetadata {
                model: Some(self.name.clone()),
                all_scores: Some(top.into_iter().map(|v| (v.label, v.confidence)).collect()),
            },
            latency_us: start.elapsed().as_micros() as u64,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ClassifierKind {
        self.embedder.kind()
    }
}
