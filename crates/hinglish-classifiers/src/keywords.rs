//! Static keyword tables (the `keywords` tier)
//!
//! A table maps keyword → (label, confidence). Lookup returns the first
//! table entry whose keyword occurs in the text, so the table order alone
//! decides ties: strong multi-word patterns and negative indicators sit
//! ahead of weaker single words.

use crate::patterns::TermSet;
use hinglish_core::{Method, Result, Task, Verdict};

/// Confidence of sentiment keyword entries
pub const SENTIMENT_KEYWORD_CONFIDENCE: f32 = 0.85;

/// Confidence of category entries that alone decide the category
pub const STRONG_CATEGORY_CONFIDENCE: f32 = 0.95;

/// Confidence of the remaining category entries
pub const CATEGORY_KEYWORD_CONFIDENCE: f32 = 0.85;

const NEGATIVE_SENTIMENT: &[&str] = &[
    "nahi hua", "nahin hua", "theek nahi", "theek nahin", "nahi mil", "nahi mila", "nahin mila",
    "cancel", "fight", "problem", "tension",
    "breakup", "reject", "fail", "gussa", "sad", "udaas", "dukhi", "bore", "ignore", "kharab",
    "pareshan", "akela", "lonely", "depressed", "anxiety", "stress", "nahi", "nahin", "nhi",
];

const POSITIVE_SENTIMENT: &[&str] = &[
    "fix ho gayi", "mil gaya", "mil gayi", "ban gaya", "mili", "selected", "clear", "success",
    "promotion", "increase", "achha", "achhi", "khush", "happy", "mast", "badiya", "excited",
    "peaceful",
];

const NEUTRAL_SENTIMENT: &[&str] = &["kya", "kaise", "plan", "karwani hai", "chahiye", "karu"];

const STRONG_CATEGORY: &[(&str, &str)] = &[
    ("interview", "career"),
    ("client", "career"),
    ("boss", "career"),
    ("girlfriend", "love_life"),
    ("boyfriend", "love_life"),
    ("propose", "love_life"),
    ("doctor", "health"),
    ("hospital", "health"),
];

const CAREER: &[&str] = &[
    "salary", "job", "office", "promotion", "meeting", "work", "colleague", "project",
    "increment", "appraisal", "resignation", "presentation", "team", "manager", "naukri", "kaam",
];

const LOVE_LIFE: &[&str] = &[
    "dating", "crush", "breakup", "relationship", "love", "valentine", "ex", "partner", "pyaar",
];

pub(crate) const FAMILY: &[&str] = &[
    "maa", "papa", "bhai", "behen", "family", "parivaar", "shaadi", "engagement", "parents",
    "father", "mother", "sister", "brother", "relatives", "gharwale", "dadi", "nani", "wife",
    "husband", "beta", "beti",
];

pub(crate) const HEALTH: &[&str] = &[
    "medicine", "bimar", "bimari", "bukhar", "operation", "tabiyat", "checkup", "health",
    "treatment", "surgery", "fever", "pain", "covid", "dentist", "gym", "fitness", "diet",
    "blood pressure",
];

const MOOD: &[&str] = &[
    "bore", "lonely", "akela", "depressed", "anxiety", "tension", "stress", "excited",
    "peaceful", "motivate", "sad", "khush", "udaas",
];

/// One keyword table entry
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordEntry {
    pub keyword: String,
    pub label: String,
    pub confidence: f32,
}

impl KeywordEntry {
    pub fn new(keyword: impl Into<String>, label: impl Into<String>, confidence: f32) -> Self {
        Self {
            keyword: keyword.into(),
            label: label.into(),
            confidence,
        }
    }
}

/// Ordered keyword → (label, confidence) table for one task
pub struct KeywordTable {
    task: Task,
    terms: TermSet,
    entries: Vec<KeywordEntry>,
}

impl KeywordTable {
    /// Build a table, validating labels and confidences
    pub fn new(task: Task, entries: Vec<KeywordEntry>) -> Result<Self> {
        for entry in &entries {
            if !task.is_valid_label(&entry.label) {
                return Err(hinglish_core::Error::config(format!(
                    "Keyword '{}' maps to unknown {} label '{}'",
                    entry.keyword, task, entry.label
                )));
            }
            if !(0.0..=1.0).contains(&entry.confidence) {
                return Err(hinglish_core::Error::config(format!(
                    "Keyword '{}' has confidence {} outside [0, 1]",
                    entry.keyword, entry.confidence
                )));
            }
        }

        let terms = TermSet::new(entries.iter().map(|e| e.keyword.clone()))?;

        Ok(Self {
            task,
            terms,
            entries,
        })
    }

    /// Built-in table for `task`
    pub fn for_task(task: Task) -> Result<Self> {
        match task {
            Task::Sentiment => Self::sentiment(),
            Task::Category => Self::category(),
        }
    }

    /// Built-in sentiment table
    pub fn sentiment() -> Result<Self> {
        let groups = [
            (NEGATIVE_SENTIMENT, "negative"),
            (POSITIVE_SENTIMENT, "positive"),
            (NEUTRAL_SENTIMENT, "neutral"),
        ];

        let entries = groups
            .iter()
            .flat_map(|(words, label)| {
                words
                    .iter()
                    .map(move |w| KeywordEntry::new(*w, *label, SENTIMENT_KEYWORD_CONFIDENCE))
            })
            .collect();

        Self::new(Task::Sentiment, entries)
    }

    /// Built-in category table
    pub fn category() -> Result<Self> {
        let mut entries: Vec<KeywordEntry> = STRONG_CATEGORY
            .iter()
            .map(|(w, label)| KeywordEntry::new(*w, *label, STRONG_CATEGORY_CONFIDENCE))
            .collect();

        let groups = [
            (CAREER, "career"),
            (LOVE_LIFE, "love_life"),
            // health ahead of family: "gharwale bimar hain" is about health
            (HEALTH, "health"),
            (FAMILY, "family"),
            (MOOD, "mood"),
        ];

        entries.extend(groups.iter().flat_map(|(words, label)| {
            words
                .iter()
                .map(move |w| KeywordEntry::new(*w, *label, CATEGORY_KEYWORD_CONFIDENCE))
        }));

        Self::new(Task::Category, entries)
    }

    /// First table entry matching `text`
    pub fn lookup_entry(&self, text: &str) -> Option<&KeywordEntry> {
        self.terms
            .first_entry(text)
            .and_then(|idx| self.entries.get(idx))
    }

    /// Verdict of the first table entry matching `text`
    pub fn lookup(&self, text: &str) -> Option<Verdict> {
        self.lookup_entry(text)
            .map(|entry| Verdict::new(entry.label.clone(), entry.confidence, Method::Keywords))
    }

    pub fn task(&self) -> Task {
        self.task
    }

    pub fn entries(&self) -> &[KeywordEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_table() {
        let table = KeywordTable::sentiment().unwrap();

        let v = table.lookup("Boss se fight ho gayi").unwrap();
        assert_eq!(v.label, "negative");
        assert_eq!(v.method, Method::Keywords);
        assert_eq!(v.confidence, SENTIMENT_KEYWORD_CONFIDENCE);

        assert_eq!(table.lookup("Aaj bahut khush hoon").unwrap().label, "positive");
        assert_eq!(table.lookup("Kya karun samajh").unwrap().label, "neutral");
        assert!(table.lookup("Aaj mausam accha").is_none());
    }

    #[test]
    fn test_first_table_entry_wins_regardless_of_text_position() {
        let table = KeywordTable::sentiment().unwrap();

        // positive word first in the text, negative entry first in the table
        let v = table.lookup("Khush tha lekin ab udaas hoon").unwrap();
        assert_eq!(v.label, "negative");
        let v = table.lookup("Udaas tha, ab khush hoon").unwrap();
        assert_eq!(v.label, "negative");
    }

    #[test]
    fn test_category_table() {
        let table = KeywordTable::category().unwrap();

        let v = table.lookup("Kal interview hai, bahut tension").unwrap();
        assert_eq!(v.label, "career");
        assert_eq!(v.confidence, STRONG_CATEGORY_CONFIDENCE);

        let v = table.lookup("Office mein tension hai").unwrap();
        assert_eq!(v.label, "career");
        assert_eq!(v.confidence, CATEGORY_KEYWORD_CONFIDENCE);

        assert_eq!(table.lookup("Blood pressure high hai").unwrap().label, "health");
        assert_eq!(table.lookup("Valentine's Day ka plan").unwrap().label, "love_life");
        assert_eq!(table.lookup("Akela feel ho raha hu").unwrap().label, "mood");
        // "ex" must not match inside "excited"
        assert_eq!(table.lookup("So excited today").unwrap().label, "mood");
    }

    #[test]
    fn test_health_entries_precede_family() {
        let table = KeywordTable::category().unwrap();

        for text in ["Relatives ko covid hua", "Gharwale bimar hain", "Family mein sab bimar hain"] {
            let v = table.lookup(text).unwrap();
            assert_eq!(v.label, "health", "{}", text);
        }
        assert_eq!(table.lookup("Gharwale aa rahe hain").unwrap().label, "family");
    }

    #[test]
    fn test_negation_variants_are_negative() {
        let table = KeywordTable::sentiment().unwrap();

        assert_eq!(table.lookup("Job nahin mili").unwrap().label, "negative");
        assert_eq!(table.lookup("Result nhi aaya").unwrap().label, "negative");
        assert_eq!(
            table.lookup(&crate::text::prepare("Job नहीं mili")).unwrap().label,
            "negative"
        );
    }

    #[test]
    fn test_lookup_is_deterministic() {
        let table = KeywordTable::category().unwrap();
        let text = "Girlfriend ke saath office party, boss bhi tha";
        let first = table.lookup(text);
        for _ in 0..10 {
            assert_eq!(table.lookup(text), first);
        }
        assert_eq!(first.unwrap().label, "career");
    }

    #[test]
    fn test_rejects_unknown_label() {
        let result = KeywordTable::new(
            Task::Sentiment,
            vec![KeywordEntry::new("salary", "career", 0.9)],
        );
        assert!(result.is_err());

        let result = KeywordTable::new(
            Task::Category,
            vec![KeywordEntry::new("salary", "career", 1.5)],
        );
        assert!(result.is_err());
    }
}
