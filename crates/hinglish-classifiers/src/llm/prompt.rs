//! Few-shot prompts and answer parsing

use hinglish_core::{Result, Task};
use regex::Regex;
use std::fmt::Write as _;

/// A labelled example shown to the model
#[derive(Debug, Clone, Copy)]
pub struct FewShotExample {
    pub text: &'static str,
    pub reasoning: &'static str,
    pub label: &'static str,
}

const fn example(text: &'static str, label: &'static str, reasoning: &'static str) -> FewShotExample {
    FewShotExample {
        text,
        reasoning,
        label,
    }
}

pub const SENTIMENT_EXAMPLES: &[FewShotExample] = &[
    example("First salary mili aaj", "positive", "achievement"),
    example("Client meeting cancel ho gayi", "negative", "disappointment"),
    example("Propose karne ka plan bana raha hu", "positive", "hopeful"),
    example("Boss se fight ho gayi", "negative", "conflict"),
    example("Bhai ki engagement hai next month", "positive", "family joy"),
    example("Job achhi hai par ghar se door", "negative", "problem dominates"),
    example("Promotion ka chance lag raha", "positive", "opportunity"),
    example("Interview clear nahi hua", "negative", "failure"),
    example("Kya karu samajh nahi aa raha", "neutral", "question"),
    example("Health checkup karwani hai", "neutral", "planning"),
    example("Maa ki tabiyat theek nahi", "negative", "worry"),
    example("Girlfriend se breakup ho gaya", "negative", "loss"),
    example("Naya project mila office mein", "positive", "achievement"),
    example("Crush ne baat nahi ki", "negative", "rejection"),
    example("Family dinner plan kar rahe", "positive", "anticipation"),
    example("Salary increase ki umeed hai", "positive", "hope"),
    example("Papa gussa hain mujhse", "negative", "conflict"),
    example("Doctor ne medicine change kar di", "neutral", "update"),
    example("Bore ho raha hu ghar pe", "negative", "dissatisfaction"),
    example("Shaadi ki date fix ho gayi", "positive", "milestone"),
];

pub const CATEGORY_EXAMPLES: &[FewShotExample] = &[
    example("Client meeting cancel ho gayi", "career", "work context"),
    example("Bhai ki engagement hai", "family", "sibling event"),
    example("Boss se fight ho gayi", "career", "workplace"),
    example("Propose karne ka plan", "love_life", "romantic"),
    example("First salary mili", "career", "work achievement"),
    example("Girlfriend se breakup", "love_life", "relationship"),
    example("Maa ki tabiyat kharab", "health", "health issue"),
    example("Promotion ka chance", "career", "work progression"),
    example("Papa gussa hain", "family", "parent conflict"),
    example("Crush ne ignore kiya", "love_life", "romantic"),
    example("Interview clear nahi hua", "career", "job hunting"),
    example("Bore ho raha hu", "mood", "emotional state"),
    example("Health checkup karwani hai", "health", "medical"),
    example("Office mein tension", "career", "work stress"),
    example("Family dinner plan", "family", "family activity"),
    example("Dating app use karu kya", "love_life", "romantic"),
    example("Doctor ne medicine di", "health", "treatment"),
    example("Salary increase chahiye", "career", "compensation"),
    example("Behen ki shaadi", "family", "sibling event"),
    example("Akela feel ho raha hu", "mood", "loneliness"),
    example("Blood pressure high hai", "health", "condition"),
    example("Client presentation hai kal", "career", "work task"),
    example("Valentine's Day ka plan", "love_life", "romantic"),
    example("Maa-Papa se baat nahi", "family", "communication"),
    example("Anxiety ho rahi hai", "mood", "mental state"),
];

const SENTIMENT_STEPS: &str = "\
1. Key emotional words? (achievements, problems, neutral facts)
2. Emotion expressed? (joy, hope, worry, anger, question)
3. Compound statement? Does negative dominate?";

const CATEGORY_STEPS: &str = "\
1. Key context words?
   - Work: salary, job, boss, client, office, meeting, interview
   - Romance: propose, dating, girlfriend, boyfriend, crush, love
   - Family: maa, papa, bhai, behen, family, shaadi, engagement
   - Health: doctor, hospital, medicine, tabiyat, bimar
   - Mood: bore, sad, khush, lonely, tension (standalone)

2. PRIMARY context?
   - \"Meeting\" + work words = career
   - \"Bhai/Behen\" + their events = family
   - \"Propose\" + romantic = love_life

3. Avoid confusion:
   - Family member's health → health
   - Sibling's wedding → family
   - Work meeting → career";

/// Few-shot examples for `task`
pub fn examples(task: Task) -> &'static [FewShotExample] {
    match task {
        Task::Sentiment => SENTIMENT_EXAMPLES,
        Task::Category => CATEGORY_EXAMPLES,
    }
}

/// Build the chain-of-thought prompt for `task`
pub fn build_prompt(task: Task, text: &str) -> String {
    let steps = match task {
        Task::Sentiment => SENTIMENT_STEPS,
        Task::Category => CATEGORY_STEPS,
    };
    let labels = match task {
        Task::Sentiment => "positive, neutral, or negative".to_string(),
        Task::Category => task.labels().join(", "),
    };

    let mut prompt = format!(
        "Analyze this Hinglish text: \"{text}\"\n\nThink step by step:\n{steps}\n\nClassify as: {labels}\n\nExamples:\n"
    );

    for (i, ex) in examples(task).iter().enumerate() {
        if i > 0 {
            prompt.push('\n');
        }
        // writing to a String cannot fail
        let _ = writeln!(
            prompt,
            "Input: \"{}\"\nReasoning: {}\nClassification: {}",
            ex.text, ex.reasoning, ex.label
        );
    }

    let _ = write!(
        prompt,
        "\nNow analyze: \"{text}\"\nReasoning:\nClassification:"
    );
    prompt
}

/// Extracts a task label from free-form model output
pub struct LabelParser {
    classification: Regex,
}

impl LabelParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            classification: Regex::new(r"(?i)Classification:\s*(\w+)").map_err(|e| {
                hinglish_core::Error::classifier(format!(
                    "Failed to compile classification regex: {}",
                    e
                ))
            })?,
        })
    }

    /// Parse a label for `task` out of `response`.
    ///
    /// An explicit `Classification: <label>` wins. Otherwise the first
    /// label (in label-set order) found in the last line is taken.
    pub fn parse(&self, task: Task, response: &str) -> Option<&'static str> {
        let response = response.trim();
        if response.is_empty() {
            return None;
        }

        if let Some(captured) = self
            .classification
            .captures(response)
            .and_then(|caps| caps.get(1))
        {
            let word = captured.as_str().to_lowercase();
            if let Some(label) = task.labels().iter().copied().find(|l| *l == word) {
                return Some(label);
            }
        }

        let last_line = response.lines().last().unwrap_or(response).to_lowercase();
        task.labels()
            .iter()
            .find(|label| last_line.contains(*label))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_labels_are_valid() {
        assert_eq!(SENTIMENT_EXAMPLES.len(), 20);
        assert_eq!(CATEGORY_EXAMPLES.len(), 25);
        for task in [Task::Sentiment, Task::Category] {
            assert!(examples(task).iter().all(|ex| task.is_valid_label(ex.label)));
        }
    }

    #[test]
    fn test_prompt_layout() {
        let prompt = build_prompt(Task::Category, "Kal exam hai");
        assert!(prompt.starts_with("Analyze this Hinglish text: \"Kal exam hai\""));
        assert!(prompt.contains("Classify as: career, love_life, family, health, mood"));
        assert!(prompt.contains("Input: \"Behen ki shaadi\"\nReasoning: sibling event\nClassification: family\n"));
        assert!(prompt.ends_with("Now analyze: \"Kal exam hai\"\nReasoning:\nClassification:"));

        let prompt = build_prompt(Task::Sentiment, "x");
        assert!(prompt.contains("Classify as: positive, neutral, or negative"));
    }

    #[test]
    fn test_parse_classification_line() {
        let parser = LabelParser::new().unwrap();

        let response = "Reasoning: work stress\nClassification: Career";
        assert_eq!(parser.parse(Task::Category, response), Some("career"));

        let response = "classification:negative\nthe user is upset";
        assert_eq!(parser.parse(Task::Sentiment, response), Some("negative"));
    }

    #[test]
    fn test_parse_falls_back_to_last_line() {
        let parser = LabelParser::new().unwrap();

        // captured word is not a label, last line decides
        let response = "Classification: unclear\nI think this is about love_life";
        assert_eq!(parser.parse(Task::Category, response), Some("love_life"));

        // label-set order breaks ties within the last line
        let response = "hmm\nnegative or positive?";
        assert_eq!(parser.parse(Task::Sentiment, response), Some("positive"));
    }

    #[test]
    fn test_parse_unparseable() {
        let parser = LabelParser::new().unwrap();
        assert_eq!(parser.parse(Task::Sentiment, ""), None);
        assert_eq!(parser.parse(Task::Sentiment, "I cannot decide."), None);
        assert_eq!(parser.parse(Task::Category, "Classification: finance"), None);
    }
}
