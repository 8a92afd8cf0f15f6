// SPDX-License-Identifier: MIT

//! Lexicon-driven file purpose classification
//!
//! Multi-label classification over the configured purpose categories.
//! Each category score combines a keyword lexicon hit-rate with the
//! token overlap between the content and the category name, weighted
//! per the classification config. Categories below the confidence
//! threshold are dropped.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::config::{CategoryConfig, ClassificationConfig};

/// Result of classifying one file's content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    /// Purpose categories with confidence scores, multi-label
    pub purposes: BTreeMap<String, f64>,
    /// Best-matching project category, if any scored at all
    pub project: Option<String>,
    /// Temporal bucket (calendar year of last modification)
    pub year: i32,
}

/// Classifier over configured category vocabularies
pub struct Classifier {
    categories: CategoryConfig,
    settings: ClassificationConfig,
}

impl Classifier {
    pub fn new(categories: CategoryConfig, settings: ClassificationConfig) -> Self {
        Self { categories, settings }
    }

    /// Classify content into purpose categories (multi-label)
    pub fn classify_purposes(&self, content: &str) -> BTreeMap<String, f64> {
        let tokens = tokenize(content);
        if tokens.is_empty() {
            return BTreeMap::new();
        }
        let token_set: HashSet<&str> = tokens.iter().map(|t| t.as_str()).collect();

        let mut scores = BTreeMap::new();
        for category in &self.categories.purpose_categories {
            let keyword_score = self.lexicon_score(category, &token_set);
            let name_score = name_overlap_score(category, &token_set);

            let score = self.settings.keyword_weight * keyword_score
                + self.settings.token_weight * name_score;

            if score >= self.settings.confidence_threshold {
                scores.insert(category.clone(), score);
            }
        }

        scores
    }

    /// Pick the best-matching project category, if any keyword hits
    pub fn classify_project(&self, content: &str) -> Option<String> {
        let tokens = tokenize(content);
        let token_set: HashSet<&str> = tokens.iter().map(|t| t.as_str()).collect();

        self.categories.project_categories.iter()
            .map(|cat| {
                let score = self.lexicon_score(cat, &token_set)
                    + name_overlap_score(cat, &token_set);
                (cat, score)
            })
            .filter(|(_, score)| *score > 0.0)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(cat, _)| cat.clone())
    }

    /// Full classification of content plus its temporal bucket
    pub fn classify(&self, content: &str, year: i32) -> Classification {
        Classification {
            purposes: self.classify_purposes(content),
            project: self.classify_project(content),
            year,
        }
    }

    /// Fraction of a category's lexicon present in the token set
    fn lexicon_score(&self, category: &str, tokens: &HashSet<&str>) -> f64 {
        let builtin = builtin_lexicon(category);
        let overrides = self.categories.keyword_overrides
            .get(category)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);

        let mut lexicon: Vec<&str> = builtin.to_vec();
        lexicon.extend(overrides.iter().map(|s| s.as_str()));

        if lexicon.is_empty() {
            return 0.0;
        }

        let hits = lexicon.iter().filter(|kw| tokens.contains(**kw)).count();
        // A handful of hits is already strong evidence; saturate early
        // rather than requiring the whole lexicon to appear.
        let saturation = (lexicon.len() as f64 / 4.0).max(1.0);
        (hits as f64 / saturation).min(1.0)
    }
}

/// Fraction of the category name's own tokens present in the content
fn name_overlap_score(category: &str, tokens: &HashSet<&str>) -> f64 {
    let name_tokens = tokenize(category);
    if name_tokens.is_empty() {
        return 0.0;
    }
    let hits = name_tokens.iter().filter(|t| tokens.contains(t.as_str())).count();
    hits as f64 / name_tokens.len() as f64
}

/// Lowercase alphanumeric tokens with stop words removed
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 2)
        .map(|w| w.to_lowercase())
        .filter(|w| !is_stop_word(w))
        .collect()
}

fn is_stop_word(word: &str) -> bool {
    matches!(word,
        "the" | "and" | "for" | "with" | "from" | "this" | "that" | "are"
        | "was" | "were" | "have" | "has" | "had" | "not" | "but" | "all"
        | "any" | "can" | "will" | "would" | "about" | "into" | "over"
        | "its" | "our" | "your" | "their" | "them" | "they" | "you"
    )
}

/// Built-in keyword lexicons for the default purpose categories
fn builtin_lexicon(category: &str) -> &'static [&'static str] {
    match category {
        "Work" => &[
            "work", "meeting", "project", "report", "deadline", "client",
            "presentation", "agenda", "quarterly", "management", "team",
            "office", "business", "strategy", "review",
        ],
        "Leisure" => &[
            "vacation", "travel", "hobby", "game", "movie", "music",
            "recipe", "cooking", "holiday", "weekend", "trip", "leisure",
        ],
        "Personal Projects" => &[
            "personal", "side", "idea", "prototype", "sketch", "diy",
            "blog", "journal", "draft", "notes",
        ],
        "Private" => &[
            "private", "confidential", "password", "secret", "identity",
            "passport", "license",
        ],
        "Family" => &[
            "family", "birthday", "wedding", "kids", "children", "parents",
            "anniversary", "photo", "reunion",
        ],
        "Education" => &[
            "course", "lecture", "homework", "assignment", "study", "exam",
            "thesis", "tutorial", "school", "university", "research",
            "academic", "lesson",
        ],
        "Finance" => &[
            "invoice", "receipt", "budget", "tax", "payment", "bank",
            "statement", "salary", "expense", "finance", "insurance",
            "loan", "investment",
        ],
        "Health" => &[
            "health", "doctor", "prescription", "medical", "fitness",
            "workout", "diet", "appointment", "hospital", "therapy",
        ],
        "Personal" => &["personal", "own", "home", "life"],
        "Academic" => &["academic", "university", "paper", "research", "citation"],
        "Freelance" => &["freelance", "contract", "gig", "invoice", "client"],
        _ => &[],
    }
}
