// SPDX-License-Identifier: MIT

//! Pairwise file similarity and version grouping
//!
//! Content similarity is cosine over TF-IDF vectors built from the
//! compared corpus; name similarity is a normalized edit distance over
//! filename stems. The overall score is their weighted combination.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::classify::tokenize;
use crate::config::SimilarityConfig;
use crate::extract::ExtractorRegistry;
use crate::Result;

/// Similarity scores for one file pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityReport {
    pub content_similarity: f64,
    pub name_similarity: f64,
    pub overall_similarity: f64,
}

/// Files judged to be versions of one another
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionGroup {
    pub id: String,
    pub members: Vec<PathBuf>,
}

/// Sparse term-frequency vector
type TermVector = HashMap<String, f64>;

/// Similarity engine over a fixed configuration
pub struct SimilarityEngine {
    settings: SimilarityConfig,
    registry: ExtractorRegistry,
    max_content_bytes: usize,
}

impl SimilarityEngine {
    pub fn new(settings: SimilarityConfig, max_content_bytes: usize) -> Self {
        Self {
            settings,
            registry: ExtractorRegistry::new(),
            max_content_bytes,
        }
    }

    /// Compare two files
    pub fn compare_files(&self, a: &Path, b: &Path) -> Result<SimilarityReport> {
        let text_a = self.registry.extract_text(a, self.max_content_bytes);
        let text_b = self.registry.extract_text(b, self.max_content_bytes);
        Ok(self.compare_texts(&text_a, &text_b, a, b))
    }

    /// Compare already-extracted texts for two paths
    pub fn compare_texts(&self, text_a: &str, text_b: &str, a: &Path, b: &Path) -> SimilarityReport {
        let docs = [tokenize(text_a), tokenize(text_b)];
        let idf = inverse_document_frequencies(&docs);
        let va = tf_idf_vector(&docs[0], &idf);
        let vb = tf_idf_vector(&docs[1], &idf);

        let content_similarity = cosine_similarity(&va, &vb);
        let name_similarity = stem_similarity(a, b);
        let overall_similarity = self.settings.content_weight * content_similarity
            + self.settings.name_weight * name_similarity;

        SimilarityReport {
            content_similarity,
            name_similarity,
            overall_similarity,
        }
    }

    /// Find all pairs in a directory scoring at or above `threshold`
    pub fn find_similar_files(
        &self,
        files: &[PathBuf],
        threshold: f64,
    ) -> Vec<(PathBuf, PathBuf, f64)> {
        // Extract each file once; pairwise comparison reuses the texts
        let texts: Vec<String> = files.iter()
            .map(|p| self.registry.extract_text(p, self.max_content_bytes))
            .collect();

        let mut pairs = Vec::new();
        for i in 0..files.len() {
            for j in (i + 1)..files.len() {
                let report = self.compare_texts(&texts[i], &texts[j], &files[i], &files[j]);
                if report.overall_similarity >= threshold {
                    pairs.push((files[i].clone(), files[j].clone(), report.overall_similarity));
                }
            }
        }

        pairs.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
        pairs
    }

    /// Group files into version groups: connected components over the
    /// pair graph at the configured version threshold.
    pub fn group_versions(&self, files: &[PathBuf]) -> Vec<VersionGroup> {
        let pairs = self.find_similar_files(files, self.settings.version_threshold);

        // Union-find over file indices
        let index: HashMap<&PathBuf, usize> = files.iter().enumerate()
            .map(|(i, p)| (p, i))
            .collect();
        let mut parent: Vec<usize> = (0..files.len()).collect();

        fn find(parent: &mut Vec<usize>, x: usize) -> usize {
            if parent[x] != x {
                let root = find(parent, parent[x]);
                parent[x] = root;
            }
            parent[x]
        }

        for (a, b, _) in &pairs {
            let (ia, ib) = (index[a], index[b]);
            let (ra, rb) = (find(&mut parent, ia), find(&mut parent, ib));
            if ra != rb {
                parent[ra] = rb;
            }
        }

        let mut groups: BTreeMap<usize, Vec<PathBuf>> = BTreeMap::new();
        for (i, file) in files.iter().enumerate() {
            let root = find(&mut parent, i);
            groups.entry(root).or_default().push(file.clone());
        }

        groups.into_values()
            .filter(|members| members.len() > 1)
            .map(|mut members| {
                members.sort();
                VersionGroup {
                    id: uuid::Uuid::new_v4().to_string(),
                    members,
                }
            })
            .collect()
    }
}

/// Assign a version type from the configured vocabulary to each member
/// of a group, ordered by modification time: the oldest member is the
/// draft, the newest the final, anything between revised. The
/// vocabulary is positional: `[unique, draft, revised, final]`.
pub fn label_versions(
    group: &VersionGroup,
    version_types: &[String],
) -> Vec<(PathBuf, String)> {
    let type_at = |i: usize| {
        version_types.get(i)
            .cloned()
            .unwrap_or_else(|| "version".to_string())
    };

    if group.members.len() == 1 {
        return vec![(group.members[0].clone(), type_at(0))];
    }

    let mut ordered: Vec<PathBuf> = group.members.clone();
    ordered.sort_by_key(|p| {
        std::fs::metadata(p)
            .and_then(|m| m.modified())
            .unwrap_or(std::time::UNIX_EPOCH)
    });

    let last = ordered.len() - 1;
    ordered.into_iter()
        .enumerate()
        .map(|(i, path)| {
            let label = if i == 0 {
                type_at(1)
            } else if i == last {
                type_at(3)
            } else {
                type_at(2)
            };
            (path, label)
        })
        .collect()
}

/// Generate a distinct version name for a file that keeps the stem and
/// extension and appends a short discriminator derived from the path.
pub fn generate_version_name(path: &Path, report: &SimilarityReport) -> String {
    let stem = path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("file");
    let ext = path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    let hash = blake3::hash(path.to_string_lossy().as_bytes());
    let short = &hash.to_hex()[..4];

    // Fold the similarity bucket into the name so near-identical copies
    // sort next to each other.
    let bucket = (report.overall_similarity * 9.0).round() as u8;

    if ext.is_empty() {
        format!("{}_v{}{}", stem, bucket, short)
    } else {
        format!("{}_v{}{}.{}", stem, bucket, short, ext)
    }
}

/// Smoothed inverse document frequency over a small corpus
fn inverse_document_frequencies(docs: &[Vec<String>]) -> HashMap<String, f64> {
    let total = docs.len() as f64;
    let mut df: HashMap<String, usize> = HashMap::new();

    for doc in docs {
        let mut seen = std::collections::HashSet::new();
        for token in doc {
            if seen.insert(token) {
                *df.entry(token.clone()).or_insert(0) += 1;
            }
        }
    }

    df.into_iter()
        .map(|(term, count)| {
            let idf = ((total + 1.0) / (count as f64 + 1.0)).ln() + 1.0;
            (term, idf)
        })
        .collect()
}

fn tf_idf_vector(tokens: &[String], idf: &HashMap<String, f64>) -> TermVector {
    let mut tf: HashMap<&str, f64> = HashMap::new();
    for token in tokens {
        *tf.entry(token.as_str()).or_insert(0.0) += 1.0;
    }

    let len = tokens.len().max(1) as f64;
    tf.into_iter()
        .map(|(term, count)| {
            let weight = (count / len) * idf.get(term).copied().unwrap_or(1.0);
            (term.to_string(), weight)
        })
        .collect()
}

/// Cosine similarity between two sparse vectors
fn cosine_similarity(a: &TermVector, b: &TermVector) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter()
        .filter_map(|(term, wa)| b.get(term).map(|wb| wa * wb))
        .sum();
    let norm_a: f64 = a.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b: f64 = b.values().map(|w| w * w).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Normalized similarity between two filename stems
fn stem_similarity(a: &Path, b: &Path) -> f64 {
    let stem_a = a.file_stem().and_then(|s| s.to_str()).unwrap_or_default().to_lowercase();
    let stem_b = b.file_stem().and_then(|s| s.to_str()).unwrap_or_default().to_lowercase();

    if stem_a.is_empty() && stem_b.is_empty() {
        return 0.0;
    }

    let distance = levenshtein(&stem_a, &stem_b) as f64;
    let max_len = stem_a.chars().count().max(stem_b.chars().count()) as f64;
    if max_len == 0.0 {
        return 0.0;
    }
    1.0 - (distance / max_len)
}

/// Classic two-row Levenshtein distance
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
