//! Lexical-overlap metrics: sentence BLEU and ROUGE-1/2/L.
//!
//! Every score is in `[0, 1]`.

use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashMap;

const MAX_BLEU_ORDER: usize = 4;
const BLEU_EPSILON: f64 = 0.1;

/// Tokens shorter than this are not stemmed.
const MIN_STEM_LEN: usize = 4;

/// Lowercased tokens for BLEU.
///
/// Words are runs of alphanumeric characters; an apostrophe between two
/// word characters stays inside the word. Any other non-space character is
/// a token of its own.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let chars: Vec<char> = lower.chars().collect();
    let mut tokens = Vec::new();
    let mut word = String::new();

    for (i, &c) in chars.iter().enumerate() {
        let joins_word = c == '\''
            && !word.is_empty()
            && chars.get(i + 1).is_some_and(|n| n.is_alphanumeric());

        if c.is_alphanumeric() || joins_word {
            word.push(c);
            continue;
        }

        if !word.is_empty() {
            tokens.push(std::mem::take(&mut word));
        }
        if !c.is_whitespace() {
            tokens.push(c.to_string());
        }
    }
    if !word.is_empty() {
        tokens.push(word);
    }

    tokens
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<Vec<&str>, usize> {
    let mut counts = HashMap::new();
    if n == 0 || tokens.len() < n {
        return counts;
    }
    for window in tokens.windows(n) {
        let gram: Vec<&str> = window.iter().map(String::as_str).collect();
        *counts.entry(gram).or_insert(0) += 1;
    }
    counts
}

/// Clipped n-gram matches and the candidate's n-gram total.
fn modified_precision(reference: &[String], candidate: &[String], n: usize) -> (usize, usize) {
    let reference_counts = ngram_counts(reference, n);
    let candidate_counts = ngram_counts(candidate, n);

    let matches = candidate_counts
        .iter()
        .map(|(gram, &count)| count.min(reference_counts.get(gram).copied().unwrap_or(0)))
        .sum();
    let total = candidate.len().saturating_sub(n - 1);

    (matches, total)
}

/// Sentence BLEU of `candidate` against a single `reference`.
///
/// Uniform 1-4-gram weights with a brevity penalty. An n-gram order with no
/// matches contributes `0.1 / total` instead of zero, but a candidate sharing
/// no unigram with the reference scores 0.
pub fn sentence_bleu(reference: &str, candidate: &str) -> f64 {
    let reference = tokenize(reference);
    let candidate = tokenize(candidate);
    if candidate.is_empty() || reference.is_empty() {
        return 0.0;
    }

    let precisions: Vec<(usize, usize)> = (1..=MAX_BLEU_ORDER)
        .map(|n| modified_precision(&reference, &candidate, n))
        .collect();

    if precisions[0].0 == 0 {
        return 0.0;
    }

    let weight = 1.0 / MAX_BLEU_ORDER as f64;
    let log_sum: f64 = precisions
        .iter()
        .map(|&(matches, total)| {
            let denominator = total.max(1) as f64;
            let p = if matches == 0 {
                BLEU_EPSILON / denominator
            } else {
                matches as f64 / denominator
            };
            weight * p.ln()
        })
        .sum();

    let c = candidate.len() as f64;
    let r = reference.len() as f64;
    let brevity_penalty = if c > r { 1.0 } else { (1.0 - r / c).exp() };

    (brevity_penalty * log_sum.exp()).clamp(0.0, 1.0)
}

/// ROUGE F-measures for one candidate/reference pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RougeScores {
    pub rouge1: f64,
    pub rouge2: f64,
    pub rouge_l: f64,
}

/// ROUGE-1, ROUGE-2 and ROUGE-L with English stemming.
pub struct RougeScorer {
    stemmer: Stemmer,
}

impl Default for RougeScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl RougeScorer {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Lowercased alphanumeric runs, stemmed when at least four characters long.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| {
                if t.chars().count() >= MIN_STEM_LEN {
                    self.stemmer.stem(t).into_owned()
                } else {
                    t.to_string()
                }
            })
            .collect()
    }

    pub fn score(&self, reference: &str, candidate: &str) -> RougeScores {
        let reference = self.tokenize(reference);
        let candidate = self.tokenize(candidate);

        RougeScores {
            rouge1: rouge_n(&reference, &candidate, 1),
            rouge2: rouge_n(&reference, &candidate, 2),
            rouge_l: rouge_l(&reference, &candidate),
        }
    }
}

fn f_measure(overlap: usize, reference_total: usize, candidate_total: usize) -> f64 {
    if overlap == 0 || reference_total == 0 || candidate_total == 0 {
        return 0.0;
    }
    let precision = overlap as f64 / candidate_total as f64;
    let recall = overlap as f64 / reference_total as f64;
    2.0 * precision * recall / (precision + recall)
}

fn rouge_n(reference: &[String], candidate: &[String], n: usize) -> f64 {
    let reference_counts = ngram_counts(reference, n);
    let candidate_counts = ngram_counts(candidate, n);

    let overlap: usize = candidate_counts
        .iter()
        .map(|(gram, &count)| count.min(reference_counts.get(gram).copied().unwrap_or(0)))
        .sum();

    f_measure(
        overlap,
        reference_counts.values().sum(),
        candidate_counts.values().sum(),
    )
}

/// Longest common subsequence length, two-row dynamic programming.
fn lcs_length(a: &[String], b: &[String]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for x in a {
        for (j, y) in b.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

fn rouge_l(reference: &[String], candidate: &[String]) -> f64 {
    f_measure(
        lcs_length(reference, candidate),
        reference.len(),
        candidate.len(),
    )
}

/// Arithmetic mean, 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        tokenize(text)
    }

    #[test]
    fn test_tokenize_splits_punctuation() {
        assert_eq!(tokens("Hello, World!"), vec!["hello", ",", "world", "!"]);
        assert_eq!(tokens("it's 1906."), vec!["it's", "1906", "."]);
        assert_eq!(tokens("'quoted'"), vec!["'", "quoted", "'"]);
    }

    #[test]
    fn test_tokenize_unicode_words() {
        assert_eq!(tokens("Đại học Huế"), vec!["đại", "học", "huế"]);
    }

    #[test]
    fn test_bleu_identical_long_sentence_is_one() {
        let text = "the university was founded in 1906 by the colonial government";
        assert!((sentence_bleu(text, text) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bleu_identical_short_sentence_is_smoothed_not_zero() {
        // 3 tokens: the 4-gram order has no candidates and is smoothed.
        let score = sentence_bleu("hanoi is old", "hanoi is old");
        assert!((score - 0.1f64.powf(0.25)).abs() < 1e-9);
    }

    #[test]
    fn test_bleu_no_unigram_overlap_is_zero() {
        assert_eq!(sentence_bleu("alpha beta gamma", "delta epsilon"), 0.0);
        assert_eq!(sentence_bleu("alpha", ""), 0.0);
        assert_eq!(sentence_bleu("", "alpha"), 0.0);
    }

    #[test]
    fn test_bleu_brevity_penalty() {
        let reference = "one two three four five six seven eight";
        let full = sentence_bleu(reference, reference);
        let short = sentence_bleu(reference, "one two three four");
        assert!(short < full);
        assert!(short > 0.0);
    }

    #[test]
    fn test_bleu_bounded() {
        let score = sentence_bleu("a b c d e", "a b x d e a b c");
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_rouge_identical_is_one() {
        let scorer = RougeScorer::new();
        let text = "The citadel was built by the Nguyen dynasty.";
        let scores = scorer.score(text, text);
        assert!((scores.rouge1 - 1.0).abs() < 1e-9);
        assert!((scores.rouge2 - 1.0).abs() < 1e-9);
        assert!((scores.rouge_l - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rouge_uses_stemming() {
        let scorer = RougeScorer::new();
        let scores = scorer.score("the rivers flooded", "the river floods");
        assert!((scores.rouge1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rouge_partial_overlap() {
        let scorer = RougeScorer::new();
        // reference: a b c d, candidate: a c e -> unigram overlap 2
        let scores = scorer.score("a b c d", "a c e");
        let p = 2.0 / 3.0;
        let r = 2.0 / 4.0;
        assert!((scores.rouge1 - 2.0 * p * r / (p + r)).abs() < 1e-9);
        assert_eq!(scores.rouge2, 0.0);
        // LCS(a b c d, a c e) = 2
        assert!((scores.rouge_l - scores.rouge1).abs() < 1e-9);
    }

    #[test]
    fn test_rouge_empty_side_is_zero() {
        let scorer = RougeScorer::new();
        assert_eq!(scorer.score("", "text here"), RougeScores::default());
        assert_eq!(scorer.score("text here", "..."), RougeScores::default());
    }

    #[test]
    fn test_lcs_subsequence_not_substring() {
        let a: Vec<String> = ["a", "x", "b", "y", "c"].iter().map(|s| s.to_string()).collect();
        let b: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(lcs_length(&a, &b), 3);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[0.5, 1.0, 0.0]) - 0.5).abs() < 1e-12);
    }
}
