//! Synthetic question/answer generation from a single document.

use crate::config::QuestionLanguage;
use crate::corpus::is_informative;
use crate::embedding::RelevanceScorer;
use crate::error::Result;
use rand::Rng;
use rand::seq::index;

const TITLE_PLACEHOLDER: &str = "{title}";

const ENGLISH_TEMPLATES: &[&str] = &[
    "What is {title}?",
    "When was {title} founded?",
    "Who founded {title}?",
    "Where is {title} located?",
    "Why is {title} important?",
    "How has {title} developed over time?",
    "What are the main characteristics of {title}?",
    "What role does {title} play in education?",
    "How is {title} organized?",
    "What are the notable achievements of {title}?",
];

const VIETNAMESE_TEMPLATES: &[&str] = &[
    "{title} là gì?",
    "Khi nào {title} được thành lập?",
    "Ai là người sáng lập {title}?",
    "Địa chỉ của {title} ở đâu?",
    "Tại sao {title} quan trọng?",
    "Lịch sử phát triển của {title} như thế nào?",
    "Các đặc điểm chính của {title} là gì?",
    "Vai trò của {title} trong giáo dục Việt Nam?",
    "Cơ cấu tổ chức của {title} ra sao?",
    "Thành tựu nổi bật của {title}?",
];

/// A fixed bank of title-parameterised question templates.
#[derive(Debug, Clone, Copy)]
pub struct QuestionTemplates {
    templates: &'static [&'static str],
}

impl QuestionTemplates {
    pub fn for_language(language: QuestionLanguage) -> Self {
        let templates = match language {
            QuestionLanguage::En => ENGLISH_TEMPLATES,
            QuestionLanguage::Vi => VIETNAMESE_TEMPLATES,
        };
        Self { templates }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Every template with `title` substituted, in bank order.
    pub fn render_all(&self, title: &str) -> Vec<String> {
        self.templates
            .iter()
            .map(|t| t.replace(TITLE_PLACEHOLDER, title))
            .collect()
    }

    /// `min(count, len)` distinct questions drawn uniformly without replacement.
    pub fn sample<R: Rng + ?Sized>(&self, title: &str, count: usize, rng: &mut R) -> Vec<String> {
        let amount = count.min(self.templates.len());
        index::sample(rng, self.templates.len(), amount)
            .into_iter()
            .map(|i| self.templates[i].replace(TITLE_PLACEHOLDER, title))
            .collect()
    }
}

impl Default for QuestionTemplates {
    fn default() -> Self {
        Self::for_language(QuestionLanguage::En)
    }
}

/// A synthesized question with its extractive answer and source paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct QaPair {
    pub question: String,
    pub reference_answer: String,
    pub supporting_context: String,
}

/// The first two `". "`-delimited sentences of `paragraph`.
///
/// A paragraph with a single sentence is returned whole.
pub fn extract_answer(paragraph: &str) -> String {
    let mut sentences = paragraph.split(". ");
    match (sentences.next(), sentences.next()) {
        (Some(first), Some(second)) => {
            let mut answer = format!("{}. {}", first, second);
            if !answer.ends_with('.') {
                answer.push('.');
            }
            answer
        }
        _ => paragraph.to_string(),
    }
}

/// Produces question/answer pairs from a document's informative paragraphs.
#[derive(Clone)]
pub struct QaSynthesizer {
    scorer: RelevanceScorer,
    templates: QuestionTemplates,
}

impl QaSynthesizer {
    pub fn new(scorer: RelevanceScorer, templates: QuestionTemplates) -> Self {
        Self { scorer, templates }
    }

    /// Up to `count` pairs for one document.
    ///
    /// Each question is answered from its most similar informative paragraph.
    /// Several questions may share a paragraph. A document with no informative
    /// paragraph yields nothing.
    pub async fn synthesize<R: Rng + ?Sized>(
        &self,
        title: &str,
        paragraphs: &[String],
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<QaPair>> {
        let informative: Vec<&str> = paragraphs
            .iter()
            .map(String::as_str)
            .filter(|p| is_informative(p))
            .collect();
        if informative.is_empty() || count == 0 {
            return Ok(Vec::new());
        }

        let questions = self.templates.sample(title, count, rng);
        let question_refs: Vec<&str> = questions.iter().map(String::as_str).collect();
        let best = self.scorer.best_matches(&question_refs, &informative).await?;

        Ok(questions
            .into_iter()
            .zip(best)
            .filter_map(|(question, idx)| {
                let paragraph = informative[idx?];
                Some(QaPair {
                    question,
                    reference_answer: extract_answer(paragraph),
                    supporting_context: paragraph.to_string(),
                })
            })
            .collect())
    }
}
