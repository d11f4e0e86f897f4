//! Aggregation of the two evaluation stages into one report.

use super::generation::GenerationSummary;
use super::metrics::mean;
use super::retrieval::RetrievalSummary;
use serde::{Deserialize, Serialize};

/// Size of the evaluated benchmark.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub total_qa_pairs: usize,
    pub evaluation_sample_size: usize,
    pub corpus_files_processed: usize,
}

/// The final evaluation artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub dataset_info: DatasetInfo,
    pub retrieval_summary: RetrievalSummary,
    pub generation_summary: GenerationSummary,
    /// Mean of precision, recall and hit rate.
    pub retrieval_score: f64,
    /// Mean of BLEU, ROUGE-1, semantic similarity, faithfulness and answer
    /// relevancy. ROUGE-2 and ROUGE-L are reported but not included.
    pub generation_score: f64,
    /// Mean of the retrieval and generation scores.
    pub overall_score: f64,
}

impl EvaluationReport {
    pub fn new(
        dataset_info: DatasetInfo,
        retrieval_summary: RetrievalSummary,
        generation_summary: GenerationSummary,
    ) -> Self {
        let retrieval_score = retrieval_score(&retrieval_summary);
        let generation_score = generation_score(&generation_summary);

        Self {
            dataset_info,
            retrieval_summary,
            generation_summary,
            retrieval_score,
            generation_score,
            overall_score: mean(&[retrieval_score, generation_score]),
        }
    }

    /// Print summary to stdout.
    pub fn print_summary(&self) {
        let r = &self.retrieval_summary;
        let g = &self.generation_summary;

        println!("\n========== RAG Evaluation Results ==========");
        println!("QA pairs:          {}", self.dataset_info.total_qa_pairs);
        println!("Generation sample: {}", self.dataset_info.evaluation_sample_size);
        println!("Corpus files:      {}", self.dataset_info.corpus_files_processed);
        println!("--------------------------------------------");
        println!("Retrieval ({} items, {} failed)", r.items_evaluated, r.items_failed);
        println!("  Precision@K:     {:.4}", r.avg_precision_at_k);
        println!("  Recall@K:        {:.4}", r.avg_recall_at_k);
        println!("  MRR:             {:.4}", r.avg_mrr);
        println!("  Hit rate:        {:.4}", r.hit_rate);
        println!("--------------------------------------------");
        println!("Generation ({} items, {} failed)", g.items_evaluated, g.items_failed);
        println!("  BLEU:            {:.4}", g.avg_bleu);
        println!("  ROUGE-1:         {:.4}", g.avg_rouge1);
        println!("  ROUGE-2:         {:.4}", g.avg_rouge2);
        println!("  ROUGE-L:         {:.4}", g.avg_rouge_l);
        println!("  Semantic sim.:   {:.4}", g.avg_semantic_similarity);
        println!("  Faithfulness:    {:.4}", g.avg_faithfulness);
        println!("  Relevancy:       {:.4}", g.avg_answer_relevancy);
        println!("--------------------------------------------");
        println!("Retrieval score:   {:.4}", self.retrieval_score);
        println!("Generation score:  {:.4}", self.generation_score);
        println!("Overall score:     {:.4}", self.overall_score);
        println!("============================================\n");
    }
}

fn retrieval_score(summary: &RetrievalSummary) -> f64 {
    mean(&[
        summary.avg_precision_at_k,
        summary.avg_recall_at_k,
        summary.hit_rate,
    ])
}

fn generation_score(summary: &GenerationSummary) -> f64 {
    mean(&[
        summary.avg_bleu,
        summary.avg_rouge1,
        summary.avg_semantic_similarity,
        summary.avg_faithfulness,
        summary.avg_answer_relevancy,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retrieval() -> RetrievalSummary {
        RetrievalSummary {
            avg_precision_at_k: 0.2,
            avg_recall_at_k: 0.6,
            avg_mrr: 0.5,
            hit_rate: 0.6,
            items_evaluated: 10,
            items_failed: 0,
        }
    }

    fn generation() -> GenerationSummary {
        GenerationSummary {
            avg_bleu: 0.1,
            avg_rouge1: 0.3,
            avg_rouge2: 0.9,
            avg_rouge_l: 0.9,
            avg_semantic_similarity: 0.5,
            avg_faithfulness: 0.6,
            avg_answer_relevancy: 0.5,
            items_evaluated: 5,
            items_failed: 1,
        }
    }

    #[test]
    fn test_scores_follow_composite_formula() {
        let report = EvaluationReport::new(DatasetInfo::default(), retrieval(), generation());

        let expected_retrieval = (0.2 + 0.6 + 0.6) / 3.0;
        let expected_generation = (0.1 + 0.3 + 0.5 + 0.6 + 0.5) / 5.0;
        assert!((report.retrieval_score - expected_retrieval).abs() < 1e-12);
        assert!((report.generation_score - expected_generation).abs() < 1e-12);
        assert!(
            (report.overall_score - (expected_retrieval + expected_generation) / 2.0).abs() < 1e-12
        );
    }

    #[test]
    fn test_rouge2_and_rouge_l_excluded() {
        let mut other = generation();
        other.avg_rouge2 = 0.0;
        other.avg_rouge_l = 0.0;
        let a = EvaluationReport::new(DatasetInfo::default(), retrieval(), generation());
        let b = EvaluationReport::new(DatasetInfo::default(), retrieval(), other);
        assert_eq!(a.generation_score, b.generation_score);
    }

    #[test]
    fn test_empty_run_scores_zero() {
        let report = EvaluationReport::new(
            DatasetInfo::default(),
            RetrievalSummary::default(),
            GenerationSummary::default(),
        );
        assert_eq!(report.overall_score, 0.0);
    }

    #[test]
    fn test_report_json_layout() {
        let info = DatasetInfo {
            total_qa_pairs: 12,
            evaluation_sample_size: 5,
            corpus_files_processed: 3,
        };
        let report = EvaluationReport::new(info, retrieval(), generation());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["dataset_info"]["total_qa_pairs"], 12);
        assert!(json["retrieval_summary"]["avg_mrr"].is_number());
        assert!(json["generation_summary"]["avg_rougeL"].is_number());
        assert!(json["overall_score"].is_number());
    }
}
