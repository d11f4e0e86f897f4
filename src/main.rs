//! RAG Evaluator CLI
//!
//! Builds the vector index, answers questions against it, and runs the
//! offline evaluation harness.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rag_evaluator::{
    config::Config,
    embedding::{self, RelevanceScorer},
    engine::RagEngine,
    eval::{
        BenchmarkBuilder, Evaluation, QaSynthesizer, QuestionTemplates, RunOptions, seeded_rng,
    },
    index::{self, CorpusIndexer, Retriever},
    llm::LlmClient,
    persistence::{DEFAULT_DATASET_FILENAME, DEFAULT_REPORT_FILENAME, save_benchmark},
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// RAG Evaluator - retrieval-augmented QA over a wiki corpus, and its evaluation harness
#[derive(Parser)]
#[command(name = "rag-eval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log progress at info level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed the corpus and upsert it into the vector index
    Index {
        /// Directory of corpus JSON files
        #[arg(long)]
        corpus: Option<PathBuf>,
    },

    /// Answer one question with retrieval-augmented generation
    Query {
        /// The question to answer
        question: String,

        /// Number of passages used as context
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Synthesize the QA benchmark without evaluating
    Generate {
        /// Directory of corpus JSON files
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Output path for the benchmark
        #[arg(short, long, default_value = DEFAULT_DATASET_FILENAME)]
        output: PathBuf,

        /// Questions per document
        #[arg(long)]
        per_document: Option<usize>,

        /// Random seed for reproducible template selection
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run the full retrieval and generation evaluation
    Evaluate {
        /// Directory of corpus JSON files
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Output path for the evaluation report
        #[arg(short, long, default_value = DEFAULT_REPORT_FILENAME)]
        output: PathBuf,

        /// Output path for the synthesized benchmark
        #[arg(long, default_value = DEFAULT_DATASET_FILENAME)]
        dataset_output: PathBuf,

        /// Evaluate a stored benchmark instead of synthesizing one
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Number of items sampled for generation scoring
        #[arg(long)]
        sample_size: Option<usize>,

        /// Passages retrieved per question when scoring retrieval
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Random seed for template and sample selection
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Test LLM connection
    Test,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Index { corpus } => cmd_index(config, corpus).await,
        Commands::Query { question, top_k } => cmd_query(config, question, top_k).await,
        Commands::Generate {
            corpus,
            output,
            per_document,
            seed,
        } => cmd_generate(config, corpus, output, per_document, seed).await,
        Commands::Evaluate {
            corpus,
            output,
            dataset_output,
            dataset,
            sample_size,
            top_k,
            seed,
        } => {
            let mut config = config;
            if let Some(n) = sample_size {
                config.eval.generation_sample_size = n;
            }
            if let Some(k) = top_k {
                config.eval.retrieval_top_k = k;
            }
            if seed.is_some() {
                config.eval.seed = seed;
            }
            let options = RunOptions {
                corpus_path: corpus.unwrap_or_else(|| config.corpus_path.clone()),
                dataset,
                dataset_output,
                report_output: output,
            };
            cmd_evaluate(config, options).await
        }
        Commands::Test => cmd_test(config).await,
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "info" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn cmd_index(config: Config, corpus: Option<PathBuf>) -> Result<()> {
    config.validate_embedding().context("Invalid configuration")?;
    config.validate_index().context("Invalid configuration")?;

    let corpus = corpus.unwrap_or_else(|| config.corpus_path.clone());
    println!("Indexing corpus: {}", corpus.display());
    println!("Embedding model: {}", config.embedding.model);

    let start = Instant::now();
    let embedder = embedding::from_config(&config.embedding).context("Failed to load embedder")?;
    let store = index::from_config(&config.index).context("Failed to open vector index")?;

    let indexer = CorpusIndexer::new(embedder, store, config.embedding.batch_size);
    let stats = indexer
        .index_corpus(&corpus)
        .await
        .context("Failed to index corpus")?;

    println!("\nIndex Built:");
    println!("  Documents:   {}", stats.documents);
    println!("  Passages:    {}", stats.passages);
    println!("  Build time:  {:.2?}", start.elapsed());

    Ok(())
}

async fn cmd_query(config: Config, question: String, top_k: Option<usize>) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let embedder = embedding::from_config(&config.embedding).context("Failed to load embedder")?;
    let store = index::from_config(&config.index).context("Failed to open vector index")?;
    let client = LlmClient::new(config.llm.clone());
    let mut session = client.new_session();

    let engine = RagEngine::new(Retriever::new(embedder, store), Arc::new(client));
    let top_k = top_k.unwrap_or(config.eval.answer_top_k);

    let start = Instant::now();
    let answer = engine
        .generate_answer(&mut session, &question, top_k)
        .await
        .context("Failed to generate answer")?;

    println!("{}", answer);
    println!("{}", "─".repeat(60));
    println!("Answered in {:.2?} using {}", start.elapsed(), config.llm.model);

    Ok(())
}

async fn cmd_generate(
    config: Config,
    corpus: Option<PathBuf>,
    output: PathBuf,
    per_document: Option<usize>,
    seed: Option<u64>,
) -> Result<()> {
    config.validate_embedding().context("Invalid configuration")?;

    let corpus = corpus.unwrap_or_else(|| config.corpus_path.clone());
    let per_document = per_document.unwrap_or(config.eval.questions_per_document);

    let embedder = embedding::from_config(&config.embedding).context("Failed to load embedder")?;
    let templates = QuestionTemplates::for_language(config.eval.question_language);
    let builder = BenchmarkBuilder::new(QaSynthesizer::new(
        RelevanceScorer::new(embedder),
        templates,
    ));

    let mut rng = seeded_rng(seed.or(config.eval.seed));
    let benchmark = builder
        .build(&corpus, per_document, &mut rng)
        .await
        .context("Failed to build benchmark")?;
    save_benchmark(&benchmark.items, &output).context("Failed to save benchmark")?;

    println!("Generated {} QA pairs from {} files", benchmark.len(), benchmark.files_processed);
    println!("Benchmark saved to: {}", output.display());

    Ok(())
}

async fn cmd_evaluate(config: Config, options: RunOptions) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    println!("Evaluating RAG pipeline");
    println!("  Corpus:  {}", options.corpus_path.display());
    println!("  Model:   {}", config.llm.model);
    println!("  Index:   {:?}", config.index.provider);

    let embedder = embedding::from_config(&config.embedding).context("Failed to load embedder")?;
    let store = index::from_config(&config.index).context("Failed to open vector index")?;
    let client = LlmClient::new(config.llm.clone());
    let mut session = client.new_session();

    let start = Instant::now();
    let evaluation = Evaluation::new(embedder, store, Arc::new(client), config.eval.clone());
    let report = evaluation
        .run(&options, &mut session)
        .await
        .context("Evaluation failed")?;

    report.print_summary();
    println!("Report saved to: {}", options.report_output.display());
    println!("Total time: {:.1}s", start.elapsed().as_secs_f64());

    Ok(())
}

async fn cmd_test(config: Config) -> Result<()> {
    println!("Testing LLM connection...\n");

    let key_prefix: String = config.llm.api_key.chars().take(8).collect();
    println!("Configuration:");
    println!("  API Base:  {}", config.llm.api_base);
    println!("  Model:     {}", config.llm.model);
    println!("  API Key:   {}...", key_prefix);
    println!();

    if let Err(e) = config.validate_llm() {
        println!("Configuration error: {}", e);
        return Ok(());
    }

    let client = LlmClient::new(config.llm);

    println!("Sending test request...");
    match client.test_connection().await {
        Ok(()) => {
            println!("Connection successful!");
        }
        Err(e) => {
            println!("Connection failed: {}", e);
        }
    }

    Ok(())
}
