use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use docrank_core::config::{resolve_with_base, Config, Settings};
use docrank_core::corpus::CorpusLoader;
use docrank_core::types::{Corpus, ScoringMethod};
use docrank_embed::{embedding_table, SemanticIndex, TableSource};
use docrank_query::{
    handle_search, health, read_queries, run_batch, write_results, IndexSnapshot, SearchService,
};
use docrank_text::{load_index, save_index, LexicalIndex};

#[derive(Parser)]
#[command(name = "docrank", about = "Rank HTML documents against free-text queries", version)]
struct Cli {
    /// Directory holding config.toml / config.<env>.toml
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the HTML corpus and build the lexical index
    Index {
        /// Corpus directory (defaults to data.corpus_dir)
        #[arg(short, long)]
        corpus: Option<PathBuf>,

        /// Index file to write (defaults to data.index_file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only index the first N files
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Run one query and print the top results
    Search {
        query: String,

        /// lexical (tfidf) or semantic (word2vec)
        #[arg(short, long)]
        method: Option<String>,

        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print the JSON response the search API would return
        #[arg(long)]
        json: bool,
    },

    /// Rank every document for each query in a CSV batch
    Batch {
        #[arg(short, long)]
        queries: Option<PathBuf>,

        #[arg(short, long)]
        results: Option<PathBuf>,

        #[arg(short, long)]
        method: Option<String>,
    },

    /// Print statistics for the stored index
    Stats,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load_from(&cli.config_dir).context("loading configuration")?;
    let settings = config.settings()?;
    let base = cli.config_dir.as_path();

    match cli.command {
        Commands::Index { corpus, output, limit } => {
            let corpus_dir =
                corpus.unwrap_or_else(|| resolve_with_base(base, &settings.data.corpus_dir));
            let index_file =
                output.unwrap_or_else(|| resolve_with_base(base, &settings.data.index_file));
            println!("📂 Corpus: {}", corpus_dir.display());
            let corpus = load_corpus(&corpus_dir, limit)?;
            let index = LexicalIndex::build(&corpus, settings.lexical.clone())?;
            save_index(&index, &index_file)?;
            let stats = index.stats();
            println!(
                "✅ Indexed {} documents ({} terms) → {}",
                stats.documents,
                stats.vocabulary_size,
                index_file.display()
            );
        }
        Commands::Search { query, method, top_k, json } => {
            let method = parse_method(method.as_deref(), &settings)?;
            let service = open_service(&settings, base, method)?;
            if json {
                let mut request = serde_json::json!({ "query": query, "method": method.as_str() });
                if let Some(k) = top_k {
                    request["top_k"] = serde_json::json!(k);
                }
                let (status, body) = handle_search(&service, &request);
                let reply = serde_json::json!({ "status": status, "body": body });
                println!("{}", serde_json::to_string_pretty(&reply)?);
            } else {
                let found = service.search(&query, Some(method), top_k)?;
                println!("🔎 \"{}\" ({})", found.query, found.method);
                for r in &found.results {
                    println!("{:>3}. {:<40} {:.4}", r.rank, r.doc_id, r.score);
                }
            }
        }
        Commands::Batch { queries, results, method } => {
            let method = parse_method(method.as_deref(), &settings)?;
            let queries_file =
                queries.unwrap_or_else(|| resolve_with_base(base, &settings.data.queries_file));
            let results_file =
                results.unwrap_or_else(|| resolve_with_base(base, &settings.data.results_file));
            let service = open_service(&settings, base, method)?;
            let batch = read_queries(&queries_file)?;
            let rows = run_batch(&service, &batch, method)?;
            write_results(&results_file, &rows)?;
            println!(
                "✅ {} queries → {} rows in {}",
                batch.len(),
                rows.len(),
                results_file.display()
            );
        }
        Commands::Stats => {
            let index_file = resolve_with_base(base, &settings.data.index_file);
            let index = load_index(&index_file)?;
            let stats = index.stats();
            let service = SearchService::new(IndexSnapshot::new(index, None)?);
            let report = health(&service);
            println!("📊 Index: {}", index_file.display());
            println!("   documents:       {}", stats.documents);
            println!("   vocabulary:      {}", stats.vocabulary_size);
            println!("   non-zero cells:  {}", stats.non_zero);
            println!("   sparsity:        {:.2}%", stats.sparsity_percent);
            println!("   status:          {} ({})", report.status, report.methods.join(", "));
        }
    }
    Ok(())
}

fn parse_method(arg: Option<&str>, settings: &Settings) -> anyhow::Result<ScoringMethod> {
    let raw = arg.unwrap_or(&settings.search.default_method);
    Ok(raw.parse()?)
}

fn load_corpus(dir: &Path, limit: Option<usize>) -> anyhow::Result<Corpus> {
    let loader = CorpusLoader::new();
    let corpus = match limit {
        Some(limit) => loader.load_directory_limited(dir, limit),
        None => loader.load_directory(dir),
    };
    corpus.with_context(|| format!("loading corpus from {}", dir.display()))
}

/// Load the stored lexical index; build the semantic index only when it is asked for.
fn open_service(
    settings: &Settings,
    base: &Path,
    method: ScoringMethod,
) -> anyhow::Result<SearchService> {
    let index_file = resolve_with_base(base, &settings.data.index_file);
    let lexical =
        load_index(&index_file).context("loading lexical index (run `docrank index` first)")?;
    let semantic = match method {
        ScoringMethod::Lexical => None,
        ScoringMethod::Semantic => Some(build_semantic(settings, base, lexical.document_ids())?),
    };
    let service = SearchService::new(IndexSnapshot::new(lexical, semantic)?)
        .with_defaults(settings.search.default_top_k, method)?;
    Ok(service)
}

fn build_semantic(
    settings: &Settings,
    base: &Path,
    indexed_ids: &[String],
) -> anyhow::Result<SemanticIndex> {
    let corpus_dir = resolve_with_base(base, &settings.data.corpus_dir);
    let corpus = load_corpus(&corpus_dir, None)?;
    let corpus = Corpus::new(
        corpus
            .documents()
            .iter()
            .filter(|d| indexed_ids.contains(&d.doc_id))
            .cloned()
            .collect(),
    )?;
    let source = TableSource::from_settings(&settings.embedding, base)?;
    let table = embedding_table(&source)?;

    let progress = ProgressBar::new(corpus.len() as u64);
    progress.set_style(ProgressStyle::with_template(
        "{spinner} embedding [{bar:40}] {pos}/{len} {msg}",
    )?);
    let index = SemanticIndex::build_with_progress(&corpus, Arc::clone(&table), |doc_id| {
        progress.set_message(doc_id.to_string());
        progress.inc(1);
    })?;
    progress.finish_and_clear();
    println!("🧠 Embedded {} documents (dim {})", index.document_ids().len(), table.dim());
    Ok(index)
}
