//! Converts a corpus of AMR graphs into agent / predicate / patient triples.
//!
//! Reads a corpus of pre-built graphs and a PropBank role table, attaches
//! triple records and AMR text triples to every sentence, caches the result,
//! and writes the plain-text files consumed by OpenIE and AMR-to-text tools.

use std::path::PathBuf;

use amr_triples::corpus::load_corpus;
use amr_triples::report::write_triples_report;
use amr_triples::{CorpusConverter, RoleTable};
use anyhow::Context;
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "amr_triples",
    about = "Extract agent/predicate/patient triples from AMR graphs",
    long_about = "Reads a JSON corpus of AMR graphs and a PropBank role table,\n\
                  classifies the ARG edges of every predicate, and renders each\n\
                  agent and patient as an AMR fragment. The extended corpus is\n\
                  cached under <output-path>/data and reused on later runs."
)]
struct Args {
    /// Corpus of pre-built AMR graphs (JSON, optionally .gz)
    #[arg(long = "amr-corpus", required = true)]
    amr_corpus: PathBuf,

    /// PropBank role table (YAML or JSON)
    #[arg(long = "propbank", required = true)]
    propbank: PathBuf,

    /// Output directory
    #[arg(short = 'o', long = "output-path", required = true)]
    output_path: PathBuf,

    /// Write sentence tokens for OpenIE
    #[arg(long = "gen-token")]
    gen_token: bool,

    /// Write AMR string triples for the AMR generator
    #[arg(long = "gen-amr-string-triples")]
    gen_amr_string_triples: bool,

    /// Write text triples as TSV
    #[arg(long = "export-tsv")]
    export_tsv: bool,

    /// Write the NLG/OpenIE report for one dataset
    #[arg(long = "write-triples", requires_all = ["nlg_output", "openie_output"])]
    write_triples: bool,

    /// Generated sentences, one line per AMR string fragment
    #[arg(long = "nlg-output")]
    nlg_output: Option<PathBuf>,

    /// OpenIE output for the token file
    #[arg(long = "openie-output")]
    openie_output: Option<PathBuf>,

    /// Dataset the report is written for
    #[arg(long = "dataset", default_value = "dev")]
    dataset: String,

    /// Fail on the first sentence that cannot be converted
    #[arg(long = "strict")]
    strict: bool,

    /// Worker threads for conversion (default: one per core)
    #[arg(short = 'j', long = "threads")]
    threads: Option<usize>,

    /// Reconvert even if a cached extended corpus exists
    #[arg(long = "no-cache")]
    no_cache: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure the conversion thread pool")?;
    }

    let role_table = RoleTable::load(&args.propbank)?;
    let corpus = load_corpus(&args.amr_corpus)?;
    let mut converter = CorpusConverter::new(corpus, &role_table, &args.output_path);

    if !args.no_cache && converter.is_file_exist() {
        info!("Using cached extended corpus {:?}", converter.cache_path());
        converter.load_data()?;
    } else {
        let summary = converter.update_amr_corpus_with_triples();
        if args.strict {
            if let Some(failure) = summary.failures.into_iter().next() {
                anyhow::bail!("Failed to convert {}: {}", failure.sentence, failure.error);
            }
        }
        converter.save_data()?;
    }

    if args.gen_token || args.gen_amr_string_triples || args.export_tsv {
        if args.gen_token {
            for path in converter.write_tok_to_file()? {
                info!("Tokens written to {:?}", path);
            }
        }
        if args.gen_amr_string_triples {
            for path in converter.write_amr_string_to_file()? {
                info!("AMR strings written to {:?}", path);
            }
        }
        if args.export_tsv {
            for path in converter.export_tsv()? {
                info!("Triples written to {:?}", path);
            }
        }
        return Ok(());
    }

    if args.write_triples {
        let nlg_output = args.nlg_output.context("--write-triples needs --nlg-output")?;
        let openie_output = args.openie_output.context("--write-triples needs --openie-output")?;
        let path = write_triples_report(
            converter.corpus(),
            &args.dataset,
            &nlg_output,
            &openie_output,
            converter.data_dir(),
        )?;
        info!("Report written to {:?}", path);
    }

    Ok(())
}
