//! Corpus-level conversion, the extended-corpus cache, and plain-text export.
//!
//! A corpus is `dataset -> document -> sentence id -> record`, kept in
//! insertion order so every export is reproducible.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::assemble::{generate_amr_string_from_triples, TextTriple};
use crate::error::{Error, Result};
use crate::graph::Amr;
use crate::propbank::RoleTable;
use crate::triples::{extract_triples, TripleMap};

const CACHE_FILE: &str = "amr_corpus_ext.json.gz";

fn default_snt_type() -> String {
    "body".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentenceRecord {
    #[serde(rename = "type", default = "default_snt_type")]
    pub snt_type: String,
    #[serde(default)]
    pub tok: Vec<String>,
    /// AMR text as it appeared in the source file.
    #[serde(default)]
    pub amr: String,
    pub graph: Amr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triples: Option<TripleMap>,
    #[serde(default)]
    pub amr_string_triples: Vec<TextTriple>,
}

impl SentenceRecord {
    pub fn new(tok: Vec<String>, amr: impl Into<String>, graph: Amr) -> Self {
        SentenceRecord {
            snt_type: default_snt_type(),
            tok,
            amr: amr.into(),
            graph,
            triples: None,
            amr_string_triples: Vec::new(),
        }
    }
}

pub type Document = IndexMap<String, SentenceRecord>;
pub type Dataset = IndexMap<String, Document>;
pub type Corpus = IndexMap<String, Dataset>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentenceId {
    pub dataset: String,
    pub document: String,
    pub sentence: String,
}

impl fmt::Display for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}.{}", self.dataset, self.document, self.sentence)
    }
}

#[derive(Debug)]
pub struct ConversionFailure {
    pub sentence: SentenceId,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct ConversionSummary {
    pub converted: usize,
    pub failures: Vec<ConversionFailure>,
}

/// Attach triples and text triples to one sentence. On failure the record is
/// left with neither.
pub fn convert_sentence(record: &mut SentenceRecord, role_table: &RoleTable) -> Result<()> {
    record.triples = None;
    record.amr_string_triples.clear();

    let triples = extract_triples(&record.graph, role_table)?;
    let texts = generate_amr_string_from_triples(&record.graph, &triples)?;
    record.triples = Some(triples);
    record.amr_string_triples = texts;
    Ok(())
}

/// Sentences of one dataset as `(document, sentence id, record)`.
pub fn sentences(dataset: &Dataset) -> impl Iterator<Item = (&str, &str, &SentenceRecord)> {
    dataset.iter().flat_map(|(document, sentences)| {
        sentences
            .iter()
            .map(move |(id, record)| (document.as_str(), id.as_str(), record))
    })
}

fn is_gzip(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "gz")
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let reader: Box<dyn Read> = if is_gzip(path) {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    serde_json::from_reader(reader).with_context(|| format!("Failed to parse JSON: {:?}", path))
}

/// Load a corpus of pre-built graphs from JSON, optionally gzipped.
pub fn load_corpus(path: &Path) -> anyhow::Result<Corpus> {
    let corpus: Corpus = read_json(path)?;
    let count: usize = corpus.values().map(|dataset| sentences(dataset).count()).sum();
    tracing::info!("Loaded {} sentences in {} datasets from {:?}", count, corpus.len(), path);
    Ok(corpus)
}

pub struct CorpusConverter<'t> {
    corpus: Corpus,
    role_table: &'t RoleTable,
    output_path: PathBuf,
}

impl<'t> CorpusConverter<'t> {
    /// Output files go under `<output_path>/data`.
    pub fn new(corpus: Corpus, role_table: &'t RoleTable, output_path: &Path) -> Self {
        CorpusConverter {
            corpus,
            role_table,
            output_path: output_path.join("data"),
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn into_corpus(self) -> Corpus {
        self.corpus
    }

    pub fn data_dir(&self) -> &Path {
        &self.output_path
    }

    /// Convert every sentence. Sentences are independent, so they run on the
    /// rayon pool; failures are reported, not fatal.
    pub fn update_amr_corpus_with_triples(&mut self) -> ConversionSummary {
        let role_table = self.role_table;
        let mut jobs = Vec::new();
        for (dataset, documents) in self.corpus.iter_mut() {
            for (document, sentences) in documents.iter_mut() {
                for (sentence, record) in sentences.iter_mut() {
                    let id = SentenceId {
                        dataset: dataset.clone(),
                        document: document.clone(),
                        sentence: sentence.clone(),
                    };
                    jobs.push((id, record));
                }
            }
        }

        let outcomes: Vec<_> = jobs
            .into_par_iter()
            .map(|(sentence, record)| {
                convert_sentence(record, role_table)
                    .map_err(|error| ConversionFailure { sentence, error })
            })
            .collect();

        let mut summary = ConversionSummary::default();
        for outcome in outcomes {
            match outcome {
                Ok(()) => summary.converted += 1,
                Err(failure) => {
                    tracing::warn!("Failed to convert {}: {}", failure.sentence, failure.error);
                    summary.failures.push(failure);
                }
            }
        }
        tracing::info!(
            "Converted {} sentences, {} failed",
            summary.converted,
            summary.failures.len()
        );
        summary
    }

    pub fn cache_path(&self) -> PathBuf {
        self.output_path.join(CACHE_FILE)
    }

    pub fn is_file_exist(&self) -> bool {
        self.cache_path().is_file()
    }

    pub fn save_data(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.output_path)
            .with_context(|| format!("Failed to create {:?}", self.output_path))?;
        let path = self.cache_path();
        let file = File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer(&mut encoder, &self.corpus)
            .with_context(|| format!("Failed to write corpus cache {:?}", path))?;
        encoder.finish()?.flush()?;
        tracing::info!("Saved extended corpus to {:?}", path);
        Ok(())
    }

    pub fn load_data(&mut self) -> anyhow::Result<&Corpus> {
        let path = self.cache_path();
        self.corpus = read_json(&path)?;
        tracing::debug!("Loaded extended corpus from cache {:?}", path);
        Ok(&self.corpus)
    }

    fn create_output(
        &self,
        subdir: &str,
        file_name: String,
    ) -> anyhow::Result<(PathBuf, BufWriter<File>)> {
        let dir = self.output_path.join(subdir);
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {:?}", dir))?;
        let path = dir.join(file_name);
        let file = File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
        Ok((path, BufWriter::new(file)))
    }

    /// `tokens/<dataset>_tok.txt`: the tokens of every sentence that produced
    /// at least one text triple, one sentence per line.
    pub fn write_tok_to_file(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for (name, dataset) in &self.corpus {
            let (path, mut out) = self.create_output("tokens", format!("{}_tok.txt", name))?;
            for (_, _, record) in sentences(dataset) {
                if record.amr_string_triples.is_empty() {
                    continue;
                }
                writeln!(out, "{}", record.tok.join(" "))?;
            }
            out.flush().with_context(|| format!("Failed to write {:?}", path))?;
            written.push(path);
        }
        Ok(written)
    }

    /// `amr_string/<dataset>_amr_string.txt`: for each text triple its left
    /// then its right fragment, skipping empty ones.
    pub fn write_amr_string_to_file(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for (name, dataset) in &self.corpus {
            let (path, mut out) =
                self.create_output("amr_string", format!("{}_amr_string.txt", name))?;
            for (_, _, record) in sentences(dataset) {
                for triple in &record.amr_string_triples {
                    if !triple.left.is_empty() {
                        writeln!(out, "{}", triple.left)?;
                    }
                    if !triple.right.is_empty() {
                        writeln!(out, "{}", triple.right)?;
                    }
                }
            }
            out.flush().with_context(|| format!("Failed to write {:?}", path))?;
            written.push(path);
        }
        Ok(written)
    }

    /// `triples/<dataset>_triples.tsv` with one row per text triple.
    pub fn export_tsv(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for (name, dataset) in &self.corpus {
            let (path, out) = self.create_output("triples", format!("{}_triples.tsv", name))?;
            let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_writer(out);
            writer.write_record(["dataset", "document", "sentence", "left", "predicate", "right"])?;
            for (document, sentence, record) in sentences(dataset) {
                for triple in &record.amr_string_triples {
                    writer.write_record([
                        name.as_str(),
                        document,
                        sentence,
                        triple.left.as_str(),
                        triple.predicate.as_str(),
                        triple.right.as_str(),
                    ])?;
                }
            }
            writer.flush().with_context(|| format!("Failed to write {:?}", path))?;
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propbank::{RoleEntry, Roleset};
    use pretty_assertions::assert_eq;

    fn table() -> RoleTable {
        let mut table = RoleTable::new();
        table.insert(
            "want.01",
            Roleset::new(vec![
                RoleEntry { arg_number: Some(0), function_tag: "PAG".to_string() },
                RoleEntry { arg_number: Some(1), function_tag: "PPT".to_string() },
            ]),
        );
        table
    }

    fn corpus() -> Corpus {
        let wants = Amr::new()
            .instance("w", "want-01")
            .edge("w", ":ARG0", "b")
            .edge("w", ":ARG1", "g")
            .instance("b", "boy")
            .instance("g", "go-02")
            .align("w", "e.2");
        let runs = Amr::new().instance("r", "run-01").edge("r", ":ARG0", "d").instance("d", "dog");
        let sleeps = Amr::new().instance("s", "sleep-01");

        let tokens = |s: &str| s.split(' ').map(str::to_string).collect::<Vec<_>>();
        let mut document = Document::new();
        document.insert(
            "1".to_string(),
            SentenceRecord::new(tokens("the boy wants to go"), "(w / want-01)", wants),
        );
        document.insert(
            "2".to_string(),
            SentenceRecord::new(tokens("the dog runs"), "(r / run-01)", runs),
        );
        document.insert(
            "3".to_string(),
            SentenceRecord::new(tokens("sleep"), "(s / sleep-01)", sleeps),
        );

        let mut dataset = Dataset::new();
        dataset.insert("doc_0001".to_string(), document);
        let mut corpus = Corpus::new();
        corpus.insert("dev".to_string(), dataset);
        corpus
    }

    #[test]
    fn converts_and_reports_failures() {
        let table = table();
        let dir = tempfile::tempdir().unwrap();
        let mut converter = CorpusConverter::new(corpus(), &table, dir.path());
        let summary = converter.update_amr_corpus_with_triples();

        assert_eq!(summary.converted, 2);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].sentence.to_string(), "dev/doc_0001.2");

        let document = &converter.corpus()["dev"]["doc_0001"];
        assert_eq!(document["1"].amr_string_triples.len(), 1);
        assert!(document["2"].triples.is_none());
        assert_eq!(document["3"].triples.as_ref().map(|t| t.len()), Some(0));
    }

    #[test]
    fn writes_tokens_and_amr_strings() {
        let table = table();
        let dir = tempfile::tempdir().unwrap();
        let mut converter = CorpusConverter::new(corpus(), &table, dir.path());
        converter.update_amr_corpus_with_triples();

        let tok_files = converter.write_tok_to_file().unwrap();
        assert_eq!(fs::read_to_string(&tok_files[0]).unwrap(), "the boy wants to go\n");

        let amr_files = converter.write_amr_string_to_file().unwrap();
        assert!(amr_files[0].ends_with("amr_string/dev_amr_string.txt"));
        assert_eq!(fs::read_to_string(&amr_files[0]).unwrap(), "(b / boy)\n(g / go-02)\n");

        let tsv_files = converter.export_tsv().unwrap();
        let tsv = fs::read_to_string(&tsv_files[0]).unwrap();
        let mut lines = tsv.lines();
        assert_eq!(lines.next(), Some("dataset\tdocument\tsentence\tleft\tpredicate\tright"));
        assert_eq!(lines.next(), Some("dev\tdoc_0001\t1\t(b / boy)\twant-01\t(g / go-02)"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn cache_round_trips() {
        let table = table();
        let dir = tempfile::tempdir().unwrap();
        let mut converter = CorpusConverter::new(corpus(), &table, dir.path());
        assert!(!converter.is_file_exist());
        converter.update_amr_corpus_with_triples();
        converter.save_data().unwrap();
        assert!(converter.is_file_exist());

        let mut reloaded = CorpusConverter::new(Corpus::new(), &table, dir.path());
        let corpus = reloaded.load_data().unwrap();
        assert_eq!(corpus, converter.corpus());
    }
}
