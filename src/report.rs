//! Stitches generated sentences and OpenIE output back onto the text triples
//! of one dataset, for side-by-side inspection.
//!
//! The NLG file holds one generated line per fragment of the AMR string
//! file, in the same order. The OpenIE file holds one blank-line separated
//! block per sentence of the token file; the first line of each block echoes
//! the sentence and is skipped.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::corpus::{sentences, Corpus};

struct LineCursor<'a> {
    lines: Vec<&'a str>,
    position: usize,
    source: &'a Path,
}

impl<'a> LineCursor<'a> {
    fn new(content: &'a str, source: &'a Path) -> Self {
        LineCursor { lines: content.lines().collect(), position: 0, source }
    }

    fn next_line(&mut self) -> anyhow::Result<&'a str> {
        let line = self.lines.get(self.position).copied().with_context(|| {
            format!("Ran out of lines in {:?} after {} lines", self.source, self.position)
        })?;
        self.position += 1;
        Ok(line)
    }

    /// Lines of the next block, stopping at a blank line or end of input.
    /// A block that starts with a blank line is just that line.
    fn next_block(&mut self) -> anyhow::Result<Vec<&'a str>> {
        let first = self.next_line()?;
        let mut block = vec![first];
        if first.is_empty() {
            return Ok(block);
        }
        while let Some(line) = self.lines.get(self.position).copied() {
            self.position += 1;
            if line.is_empty() {
                break;
            }
            block.push(line);
        }
        Ok(block)
    }
}

/// Quotes like Python's `repr(str)`: single quotes unless the text holds a
/// single quote and no double quote.
fn quote(item: &str) -> String {
    let delimiter = if item.contains('\'') && !item.contains('"') { '"' } else { '\'' };
    let mut quoted = String::with_capacity(item.len() + 2);
    quoted.push(delimiter);
    for c in item.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c == delimiter => {
                quoted.push('\\');
                quoted.push(c);
            }
            c => quoted.push(c),
        }
    }
    quoted.push(delimiter);
    quoted
}

/// Python-style list rendering, e.g. `['the boy', 'want-01', 'to go']`.
fn render_list(items: &[&str]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| quote(item)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Write `report/<dataset>_out.txt` under `data_dir`.
pub fn write_triples_report(
    corpus: &Corpus,
    dataset_name: &str,
    nlg_path: &Path,
    openie_path: &Path,
    data_dir: &Path,
) -> anyhow::Result<PathBuf> {
    let dataset = corpus
        .get(dataset_name)
        .with_context(|| format!("Dataset '{}' is not in the corpus", dataset_name))?;
    let nlg_content = fs::read_to_string(nlg_path)
        .with_context(|| format!("Failed to read NLG output: {:?}", nlg_path))?;
    let openie_content = fs::read_to_string(openie_path)
        .with_context(|| format!("Failed to read OpenIE output: {:?}", openie_path))?;
    let mut nlg = LineCursor::new(&nlg_content, nlg_path);
    let mut openie = LineCursor::new(&openie_content, openie_path);

    let dir = data_dir.join("report");
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {:?}", dir))?;
    let path = dir.join(format!("{}_out.txt", dataset_name));
    let file = File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut out = BufWriter::new(file);

    let mut reported = 0;
    for (document, sentence, record) in sentences(dataset) {
        if record.amr_string_triples.is_empty() {
            continue;
        }
        writeln!(out, "Document Name : {}.{}", document, sentence)?;
        writeln!(out, "Sentence: {}", record.tok.join(" "))?;
        writeln!(out, "AMR: {}", record.amr)?;
        writeln!(out, "Triplets: ")?;

        for (count, triple) in record.amr_string_triples.iter().enumerate() {
            writeln!(out, "[{}]: ", count + 1)?;
            let left = if triple.left.is_empty() { "" } else { nlg.next_line()?.trim_end() };
            let right = if triple.right.is_empty() { "" } else { nlg.next_line()?.trim_end() };
            writeln!(out, "{}", render_list(&[left, triple.predicate.as_str(), right]))?;
            if !triple.left.is_empty() {
                writeln!(out, "Left: \n{}", triple.left)?;
            }
            writeln!(out, "Middle: {}", triple.predicate)?;
            if !triple.right.is_empty() {
                writeln!(out, "Right: \n{}\n", triple.right)?;
            }
        }

        writeln!(out, "OpenIE Triplets: ")?;
        for line in openie.next_block()?.into_iter().skip(1) {
            writeln!(out, "{}", line)?;
        }
        writeln!(out, "\n")?;
        reported += 1;
    }

    out.flush().with_context(|| format!("Failed to write {:?}", path))?;
    tracing::info!("Wrote report for {} sentences to {:?}", reported, path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::TextTriple;
    use crate::corpus::{Dataset, Document, SentenceRecord};
    use crate::graph::Amr;
    use pretty_assertions::assert_eq;

    fn corpus() -> Corpus {
        let mut record = SentenceRecord::new(
            vec!["the".into(), "boy".into(), "wants".into(), "to".into(), "go".into()],
            "(w / want-01)",
            Amr::new(),
        );
        record.amr_string_triples = vec![TextTriple {
            left: "(b / boy)".to_string(),
            predicate: "want-01".to_string(),
            right: "(g / go-02)".to_string(),
        }];
        let skipped = SentenceRecord::new(vec!["hi".into()], "(h / hi)", Amr::new());

        let mut document = Document::new();
        document.insert("1".to_string(), record);
        document.insert("2".to_string(), skipped);
        let mut dataset = Dataset::new();
        dataset.insert("doc".to_string(), document);
        let mut corpus = Corpus::new();
        corpus.insert("dev".to_string(), dataset);
        corpus
    }

    #[test]
    fn stitches_nlg_and_openie_output() {
        let dir = tempfile::tempdir().unwrap();
        let nlg = dir.path().join("nlg.txt");
        let openie = dir.path().join("openie.txt");
        fs::write(&nlg, "the boy\ngoing  \n").unwrap();
        fs::write(&openie, "the boy wants to go\n0.9 (the boy; wants; to go)\n\n").unwrap();

        let path = write_triples_report(&corpus(), "dev", &nlg, &openie, dir.path()).unwrap();
        let expected = "Document Name : doc.1\n\
                        Sentence: the boy wants to go\n\
                        AMR: (w / want-01)\n\
                        Triplets: \n\
                        [1]: \n\
                        ['the boy', 'want-01', 'going']\n\
                        Left: \n(b / boy)\n\
                        Middle: want-01\n\
                        Right: \n(g / go-02)\n\n\
                        OpenIE Triplets: \n\
                        0.9 (the boy; wants; to go)\n\
                        \n\n";
        assert_eq!(fs::read_to_string(path).unwrap(), expected);
    }

    #[test]
    fn short_nlg_output_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let nlg = dir.path().join("nlg.txt");
        let openie = dir.path().join("openie.txt");
        fs::write(&nlg, "the boy\n").unwrap();
        fs::write(&openie, "the boy wants to go\n\n").unwrap();

        let err = write_triples_report(&corpus(), "dev", &nlg, &openie, dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Ran out of lines"));
    }

    #[test]
    fn lists_quote_like_python() {
        assert_eq!(render_list(&["it's", "x"]), "[\"it's\", 'x']");
        assert_eq!(render_list(&["it's \"so\""]), "['it\\'s \"so\"']");
        assert_eq!(render_list(&["a\\b"]), "['a\\\\b']");
    }

    #[test]
    fn leading_blank_line_is_its_own_block() {
        let source = Path::new("openie.txt");
        let mut cursor = LineCursor::new("\nfirst\nsecond\n\nthird\n", source);
        assert_eq!(cursor.next_block().unwrap(), vec![""]);
        assert_eq!(cursor.next_block().unwrap(), vec!["first", "second"]);
        assert_eq!(cursor.next_block().unwrap(), vec!["third"]);
        assert!(cursor.next_block().is_err());
    }
}
