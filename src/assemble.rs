//! Turns triple records into `(left, predicate, right)` AMR text triples.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::AmrGraph;
use crate::serialize::serialize_subgraph;
use crate::triples::TripleMap;

/// One NLG training example: agent fragment, predicate concept, patient fragment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextTriple {
    pub left: String,
    pub predicate: String,
    pub right: String,
}

/// Wraps a bare single-token fragment so it reads like a one-node graph.
fn wrap_leaf(text: String) -> String {
    if !text.contains(' ') && !text.starts_with('(') {
        format!("({})", text)
    } else {
        text
    }
}

/// One text triple per (record, patient) pair, in map order then patient
/// order. Records whose predicate has no token alignment are skipped; the
/// left text is empty when a record has no agent.
pub fn generate_amr_string_from_triples<G: AmrGraph + ?Sized>(
    graph: &G,
    triples: &TripleMap,
) -> Result<Vec<TextTriple>> {
    let mut results = Vec::new();
    for record in triples.values() {
        if graph.token_index(&record.predicate)?.is_none() {
            tracing::debug!("Skipping unaligned predicate {}", record.predicate);
            continue;
        }
        let predicate = graph
            .concept_of(&record.predicate)
            .ok_or_else(|| Error::MissingConcept { var: record.predicate.to_string() })?;

        let left = record
            .agent
            .as_ref()
            .map(|agent| serialize_subgraph(graph, agent))
            .unwrap_or_default();
        for patient in &record.patients {
            results.push(TextTriple {
                left: left.clone(),
                predicate: predicate.to_string(),
                right: wrap_leaf(serialize_subgraph(graph, patient)),
            });
        }
    }
    Ok(results)
}
