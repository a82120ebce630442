//! Builds `(agent, predicate, patients)` records from linker groups.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::AmrGraph;
use crate::linker::{linker_groups, LinkerGroup};
use crate::propbank::RoleTable;
use crate::types::{Node, Var};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripleRecord {
    pub agent: Option<Node>,
    pub predicate: Var,
    pub patients: Vec<Node>,
}

impl TripleRecord {
    pub fn new(predicate: Var) -> Self {
        TripleRecord { agent: None, predicate, patients: Vec::new() }
    }

    /// A record is kept only if it has an agent or at least one patient.
    pub fn is_retained(&self) -> bool {
        self.agent.is_some() || !self.patients.is_empty()
    }
}

/// Records keyed by predicate variable, in the order they were first created.
pub type TripleMap = IndexMap<Var, TripleRecord>;

fn concept_for<'g, G: AmrGraph + ?Sized>(graph: &'g G, var: &Var) -> Result<&'g str> {
    graph
        .concept_of(var)
        .ok_or_else(|| Error::MissingConcept { var: var.to_string() })
}

/// Runs the forward pass and then the inverse pass over `groups`.
///
/// Forward `:ARGn` edges fill the record of their head; a later agent edge
/// replaces an earlier one. Inverse `:ARGn-of` edges are keyed by their
/// dependent, which is the predicate, and either create its record or merge
/// into the one the forward pass left behind.
pub fn build_triples<G: AmrGraph + ?Sized>(
    graph: &G,
    table: &RoleTable,
    groups: &[LinkerGroup],
) -> Result<TripleMap> {
    let mut triples = TripleMap::new();

    for group in groups {
        let mut record = TripleRecord::new(group.head.clone());
        for edge in group.forward_args() {
            let concept = concept_for(graph, &edge.head)?;
            if table.is_agent(&edge.role, concept)? {
                record.agent = Some(edge.dependent.clone());
            } else {
                record.patients.push(edge.dependent.clone());
            }
        }
        if record.is_retained() {
            triples.insert(record.predicate.clone(), record);
        }
    }

    for group in groups {
        for edge in group.inverse_args() {
            let predicate = edge
                .dependent
                .as_var()
                .ok_or_else(|| Error::MissingConcept { var: edge.dependent.label().to_string() })?;
            let concept = concept_for(graph, predicate)?;
            let agent = table.is_agent(&edge.role, concept)?;

            let record = triples
                .entry(predicate.clone())
                .or_insert_with(|| TripleRecord::new(predicate.clone()));
            let argument = Node::Var(edge.head.clone());
            if agent {
                record.agent = Some(argument);
            } else {
                record.patients.push(argument);
            }
        }
    }

    Ok(triples)
}

/// Linker grouping followed by [`build_triples`].
pub fn extract_triples<G: AmrGraph + ?Sized>(graph: &G, table: &RoleTable) -> Result<TripleMap> {
    let groups = linker_groups(graph);
    build_triples(graph, table, &groups)
}
