//! Groups the outgoing edges of every concept that carries semantic arguments.

use crate::graph::{AmrGraph, TripleQuery};
use crate::types::{Edge, Role, Var};

/// All outgoing edges of one concept, at least one of which is an `ARG` edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkerGroup {
    pub head: Var,
    pub edges: Vec<Edge>,
}

impl LinkerGroup {
    pub fn forward_args(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|edge| matches!(edge.role, Role::Arg(_)))
    }

    pub fn inverse_args(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|edge| matches!(edge.role, Role::ArgOf(_)))
    }
}

/// Linker groups in concept order. Each group keeps the source edge order.
pub fn linker_groups<G: AmrGraph + ?Sized>(graph: &G) -> Vec<LinkerGroup> {
    graph
        .concepts()
        .into_iter()
        .filter_map(|(var, _)| {
            let edges = graph.triples(&TripleQuery::new().head(var));
            edges.iter().any(|edge| edge.role.is_arg()).then(|| LinkerGroup {
                head: var.clone(),
                edges,
            })
        })
        .collect()
}
