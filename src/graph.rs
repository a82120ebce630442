//! Read-only access to a parsed AMR graph.
//!
//! The extraction code only talks to [`AmrGraph`]. [`Amr`] is the in-memory
//! implementation: it is what an external AMR reader hands over, and what
//! the corpus cache stores.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Edge, Node, Role, Var};

/// A token alignment recorded against one edge, e.g. `"e.3"` or `"e.3,4"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    pub edge: Edge,
    pub descriptor: String,
}

/// Role constraint for [`TripleQuery`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoleFilter {
    Exact(Role),
    AnyArg,
    InverseArg,
}

impl RoleFilter {
    fn matches(&self, role: &Role) -> bool {
        match self {
            RoleFilter::Exact(expected) => role == expected,
            RoleFilter::AnyArg => role.is_arg(),
            RoleFilter::InverseArg => matches!(role, Role::ArgOf(_)),
        }
    }
}

/// Edge filter. Filters match edges as stored; `normalize_inverses` then
/// rewrites each match into forward direction.
#[derive(Clone, Debug, Default)]
pub struct TripleQuery<'a> {
    head: Option<&'a Var>,
    dep: Option<&'a Var>,
    role: Option<RoleFilter>,
    normalize_inverses: bool,
}

impl<'a> TripleQuery<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn head(mut self, var: &'a Var) -> Self {
        self.head = Some(var);
        self
    }

    pub fn dep(mut self, var: &'a Var) -> Self {
        self.dep = Some(var);
        self
    }

    pub fn role(mut self, filter: RoleFilter) -> Self {
        self.role = Some(filter);
        self
    }

    pub fn normalize_inverses(mut self) -> Self {
        self.normalize_inverses = true;
        self
    }

    fn matches(&self, edge: &Edge) -> bool {
        self.head.map_or(true, |head| &edge.head == head)
            && self.dep.map_or(true, |dep| edge.dependent.as_var() == Some(dep))
            && self.role.as_ref().map_or(true, |filter| filter.matches(&edge.role))
    }
}

/// Parses the first token offset out of `"x.N[,M...]"`.
pub fn parse_offset(descriptor: &str) -> Result<usize> {
    descriptor
        .split('.')
        .nth(1)
        .and_then(|offsets| offsets.split(',').next())
        .and_then(|first| first.trim().parse().ok())
        .ok_or_else(|| Error::MalformedAlignment { descriptor: descriptor.to_string() })
}

pub trait AmrGraph {
    /// All edges in source order, `:instance-of` bindings included.
    fn edges(&self) -> &[Edge];

    fn alignments(&self) -> &[Alignment];

    /// Re-entrancy bound of `var`, if it is re-entrant at all.
    fn reentrancy(&self, var: &Var) -> Option<usize>;

    fn tokens(&self) -> &[String];

    /// `(variable, concept)` pairs in source order.
    fn concepts(&self) -> Vec<(&Var, &str)> {
        self.edges()
            .iter()
            .filter_map(|edge| match (&edge.role, &edge.dependent) {
                (Role::Instance, Node::Concept(concept)) => Some((&edge.head, concept.as_str())),
                _ => None,
            })
            .collect()
    }

    fn concept_of(&self, var: &Var) -> Option<&str> {
        self.edges().iter().find_map(|edge| match (&edge.role, &edge.dependent) {
            (Role::Instance, Node::Concept(concept)) if &edge.head == var => Some(concept.as_str()),
            _ => None,
        })
    }

    fn triples(&self, query: &TripleQuery<'_>) -> Vec<Edge> {
        self.edges()
            .iter()
            .filter(|edge| query.matches(edge))
            .map(|edge| if query.normalize_inverses { edge.normalized() } else { edge.clone() })
            .collect()
    }

    /// Token offset of `var`, taken from the first alignment recorded on one
    /// of its `:instance-of` edges.
    fn token_index(&self, var: &Var) -> Result<Option<usize>> {
        self.alignments()
            .iter()
            .find(|alignment| &alignment.edge.head == var && alignment.edge.role == Role::Instance)
            .map(|alignment| parse_offset(&alignment.descriptor))
            .transpose()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Amr {
    #[serde(default)]
    tokens: Vec<String>,
    edges: Vec<Edge>,
    #[serde(default)]
    alignments: Vec<Alignment>,
    #[serde(default)]
    reentrancies: BTreeMap<Var, usize>,
}

impl Amr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Binds `var` to `concept`.
    pub fn instance(mut self, var: &str, concept: &str) -> Self {
        let concept = Node::Concept(concept.to_string());
        self.push_edge(Edge::new(Var::from(var), Role::Instance, concept));
        self
    }

    /// Adds a variable-to-variable edge.
    pub fn edge(mut self, head: &str, role: &str, dependent: &str) -> Self {
        let dependent = Node::Var(Var::from(dependent));
        self.push_edge(Edge::new(Var::from(head), Role::parse(role), dependent));
        self
    }

    pub fn constant(mut self, head: &str, role: &str, value: &str) -> Self {
        let value = Node::Const(value.to_string());
        self.push_edge(Edge::new(Var::from(head), Role::parse(role), value));
        self
    }

    /// Aligns the `:instance-of` edge of `var`. Has no effect unless the
    /// binding was added first.
    pub fn align(mut self, var: &str, descriptor: &str) -> Self {
        let var = Var::from(var);
        let binding = self
            .edges
            .iter()
            .find(|edge| edge.head == var && edge.role == Role::Instance)
            .cloned();
        if let Some(edge) = binding {
            self.push_alignment(edge, descriptor);
        }
        self
    }

    pub fn with_reentrancy(mut self, var: &str, bound: usize) -> Self {
        self.reentrancies.insert(Var::from(var), bound);
        self
    }

    pub fn push_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    pub fn push_alignment(&mut self, edge: Edge, descriptor: impl Into<String>) {
        self.alignments.push(Alignment { edge, descriptor: descriptor.into() });
    }
}

impl AmrGraph for Amr {
    fn edges(&self) -> &[Edge] {
        &self.edges
    }

    fn alignments(&self) -> &[Alignment] {
        &self.alignments
    }

    fn reentrancy(&self, var: &Var) -> Option<usize> {
        self.reentrancies.get(var).copied()
    }

    fn tokens(&self) -> &[String] {
        &self.tokens
    }
}
