//! Rebuilds an indented AMR fragment rooted at any node of a graph.
//!
//! Serialization runs in two stages. [`traverse`] walks the graph depth-first
//! from the root and records every edge it expands, bounding how often a
//! re-entrant variable may be expanded again, and marks where each expansion
//! ends. [`reconstruct`] then replays those steps once, left to right,
//! opening a parenthesized scope per edge and closing scopes whenever the
//! next edge hangs off a shallower variable.

use std::collections::HashMap;

use crate::graph::{AmrGraph, RoleFilter, TripleQuery};
use crate::types::{Edge, Node, Role, Var};

/// Spaces per nesting level.
const INDENT: usize = 4;

/// One entry of a traversal order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// An expanded edge.
    Edge(Edge),
    /// Every descendant of the most recent expansion of this variable has
    /// been emitted.
    Exit(Var),
}

/// Serialize the sub-graph reachable from `root`.
pub fn serialize_subgraph<G: AmrGraph + ?Sized>(graph: &G, root: &Node) -> String {
    reconstruct(&traverse(graph, root))
}

/// Steps in expansion order, starting with the synthetic `(TOP, :top, root)`.
///
/// A variable is expanded at most `reentrancy + 1` times, where variables
/// without a recorded re-entrancy count as zero. The root's own expansion
/// counts as its first visit.
pub fn traverse<G: AmrGraph + ?Sized>(graph: &G, root: &Node) -> Vec<Step> {
    Traversal::new(graph, root).run()
}

/// Replay a traversal order into text. See the module docs.
pub fn reconstruct(order: &[Step]) -> String {
    let mut reconstruction = Reconstruction::default();
    for step in order {
        match step {
            Step::Edge(edge) => reconstruction.feed(edge),
            Step::Exit(var) => reconstruction.exit(var),
        }
    }
    reconstruction.finish()
}

struct Traversal<'g, G: ?Sized> {
    graph: &'g G,
    frontier: Vec<Step>,
    visits: HashMap<Var, usize>,
    order: Vec<Step>,
}

impl<'g, G: AmrGraph + ?Sized> Traversal<'g, G> {
    fn new(graph: &'g G, root: &Node) -> Self {
        let mut visits = HashMap::new();
        if let Node::Var(var) = root {
            visits.insert(var.clone(), 1);
        }
        Traversal {
            graph,
            frontier: vec![Step::Edge(Edge::new(Var::top(), Role::Top, root.clone()))],
            visits,
            order: Vec::new(),
        }
    }

    /// The concept binding of `var` comes first so that its depth is known
    /// before any child scope opens. Incoming inverse arguments follow,
    /// rewritten to hang off `var`, then the rest of its outgoing edges.
    fn children(&self, var: &Var) -> Vec<Edge> {
        let (bindings, outgoing): (Vec<Edge>, Vec<Edge>) = self
            .graph
            .triples(&TripleQuery::new().head(var))
            .into_iter()
            .partition(|edge| edge.role == Role::Instance);
        let incoming = self.graph.triples(
            &TripleQuery::new()
                .dep(var)
                .role(RoleFilter::InverseArg)
                .normalize_inverses(),
        );
        bindings.into_iter().chain(incoming).chain(outgoing).collect()
    }

    fn admit(&mut self, node: &Node) -> bool {
        let Node::Var(var) = node else {
            return true;
        };
        let limit = self.graph.reentrancy(var).unwrap_or(0) + 1;
        let visits = self.visits.entry(var.clone()).or_insert(0);
        if *visits < limit {
            *visits += 1;
            true
        } else {
            false
        }
    }

    fn run(mut self) -> Vec<Step> {
        while let Some(step) = self.frontier.pop() {
            if let Step::Edge(Edge { dependent: Node::Var(var), .. }) = &step {
                // the exit pops only after every descendant
                self.frontier.push(Step::Exit(var.clone()));
                // pushed in reverse so they pop in source order
                for child in self.children(var).into_iter().rev() {
                    if self.admit(&child.dependent) {
                        self.frontier.push(Step::Edge(child));
                    }
                }
            }
            self.order.push(step);
        }
        self.order
    }
}

struct Scope {
    dependent: Node,
    /// Byte offset of the scope's opening paren.
    open_at: usize,
}

#[derive(Default)]
struct Reconstruction {
    text: String,
    stack: Vec<Scope>,
    /// Whether the most recently opened scope got a concept. `None` once it closed.
    instance_bound: Option<bool>,
    /// Per variable, one slot per open expansion holding the stack depth at
    /// which that expansion's concept was written. The innermost expansion
    /// is last.
    concept_depth: HashMap<Var, Vec<Option<usize>>>,
}

impl Reconstruction {
    fn feed(&mut self, edge: &Edge) {
        if let Node::Var(var) = &edge.dependent {
            self.concept_depth.entry(var.clone()).or_default().push(None);
        }
        match &edge.role {
            Role::Top => self.open(&edge.dependent),
            Role::Instance => {
                self.text.push_str(" / ");
                self.text.push_str(edge.dependent.label());
                self.instance_bound = Some(true);
                let depth = self.stack.len();
                if let Some(slot) = self
                    .concept_depth
                    .get_mut(&edge.head)
                    .and_then(|slots| slots.last_mut())
                {
                    *slot = Some(depth);
                }
            }
            Role::Wiki => {}
            Role::Polarity if self.innermost_is(&edge.head) => {
                self.text.push(' ');
                self.text.push_str(&edge.role.to_string());
                self.text.push(' ');
                self.text.push_str(edge.dependent.label());
            }
            role => {
                let depth = self.depth_of(&edge.head);
                self.close_to(depth);
                self.text.push_str(" \n");
                self.text.push_str(&" ".repeat(INDENT * self.stack.len()));
                self.text.push_str(&role.to_string());
                self.text.push(' ');
                self.open(&edge.dependent);
            }
        }
    }

    /// Later edges of `var` belong to the enclosing expansion, if any.
    fn exit(&mut self, var: &Var) {
        if let Some(slots) = self.concept_depth.get_mut(var) {
            slots.pop();
        }
    }

    fn innermost_is(&self, var: &Var) -> bool {
        self.stack
            .last()
            .map_or(false, |scope| scope.dependent.as_var() == Some(var))
    }

    /// Depth at which children of `head` are written. Falls back to the
    /// position of `head`'s own open scope when it never got a concept.
    fn depth_of(&self, head: &Var) -> usize {
        let recorded = self
            .concept_depth
            .get(head)
            .and_then(|slots| slots.last().copied().flatten());
        recorded.unwrap_or_else(|| {
            self.stack
                .iter()
                .rposition(|scope| scope.dependent.as_var() == Some(head))
                .map_or(0, |position| position + 1)
        })
    }

    fn open(&mut self, node: &Node) {
        self.stack.push(Scope { dependent: node.clone(), open_at: self.text.len() });
        self.text.push('(');
        self.text.push_str(node.label());
        self.instance_bound = Some(false);
    }

    fn close_to(&mut self, depth: usize) {
        while self.stack.len() > depth {
            let Some(scope) = self.stack.pop() else {
                break;
            };
            if self.instance_bound == Some(false) {
                // a bare variable or constant, so its paren goes away
                self.text.remove(scope.open_at);
            } else {
                self.text.push(')');
            }
            self.instance_bound = None;
        }
    }

    fn finish(mut self) -> String {
        self.close_to(0);
        self.text
    }
}
