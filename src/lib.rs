//! # AMR triples
//!
//! Extracts agent / predicate / patient triples from AMR graphs and renders
//! each argument back into an AMR fragment, producing text triples for NLG
//! training data.
//!
//! ```text
//! AMR graph + PropBank rolesets
//!   → linker groups (concepts with ARG edges)
//!     → triple records (agent classified via PropBank "pag" tags)
//!       → text triples (sub-graph fragments for agent and each patient)
//! ```
//!
//! Graphs come from an external AMR reader through [`AmrGraph`]; rolesets come
//! from a pre-converted [`RoleTable`].

pub mod assemble;
pub mod corpus;
pub mod error;
pub mod graph;
pub mod linker;
pub mod propbank;
pub mod report;
pub mod serialize;
pub mod triples;
pub mod types;

pub use assemble::{generate_amr_string_from_triples, TextTriple};
pub use corpus::{Corpus, CorpusConverter, SentenceRecord};
pub use error::{Error, Result};
pub use graph::{Amr, AmrGraph};
pub use propbank::{RoleTable, Roleset};
pub use serialize::serialize_subgraph;
pub use triples::{extract_triples, TripleMap, TripleRecord};
pub use types::{Edge, Node, Role, Var};
