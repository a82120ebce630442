use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// An AMR variable, e.g. `w` in `(w / want-01)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Var(pub String);

impl Var {
    pub fn new(name: impl Into<String>) -> Self {
        Var(name.into())
    }

    /// The synthetic head of the `:top` edge that seeds a traversal.
    pub fn top() -> Self {
        Var("TOP".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Var {
    fn from(name: &str) -> Self {
        Var(name.to_string())
    }
}

/// The dependent end of an edge.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Node {
    Var(Var),
    Concept(String),
    Const(String),
}

impl Node {
    /// Text used when the node is written into a graph fragment.
    pub fn label(&self) -> &str {
        match self {
            Node::Var(var) => var.as_str(),
            Node::Concept(name) | Node::Const(name) => name,
        }
    }

    pub fn as_var(&self) -> Option<&Var> {
        match self {
            Node::Var(var) => Some(var),
            _ => None,
        }
    }
}

impl From<Var> for Node {
    fn from(var: Var) -> Self {
        Node::Var(var)
    }
}

/// Edge label, decided once when the edge is created.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Arg(u8),
    ArgOf(u8),
    Instance,
    Top,
    Wiki,
    Polarity,
    Other(String),
}

fn arg_label() -> &'static Regex {
    static ARG_LABEL: OnceLock<Regex> = OnceLock::new();
    ARG_LABEL.get_or_init(|| Regex::new(r"^:ARG(\d+)(-of)?$").expect("valid ARG label pattern"))
}

impl Role {
    pub fn parse(label: &str) -> Self {
        match label {
            ":instance-of" | ":instance" => Role::Instance,
            ":top" => Role::Top,
            ":wiki" => Role::Wiki,
            ":polarity" => Role::Polarity,
            _ => arg_label()
                .captures(label)
                .and_then(|caps| {
                    let n: u8 = caps[1].parse().ok()?;
                    Some(if caps.get(2).is_some() { Role::ArgOf(n) } else { Role::Arg(n) })
                })
                .unwrap_or_else(|| Role::Other(label.to_string())),
        }
    }

    /// True for both `:ARGn` and `:ARGn-of`.
    pub fn is_arg(&self) -> bool {
        matches!(self, Role::Arg(_) | Role::ArgOf(_))
    }

    pub fn arg_number(&self) -> Option<u8> {
        match self {
            Role::Arg(n) | Role::ArgOf(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Arg(n) => write!(f, ":ARG{}", n),
            Role::ArgOf(n) => write!(f, ":ARG{}-of", n),
            Role::Instance => f.write_str(":instance-of"),
            Role::Top => f.write_str(":top"),
            Role::Wiki => f.write_str(":wiki"),
            Role::Polarity => f.write_str(":polarity"),
            Role::Other(label) => f.write_str(label),
        }
    }
}

impl From<&str> for Role {
    fn from(label: &str) -> Self {
        Role::parse(label)
    }
}

impl From<String> for Role {
    fn from(label: String) -> Self {
        Role::parse(&label)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.to_string()
    }
}

/// A labeled triple `(head, role, dependent)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub head: Var,
    pub role: Role,
    pub dependent: Node,
}

impl Edge {
    pub fn new(head: Var, role: Role, dependent: Node) -> Self {
        Edge { head, role, dependent }
    }

    /// Rewrites `(x, :ARGn-of, v)` as `(v, :ARGn, x)`. Other edges are returned as-is.
    pub fn normalized(&self) -> Edge {
        match (&self.role, &self.dependent) {
            (Role::ArgOf(n), Node::Var(dep)) => Edge {
                head: dep.clone(),
                role: Role::Arg(*n),
                dependent: Node::Var(self.head.clone()),
            },
            _ => self.clone(),
        }
    }
}
