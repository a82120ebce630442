//! PropBank roleset lookup and agent classification.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Role;

/// Function tag PropBank uses for the prototypical agent.
const AGENT_TAG: &str = "pag";

/// Sense number AMR uses for concepts with no PropBank frame.
const NO_FRAME_SENSE: &str = "00";

#[derive(Deserialize, Serialize)]
struct RawRole {
    n: String,
    #[serde(default)]
    f: String,
}

/// One numbered role of a roleset, e.g. `n="0" f="PAG"`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "RawRole", into = "RawRole")]
pub struct RoleEntry {
    /// `None` for modifier slots such as `n="m"`.
    pub arg_number: Option<u8>,
    pub function_tag: String,
}

impl From<RawRole> for RoleEntry {
    fn from(raw: RawRole) -> Self {
        RoleEntry {
            arg_number: raw.n.trim().parse().ok(),
            function_tag: raw.f,
        }
    }
}

impl From<RoleEntry> for RawRole {
    fn from(entry: RoleEntry) -> Self {
        RawRole {
            n: entry.arg_number.map_or_else(|| "m".to_string(), |n| n.to_string()),
            f: entry.function_tag,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Roleset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<RoleEntry>,
}

impl Roleset {
    pub fn new(roles: Vec<RoleEntry>) -> Self {
        Roleset { name: None, roles }
    }

    /// Whether argument `n` carries the agent function tag.
    pub fn has_agent(&self, n: u8) -> bool {
        self.roles.iter().any(|role| {
            role.arg_number == Some(n) && role.function_tag.eq_ignore_ascii_case(AGENT_TAG)
        })
    }
}

fn sense_pattern() -> &'static Regex {
    static SENSE: OnceLock<Regex> = OnceLock::new();
    SENSE.get_or_init(|| Regex::new(r"^(.*)-(\d*)$").expect("valid sense pattern"))
}

/// Rolesets keyed by `"<lemma>.<sense>"`, e.g. `"want.01"`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RoleTable {
    rolesets: HashMap<String, Roleset>,
}

impl RoleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, roleset: Roleset) {
        self.rolesets.insert(key.into(), roleset);
    }

    pub fn get(&self, key: &str) -> Option<&Roleset> {
        self.rolesets.get(key)
    }

    pub fn len(&self) -> usize {
        self.rolesets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rolesets.is_empty()
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse role table YAML")
    }

    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        serde_json::from_str(content).context("Failed to parse role table JSON")
    }

    /// Load a role table, picking the format from the file extension.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read role table: {:?}", path))?;
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        let table = match extension {
            "yaml" | "yml" => Self::from_yaml_str(&content),
            "json" => Self::from_json_str(&content),
            other => anyhow::bail!("Unsupported role table format '{}' for {:?}", other, path),
        }
        .with_context(|| format!("Failed to load role table: {:?}", path))?;
        tracing::info!("Loaded {} rolesets from {:?}", table.len(), path);
        Ok(table)
    }

    /// Lookup key for `lemma.sense`. Some annotations write the lemma with
    /// hyphens where the frame files use underscores.
    fn resolve_key(&self, lemma: &str, sense: &str) -> String {
        let key = format!("{}.{}", lemma, sense);
        if self.rolesets.contains_key(&key) {
            key
        } else {
            format!("{}.{}", lemma.replace('-', "_"), sense)
        }
    }

    /// Decides whether `role`, attached to a predicate bound to `concept`
    /// (e.g. `want-01`), is that predicate's agent.
    pub fn is_agent(&self, role: &Role, concept: &str) -> Result<bool> {
        let caps = sense_pattern()
            .captures(concept)
            .ok_or_else(|| Error::MalformedSense { concept: concept.to_string() })?;
        let (lemma, sense) = (&caps[1], &caps[2]);
        if sense == NO_FRAME_SENSE {
            return Ok(false);
        }

        let key = self.resolve_key(lemma, sense);
        let roleset = self.rolesets.get(&key).ok_or(Error::MissingRoleset { key })?;
        Ok(role.arg_number().map_or(false, |n| roleset.has_agent(n)))
    }
}
