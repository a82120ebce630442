//! Error types for triple extraction.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed predicate sense '{concept}', expected <lemma>-<sense>")]
    MalformedSense { concept: String },

    #[error("no PropBank roleset for '{key}'")]
    MissingRoleset { key: String },

    #[error("variable '{var}' has no concept binding")]
    MissingConcept { var: String },

    #[error("malformed alignment descriptor '{descriptor}'")]
    MalformedAlignment { descriptor: String },
}

pub type Result<T> = std::result::Result<T, Error>;
