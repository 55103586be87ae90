use std::fmt::{self, Write as _};
use strata_schema::error::ErrorTree;
use thiserror::Error as ThisError;

///
/// Error
/// Top-level error for registry and materialization operations.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("model '{name}' has already been registered")]
    DuplicateRegistration { name: String },

    #[error("cannot register '{name}': class is already registered as '{existing}'")]
    ClassAlreadyRegistered { name: String, existing: String },

    #[error("metadata for '{key}' not set")]
    MetadataNotFound { key: String },

    #[error("invalid schema for model '{name}': {errors}")]
    InvalidSchema { name: String, errors: ErrorTree },

    #[error(transparent)]
    Materialization(#[from] MaterializationError),
}

impl Error {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::MetadataNotFound { .. })
    }

    /// The materialization failure, when that is what this is.
    #[must_use]
    pub const fn as_materialization(&self) -> Option<&MaterializationError> {
        match self {
            Self::Materialization(err) => Some(err),
            _ => None,
        }
    }
}

///
/// CoercionError
/// Leaf failure raised while converting one raw value.
///

#[derive(Debug, ThisError)]
pub enum CoercionError {
    #[error("cannot assign fields on a non-object value ({found})")]
    NotAnObject { found: &'static str },

    #[error("expected an array, found {found}")]
    ExpectedArray { found: &'static str },

    #[error("expected an object, found {found}")]
    ExpectedObject { found: &'static str },

    #[error("value {value} is not a member of enum '{name}'")]
    UnknownEnumValue { name: String, value: String },

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error(transparent)]
    Metadata(Box<Error>),

    #[error("{0}")]
    Custom(String),
}

impl CoercionError {
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

///
/// PathSegment
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
    Key(String),
    Model(String),
}

///
/// MaterializationError
///
/// A coercion failure plus the path it happened at. The path is built while
/// the error bubbles out of nested materialization: each level prepends its
/// own segment, so the root field ends up first.
///

#[derive(Debug)]
pub struct MaterializationError {
    model: Option<String>,
    segments: Vec<PathSegment>,
    cause: CoercionError,
}

impl MaterializationError {
    pub(crate) const fn leaf(cause: CoercionError) -> Self {
        Self {
            model: None,
            segments: Vec::new(),
            cause,
        }
    }

    /// Prefix an array position.
    #[must_use]
    pub(crate) fn at_index(mut self, index: usize) -> Self {
        self.close_model();
        self.segments.insert(0, PathSegment::Index(index));
        self
    }

    /// Prefix a map key.
    #[must_use]
    pub(crate) fn at_key(mut self, key: &str) -> Self {
        self.close_model();
        self.segments.insert(0, PathSegment::Key(key.to_string()));
        self
    }

    /// Prefix the field `field` of model `owner`.
    #[must_use]
    pub(crate) fn nest(mut self, owner: &str, field: &str) -> Self {
        self.close_model();
        self.segments.insert(0, PathSegment::Field(field.to_string()));
        self.model = Some(owner.to_string());
        self
    }

    // the model that owned the previous head segment becomes part of the path
    fn close_model(&mut self) {
        if let Some(model) = self.model.take() {
            self.segments.insert(0, PathSegment::Model(model));
        }
    }

    /// Outermost model the failing path starts from.
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    #[must_use]
    pub const fn cause(&self) -> &CoercionError {
        &self.cause
    }

    /// Render the path, e.g. `model:Child.foo` or `items[2]:Child.foo`.
    #[must_use]
    pub fn path(&self) -> String {
        let mut out = String::new();
        let mut after_model = false;

        for segment in &self.segments {
            match segment {
                PathSegment::Field(name) => {
                    if after_model {
                        out.push('.');
                    }
                    out.push_str(name);
                }
                PathSegment::Index(index) => {
                    let _ = write!(out, "[{index}]");
                }
                PathSegment::Key(key) => {
                    let _ = write!(out, "[{key}]");
                }
                PathSegment::Model(model) => {
                    out.push(':');
                    out.push_str(model);
                }
            }
            after_model = matches!(segment, PathSegment::Model(_));
        }

        out
    }
}

impl fmt::Display for MaterializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.model {
            Some(model) => write!(f, "failed to materialize {model} at '{}'", self.path())?,
            None => write!(f, "failed to materialize value")?,
        }

        write!(f, ": {}", self.cause)
    }
}

impl std::error::Error for MaterializationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

///
/// TESTS
///
