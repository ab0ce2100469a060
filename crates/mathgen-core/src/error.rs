//! Fatal generation errors.
//!
//! Every variant is a configuration bug in the catalogs or in the caller,
//! never a data condition: generation stops on the first one. Non-fatal
//! findings are [`Diagnostic`](crate::diagnostics::Diagnostic)s instead.

use thiserror::Error;

use crate::diagnostics::{Diagnostic, DiagnosticCode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenError {
    #[error("{what} schema_version mismatch: expected {expected} got {found:?}")]
    SchemaMismatch {
        what: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("duplicate type key {key:?}")]
    DuplicateType { key: String },

    #[error("malformed type {key:?}: {reason}")]
    MalformedType { key: String, reason: &'static str },

    #[error("unknown type key {key:?} (referenced by {referenced_by})")]
    UnknownType { key: String, referenced_by: String },

    #[error("cycle in child_types through {key:?}")]
    TypeCycle { key: String },

    #[error("unknown mutation rule {rule:?} in {function}")]
    UnknownMutationRule { function: String, rule: String },

    #[error("mutation in {function} references type {key:?} which is not in the signature")]
    MutationTypeNotInSignature { function: String, key: String },

    #[error("{function} marks {count} pointer arguments; at most one is supported")]
    TooManyPointerArgs { function: String, count: usize },

    #[error("{function} has pointer index {index} but only {arg_count} arguments")]
    PointerIndexOutOfRange {
        function: String,
        index: usize,
        arg_count: usize,
    },

    #[error("unknown static reference {name:?} in {function}")]
    UnknownStaticReference { function: String, name: String },

    #[error("static reference {name:?} in {function} takes {expected} arguments, signature has {found}")]
    StaticReferenceArity {
        function: String,
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("static reference {name:?} for {signature} yields {found} values, return type has dim {expected}")]
    StaticReferenceShape {
        signature: String,
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("unsupported base type for value generation: {base_type:?}")]
    UnsupportedBaseType { base_type: String },

    #[error("invalid variant for {function}: {reason}")]
    InvalidVariant {
        function: String,
        reason: &'static str,
    },

    #[error("test ids starting at {start_id} overflow u64")]
    IdOverflow { start_id: u64 },
}

impl GenError {
    pub fn code(&self) -> DiagnosticCode {
        match self {
            GenError::SchemaMismatch { .. } => DiagnosticCode::MG0001SchemaMismatch,
            GenError::DuplicateType { .. } => DiagnosticCode::MG0002DuplicateType,
            GenError::MalformedType { .. } => DiagnosticCode::MG0003MalformedType,
            GenError::UnknownType { .. } => DiagnosticCode::MG0010UnknownType,
            GenError::TypeCycle { .. } => DiagnosticCode::MG0011TypeCycle,
            GenError::UnknownMutationRule { .. } => DiagnosticCode::MG0100UnknownMutationRule,
            GenError::MutationTypeNotInSignature { .. } => {
                DiagnosticCode::MG0101MutationTypeNotInSignature
            }
            GenError::TooManyPointerArgs { .. } => DiagnosticCode::MG0110TooManyPointerArgs,
            GenError::PointerIndexOutOfRange { .. } => DiagnosticCode::MG0111PointerIndexOutOfRange,
            GenError::UnknownStaticReference { .. } => {
                DiagnosticCode::MG0120UnknownStaticReference
            }
            GenError::StaticReferenceArity { .. } => DiagnosticCode::MG0121StaticReferenceArity,
            GenError::StaticReferenceShape { .. } => DiagnosticCode::MG0122StaticReferenceShape,
            GenError::UnsupportedBaseType { .. } => DiagnosticCode::MG0300UnsupportedBaseType,
            GenError::InvalidVariant { .. } => DiagnosticCode::MG0400InvalidVariant,
            GenError::IdOverflow { .. } => DiagnosticCode::MG0410IdOverflow,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(self.code(), self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GenError>;
