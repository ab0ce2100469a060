use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    Load,
    Resolve,
    Expand,
    Values,
    Synthesize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DiagnosticCode {
    MG0001SchemaMismatch,
    MG0002DuplicateType,
    MG0003MalformedType,
    MG0010UnknownType,
    MG0011TypeCycle,
    MG0100UnknownMutationRule,
    MG0101MutationTypeNotInSignature,
    MG0110TooManyPointerArgs,
    MG0111PointerIndexOutOfRange,
    MG0120UnknownStaticReference,
    MG0121StaticReferenceArity,
    MG0122StaticReferenceShape,
    MG0200EmptyExpansion,
    MG0300UnsupportedBaseType,
    MG0400InvalidVariant,
    MG0410IdOverflow,
}

impl DiagnosticCode {
    pub fn code_str(self) -> &'static str {
        match self {
            DiagnosticCode::MG0001SchemaMismatch => "MG0001",
            DiagnosticCode::MG0002DuplicateType => "MG0002",
            DiagnosticCode::MG0003MalformedType => "MG0003",
            DiagnosticCode::MG0010UnknownType => "MG0010",
            DiagnosticCode::MG0011TypeCycle => "MG0011",
            DiagnosticCode::MG0100UnknownMutationRule => "MG0100",
            DiagnosticCode::MG0101MutationTypeNotInSignature => "MG0101",
            DiagnosticCode::MG0110TooManyPointerArgs => "MG0110",
            DiagnosticCode::MG0111PointerIndexOutOfRange => "MG0111",
            DiagnosticCode::MG0120UnknownStaticReference => "MG0120",
            DiagnosticCode::MG0121StaticReferenceArity => "MG0121",
            DiagnosticCode::MG0122StaticReferenceShape => "MG0122",
            DiagnosticCode::MG0200EmptyExpansion => "MG0200",
            DiagnosticCode::MG0300UnsupportedBaseType => "MG0300",
            DiagnosticCode::MG0400InvalidVariant => "MG0400",
            DiagnosticCode::MG0410IdOverflow => "MG0410",
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            DiagnosticCode::MG0001SchemaMismatch => "catalog schema_version mismatch",
            DiagnosticCode::MG0002DuplicateType => "duplicate type key in type catalog",
            DiagnosticCode::MG0003MalformedType => "type entry violates the leaf/generic shape",
            DiagnosticCode::MG0010UnknownType => "unknown type key",
            DiagnosticCode::MG0011TypeCycle => "cycle in child_types",
            DiagnosticCode::MG0100UnknownMutationRule => "unknown mutation rule",
            DiagnosticCode::MG0101MutationTypeNotInSignature => {
                "mutation references a type absent from the signature"
            }
            DiagnosticCode::MG0110TooManyPointerArgs => "more than one pointer argument",
            DiagnosticCode::MG0111PointerIndexOutOfRange => "pointer index out of range",
            DiagnosticCode::MG0120UnknownStaticReference => "unknown static reference",
            DiagnosticCode::MG0121StaticReferenceArity => {
                "static reference needs more arguments than the signature has"
            }
            DiagnosticCode::MG0122StaticReferenceShape => {
                "static reference result does not match the return type's dim"
            }
            DiagnosticCode::MG0200EmptyExpansion => "signature has no admissible overloads",
            DiagnosticCode::MG0300UnsupportedBaseType => "unsupported base type for value generation",
            DiagnosticCode::MG0400InvalidVariant => "invalid memory/check variant for signature",
            DiagnosticCode::MG0410IdOverflow => "test id range exceeds u64",
        }
    }

    pub fn default_help(self) -> Option<&'static str> {
        match self {
            DiagnosticCode::MG0100UnknownMutationRule => Some(
                "Use one of: dim, base_type, base_type_but_same_sizeof.",
            ),
            DiagnosticCode::MG0110TooManyPointerArgs => {
                Some("Split the entry: each signature may mark at most one pointer argument.")
            }
            DiagnosticCode::MG0111PointerIndexOutOfRange => {
                Some("pntr_indx is 1-based over arg_types; 0 is reserved for the return type.")
            }
            DiagnosticCode::MG0121StaticReferenceArity | DiagnosticCode::MG0122StaticReferenceShape => {
                Some("Drop static_reference from the entry to compare against reference::<name> instead.")
            }
            DiagnosticCode::MG0410IdOverflow => Some("Lower --start-id (or the manifest start_id)."),
            DiagnosticCode::MG0200EmptyExpansion => Some(
                "Check the selection (var_types/base_types/dimensions) and the mutation rules.",
            ),
            _ => None,
        }
    }

    pub fn phase(self) -> Phase {
        match self {
            DiagnosticCode::MG0001SchemaMismatch
            | DiagnosticCode::MG0002DuplicateType
            | DiagnosticCode::MG0003MalformedType
            | DiagnosticCode::MG0120UnknownStaticReference => Phase::Load,
            DiagnosticCode::MG0010UnknownType | DiagnosticCode::MG0011TypeCycle => Phase::Resolve,
            DiagnosticCode::MG0100UnknownMutationRule
            | DiagnosticCode::MG0101MutationTypeNotInSignature
            | DiagnosticCode::MG0110TooManyPointerArgs
            | DiagnosticCode::MG0111PointerIndexOutOfRange
            | DiagnosticCode::MG0121StaticReferenceArity
            | DiagnosticCode::MG0200EmptyExpansion => Phase::Expand,
            DiagnosticCode::MG0300UnsupportedBaseType => Phase::Values,
            DiagnosticCode::MG0122StaticReferenceShape
            | DiagnosticCode::MG0400InvalidVariant
            | DiagnosticCode::MG0410IdOverflow => Phase::Synthesize,
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            DiagnosticCode::MG0200EmptyExpansion => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub phase: Phase,
    pub severity: Severity,
    pub message: String,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Diagnostic {
            code,
            phase: code.phase(),
            severity: code.severity(),
            message: message.into(),
            help: code.default_help().map(|s| s.to_string()),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} {:?}: {}",
            self.code.code_str(),
            self.phase,
            self.severity,
            self.message
        )?;
        if let Some(help) = &self.help {
            write!(f, "\n  help: {help}")?;
        }
        Ok(())
    }
}

pub fn render_diagnostics_md() -> String {
    let mut rows: Vec<(&str, Phase, Severity, &str, &str)> = all_codes()
        .iter()
        .map(|&code| {
            (
                code.code_str(),
                code.phase(),
                code.severity(),
                code.default_message(),
                code.default_help().unwrap_or(""),
            )
        })
        .collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::new();
    out.push_str("# mathgen diagnostics catalog\n\n");
    out.push_str("This document is generated from `crates/mathgen-core/src/diagnostics.rs`.\n\n");
    out.push_str("| Code | Phase | Severity | Message | Help |\n");
    out.push_str("| ---- | ----- | -------- | ------- | ---- |\n");
    for (code, phase, sev, msg, help) in rows {
        out.push_str(&format!(
            "| {code} | {phase:?} | {sev:?} | {msg} | {help} |\n"
        ));
    }
    out
}

fn all_codes() -> &'static [DiagnosticCode] {
    &[
        DiagnosticCode::MG0001SchemaMismatch,
        DiagnosticCode::MG0002DuplicateType,
        DiagnosticCode::MG0003MalformedType,
        DiagnosticCode::MG0010UnknownType,
        DiagnosticCode::MG0011TypeCycle,
        DiagnosticCode::MG0100UnknownMutationRule,
        DiagnosticCode::MG0101MutationTypeNotInSignature,
        DiagnosticCode::MG0110TooManyPointerArgs,
        DiagnosticCode::MG0111PointerIndexOutOfRange,
        DiagnosticCode::MG0120UnknownStaticReference,
        DiagnosticCode::MG0121StaticReferenceArity,
        DiagnosticCode::MG0122StaticReferenceShape,
        DiagnosticCode::MG0200EmptyExpansion,
        DiagnosticCode::MG0300UnsupportedBaseType,
        DiagnosticCode::MG0400InvalidVariant,
        DiagnosticCode::MG0410IdOverflow,
    ]
}
