//! Cross-placeholder compatibility rules ("mutations").
//!
//! A mutation `(a, b, rule)` on a signature states how the concrete types
//! bound to placeholders `a` and `b` may differ from each other.

use crate::error::{GenError, Result};
use crate::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationRule {
    /// Only the dimension may differ: base types must match.
    Dim,
    /// Only the base type may differ: kind and dimension must match.
    BaseType,
    /// Like `BaseType`, and both base types have the same size.
    BaseTypeSameWidth,
}

/// Base types of equal size. A pair is same-width iff some class holds both.
const SAME_WIDTH_CLASSES: &[&[&str]] = &[
    &["char", "signed char", "unsigned char"],
    &["short", "unsigned short"],
    &["int", "unsigned"],
    &["long", "unsigned long"],
    &["long long", "unsigned long long"],
    &["int8_t", "uint8_t"],
    &["int16_t", "uint16_t", "sycl::half"],
    &["int32_t", "uint32_t", "float"],
    &["int64_t", "uint64_t", "double"],
];

impl MutationRule {
    pub fn as_str(self) -> &'static str {
        match self {
            MutationRule::Dim => "dim",
            MutationRule::BaseType => "base_type",
            MutationRule::BaseTypeSameWidth => "base_type_but_same_sizeof",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "dim" => Some(MutationRule::Dim),
            "base_type" => Some(MutationRule::BaseType),
            "base_type_but_same_sizeof" => Some(MutationRule::BaseTypeSameWidth),
            _ => None,
        }
    }

    /// True if binding `a` and `b` together breaks this rule.
    pub fn violates(self, a: &Type, b: &Type) -> bool {
        !self.admits(a, b)
    }

    pub fn admits(self, a: &Type, b: &Type) -> bool {
        match self {
            MutationRule::Dim => a.base_type() == b.base_type(),
            MutationRule::BaseType => a.var_type == b.var_type && a.dim == b.dim,
            MutationRule::BaseTypeSameWidth => {
                a.var_type == b.var_type
                    && a.dim == b.dim
                    && same_width(a.base_type(), b.base_type())
            }
        }
    }
}

pub fn same_width(a: &str, b: &str) -> bool {
    SAME_WIDTH_CLASSES
        .iter()
        .any(|class| class.contains(&a) && class.contains(&b))
}

/// Named-rule entry point; `function` only labels the error.
pub fn violates(function: &str, a: &Type, b: &Type, rule_name: &str) -> Result<bool> {
    let rule = MutationRule::parse(rule_name).ok_or_else(|| GenError::UnknownMutationRule {
        function: function.to_string(),
        rule: rule_name.to_string(),
    })?;
    Ok(rule.violates(a, b))
}
