//! Signature expansion: abstract overload templates to concrete overloads.
//!
//! Each distinct type key of a signature resolves to a list of leaves. Keys
//! with exactly one leaf are fixed; the rest are free. One free key varies
//! on its own; two or more vary jointly over their Cartesian product,
//! filtered by the signature's mutation rules.

use std::collections::HashSet;

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::error::{GenError, Result};
use crate::mutation::MutationRule;
use crate::signature::{ConcreteSignature, Signature};
use crate::types::{ResolvedTypes, Type};

#[derive(Debug, Clone, Default)]
pub struct Expansion<'c> {
    pub signatures: Vec<ConcreteSignature<'c>>,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn expand_signature<'c>(
    resolved: &ResolvedTypes<'c>,
    signature: &'c Signature,
) -> Result<Expansion<'c>> {
    let function = signature.qualified_name();
    tracing::debug!(
        function = %function,
        ret = %signature.ret_type,
        args = ?signature.arg_types,
        "expand signature"
    );

    signature.pointer_arg()?;
    signature.check_static_reference()?;
    let mutations = signature.checked_mutations()?;

    // Distinct keys in first-occurrence order (arguments, then return type).
    let mut slots: Vec<(&'c str, &[&'c Type])> = Vec::new();
    for key in signature.type_keys() {
        if slots.iter().any(|(k, _)| *k == key) {
            continue;
        }
        let types = resolved.get(key).ok_or_else(|| GenError::UnknownType {
            key: key.to_string(),
            referenced_by: format!("signature {function}"),
        })?;
        slots.push((key, types));
    }
    let keys: Vec<&str> = slots.iter().map(|(k, _)| *k).collect();
    let resolved_mutations = mutation_slots(&function, &keys, &mutations)?;

    let free: Vec<usize> = (0..slots.len())
        .filter(|&i| slots[i].1.len() != 1)
        .collect();

    let rows: Vec<Vec<&'c Type>> = if free.len() <= 1 {
        let common = free.first().map_or(1, |&i| slots[i].1.len());
        (0..common)
            .map(|r| {
                slots
                    .iter()
                    .map(|(_, ts)| if ts.len() == 1 { ts[0] } else { ts[r] })
                    .collect()
            })
            .collect()
    } else {
        let lens: Vec<usize> = free.iter().map(|&i| slots[i].1.len()).collect();
        cartesian(&lens)
            .into_iter()
            .map(|picks| {
                let mut row: Vec<&'c Type> = slots.iter().map(|(_, ts)| ts[0]).collect();
                for (&slot, pick) in free.iter().zip(picks) {
                    row[slot] = slots[slot].1[pick];
                }
                row
            })
            .filter(|row| {
                resolved_mutations
                    .iter()
                    .all(|(a, b, rule)| !rule.violates(row[*a], row[*b]))
            })
            .collect()
    };

    let mut out = Expansion::default();
    if rows.is_empty() {
        let args = signature.arg_types.join(", ");
        let message = format!(
            "no matching for {function}({args}) => {}",
            signature.ret_type
        );
        tracing::warn!(function = %function, "{message}");
        out.diagnostics
            .push(Diagnostic::new(DiagnosticCode::MG0200EmptyExpansion, message));
        return Ok(out);
    }

    let slot_of = |key: &str| {
        keys.iter()
            .position(|k| *k == key)
            .ok_or_else(|| GenError::UnknownType {
                key: key.to_string(),
                referenced_by: format!("signature {function}"),
            })
    };
    let ret_slot = slot_of(signature.ret_type.as_str())?;
    let arg_slots: Vec<usize> = signature
        .arg_types
        .iter()
        .map(|k| slot_of(k.as_str()))
        .collect::<Result<_>>()?;
    for row in rows {
        out.signatures.push(ConcreteSignature {
            template: signature,
            ret_type: row[ret_slot],
            arg_types: arg_slots.iter().map(|&s| row[s]).collect(),
        });
    }
    Ok(out)
}

/// Maps each mutation's placeholder keys to slot indices.
fn mutation_slots(
    function: &str,
    keys: &[&str],
    mutations: &[(&str, &str, MutationRule)],
) -> Result<Vec<(usize, usize, MutationRule)>> {
    let slot = |key: &str| {
        keys.iter()
            .position(|k| *k == key)
            .ok_or_else(|| GenError::MutationTypeNotInSignature {
                function: function.to_string(),
                key: key.to_string(),
            })
    };
    mutations
        .iter()
        .map(|&(a, b, rule)| Ok((slot(a)?, slot(b)?, rule)))
        .collect()
}

/// Every index tuple over `lens`, last position varying fastest.
fn cartesian(lens: &[usize]) -> Vec<Vec<usize>> {
    if lens.iter().any(|&n| n == 0) {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut cur = vec![0usize; lens.len()];
    loop {
        out.push(cur.clone());
        let mut pos = lens.len();
        loop {
            if pos == 0 {
                return out;
            }
            pos -= 1;
            cur[pos] += 1;
            if cur[pos] < lens[pos] {
                break;
            }
            cur[pos] = 0;
        }
    }
}

/// Expands every signature in catalog order, then drops later duplicates.
pub fn expand_signatures<'c>(
    resolved: &ResolvedTypes<'c>,
    signatures: &'c [Signature],
) -> Result<Expansion<'c>> {
    let mut all = Expansion::default();
    for sig in signatures {
        let exp = expand_signature(resolved, sig)?;
        all.signatures.extend(exp.signatures);
        all.diagnostics.extend(exp.diagnostics);
    }
    let before = all.signatures.len();
    all.signatures = dedup_signatures(all.signatures);
    tracing::debug!(
        expanded = before,
        unique = all.signatures.len(),
        "expanded signature catalog"
    );
    Ok(all)
}

/// Keeps the first occurrence of every signature, preserving order.
pub fn dedup_signatures<'c>(sigs: Vec<ConcreteSignature<'c>>) -> Vec<ConcreteSignature<'c>> {
    let mut seen: HashSet<ConcreteSignature<'c>> = HashSet::new();
    sigs.into_iter().filter(|s| seen.insert(s.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Mutation;
    use crate::types::{expand_types, Selection, TypeCatalog};

    fn catalog() -> TypeCatalog {
        TypeCatalog::new([
            Type::leaf("float", "float", "scalar", "float", 1),
            Type::leaf("double", "double", "scalar", "double", 1),
            Type::leaf("float2", "sycl::float2", "vector", "float", 2),
            Type::leaf("int32_t", "int32_t", "scalar", "int32_t", 1),
            Type::leaf("int2", "sycl::int2", "vector", "int32_t", 2),
            Type::leaf("int8_t", "int8_t", "scalar", "int8_t", 1),
            Type::leaf("int16_t", "int16_t", "scalar", "int16_t", 1),
            Type::leaf("uint8_t", "uint8_t", "scalar", "uint8_t", 1),
            Type::generic("genfloat", "vector", &["float", "double", "float2"]),
            Type::generic("genint", "vector", &["int32_t", "int2"]),
            Type::generic("small_int", "scalar", &["int8_t", "int16_t"]),
        ])
        .expect("valid catalog")
    }

    fn names(sigs: &[ConcreteSignature<'_>]) -> Vec<String> {
        sigs.iter().map(|s| s.display()).collect()
    }

    #[test]
    fn single_placeholder_varies_alone() {
        let cat = catalog();
        let resolved = expand_types(&Selection::all_of(&cat), &cat).unwrap();
        let sig = Signature::new("sycl", "convert", "small_int", &["float", "int32_t"]);
        let exp = expand_signature(&resolved, &sig).unwrap();
        assert!(exp.diagnostics.is_empty());
        assert_eq!(
            names(&exp.signatures),
            vec![
                "int8_t sycl::convert(float, int32_t)",
                "int16_t sycl::convert(float, int32_t)",
            ]
        );
        assert_eq!(exp.signatures[0].arg_types, exp.signatures[1].arg_types);
    }

    #[test]
    fn fixed_only_signature_yields_one_overload() {
        let cat = catalog();
        let resolved = expand_types(&Selection::all_of(&cat), &cat).unwrap();
        let sig = Signature::new("sycl", "sqrt", "double", &["double"]);
        let exp = expand_signature(&resolved, &sig).unwrap();
        assert_eq!(names(&exp.signatures), vec!["double sycl::sqrt(double)"]);
    }

    #[test]
    fn same_key_binds_the_same_type_everywhere() {
        let cat = catalog();
        let resolved = expand_types(&Selection::all_of(&cat), &cat).unwrap();
        let sig = Signature::new("sycl", "fmax", "genfloat", &["genfloat", "genfloat"]);
        let exp = expand_signature(&resolved, &sig).unwrap();
        assert_eq!(
            names(&exp.signatures),
            vec![
                "float sycl::fmax(float, float)",
                "double sycl::fmax(double, double)",
                "sycl::float2 sycl::fmax(sycl::float2, sycl::float2)",
            ]
        );
    }

    #[test]
    fn joint_placeholders_are_filtered_by_mutations() {
        let cat = catalog();
        let resolved = expand_types(&Selection::all_of(&cat), &cat).unwrap();
        let mut sig = Signature::new("sycl", "ldexp", "genfloat", &["genfloat", "genint"]);
        sig.mutations
            .push(Mutation::new("genfloat", "genint", "base_type"));
        let exp = expand_signature(&resolved, &sig).unwrap();
        assert_eq!(
            names(&exp.signatures),
            vec![
                "float sycl::ldexp(float, int32_t)",
                "double sycl::ldexp(double, int32_t)",
                "sycl::float2 sycl::ldexp(sycl::float2, sycl::int2)",
            ]
        );
    }

    #[test]
    fn unconstrained_product_enumerates_last_fastest() {
        let cat = catalog();
        let resolved = expand_types(&Selection::all_of(&cat), &cat).unwrap();
        let sig = Signature::new("sycl", "f", "small_int", &["genint"]);
        let exp = expand_signature(&resolved, &sig).unwrap();
        assert_eq!(
            names(&exp.signatures),
            vec![
                "int8_t sycl::f(int32_t)",
                "int16_t sycl::f(int32_t)",
                "int8_t sycl::f(sycl::int2)",
                "int16_t sycl::f(sycl::int2)",
            ]
        );
    }

    #[test]
    fn mutation_against_a_fixed_type_uses_its_value() {
        let cat = catalog();
        let resolved = expand_types(&Selection::all_of(&cat), &cat).unwrap();
        let mut sig = Signature::new("sycl", "g", "genfloat", &["genint", "uint8_t"]);
        sig.mutations
            .push(Mutation::new("small_int", "uint8_t", "base_type_but_same_sizeof"));
        assert!(matches!(
            expand_signature(&resolved, &sig),
            Err(GenError::MutationTypeNotInSignature { .. })
        ));

        let mut sig = Signature::new("sycl", "g", "small_int", &["genint", "uint8_t"]);
        sig.mutations
            .push(Mutation::new("small_int", "uint8_t", "base_type_but_same_sizeof"));
        let exp = expand_signature(&resolved, &sig).unwrap();
        assert_eq!(
            names(&exp.signatures),
            vec![
                "int8_t sycl::g(int32_t, uint8_t)",
                "int8_t sycl::g(sycl::int2, uint8_t)",
            ]
        );
    }

    #[test]
    fn empty_resolution_is_diagnosed_not_raised() {
        let cat = catalog();
        let mut sel = Selection::all_of(&cat);
        sel.dimensions = [2].into_iter().collect();
        let resolved = expand_types(&sel, &cat).unwrap();
        let sig = Signature::new("sycl", "abs", "small_int", &["small_int"]);
        let exp = expand_signature(&resolved, &sig).unwrap();
        assert!(exp.signatures.is_empty());
        assert_eq!(exp.diagnostics.len(), 1);
        assert_eq!(exp.diagnostics[0].code, DiagnosticCode::MG0200EmptyExpansion);
    }

    #[test]
    fn all_rows_filtered_is_diagnosed() {
        let cat = catalog();
        let resolved = expand_types(&Selection::all_of(&cat), &cat).unwrap();
        let mut sig = Signature::new("sycl", "h", "small_int", &["genfloat"]);
        sig.mutations.push(Mutation::new("genfloat", "small_int", "dim"));
        let exp = expand_signature(&resolved, &sig).unwrap();
        assert!(exp.signatures.is_empty());
        assert_eq!(exp.diagnostics.len(), 1);
    }

    #[test]
    fn configuration_errors_abort() {
        let cat = catalog();
        let resolved = expand_types(&Selection::all_of(&cat), &cat).unwrap();

        let mut sig = Signature::new("sycl", "ldexp", "genfloat", &["genfloat", "genint"]);
        sig.mutations.push(Mutation::new("genfloat", "genint", "width"));
        assert!(matches!(
            expand_signature(&resolved, &sig),
            Err(GenError::UnknownMutationRule { .. })
        ));

        let sig = Signature::new("sycl", "ldexp", "genfloat", &["gentype"]);
        assert!(matches!(
            expand_signature(&resolved, &sig),
            Err(GenError::UnknownType { .. })
        ));

        let mut sig = Signature::new("sycl", "modf", "genfloat", &["genfloat", "genfloat"]);
        sig.pntr_indx = vec![1, 2];
        assert!(matches!(
            expand_signature(&resolved, &sig),
            Err(GenError::TooManyPointerArgs { .. })
        ));
    }

    #[test]
    fn duplicates_across_entries_are_dropped_and_dedup_is_idempotent() {
        let cat = catalog();
        let resolved = expand_types(&Selection::all_of(&cat), &cat).unwrap();
        let sigs = vec![
            Signature::new("sycl", "fabs", "genfloat", &["genfloat"]),
            Signature::new("sycl", "fabs", "float", &["float"]),
            Signature::new("sycl", "fabs", "double", &["double"]),
        ];
        let exp = expand_signatures(&resolved, &sigs).unwrap();
        assert_eq!(
            names(&exp.signatures),
            vec![
                "float sycl::fabs(float)",
                "double sycl::fabs(double)",
                "sycl::float2 sycl::fabs(sycl::float2)",
            ]
        );
        let again = dedup_signatures(exp.signatures.clone());
        assert_eq!(again, exp.signatures);
    }

    #[test]
    fn mutation_slots_reject_keys_without_a_slot() {
        let keys = ["genfloat", "genint"];
        let ok = mutation_slots("sycl::ldexp", &keys, &[("genint", "genfloat", MutationRule::Dim)])
            .unwrap();
        assert_eq!(ok, vec![(1, 0, MutationRule::Dim)]);

        let err = mutation_slots(
            "sycl::ldexp",
            &keys,
            &[("genfloat", "genhalf", MutationRule::BaseType)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            GenError::MutationTypeNotInSignature {
                function: "sycl::ldexp".to_string(),
                key: "genhalf".to_string(),
            }
        );
    }

    #[test]
    fn mismatched_static_reference_arity_aborts() {
        let cat = catalog();
        let resolved = expand_types(&Selection::all_of(&cat), &cat).unwrap();
        let mut sig = Signature::new("sycl", "fabs", "float2", &["float2"]);
        sig.static_reference = crate::static_refs::lookup("max");
        assert!(matches!(
            expand_signature(&resolved, &sig),
            Err(GenError::StaticReferenceArity { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn cartesian_order() {
        assert_eq!(
            cartesian(&[2, 2]),
            vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]
        );
        assert!(cartesian(&[3, 0]).is_empty());
        assert_eq!(cartesian(&[]), vec![Vec::<usize>::new()]);
    }
}
