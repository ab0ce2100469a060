use std::hash::{Hash, Hasher};

use crate::error::{GenError, Result};
use crate::mutation::MutationRule;
use crate::static_refs::StaticReference;
use crate::types::Type;

/// `(base, derived, rule)`: how the types bound to two placeholders co-vary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub base: String,
    pub derived: String,
    pub rule: String,
}

impl Mutation {
    pub fn new(base: &str, derived: &str, rule: &str) -> Self {
        Mutation {
            base: base.to_string(),
            derived: derived.to_string(),
            rule: rule.to_string(),
        }
    }
}

/// One overload template, written against type keys that may be generic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub namespace: String,
    pub name: String,
    pub ret_type: String,
    pub arg_types: Vec<String>,
    /// 1-based pointer argument positions; 0 would be the return type.
    pub pntr_indx: Vec<usize>,
    pub mutations: Vec<Mutation>,
    pub accuracy: Option<String>,
    pub comment: Option<String>,
    pub static_reference: Option<StaticReference>,
}

impl Signature {
    pub fn new(namespace: &str, name: &str, ret_type: &str, arg_types: &[&str]) -> Self {
        Signature {
            namespace: namespace.to_string(),
            name: name.to_string(),
            ret_type: ret_type.to_string(),
            arg_types: arg_types.iter().map(|s| s.to_string()).collect(),
            pntr_indx: Vec::new(),
            mutations: Vec::new(),
            accuracy: None,
            comment: None,
            static_reference: None,
        }
    }

    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.namespace, self.name)
    }

    /// Argument keys followed by the return key.
    pub fn type_keys(&self) -> impl Iterator<Item = &str> {
        self.arg_types
            .iter()
            .chain(std::iter::once(&self.ret_type))
            .map(|s| s.as_str())
    }

    /// Zero-based index of the pointer argument, if any.
    ///
    /// Fails unless `pntr_indx` holds at most one valid 1-based position.
    pub fn pointer_arg(&self) -> Result<Option<usize>> {
        match self.pntr_indx.as_slice() {
            [] => Ok(None),
            [index] if (1..=self.arg_types.len()).contains(index) => Ok(Some(index - 1)),
            [index] => Err(GenError::PointerIndexOutOfRange {
                function: self.qualified_name(),
                index: *index,
                arg_count: self.arg_types.len(),
            }),
            more => Err(GenError::TooManyPointerArgs {
                function: self.qualified_name(),
                count: more.len(),
            }),
        }
    }

    /// Fails if the bound static reference reads more arguments than the
    /// signature declares.
    pub fn check_static_reference(&self) -> Result<()> {
        match self.static_reference {
            Some(r) if r.arity > self.arg_types.len() => Err(GenError::StaticReferenceArity {
                function: self.qualified_name(),
                name: r.name,
                expected: r.arity,
                found: self.arg_types.len(),
            }),
            _ => Ok(()),
        }
    }

    /// Parses every mutation rule and checks both of its keys occur in the
    /// signature.
    pub fn checked_mutations(&self) -> Result<Vec<(&str, &str, MutationRule)>> {
        self.mutations
            .iter()
            .map(|m| {
                let rule =
                    MutationRule::parse(&m.rule).ok_or_else(|| GenError::UnknownMutationRule {
                        function: self.qualified_name(),
                        rule: m.rule.clone(),
                    })?;
                for key in [&m.base, &m.derived] {
                    if !self.type_keys().any(|k| k == key.as_str()) {
                        return Err(GenError::MutationTypeNotInSignature {
                            function: self.qualified_name(),
                            key: key.clone(),
                        });
                    }
                }
                Ok((m.base.as_str(), m.derived.as_str(), rule))
            })
            .collect()
    }
}

/// A fully resolved overload. Borrows its template and the catalog types.
#[derive(Debug, Clone)]
pub struct ConcreteSignature<'c> {
    pub template: &'c Signature,
    pub ret_type: &'c Type,
    pub arg_types: Vec<&'c Type>,
}

impl<'c> ConcreteSignature<'c> {
    pub fn namespace(&self) -> &'c str {
        &self.template.namespace
    }

    pub fn name(&self) -> &'c str {
        &self.template.name
    }

    pub fn pntr_indx(&self) -> &'c [usize] {
        &self.template.pntr_indx
    }

    pub fn accuracy(&self) -> Option<&'c str> {
        self.template.accuracy.as_deref()
    }

    pub fn comment(&self) -> Option<&'c str> {
        self.template.comment.as_deref()
    }

    pub fn static_reference(&self) -> Option<StaticReference> {
        self.template.static_reference
    }

    pub fn pointer_arg(&self) -> Result<Option<usize>> {
        self.template.pointer_arg()
    }

    pub fn has_pointer(&self) -> bool {
        !self.template.pntr_indx.is_empty()
    }

    /// `R ns::name(A0, A1, ...)` using emitted type spellings.
    pub fn display(&self) -> String {
        let args: Vec<&str> = self.arg_types.iter().map(|t| t.name.as_str()).collect();
        format!(
            "{} {}::{}({})",
            self.ret_type.name,
            self.namespace(),
            self.name(),
            args.join(", ")
        )
    }

    fn key(&self) -> (&str, &str, &str, Vec<&str>, &[usize]) {
        (
            self.namespace(),
            self.name(),
            self.ret_type.key.as_str(),
            self.arg_types.iter().map(|t| t.key.as_str()).collect(),
            self.pntr_indx(),
        )
    }
}

impl PartialEq for ConcreteSignature<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ConcreteSignature<'_> {}

impl Hash for ConcreteSignature<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_index_contract() {
        let mut sig = Signature::new("sycl", "fract", "genfloat", &["genfloat", "genfloat"]);
        assert_eq!(sig.pointer_arg().unwrap(), None);

        sig.pntr_indx = vec![2];
        assert_eq!(sig.pointer_arg().unwrap(), Some(1));

        sig.pntr_indx = vec![0];
        assert!(matches!(
            sig.pointer_arg(),
            Err(GenError::PointerIndexOutOfRange { index: 0, .. })
        ));

        sig.pntr_indx = vec![3];
        assert!(matches!(
            sig.pointer_arg(),
            Err(GenError::PointerIndexOutOfRange { index: 3, arg_count: 2, .. })
        ));

        sig.pntr_indx = vec![1, 2];
        assert!(matches!(
            sig.pointer_arg(),
            Err(GenError::TooManyPointerArgs { count: 2, .. })
        ));
    }

    #[test]
    fn mutations_must_reference_signature_types() {
        let mut sig = Signature::new("sycl", "ldexp", "genfloat", &["genfloat", "genint"]);
        sig.mutations.push(Mutation::new("genfloat", "genint", "base_type"));
        let checked = sig.checked_mutations().unwrap();
        assert_eq!(checked, vec![("genfloat", "genint", MutationRule::BaseType)]);

        sig.mutations.push(Mutation::new("genfloat", "genhalf", "dim"));
        assert_eq!(
            sig.checked_mutations().unwrap_err(),
            GenError::MutationTypeNotInSignature {
                function: "sycl::ldexp".to_string(),
                key: "genhalf".to_string(),
            }
        );
    }

    #[test]
    fn static_reference_arity_is_checked() {
        let mut sig = Signature::new("sycl", "fabs", "float4", &["float4"]);
        sig.static_reference = crate::static_refs::lookup("identity");
        assert_eq!(sig.check_static_reference(), Ok(()));

        sig.static_reference = crate::static_refs::lookup("max");
        assert_eq!(
            sig.check_static_reference(),
            Err(GenError::StaticReferenceArity {
                function: "sycl::fabs".to_string(),
                name: "max",
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn equality_ignores_accuracy_and_mutations() {
        let float = Type::leaf("float", "float", "scalar", "float", 1);
        let a = Signature::new("sycl", "sin", "genfloat", &["genfloat"]);
        let mut b = a.clone();
        b.accuracy = Some("4".to_string());
        b.mutations.push(Mutation::new("genfloat", "genfloat", "dim"));

        let ca = ConcreteSignature {
            template: &a,
            ret_type: &float,
            arg_types: vec![&float],
        };
        let cb = ConcreteSignature {
            template: &b,
            ret_type: &float,
            arg_types: vec![&float],
        };
        assert_eq!(ca, cb);
        assert_eq!(ca.display(), "float sycl::sin(float)");
    }
}
