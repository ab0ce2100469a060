//! Type catalog and the placeholder walker.
//!
//! The catalog is a read-only DAG addressed by stable keys. Generic
//! placeholders (`dim == 0`) list child keys; concrete leaves (`dim > 0`)
//! carry a base element type. [`expand_types`] flattens every entry to the
//! ordered list of leaves a [`Selection`] admits.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    /// Stable catalog key, e.g. `float4` or `genfloat`.
    pub key: String,
    /// Spelling used in emitted code, e.g. `sycl::vec<float, 4>`.
    pub name: String,
    pub var_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    pub dim: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_types: Vec<String>,
}

impl Type {
    pub fn leaf(key: &str, name: &str, var_type: &str, base_type: &str, dim: u32) -> Self {
        Type {
            key: key.to_string(),
            name: name.to_string(),
            var_type: var_type.to_string(),
            base_type: Some(base_type.to_string()),
            dim,
            child_types: Vec::new(),
        }
    }

    pub fn generic(key: &str, var_type: &str, child_types: &[&str]) -> Self {
        Type {
            key: key.to_string(),
            name: key.to_string(),
            var_type: var_type.to_string(),
            base_type: None,
            dim: 0,
            child_types: child_types.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.dim > 0
    }

    /// Element type name; empty for generic placeholders.
    pub fn base_type(&self) -> &str {
        self.base_type.as_deref().unwrap_or("")
    }

    fn check_shape(&self) -> Result<()> {
        let reason = if self.is_leaf() {
            if !self.child_types.is_empty() {
                Some("leaf type (dim > 0) must not list child_types")
            } else if self.base_type.is_none() {
                Some("leaf type (dim > 0) needs a base_type")
            } else {
                None
            }
        } else if self.child_types.is_empty() {
            Some("generic type (dim == 0) needs at least one child type")
        } else if self.base_type.is_some() {
            Some("generic type (dim == 0) must not set base_type")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(GenError::MalformedType {
                key: self.key.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// Catalog entries in document order, indexed by key.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: Vec<Type>,
    index: BTreeMap<String, usize>,
}

impl TypeCatalog {
    /// Builds a catalog, rejecting duplicate keys, malformed entries and
    /// child keys that name no entry.
    pub fn new(types: impl IntoIterator<Item = Type>) -> Result<Self> {
        let mut catalog = TypeCatalog::default();
        for t in types {
            t.check_shape()?;
            if catalog.index.contains_key(&t.key) {
                return Err(GenError::DuplicateType { key: t.key });
            }
            catalog.index.insert(t.key.clone(), catalog.types.len());
            catalog.types.push(t);
        }
        for t in &catalog.types {
            if let Some(child) = t
                .child_types
                .iter()
                .find(|c| !catalog.index.contains_key(*c))
            {
                return Err(GenError::UnknownType {
                    key: child.clone(),
                    referenced_by: format!("type {:?}", t.key),
                });
            }
        }
        Ok(catalog)
    }

    pub fn get(&self, key: &str) -> Option<&Type> {
        self.index.get(key).map(|&i| &self.types[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Type> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Run-time filter over concrete leaves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub var_types: BTreeSet<String>,
    pub base_types: BTreeSet<String>,
    pub dimensions: BTreeSet<u32>,
}

impl Selection {
    /// A selection admitting every leaf of `catalog`.
    pub fn all_of(catalog: &TypeCatalog) -> Self {
        let mut sel = Selection::default();
        for t in catalog.iter().filter(|t| t.is_leaf()) {
            sel.var_types.insert(t.var_type.clone());
            sel.base_types.insert(t.base_type().to_string());
            sel.dimensions.insert(t.dim);
        }
        sel
    }

    pub fn admits(&self, t: &Type) -> bool {
        self.var_types.contains(&t.var_type)
            && self.base_types.contains(t.base_type())
            && self.dimensions.contains(&t.dim)
    }
}

/// Every catalog key mapped to the ordered leaves it resolves to.
#[derive(Debug, Clone)]
pub struct ResolvedTypes<'c> {
    map: BTreeMap<&'c str, Vec<&'c Type>>,
}

impl<'c> ResolvedTypes<'c> {
    pub fn get(&self, key: &str) -> Option<&[&'c Type]> {
        self.map.get(key).map(|v| v.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'c str, &[&'c Type])> + '_ {
        self.map.iter().map(|(k, v)| (*k, v.as_slice()))
    }
}

/// Resolves one key to the leaves reachable through `child_types`, in
/// declaration order with later duplicates dropped.
pub fn expand_type<'c>(
    selection: &Selection,
    catalog: &'c TypeCatalog,
    key: &str,
) -> Result<Vec<&'c Type>> {
    let mut out: Vec<&'c Type> = Vec::new();
    let mut stack: Vec<&'c str> = Vec::new();
    walk(selection, catalog, key, &mut stack, &mut out)?;
    Ok(out)
}

fn walk<'c>(
    selection: &Selection,
    catalog: &'c TypeCatalog,
    key: &str,
    stack: &mut Vec<&'c str>,
    out: &mut Vec<&'c Type>,
) -> Result<()> {
    let Some(t) = catalog.get(key) else {
        let referenced_by = match stack.last() {
            Some(parent) => format!("type {parent:?}"),
            None => "expansion request".to_string(),
        };
        return Err(GenError::UnknownType {
            key: key.to_string(),
            referenced_by,
        });
    };

    if t.is_leaf() {
        if selection.admits(t) && !out.iter().any(|seen| seen.key == t.key) {
            out.push(t);
        }
        return Ok(());
    }

    if stack.contains(&t.key.as_str()) {
        return Err(GenError::TypeCycle { key: t.key.clone() });
    }
    stack.push(t.key.as_str());
    for child in &t.child_types {
        walk(selection, catalog, child, stack, out)?;
    }
    stack.pop();
    Ok(())
}

pub fn expand_types<'c>(
    selection: &Selection,
    catalog: &'c TypeCatalog,
) -> Result<ResolvedTypes<'c>> {
    let mut map = BTreeMap::new();
    for t in catalog.iter() {
        map.insert(t.key.as_str(), expand_type(selection, catalog, &t.key)?);
    }
    Ok(ResolvedTypes { map })
}
