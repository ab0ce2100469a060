//! JSON catalog documents: types, functions and selections.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use mathgen_contracts::{
    MATHGEN_FUNCTIONS_SCHEMA_VERSION, MATHGEN_SELECTION_SCHEMA_VERSION,
    MATHGEN_TYPES_SCHEMA_VERSION,
};

use crate::error::{GenError, Result};
use crate::signature::{Mutation, Signature};
use crate::static_refs;
use crate::types::{Selection, Type, TypeCatalog};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypesDoc {
    pub schema_version: String,
    pub types: Vec<Type>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionsDoc {
    pub schema_version: String,
    pub functions: Vec<FunctionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionEntry {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub name: String,
    pub ret_type: String,
    pub arg_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pntr_indx: Vec<usize>,
    /// `[base, derived, rule]` triples.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mutations: Vec<(String, String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_reference: Option<String>,
}

fn default_namespace() -> String {
    "sycl".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionDoc {
    pub schema_version: String,
    pub var_types: BTreeSet<String>,
    pub base_types: BTreeSet<String>,
    pub dimensions: BTreeSet<u32>,
}

fn check_schema(what: &'static str, expected: &'static str, found: &str) -> Result<()> {
    if found.trim() != expected {
        return Err(GenError::SchemaMismatch {
            what,
            expected,
            found: found.to_string(),
        });
    }
    Ok(())
}

impl TypesDoc {
    pub fn into_catalog(self) -> Result<TypeCatalog> {
        check_schema("types", MATHGEN_TYPES_SCHEMA_VERSION, &self.schema_version)?;
        TypeCatalog::new(self.types)
    }
}

impl FunctionEntry {
    pub fn into_signature(self) -> Result<Signature> {
        let static_reference = match &self.static_reference {
            None => None,
            Some(name) => Some(static_refs::lookup(name).ok_or_else(|| {
                GenError::UnknownStaticReference {
                    function: format!("{}::{}", self.namespace, self.name),
                    name: name.clone(),
                }
            })?),
        };
        let sig = Signature {
            mutations: self
                .mutations
                .iter()
                .map(|(a, b, rule)| Mutation::new(a, b, rule))
                .collect(),
            namespace: self.namespace,
            name: self.name,
            ret_type: self.ret_type,
            arg_types: self.arg_types,
            pntr_indx: self.pntr_indx,
            accuracy: self.accuracy,
            comment: self.comment,
            static_reference,
        };
        sig.check_static_reference()?;
        Ok(sig)
    }
}

impl FunctionsDoc {
    pub fn into_signatures(self) -> Result<Vec<Signature>> {
        check_schema(
            "functions",
            MATHGEN_FUNCTIONS_SCHEMA_VERSION,
            &self.schema_version,
        )?;
        self.functions
            .into_iter()
            .map(FunctionEntry::into_signature)
            .collect()
    }
}

impl SelectionDoc {
    pub fn into_selection(self) -> Result<Selection> {
        check_schema(
            "selection",
            MATHGEN_SELECTION_SCHEMA_VERSION,
            &self.schema_version,
        )?;
        Ok(Selection {
            var_types: self.var_types,
            base_types: self.base_types,
            dimensions: self.dimensions,
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read {what}: {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("parse {what} JSON: {}", path.display()))
}

pub fn types_from_json(src: &str) -> anyhow::Result<TypeCatalog> {
    let doc: TypesDoc = serde_json::from_str(src).context("parse types JSON")?;
    Ok(doc.into_catalog()?)
}

pub fn functions_from_json(src: &str) -> anyhow::Result<Vec<Signature>> {
    let doc: FunctionsDoc = serde_json::from_str(src).context("parse functions JSON")?;
    Ok(doc.into_signatures()?)
}

pub fn selection_from_json(src: &str) -> anyhow::Result<Selection> {
    let doc: SelectionDoc = serde_json::from_str(src).context("parse selection JSON")?;
    Ok(doc.into_selection()?)
}

pub fn load_types(path: &Path) -> anyhow::Result<TypeCatalog> {
    let doc: TypesDoc = read_json(path, "types")?;
    doc.into_catalog()
        .with_context(|| format!("types catalog: {}", path.display()))
}

pub fn load_functions(path: &Path) -> anyhow::Result<Vec<Signature>> {
    let doc: FunctionsDoc = read_json(path, "functions")?;
    doc.into_signatures()
        .with_context(|| format!("functions catalog: {}", path.display()))
}

pub fn load_selection(path: &Path) -> anyhow::Result<Selection> {
    let doc: SelectionDoc = read_json(path, "selection")?;
    doc.into_selection()
        .with_context(|| format!("selection: {}", path.display()))
}
