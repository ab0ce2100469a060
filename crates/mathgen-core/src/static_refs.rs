//! Named static references.
//!
//! A static reference computes the expected result of a call directly from
//! the generated literals, so the emitted test compares against a constant
//! instead of calling `reference::<name>`. Catalog entries bind to these by
//! name.

use std::cmp::Ordering;
use std::fmt;

use crate::values::format_float;

/// Maps per-argument literal lists to the result's literal list.
pub type StaticReferenceFn = fn(&[Vec<String>]) -> Vec<String>;

#[derive(Clone, Copy)]
pub struct StaticReference {
    pub name: &'static str,
    /// Leading arguments `apply` reads.
    pub arity: usize,
    pub apply: StaticReferenceFn,
}

impl fmt::Debug for StaticReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StaticReference").field(&self.name).finish()
    }
}

impl PartialEq for StaticReference {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for StaticReference {}

const REGISTRY: &[StaticReference] = &[
    StaticReference {
        name: "identity",
        arity: 1,
        apply: identity,
    },
    StaticReference {
        name: "min",
        arity: 2,
        apply: min,
    },
    StaticReference {
        name: "max",
        arity: 2,
        apply: max,
    },
    StaticReference {
        name: "clamp",
        arity: 3,
        apply: clamp,
    },
];

pub fn lookup(name: &str) -> Option<StaticReference> {
    REGISTRY.iter().copied().find(|r| r.name == name)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|r| r.name)
}

fn identity(args: &[Vec<String>]) -> Vec<String> {
    args.first().cloned().unwrap_or_default()
}

fn min(args: &[Vec<String>]) -> Vec<String> {
    elementwise(args, 2, |xs| pick(&xs[0], &xs[1], Ordering::Greater))
}

fn max(args: &[Vec<String>]) -> Vec<String> {
    elementwise(args, 2, |xs| pick(&xs[0], &xs[1], Ordering::Less))
}

fn clamp(args: &[Vec<String>]) -> Vec<String> {
    elementwise(args, 3, |xs| {
        let lo_bound = pick(&xs[0], &xs[1], Ordering::Less);
        pick(&lo_bound, &xs[2], Ordering::Greater)
    })
}

/// Applies `f` lane by lane over the first `arity` arguments. Single-value
/// arguments broadcast against vector ones.
fn elementwise(
    args: &[Vec<String>],
    arity: usize,
    f: impl Fn(&[String]) -> String,
) -> Vec<String> {
    let args = &args[..arity.min(args.len())];
    if args.len() < arity {
        return Vec::new();
    }
    let lanes = args.iter().map(|a| a.len()).max().unwrap_or(0);
    (0..lanes)
        .map(|lane| {
            let xs: Vec<String> = args
                .iter()
                .map(|a| {
                    if a.len() == 1 {
                        a[0].clone()
                    } else {
                        a.get(lane).cloned().unwrap_or_default()
                    }
                })
                .collect();
            f(&xs)
        })
        .collect()
}

/// Returns `b` when `a.cmp(b) == replace_when`, else `a`.
fn pick(a: &str, b: &str, replace_when: Ordering) -> String {
    if compare_literals(a, b) == replace_when {
        normalize(b)
    } else {
        normalize(a)
    }
}

fn compare_literals(a: &str, b: &str) -> Ordering {
    match (a.parse::<i128>(), b.parse::<i128>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => {
            let x = a.parse::<f64>().unwrap_or(f64::NAN);
            let y = b.parse::<f64>().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
    }
}

fn normalize(lit: &str) -> String {
    if lit.parse::<i128>().is_ok() {
        return lit.to_string();
    }
    match lit.parse::<f64>() {
        Ok(x) => format_float(x),
        Err(_) => lit.to_string(),
    }
}
