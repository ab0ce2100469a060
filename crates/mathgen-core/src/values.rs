//! Deterministic literal generation for test inputs.
//!
//! Draw order is observable: every call consumes the generator in argument
//! order, one draw per element (booleans draw nothing).

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{GenError, Result};
use crate::types::Type;

/// Seed every full generation run starts from.
pub const GENERATION_SEED: u64 = 0;

pub fn seeded_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(GENERATION_SEED)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueClass {
    Bool,
    Float,
    Char,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
}

const VALUE_CLASSES: &[(&str, ValueClass)] = &[
    ("bool", ValueClass::Bool),
    ("float", ValueClass::Float),
    ("double", ValueClass::Float),
    ("sycl::half", ValueClass::Float),
    ("half", ValueClass::Float),
    ("char", ValueClass::Char),
    ("signed char", ValueClass::I8),
    ("int8_t", ValueClass::I8),
    ("unsigned char", ValueClass::U8),
    ("uint8_t", ValueClass::U8),
    // `int` only guarantees 16 bits.
    ("short", ValueClass::I16),
    ("int", ValueClass::I16),
    ("int16_t", ValueClass::I16),
    ("unsigned short", ValueClass::U16),
    ("unsigned", ValueClass::U16),
    ("uint16_t", ValueClass::U16),
    ("long", ValueClass::I32),
    ("int32_t", ValueClass::I32),
    ("unsigned long", ValueClass::U32),
    ("uint32_t", ValueClass::U32),
    ("long long", ValueClass::I64),
    ("int64_t", ValueClass::I64),
    ("unsigned long long", ValueClass::U64),
    ("uint64_t", ValueClass::U64),
];

const LITERAL_SUFFIXES: &[(&str, &str)] = &[
    ("float", "f"),
    ("sycl::half", "f"),
    ("half", "f"),
    ("unsigned long", "U"),
    ("uint32_t", "U"),
    ("long long", "LL"),
    ("int64_t", "LL"),
    ("unsigned long long", "LLU"),
    ("uint64_t", "LLU"),
];

pub fn value_class(base_type: &str) -> Option<ValueClass> {
    VALUE_CLASSES
        .iter()
        .find(|(name, _)| *name == base_type)
        .map(|(_, class)| *class)
}

pub fn literal_suffix(base_type: &str) -> &'static str {
    LITERAL_SUFFIXES
        .iter()
        .find(|(name, _)| *name == base_type)
        .map(|(_, suffix)| *suffix)
        .unwrap_or("")
}

pub fn generate_input_values(
    rng: &mut dyn RngCore,
    base_type: &str,
    count: usize,
) -> Result<Vec<String>> {
    let class = value_class(base_type).ok_or_else(|| GenError::UnsupportedBaseType {
        base_type: base_type.to_string(),
    })?;
    Ok((0..count).map(|_| draw(&mut *rng, class)).collect())
}

fn draw(rng: &mut dyn RngCore, class: ValueClass) -> String {
    match class {
        ValueClass::Bool => "true".to_string(),
        ValueClass::Float => {
            let x: f64 = rng.gen_range(0.1..=0.9);
            format_float((x * 1e10).round() / 1e10)
        }
        ValueClass::Char => rng.gen_range(0..=127i64).to_string(),
        ValueClass::I8 => rng.gen_range(-128..=127i64).to_string(),
        ValueClass::U8 => rng.gen_range(0..=255i64).to_string(),
        ValueClass::I16 => rng.gen_range(-32768..=32767i64).to_string(),
        ValueClass::U16 => rng.gen_range(0..=65535i64).to_string(),
        ValueClass::I32 => rng.gen_range(i32::MIN..=i32::MAX).to_string(),
        ValueClass::U32 => rng.gen_range(0..=u32::MAX).to_string(),
        ValueClass::I64 => rng.gen_range(i64::MIN..=i64::MAX).to_string(),
        ValueClass::U64 => rng.gen_range(0..=u64::MAX).to_string(),
    }
}

/// Shortest round-trip decimal, always with a fractional part.
pub(crate) fn format_float(x: f64) -> String {
    let s = format!("{x}");
    if s.contains('.') || s.contains('e') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{s}.0")
    }
}

/// One value list per argument, `dim` values each.
pub fn generate_all_input_values(
    rng: &mut dyn RngCore,
    arg_types: &[&Type],
) -> Result<Vec<Vec<String>>> {
    arg_types
        .iter()
        .map(|t| generate_input_values(&mut *rng, t.base_type(), t.dim as usize))
        .collect()
}

/// Comma-separated initializer with the base type's literal suffix.
pub fn generate_value_init<S: AsRef<str>>(base_type: &str, values: &[S]) -> String {
    let suffix = literal_suffix(base_type);
    values
        .iter()
        .map(|v| format!("{}{suffix}", v.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}
