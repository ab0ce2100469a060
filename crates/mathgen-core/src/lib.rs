//! Overload expansion and test case synthesis for SYCL math builtins.
//!
//! Pipeline: a [`types::TypeCatalog`] and a [`types::Selection`] resolve
//! every placeholder to concrete leaves; [`expand`] turns signature
//! templates into concrete overloads; [`synth`] emits one or six test
//! blocks per overload with seeded input literals.

pub mod catalog;
pub mod diagnostics;
pub mod error;
pub mod expand;
pub mod generate;
pub mod mutation;
pub mod render;
pub mod signature;
pub mod static_refs;
pub mod synth;
pub mod types;
pub mod util;
pub mod values;

pub use error::{GenError, Result};
pub use generate::{apply_template, generate, GenerateOptions, GenerationOutput, RunReport};
pub use synth::{CheckMode, Decoration, MemoryMode, TestCase};
