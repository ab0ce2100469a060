//! Test case synthesis for concrete signatures.
//!
//! Pointer-bearing overloads get six blocks (three address spaces, each
//! with an undecorated and a decorated `multi_ptr`); the rest get one.
//! Every block draws its input literals from the run's generator first, so
//! the draw sequence only depends on signature order and argument types.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};
use crate::render::{Harness, TestCaseBlock};
use crate::signature::ConcreteSignature;
use crate::types::Type;
use crate::values::{generate_all_input_values, generate_value_init};

const SOURCE_DATA: &str = "multiPtrSourceData";
const VEC_SIZE_TOKEN: &str = "vecSize";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryMode {
    Private,
    Local,
    Global,
    NoPtr,
}

impl MemoryMode {
    pub fn as_str(self) -> &'static str {
        match self {
            MemoryMode::Private => "private",
            MemoryMode::Local => "local",
            MemoryMode::Global => "global",
            MemoryMode::NoPtr => "no_ptr",
        }
    }

    fn address_space(self) -> Option<&'static str> {
        match self {
            MemoryMode::Private => Some("sycl::access::address_space::private_space"),
            MemoryMode::Local => Some("sycl::access::address_space::local_space"),
            MemoryMode::Global => Some("sycl::access::address_space::global_space"),
            MemoryMode::NoPtr => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckMode {
    /// Only exercise the call.
    #[default]
    Plain,
    /// Compare the result against a reference value.
    Verified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoration {
    No,
    Yes,
}

impl Decoration {
    pub fn as_cpp(self) -> &'static str {
        match self {
            Decoration::No => "sycl::access::decorated::no",
            Decoration::Yes => "sycl::access::decorated::yes",
        }
    }
}

/// Emission order for pointer-bearing overloads.
pub const POINTER_VARIANTS: [(MemoryMode, Decoration); 6] = [
    (MemoryMode::Private, Decoration::No),
    (MemoryMode::Private, Decoration::Yes),
    (MemoryMode::Local, Decoration::No),
    (MemoryMode::Local, Decoration::Yes),
    (MemoryMode::Global, Decoration::No),
    (MemoryMode::Global, Decoration::Yes),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase {
    pub test_id: u64,
    pub memory: MemoryMode,
    pub decoration: Option<Decoration>,
    /// Human-readable overload, e.g. `float sycl::fract(float, float)`.
    pub signature: String,
    pub source: String,
}

/// Declarations for one argument.
struct ArgDecl {
    name: String,
    /// Backing value for a pointer argument, or the plain value.
    value: String,
    /// `multi_ptr` handle; pointer arguments only.
    handle: Option<String>,
}

pub fn generate_test_case(
    rng: &mut dyn RngCore,
    test_id: u64,
    sig: &ConcreteSignature<'_>,
    memory: MemoryMode,
    check: CheckMode,
    decoration: Option<Decoration>,
) -> Result<TestCase> {
    let pointer = sig.pointer_arg()?;
    check_variant(sig, pointer, memory, check, decoration)?;

    let inputs = generate_all_input_values(rng, &sig.arg_types)?;
    let args: Vec<ArgDecl> = sig
        .arg_types
        .iter()
        .zip(&inputs)
        .enumerate()
        .map(|(i, (ty, values))| {
            let name = format!("inputData_{i}");
            let init = generate_value_init(ty.base_type(), values);
            if pointer == Some(i) {
                ArgDecl {
                    value: format!("{} {SOURCE_DATA}({init});", ty.name),
                    handle: Some(multi_ptr_decl(&name, ty, memory, decoration)),
                    name,
                }
            } else {
                ArgDecl {
                    value: format!("{} {name}({init});", ty.name),
                    handle: None,
                    name,
                }
            }
        })
        .collect();

    let ptr: Option<(usize, &Type)> = pointer.map(|i| (i, sig.arg_types[i]));
    let arg_names: Vec<&str> = args.iter().map(|a| a.name.as_str()).collect();
    let call = format!("{}::{}({})", sig.namespace(), sig.name(), arg_names.join(", "));
    let ret = sig.ret_type.name.as_str();

    let mut body: Vec<String> = args
        .iter()
        .flat_map(|a| std::iter::once(a.value.clone()).chain(a.handle.clone()))
        .collect();
    if check == CheckMode::Verified {
        body.push(return_type_assert(sig, &call));
    }
    match (check, ptr) {
        (CheckMode::Verified, Some((_, ptr_ty))) if memory == MemoryMode::Private => {
            body.push(format!("{ret} res = {call};"));
            body.push(format!(
                "return privatePtrCheck<{ret}, {}>(res, {SOURCE_DATA});",
                ptr_ty.name
            ));
        }
        _ => body.push(format!("return {call};")),
    }

    let mut preamble: Vec<String> = Vec::new();
    let mut trailing_args: Vec<String> = Vec::new();
    match (check, ptr) {
        (CheckMode::Plain, None) => {}
        (CheckMode::Plain, Some((i, ptr_ty))) => {
            if memory != MemoryMode::Private {
                let init = generate_value_init(ptr_ty.base_type(), &inputs[i]);
                preamble.push(format!("{} {SOURCE_DATA}({init});", ptr_ty.name));
                trailing_args.push(SOURCE_DATA.to_string());
            }
        }
        (CheckMode::Verified, None) => {
            preamble.extend(args.iter().map(|a| a.value.clone()));
            preamble.push(format!(
                "sycl_cts::resultRef<{ret}> ref = {};",
                reference_init(sig, &arg_names, &inputs)?
            ));
            trailing_args.push("ref".to_string());
        }
        (CheckMode::Verified, Some((i, ptr_ty))) => {
            preamble.extend(args.iter().map(|a| a.value.clone()));
            preamble.push(format!("{} refPtr = {SOURCE_DATA};", ptr_ty.name));
            let ref_args: Vec<&str> = arg_names
                .iter()
                .enumerate()
                .map(|(j, n)| if j == i { "&refPtr" } else { *n })
                .collect();
            preamble.push(format!(
                "sycl_cts::resultRef<{ret}> ref = reference::{}({});",
                sig.name(),
                ref_args.join(", ")
            ));
            if memory != MemoryMode::Private {
                trailing_args.push(SOURCE_DATA.to_string());
            }
            trailing_args.push("ref".to_string());
            trailing_args.push("refPtr".to_string());
        }
    }

    let accessor = ptr.and_then(|(_, t)| accessor_type(memory, t));
    let (accuracy, comment) = match check {
        CheckMode::Verified => (accuracy_clause(sig), sig.comment().map(str::to_string)),
        CheckMode::Plain => (None, None),
    };

    let block = TestCaseBlock {
        test_id,
        harness: harness(memory, check),
        ret_type: ret.to_string(),
        preamble,
        accessor,
        body,
        trailing_args,
        accuracy,
        comment,
    };
    Ok(TestCase {
        test_id,
        memory,
        decoration: pointer.and(decoration),
        signature: sig.display(),
        source: block.render(),
    })
}

fn check_variant(
    sig: &ConcreteSignature<'_>,
    pointer: Option<usize>,
    memory: MemoryMode,
    check: CheckMode,
    decoration: Option<Decoration>,
) -> Result<()> {
    let reason = match (pointer, memory, check) {
        (_, MemoryMode::NoPtr, CheckMode::Plain) => Some("plain test cases have no no_ptr form"),
        (Some(_), MemoryMode::NoPtr, _) => Some("pointer arguments need a memory space"),
        (None, MemoryMode::Local | MemoryMode::Global, _) => {
            Some("local and global variants need a pointer argument")
        }
        (None, MemoryMode::Private, CheckMode::Verified) => {
            Some("verified cases without a pointer argument use no_ptr")
        }
        (Some(_), _, _) if decoration.is_none() => Some("pointer variants need a decoration"),
        _ => None,
    };
    match reason {
        Some(reason) => Err(GenError::InvalidVariant {
            function: format!("{}::{}", sig.namespace(), sig.name()),
            reason,
        }),
        None => Ok(()),
    }
}

fn harness(memory: MemoryMode, check: CheckMode) -> Harness {
    match (check, memory) {
        (CheckMode::Plain, MemoryMode::Local) => Harness::TestFunctionLocal,
        (CheckMode::Plain, MemoryMode::Global) => Harness::TestFunctionGlobal,
        (CheckMode::Plain, _) => Harness::TestFunction,
        (CheckMode::Verified, MemoryMode::NoPtr) => Harness::Check,
        (CheckMode::Verified, MemoryMode::Private) => Harness::CheckPrivate,
        (CheckMode::Verified, MemoryMode::Local) => Harness::CheckLocal,
        (CheckMode::Verified, MemoryMode::Global) => Harness::CheckGlobal,
    }
}

fn multi_ptr_decl(
    name: &str,
    ty: &Type,
    memory: MemoryMode,
    decoration: Option<Decoration>,
) -> String {
    let space = memory.address_space().unwrap_or_default();
    let decorated = decoration.unwrap_or(Decoration::No).as_cpp();
    let ptr_ty = format!("sycl::multi_ptr<{}, {space}, {decorated}>", ty.name);
    match memory {
        MemoryMode::Private => format!(
            "{ptr_ty} {name} = sycl::address_space_cast<{space}, {decorated}>(&{SOURCE_DATA});"
        ),
        _ => format!("{ptr_ty} {name}(acc);"),
    }
}

fn accessor_type(memory: MemoryMode, ptr_ty: &Type) -> Option<String> {
    match memory {
        MemoryMode::Local => Some(format!("sycl::local_accessor<{}, 1>", ptr_ty.name)),
        MemoryMode::Global => Some(format!(
            "sycl::accessor<{}, 1, sycl::access_mode::read_write, sycl::target::device>",
            ptr_ty.name
        )),
        MemoryMode::Private | MemoryMode::NoPtr => None,
    }
}

fn return_type_assert(sig: &ConcreteSignature<'_>, call: &str) -> String {
    let arg_types: Vec<&str> = sig.arg_types.iter().map(|t| t.name.as_str()).collect();
    let ret = &sig.ret_type.name;
    format!(
        "static_assert(std::is_same_v<decltype({call}), {ret}>,\n    \"Error: Wrong return type of {}::{}({}), not {ret}\");",
        sig.namespace(),
        sig.name(),
        arg_types.join(", ")
    )
}

fn reference_init(
    sig: &ConcreteSignature<'_>,
    arg_names: &[&str],
    inputs: &[Vec<String>],
) -> Result<String> {
    let ret = &sig.ret_type;
    let Some(reference) = sig.static_reference() else {
        return Ok(format!("reference::{}({})", sig.name(), arg_names.join(", ")));
    };
    sig.template.check_static_reference()?;
    let results = (reference.apply)(inputs);
    if results.len() != ret.dim as usize {
        return Err(GenError::StaticReferenceShape {
            signature: sig.display(),
            name: reference.name,
            expected: ret.dim as usize,
            found: results.len(),
        });
    }
    Ok(format!(
        "{}({})",
        ret.name,
        generate_value_init(ret.base_type(), &results)
    ))
}

fn accuracy_clause(sig: &ConcreteSignature<'_>) -> Option<String> {
    let accuracy = sig.accuracy()?;
    if accuracy.contains(VEC_SIZE_TOKEN) {
        let dim = sig.arg_types.first().map_or(sig.ret_type.dim, |t| t.dim);
        Some(accuracy.replace(VEC_SIZE_TOKEN, &dim.to_string()))
    } else {
        Some(accuracy.to_string())
    }
}

/// Blocks for every signature in order, ids counting up from `start_id`.
/// The id after the last block must still fit in a `u64`.
pub fn generate_test_cases(
    rng: &mut dyn RngCore,
    start_id: u64,
    sigs: &[ConcreteSignature<'_>],
    check: CheckMode,
) -> Result<Vec<TestCase>> {
    let mut out = Vec::new();
    let mut next_id = start_id;
    for sig in sigs {
        if sig.has_pointer() {
            for (memory, decoration) in POINTER_VARIANTS {
                out.push(generate_test_case(
                    &mut *rng,
                    next_id,
                    sig,
                    memory,
                    check,
                    Some(decoration),
                )?);
                next_id = next_id.checked_add(1).ok_or(GenError::IdOverflow { start_id })?;
            }
        } else {
            let memory = match check {
                CheckMode::Verified => MemoryMode::NoPtr,
                CheckMode::Plain => MemoryMode::Private,
            };
            out.push(generate_test_case(&mut *rng, next_id, sig, memory, check, None)?);
            next_id = next_id.checked_add(1).ok_or(GenError::IdOverflow { start_id })?;
        }
    }
    Ok(out)
}

/// Concatenates blocks in generation order.
pub fn render_stream(cases: &[TestCase]) -> String {
    cases.iter().map(|c| c.source.as_str()).collect()
}
