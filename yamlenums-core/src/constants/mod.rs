//! Constant discovery and evaluation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐     ┌─────────────────────┐
//! │ const_extractor.rs  │     │    int_kind.rs      │
//! │  ─────────────────  │     │  ─────────────────  │
//! │  Flatten groups,    │     │  Integer kinds and  │
//! │  type elision,      │     │  their ranges       │
//! │  implicit repeats   │     │                     │
//! └──────────┬──────────┘     └──────────┬──────────┘
//!            │                           │
//!            ▼                           ▼
//! ┌─────────────────────┐     ┌─────────────────────┐
//! │   const_graph.rs    │────►│     resolve.rs      │
//! │  ─────────────────  │     │  ─────────────────  │
//! │  Dependency order,  │     │  Declared types,    │
//! │  cycles, closure    │     │  eval.rs per entry  │
//! └─────────────────────┘     └──────────┬──────────┘
//!                                        ▼
//!                             ┌─────────────────────┐
//!                             │   value_table.rs    │
//!                             │  ─────────────────  │
//!                             │  One canonical name │
//!                             │  per value          │
//!                             └─────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use yamlenums_core::constants::{extract_constants, resolve_values, AliasPolicy};
//!
//! let entries = extract_constants(&files)?;
//! let table = resolve_values(&entries, &package, "Pill", AliasPolicy::Lexical)?;
//!
//! for (name, value) in table.pairs() {
//!     println!("{} = {}", name, value);
//! }
//! ```

pub mod const_extractor;
pub mod const_graph;
pub mod eval;
pub mod int_kind;
pub mod resolve;
pub mod value_table;

pub use const_extractor::{extract_constants, ConstEntry};
pub use const_graph::ConstGraph;
pub use eval::{ConstValue, EvalScope, Evaluator};
pub use int_kind::{IntKind, TypeResolution};
pub use resolve::{resolve_values, TypeLookup};
pub use value_table::{AliasPolicy, ResolvedConstant, ValueEntry, ValueTable};
