//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use yamlenums_core::prelude::*;
//! ```

// Errors
pub use crate::error::{YamlenumsError, YamlenumsResult};

// Builder API
pub use crate::builder::{GenerationReport, Yamlenums};

// Package analysis
pub use crate::constants::{AliasPolicy, ValueTable};
pub use crate::package::{parse_package, Package};

// Generation seams
pub use crate::generate::{output_file_name, OutputSink};
pub use crate::render::{RenderContext, SourceRenderer};

// Configuration
pub use crate::config::{load_config, YamlenumsConfig};
