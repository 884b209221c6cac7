//! cf-protocol: Shared data model for cmdfuscator.
//!
//! These types map onto the ArgFuscator JSON profile format (format
//! version 2.0) and are shared by the engine, the profile loader, and the
//! command-line frontend.

pub mod modifier;
pub mod profile;
pub mod token;

pub use modifier::{lenient_usize, BaseModifierConfig, Probability, ProbabilityError};
pub use profile::{ArgumentDefinition, CommandElement, ProfileFile, ProfileVariant, Versions};
pub use token::{Token, TokenType};
