/**
 * Responsibility
 *  - Bundle core (extractor) and types (per-kind aliases)
 */
mod core;
mod types;

pub use types::*;
