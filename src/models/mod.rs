//! Domain models for stickies.
//!
//! # Core Concepts
//!
//! - [`Note`]: the single persisted record. Identity is the numeric `id`
//!   chosen at creation; text, color and pin state are mutable.
//! - [`NoteDraft`]: the transient input fields of the note composer.

mod note;

pub use note::*;
