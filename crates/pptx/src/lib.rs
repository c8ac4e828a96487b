//! PPTX (Office Open XML) backend for deck generation.
//!
//! A `.pptx` file is a ZIP archive of XML parts tied together by
//! relationship tables. This crate loads one into a [`SlidePackage`],
//! forces it to a fixed slide count, rewrites placeholder text, and writes
//! it back; or builds a styled deck from nothing when no template exists.

pub mod deck;
pub mod injector;
pub mod layout;
pub mod normalizer;
pub mod opc;
pub mod package;
pub mod placeholder;
pub mod slide;
pub mod synthesizer;
pub mod template;
pub mod text;
pub mod xml;

pub use deck::{render_deck, DeckSource, RenderedDeck};
pub use injector::{clear_text, inject, ClearReport, InjectionReport, RoleWrite, ShapeWriteSkip};
pub use layout::Layout;
pub use normalizer::{normalize, NormalizeReport};
pub use package::{SlidePackage, SlideRemoval, StructuralMutationWarning};
pub use placeholder::{best_layout, PlaceholderRole};
pub use slide::{NotesSlide, Shape, SkipReason, Slide};
pub use synthesizer::synthesize;
pub use text::{Paragraph, RgbColor, TextStyle};
