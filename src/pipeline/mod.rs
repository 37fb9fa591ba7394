//! The content pipeline a tagged file's body is passed through
//!
//! A pipeline is a list of [`StageDescriptor`]s naming stages in a
//! [`StageRegistry`]. [`run_stages`] executes them over the body, serving the
//! body to the stages through a single-file [`VirtualFs`].

pub mod builtin;
pub mod registry;
pub mod runner;
pub mod stage;

pub use builtin::{RawStage, TrimStage};
pub use registry::StageRegistry;
pub use runner::{run_stages, VirtualFs};
pub use stage::{Stage, StageContext, StageDescriptor};
