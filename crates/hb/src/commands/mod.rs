//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod check;
pub(crate) mod toc;

pub(crate) use build::BuildArgs;
pub(crate) use check::CheckArgs;
pub(crate) use toc::TocArgs;
