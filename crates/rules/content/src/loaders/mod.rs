//! Loaders for authored rule data.

mod rules;

pub use rules::{FORMAT_VERSION, LoadError, RuleFile, RuleLibrary};
