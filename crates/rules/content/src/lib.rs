//! Rule data loading and load-time validation.
//!
//! `rules-content` owns the authored side of the engine: RON rule files,
//! their format versioning, and the validation pass that keeps broken
//! authoring out of the runtime. Everything caught here is fatal at load;
//! the engine itself only ever sees rules that passed.

pub mod loaders;
pub mod validate;

pub use loaders::{FORMAT_VERSION, LoadError, RuleLibrary};
pub use validate::{ValidationError, validate_rule};
