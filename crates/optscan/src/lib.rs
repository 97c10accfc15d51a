//! Declarative short/long option parsing with deferred validation and usage rendering.
//!
//! Options are declared on an [`OptionRegistry`] as required, optional or flag.
//! [`OptionRegistry::parse`] scans a token sequence, producing the resolved
//! [`Parameters`] and the leftover remainder. Validator failures and missing
//! required options are collected across the whole scan so that
//! [`OptionRegistry::usage`] can report every problem at once.
//!
//! # Example
//!
//! ```
//! use optscan::{OptionOpts, OptionRegistry, validators};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut reg = OptionRegistry::new();
//! reg.declare_required("f", Some("file"), OptionOpts::new().description("Input file"))?;
//! reg.declare_optional(
//!     "n",
//!     Some("count"),
//!     OptionOpts::new().default_value("1").validator(validators::resolve("n", "int")?),
//! )?;
//! reg.declare_flag("v", Some("verbose"), OptionOpts::new())?;
//!
//! let res = reg.parse(["--file", "in.txt", "-v", "--", "extra"])?;
//! assert_eq!(res.parameters.get_str("file"), Some("in.txt"));
//! assert_eq!(res.parameters.get_int("count"), Some(1));
//! assert_eq!(res.parameters.get_bool("v"), Some(true));
//! assert_eq!(res.remainder, vec!["extra"]);
//! # Ok(()) }
//! ```

mod error;
mod registry;
mod scanner;
mod spec;
mod usage;
mod value;

pub mod validators;

pub use error::{DeclareError, OptionFailure, ParseError, ValidationError};
pub use registry::OptionRegistry;
pub use scanner::{ArgumentScanner, ParseResult, ScanReport};
pub use spec::{OptionKind, OptionOpts, OptionSpec, RemainderValidator, Validator};
pub use usage::{DEFAULT_MAX_COLUMN_WIDTH, UsageConfig, UsagePresenter};
pub use value::{Parameters, Value};
