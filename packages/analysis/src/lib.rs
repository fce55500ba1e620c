//! Shared tank-analysis pipeline
//!
//! One library owns prompt construction, model invocation, and defensive
//! response interpretation, so every transport (HTTP route, job, test
//! harness) produces the same canonical [`AnalysisReport`] instead of
//! carrying its own drifting copy of the logic.
//!
//! # Example
//!
//! ```rust,ignore
//! use analysis::{AnalysisInvoker, prompt};
//!
//! let invoker = AnalysisInvoker::mock();
//! let description = prompt::describe(&setup);
//! let report = invoker.analyze_setup(&description).await?;
//! assert!((60..=99).contains(&report.score));
//! ```

pub mod interpret;
pub mod invoker;
pub mod prompt;
pub mod types;

pub use interpret::{InterpreterChain, ResponseInterpreter};
pub use invoker::{fallback_setup_report, AnalysisInvoker, AnalysisMode};
pub use types::{AnalysisReport, Breakdown, LivestockEntry, TankSetup, WaterParams};
