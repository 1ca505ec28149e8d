//! Shared vocabulary for the errtrap engine.
//!
//! This crate holds everything the stateful engine and its embedders agree on:
//! - Severity codes, the reporting mask, and the per-runtime name table
//! - Noise rules for errors produced by the framework itself
//! - Percent templates used for assertion messages
//! - Matchers that decide whether a captured error fulfils an expectation
//! - The `TestContext` capability that receives every report
//!
//! # Reporting Contract
//!
//! Every message handed to a [`TestContext`] is a percent template: literal
//! `%` characters arrive doubled and `%s` marks the slot for the matcher's
//! overlay. Contexts render with [`template::render`] before display.
//!
//! ```text
//! add(NOTICE, "50% done")  ──► escaped "50%% done"
//!     │
//!     ▼
//! assert(matcher, "50%% done", "saw %s -> Error [50%% done] ...")
//!     │
//!     ▼
//! render ──► "saw <overlay> -> Error [50% done] ..."
//! ```

mod captured;
pub mod context;
mod errors;
pub mod matcher;
pub mod noise;
pub mod severity;
pub mod template;

pub use captured::CapturedError;
pub use context::{RecordedCall, RecordingContext, TestContext};
pub use errors::TrapError;
pub use matcher::{AnyError, ExpectedError, Matcher, MessageContains, MessageEquals, Observed};
pub use noise::{NoiseFilter, NoiseRule};
pub use severity::{Generation, RuntimeCapabilities, Severity, SeverityClassifier, SeverityMask};
