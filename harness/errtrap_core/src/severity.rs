//! Severity codes, reporting masks, and the per-runtime name table.
//!
//! # Design
//!
//! The enumeration is complete and versioned: every severity any runtime
//! generation can raise is a variant, and [`RuntimeCapabilities`] records which
//! conditional entries the current runtime actually provides. The
//! [`SeverityClassifier`] resolves the table once against those flags, so name
//! lookups never consult the environment again.
//!
//! Codes follow the classic bit layout:
//!
//! | Bit     | Severity          | Conditional on       |
//! |---------|-------------------|----------------------|
//! | 1       | `E_ERROR`         |                      |
//! | 2       | `E_WARNING`       |                      |
//! | 4       | `E_PARSE`         |                      |
//! | 8       | `E_NOTICE`        |                      |
//! | 16..128 | core / compile    |                      |
//! | 256     | `E_USER_ERROR`    |                      |
//! | 512     | `E_USER_WARNING`  |                      |
//! | 1024    | `E_USER_NOTICE`   |                      |
//! | 2048    | `E_STRICT`        |                      |
//! | 4096    | `E_RECOVERABLE_ERROR` | `RECOVERABLE_ERROR` |
//! | 8192    | `E_DEPRECATED`    | `DEPRECATION`        |
//! | 16384   | `E_USER_DEPRECATED` | `DEPRECATION`      |
//! | 32767   | `E_ALL`           |                      |

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::TrapError;

bitflags! {
    /// Set of severities currently eligible for capture.
    ///
    /// The ambient "reporting level" of the runtime. A fired error whose
    /// severity does not intersect the mask is dropped before any processing.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct SeverityMask: u32 {
        const ERROR = 1 << 0;
        const WARNING = 1 << 1;
        const PARSE = 1 << 2;
        const NOTICE = 1 << 3;
        const CORE_ERROR = 1 << 4;
        const CORE_WARNING = 1 << 5;
        const COMPILE_ERROR = 1 << 6;
        const COMPILE_WARNING = 1 << 7;
        const USER_ERROR = 1 << 8;
        const USER_WARNING = 1 << 9;
        const USER_NOTICE = 1 << 10;
        const STRICT = 1 << 11;
        const RECOVERABLE_ERROR = 1 << 12;
        const DEPRECATED = 1 << 13;
        const USER_DEPRECATED = 1 << 14;

        /// Every severity, including strict and deprecation notices.
        const ALL = 0x7FFF;
    }
}

impl SeverityMask {
    /// Whether a fired error of `severity` passes this mask.
    #[inline]
    pub fn admits(self, severity: Severity) -> bool {
        self.intersects(severity.mask())
    }
}

bitflags! {
    /// Which conditional severities the running environment provides.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct RuntimeCapabilities: u8 {
        /// `E_RECOVERABLE_ERROR` exists.
        const RECOVERABLE_ERROR = 1 << 0;
        /// `E_DEPRECATED` and `E_USER_DEPRECATED` exist.
        const DEPRECATION = 1 << 1;
    }
}

/// Runtime generation, ordered oldest first.
///
/// Each generation adds conditional severities on top of the previous one.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Generation {
    /// Only the unconditional severities.
    Legacy,
    /// Adds `E_RECOVERABLE_ERROR`.
    Recoverable,
    /// Adds the deprecation severities.
    #[default]
    Current,
}

impl Generation {
    /// Capability flags this generation provides.
    pub fn capabilities(self) -> RuntimeCapabilities {
        match self {
            Generation::Legacy => RuntimeCapabilities::empty(),
            Generation::Recoverable => RuntimeCapabilities::RECOVERABLE_ERROR,
            Generation::Current => RuntimeCapabilities::all(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Generation::Legacy => "legacy",
            Generation::Recoverable => "recoverable",
            Generation::Current => "current",
        }
    }
}

impl FromStr for Generation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Generation::Legacy),
            "recoverable" => Ok(Generation::Recoverable),
            "current" => Ok(Generation::Current),
            other => Err(format!(
                "unknown runtime generation '{other}' (expected legacy, recoverable or current)"
            )),
        }
    }
}

/// A severity code from the fixed enumeration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Parse,
    Notice,
    CoreError,
    CoreWarning,
    CompileError,
    CompileWarning,
    UserError,
    UserWarning,
    UserNotice,
    Strict,
    RecoverableError,
    Deprecated,
    UserDeprecated,
    /// The union of every severity.
    All,
}

impl Severity {
    /// Every variant, in code order.
    pub const VARIANTS: [Severity; 16] = [
        Severity::Error,
        Severity::Warning,
        Severity::Parse,
        Severity::Notice,
        Severity::CoreError,
        Severity::CoreWarning,
        Severity::CompileError,
        Severity::CompileWarning,
        Severity::UserError,
        Severity::UserWarning,
        Severity::UserNotice,
        Severity::Strict,
        Severity::RecoverableError,
        Severity::Deprecated,
        Severity::UserDeprecated,
        Severity::All,
    ];

    /// Numeric code of this severity.
    pub const fn code(self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Parse => 4,
            Severity::Notice => 8,
            Severity::CoreError => 16,
            Severity::CoreWarning => 32,
            Severity::CompileError => 64,
            Severity::CompileWarning => 128,
            Severity::UserError => 256,
            Severity::UserWarning => 512,
            Severity::UserNotice => 1024,
            Severity::Strict => 2048,
            Severity::RecoverableError => 4096,
            Severity::Deprecated => 8192,
            Severity::UserDeprecated => 16384,
            Severity::All => 32767,
        }
    }

    /// The mask bits covered by this severity.
    pub const fn mask(self) -> SeverityMask {
        SeverityMask::from_bits_retain(self.code())
    }

    /// Canonical display name, regardless of runtime availability.
    ///
    /// Use [`SeverityClassifier::name_of`] when the runtime matters.
    pub const fn name(self) -> &'static str {
        match self {
            Severity::Error => "E_ERROR",
            Severity::Warning => "E_WARNING",
            Severity::Parse => "E_PARSE",
            Severity::Notice => "E_NOTICE",
            Severity::CoreError => "E_CORE_ERROR",
            Severity::CoreWarning => "E_CORE_WARNING",
            Severity::CompileError => "E_COMPILE_ERROR",
            Severity::CompileWarning => "E_COMPILE_WARNING",
            Severity::UserError => "E_USER_ERROR",
            Severity::UserWarning => "E_USER_WARNING",
            Severity::UserNotice => "E_USER_NOTICE",
            Severity::Strict => "E_STRICT",
            Severity::RecoverableError => "E_RECOVERABLE_ERROR",
            Severity::Deprecated => "E_DEPRECATED",
            Severity::UserDeprecated => "E_USER_DEPRECATED",
            Severity::All => "E_ALL",
        }
    }

    /// Capability a runtime needs for this severity to exist.
    pub const fn required_capability(self) -> RuntimeCapabilities {
        match self {
            Severity::RecoverableError => RuntimeCapabilities::RECOVERABLE_ERROR,
            Severity::Deprecated | Severity::UserDeprecated => RuntimeCapabilities::DEPRECATION,
            _ => RuntimeCapabilities::empty(),
        }
    }

    /// Look up a severity by its numeric code.
    pub fn from_code(code: u32) -> Result<Self, TrapError> {
        Self::VARIANTS
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or(TrapError::UnknownSeverityCode(code))
    }

    /// Look up a severity by name. The `E_` prefix is optional.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let bare = name.strip_prefix("E_").unwrap_or(name);
        Self::VARIANTS
            .into_iter()
            .find(|s| s.name()[2..].eq_ignore_ascii_case(bare))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name table resolved once for a runtime's capabilities.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SeverityClassifier {
    capabilities: RuntimeCapabilities,
    /// Single-bit severities that exist on this runtime.
    available: SeverityMask,
}

impl Default for SeverityClassifier {
    fn default() -> Self {
        Self::for_generation(Generation::default())
    }
}

impl SeverityClassifier {
    /// Resolve the table for an explicit capability set.
    pub fn new(capabilities: RuntimeCapabilities) -> Self {
        let available = Severity::VARIANTS
            .into_iter()
            .filter(|s| *s != Severity::All && capabilities.contains(s.required_capability()))
            .fold(SeverityMask::empty(), |mask, s| mask | s.mask());
        SeverityClassifier {
            capabilities,
            available,
        }
    }

    pub fn for_generation(generation: Generation) -> Self {
        Self::new(generation.capabilities())
    }

    pub fn capabilities(&self) -> RuntimeCapabilities {
        self.capabilities
    }

    /// Union of the severities this runtime can raise.
    pub fn runtime_mask(&self) -> SeverityMask {
        self.available
    }

    /// Whether `severity` is a valid entry on this runtime.
    pub fn is_available(&self, severity: Severity) -> bool {
        severity == Severity::All || self.available.contains(severity.mask())
    }

    /// Display name of `severity`.
    ///
    /// Fails only for conditional severities the runtime lacks; that is a
    /// programming error in the caller, not a test outcome.
    pub fn name_of(&self, severity: Severity) -> Result<&'static str, TrapError> {
        if self.is_available(severity) {
            Ok(severity.name())
        } else {
            Err(TrapError::UnavailableSeverity {
                name: severity.name(),
            })
        }
    }

    /// Display name of a raw numeric code.
    pub fn name_of_code(&self, code: u32) -> Result<&'static str, TrapError> {
        self.name_of(Severity::from_code(code)?)
    }

    /// Severities valid on this runtime, in code order.
    pub fn available(&self) -> impl Iterator<Item = Severity> + '_ {
        Severity::VARIANTS
            .into_iter()
            .filter(move |s| self.is_available(*s))
    }
}

#[cfg(test)]
mod tests;
