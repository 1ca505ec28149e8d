//! Runtime configuration loaded from the environment.
//!
//! | Variable             | Meaning                               | Default   |
//! |----------------------|---------------------------------------|-----------|
//! | `ERRTRAP_REPORTING`  | reporting mask, number or expression  | `E_ALL`   |
//! | `ERRTRAP_LOG_ERRORS` | write genuine errors to the error log | off       |
//! | `ERRTRAP_GENERATION` | `legacy`, `recoverable`, `current`    | `current` |
//!
//! Mask expressions use the classic operators, `|` binding looser than `&`:
//! `E_ALL & ~E_NOTICE | E_STRICT`.

use std::iter::Peekable;
use std::str::CharIndices;

use errtrap_core::{Generation, Severity, SeverityMask};

pub const REPORTING_VAR: &str = "ERRTRAP_REPORTING";
pub const LOG_ERRORS_VAR: &str = "ERRTRAP_LOG_ERRORS";
pub const GENERATION_VAR: &str = "ERRTRAP_GENERATION";

/// Error raised while loading configuration.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("unknown severity name {0:?}")]
    UnknownSeverity(String),
    #[error("malformed reporting mask {expr:?}: {reason}")]
    MalformedMask { expr: String, reason: String },
}

/// Ambient reporting settings for an [`crate::ExecutionContext`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TrapConfig {
    pub reporting_mask: SeverityMask,
    pub log_errors: bool,
    pub generation: Generation,
}

impl Default for TrapConfig {
    fn default() -> Self {
        TrapConfig {
            reporting_mask: SeverityMask::ALL,
            log_errors: false,
            generation: Generation::default(),
        }
    }
}

impl TrapConfig {
    /// Read the process environment. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = TrapConfig::default();
        if let Some(value) = lookup(REPORTING_VAR) {
            config.reporting_mask = parse_mask(&value)?;
        }
        if let Some(value) = lookup(LOG_ERRORS_VAR) {
            config.log_errors = parse_bool(LOG_ERRORS_VAR, &value)?;
        }
        if let Some(value) = lookup(GENERATION_VAR) {
            config.generation = value
                .parse()
                .map_err(|reason| ConfigError::InvalidValue {
                    key: GENERATION_VAR,
                    value: value.clone(),
                    reason,
                })?;
        }
        tracing::debug!(
            mask = config.reporting_mask.bits(),
            log_errors = config.log_errors,
            generation = config.generation.as_str(),
            "loaded trap configuration"
        );
        Ok(config)
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Ok(true),
        "0" | "off" | "false" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "expected on/off".to_string(),
        }),
    }
}

/// Parse a reporting-mask expression.
///
/// Accepts decimal or `0x` numbers, severity names (`E_` optional), `~`,
/// `&`, `|`, and parentheses. Bits outside [`SeverityMask::ALL`] are dropped.
pub fn parse_mask(expr: &str) -> Result<SeverityMask, ConfigError> {
    let mut parser = MaskParser {
        expr,
        chars: expr.char_indices().peekable(),
    };
    let mask = parser.or_expr()?;
    parser.skip_whitespace();
    match parser.chars.peek().map(|&(_, c)| c) {
        None => Ok(mask),
        Some(c) => Err(parser.malformed(format!("unexpected {c:?}"))),
    }
}

struct MaskParser<'a> {
    expr: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl MaskParser<'_> {
    fn or_expr(&mut self) -> Result<SeverityMask, ConfigError> {
        let mut mask = self.and_expr()?;
        while self.eat('|') {
            mask |= self.and_expr()?;
        }
        Ok(mask)
    }

    fn and_expr(&mut self) -> Result<SeverityMask, ConfigError> {
        let mut mask = self.unary()?;
        while self.eat('&') {
            mask &= self.unary()?;
        }
        Ok(mask)
    }

    fn unary(&mut self) -> Result<SeverityMask, ConfigError> {
        if self.eat('~') {
            return Ok(self.unary()?.complement());
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<SeverityMask, ConfigError> {
        self.skip_whitespace();
        let Some(&(start, c)) = self.chars.peek() else {
            return Err(self.malformed("unexpected end of expression".to_string()));
        };
        if c == '(' {
            self.chars.next();
            let mask = self.or_expr()?;
            if !self.eat(')') {
                return Err(self.malformed("missing ')'".to_string()));
            }
            return Ok(mask);
        }
        if !(c.is_ascii_alphanumeric() || c == '_') {
            return Err(self.malformed(format!("unexpected {c:?}")));
        }

        let mut end = start;
        while let Some(&(i, c)) = self.chars.peek() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            end = i + c.len_utf8();
            self.chars.next();
        }
        let word = &self.expr[start..end];
        if c.is_ascii_digit() {
            self.number(word)
        } else {
            Severity::from_name(word)
                .map(Severity::mask)
                .ok_or_else(|| ConfigError::UnknownSeverity(word.to_string()))
        }
    }

    fn number(&self, word: &str) -> Result<SeverityMask, ConfigError> {
        let parsed = match word.strip_prefix("0x").or_else(|| word.strip_prefix("0X")) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => word.parse(),
        };
        parsed
            .map(SeverityMask::from_bits_truncate)
            .map_err(|e| self.malformed(format!("bad number {word:?}: {e}")))
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.chars.peek().is_some_and(|&(_, c)| c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|(_, c)| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn malformed(&self, reason: String) -> ConfigError {
        ConfigError::MalformedMask {
            expr: self.expr.to_string(),
            reason,
        }
    }
}
