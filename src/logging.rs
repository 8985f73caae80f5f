//! Structured log view over a fault chain.
//!
//! # Properties
//!
//! - Borrows from the [`Fault`] with an explicit lifetime and cannot outlive it
//! - Accessors never allocate
//! - `write_to` bounds every text field so a hostile message cannot blow up
//!   log storage
//!
//! The view exists only for the duration of a logging call. Owned message text
//! stays inside the fault and is zeroized when the fault drops.

use crate::{CancellationToken, Fault, FaultKind, LegacyCode};
use std::borrow::Cow;
use std::fmt;

/// Maximum length for any individual field in formatted output
const MAX_FIELD_OUTPUT_LEN: usize = 1024;

/// Truncation indicator appended to truncated strings
const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// Causes written by `write_to` before the rest of the chain is summarized
const MAX_LOGGED_CAUSES: usize = 16;

/// Structured log entry borrowing from a fault.
///
/// # Example
///
/// ```rust
/// # use bcl_faults::{Fault, FaultKind};
/// let err = Fault::with_cause(
///     FaultKind::TypeInitialization,
///     "Audio backend failed.",
///     Fault::new(FaultKind::DllNotFound),
/// );
/// let mut line = String::new();
/// err.log().write_to(&mut line).unwrap();
/// assert!(line.starts_with("[0x80131534] System.TypeInitializationException"));
/// assert!(line.contains("cause[0]=System.DllNotFoundException"));
/// ```
#[derive(Debug)]
pub struct FaultLog<'a> {
    /// Kind of the logged fault.
    pub kind: FaultKind,
    /// Legacy code, overridden or default.
    pub code: LegacyCode,
    /// Composed message, parameter suffix included.
    pub message: &'a str,
    /// Offending parameter, when one was named.
    pub param_name: Option<&'a str>,
    /// Cancellation token carried by the fault.
    pub token: Option<CancellationToken>,
    /// Immediate cause; the rest of the chain is reached through it.
    pub cause: Option<&'a Fault>,
}

impl<'a> FaultLog<'a> {
    /// Format for human-readable logs in trusted debug contexts.
    ///
    /// Materializes the whole chain, untruncated, into a `String`. Only
    /// available with BOTH the `trusted_debug` feature flag AND debug
    /// assertions enabled.
    #[cfg(all(feature = "trusted_debug", debug_assertions))]
    pub fn format_for_trusted_debug(&self) -> String {
        let mut output = format!(
            "[{}] {} ({}) message='{}'",
            self.code,
            self.kind.type_name(),
            self.kind.family(),
            self.message
        );
        if let Some(param) = self.param_name {
            output.push_str(&format!(" param='{}'", param));
        }
        if let Some(token) = self.token {
            output.push_str(&format!(" token={}", token));
        }
        for (i, cause) in self.causes().enumerate() {
            output.push_str(&format!(
                "\n  cause[{}] [{}] {}: {}",
                i,
                cause.code(),
                cause.kind().type_name(),
                cause.message()
            ));
        }
        output
    }

    /// Write structured log data to a formatter without allocating for
    /// fields that fit the output bound.
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "[{}] {} message='{}'",
            self.code,
            self.kind.type_name(),
            truncate_with_indicator(self.message)
        )?;

        if let Some(param) = self.param_name {
            write!(f, " param='{}'", truncate_with_indicator(param))?;
        }

        if let Some(token) = self.token {
            write!(f, " token={}", token)?;
        }

        let mut remaining = 0usize;
        for (i, cause) in self.causes().enumerate() {
            if i >= MAX_LOGGED_CAUSES {
                remaining += 1;
                continue;
            }
            write!(
                f,
                " cause[{}]={}:'{}'",
                i,
                cause.kind().type_name(),
                truncate_with_indicator(cause.message())
            )?;
        }
        if remaining > 0 {
            write!(f, " causes_omitted={}", remaining)?;
        }

        Ok(())
    }

    /// Causes of the logged fault, outermost first.
    pub fn causes(&self) -> impl Iterator<Item = &'a Fault> {
        self.cause.into_iter().flat_map(Fault::chain)
    }

    /// Kind of the logged fault.
    #[inline]
    pub const fn kind(&self) -> FaultKind {
        self.kind
    }

    /// Legacy code of the logged fault.
    #[inline]
    pub const fn code(&self) -> LegacyCode {
        self.code
    }

    /// Untruncated message.
    #[inline]
    pub const fn message(&self) -> &str {
        self.message
    }

    /// Offending parameter name.
    #[inline]
    pub const fn param_name(&self) -> Option<&str> {
        self.param_name
    }

    /// Number of faults in the chain, including the logged one.
    pub fn chain_len(&self) -> usize {
        1 + self.causes().count()
    }
}

impl Fault {
    /// Borrowed structured view for logging.
    pub fn log(&self) -> FaultLog<'_> {
        FaultLog {
            kind: self.kind(),
            code: self.code(),
            message: self.message(),
            param_name: self.param_name(),
            token: self.cancellation_token(),
            cause: self.cause(),
        }
    }

    /// Run `f` with the structured view; the view cannot escape the closure.
    pub fn with_log<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&FaultLog<'_>) -> R,
    {
        f(&self.log())
    }
}

/// Truncate a string for display.
///
/// Strings over `MAX_FIELD_OUTPUT_LEN` bytes are cut at a UTF-8 boundary and
/// marked with an indicator. Returns `Cow` to avoid allocation when nothing
/// is cut.
pub(crate) fn truncate_with_indicator(s: &str) -> Cow<'_, str> {
    if s.len() <= MAX_FIELD_OUTPUT_LEN {
        return Cow::Borrowed(s);
    }

    let max_content_len = MAX_FIELD_OUTPUT_LEN.saturating_sub(TRUNCATION_INDICATOR.len());

    let mut idx = max_content_len;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    if idx == 0 {
        return Cow::Borrowed(TRUNCATION_INDICATOR);
    }

    let mut result = String::with_capacity(idx + TRUNCATION_INDICATOR.len());
    result.push_str(&s[..idx]);
    result.push_str(TRUNCATION_INDICATOR);
    Cow::Owned(result)
}
