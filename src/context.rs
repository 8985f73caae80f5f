//! Builder for faults that need more than one optional field.
//!
//! The platform offered three or four constructor overloads per kind. They
//! collapse into the shapes on [`Fault`] plus this builder, which covers
//! every combination (message, parameter name, cause, override code, token)
//! without a combinatorial set of functions.
//!
//! # Example
//!
//! ```rust
//! use bcl_faults::{CancellationToken, Fault, FaultBuilder, FaultKind};
//!
//! let err = FaultBuilder::new(FaultKind::OperationCanceled)
//!     .message("Level streaming aborted.")
//!     .token(CancellationToken::new(42))
//!     .cause(Fault::new(FaultKind::Timeout))
//!     .build();
//!
//! assert_eq!(err.cancellation_token(), Some(CancellationToken::new(42)));
//! assert_eq!(err.cause().map(Fault::kind), Some(FaultKind::Timeout));
//! ```

use crate::{Fault, FaultKind, LegacyCode};
use std::borrow::Cow;
use std::fmt;

// ============================================================================
// Cancellation Token
// ============================================================================

/// Opaque cancellation token carried by `OperationCanceled` faults.
///
/// Pure payload: the token has no behaviour of its own and is only compared
/// and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CancellationToken(u64);

impl CancellationToken {
    /// The token that is never signalled.
    pub const NONE: Self = Self(0);

    /// Wrap a raw token identifier.
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw identifier.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token#{}", self.0)
    }
}

// ============================================================================
// Fault Builder
// ============================================================================

/// Step-by-step fault construction.
///
/// Every setter may be called at most once in debug builds; a second call is
/// a programming error and trips a debug assertion.
#[must_use = "a builder does nothing until build() is called"]
pub struct FaultBuilder {
    kind: FaultKind,
    message: Option<Cow<'static, str>>,
    param_name: Option<Cow<'static, str>>,
    cause: Option<Fault>,
    code: Option<LegacyCode>,
    token: Option<CancellationToken>,
}

impl FaultBuilder {
    /// Start a fault of the given kind.
    #[inline]
    pub fn new(kind: FaultKind) -> Self {
        Self {
            kind,
            message: None,
            param_name: None,
            cause: None,
            code: None,
            token: None,
        }
    }

    /// Replace the default message.
    #[inline]
    pub fn message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        debug_assert!(self.message.is_none(), "FaultBuilder: message already set");
        self.message = Some(message.into());
        self
    }

    /// Name the offending parameter; it is interpolated into the message.
    #[inline]
    pub fn param(mut self, param_name: impl Into<Cow<'static, str>>) -> Self {
        debug_assert!(self.param_name.is_none(), "FaultBuilder: param already set");
        self.param_name = Some(param_name.into());
        self
    }

    /// Wrap a prior fault as the cause.
    #[inline]
    pub fn cause(mut self, cause: Fault) -> Self {
        debug_assert!(self.cause.is_none(), "FaultBuilder: cause already set");
        self.cause = Some(cause);
        self
    }

    /// Request an explicit legacy code.
    ///
    /// Honoured only for kinds where [`FaultKind::accepts_code_override`]
    /// holds; every other kind keeps its default code.
    #[inline]
    pub fn code(mut self, code: LegacyCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Attach a cancellation token payload.
    #[inline]
    pub fn token(mut self, token: CancellationToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Produce the fault. Construction never fails.
    pub fn build(self) -> Fault {
        Fault::from_parts(
            self.kind,
            self.message,
            self.param_name,
            self.cause,
            self.code,
            self.token,
        )
    }
}

impl From<FaultBuilder> for Fault {
    fn from(builder: FaultBuilder) -> Self {
        builder.build()
    }
}

// ============================================================================
// Tests
// ============================================================================
