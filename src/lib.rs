//! # BCL Faults
//!
//! The base-class-library fault taxonomy a scripting shim exposes to game
//! code, plus the handful of small utility types that travel with it.
//!
//! ## Design
//!
//! 1. **One value type for every fault**: [`Fault`] pairs a kind, a message,
//!    an optional owned cause and a legacy code
//! 2. **The hierarchy is data**: [`FaultKind`] names its parent in a static
//!    table; handlers match by [`KindSet`] membership instead of inheritance
//! 3. **Codes are compatibility surface**: each kind carries the platform's
//!    signed 32-bit code, reproduced exactly ([`codes`])
//! 4. **Faults never change after construction**; owned message text is
//!    zeroized when the fault drops
//!
//! ## Quick Start
//!
//! ```rust
//! use bcl_faults::{Fault, FaultKind, Result, ResultExt};
//!
//! fn average(total: i64, count: i64) -> Result<i64> {
//!     if count == 0 {
//!         return Err(Fault::new(FaultKind::DivideByZero));
//!     }
//!     Ok(total / count)
//! }
//!
//! // A handler registered for Arithmetic also catches DivideByZero.
//! let value = average(10, 0).catch(FaultKind::Arithmetic, |_| Ok(0)).unwrap();
//! assert_eq!(value, 0);
//!
//! // Anything else propagates untouched.
//! let err = Err::<i64, _>(Fault::new(FaultKind::Format))
//!     .catch(FaultKind::Arithmetic, |_| Ok(0))
//!     .unwrap_err();
//! assert_eq!(err.kind(), FaultKind::Format);
//! ```
//!
//! ## Construction shapes
//!
//! ```rust
//! use bcl_faults::{Fault, FaultKind};
//!
//! let plain = Fault::new(FaultKind::Timeout);
//! assert_eq!(plain.message(), "The operation has timed out.");
//!
//! let param = Fault::for_param(FaultKind::ArgumentNull, "texture");
//! assert_eq!(param.message(), "Value cannot be null. (Parameter 'texture')");
//!
//! let wrapped = Fault::with_cause(FaultKind::TypeInitialization, "Loader failed.", plain);
//! assert_eq!(wrapped.cause().map(Fault::kind), Some(FaultKind::Timeout));
//! ```
//!
//! ## Process boundary
//!
//! Faults that escape every handler go to an [`UnhandledFaultReporter`],
//! which journals them in a bounded [`FaultJournal`] and notifies
//! subscribers. Chains can be persisted as flat [`FaultRecord`] lines.
//!
//! ## Utility types
//!
//! [`ApplicationIdentity`], [`CharEnumerator`], [`ConsoleCancelEventArgs`]
//! with the [`CancelKeyPress`] registry, and [`LocalDataSlot`] handles issued
//! by a [`LocalDataStoreManager`].
//!
//! ## Features
//!
//! - `trusted_debug`: enable `FaultLog::format_for_trusted_debug` (debug builds only)

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::result;
use zeroize::Zeroize;

pub mod char_enumerator;
pub mod codes;
pub mod context;
pub mod convenience;
pub mod data_slots;
pub mod definitions;
pub mod events;
pub mod identity;
pub mod logging;
pub mod models;
pub mod records;
pub mod ring_buffer;

pub use char_enumerator::*;
pub use codes::{Facility, LegacyCode};
pub use context::*;
pub use data_slots::*;
pub use definitions::*;
pub use events::*;
pub use identity::*;
pub use logging::*;
pub use models::*;
pub use records::*;
pub use ring_buffer::*;

/// Type alias for Results using the fault type.
pub type Result<T> = result::Result<T, Fault>;

// ============================================================================
// Fault Context (message text, zeroized on drop)
// ============================================================================

#[derive(Clone, PartialEq, Eq)]
struct FaultContext {
    message: Cow<'static, str>,
    param_name: Option<Cow<'static, str>>,
}

impl FaultContext {
    /// Apply the message rules: empty or absent text falls back to the kind's
    /// default, and a parameter name is appended as ` (Parameter 'name')`.
    fn compose(
        kind: FaultKind,
        message: Option<Cow<'static, str>>,
        param_name: Option<Cow<'static, str>>,
    ) -> Self {
        let base = match message {
            Some(text) if !text.is_empty() => text,
            _ => Cow::Borrowed(kind.default_message()),
        };
        let param_name = param_name.filter(|name| !name.is_empty());
        let message = match &param_name {
            Some(name) => Cow::Owned(format!("{} (Parameter '{}')", base, name)),
            None => base,
        };
        Self {
            message,
            param_name,
        }
    }
}

impl Zeroize for FaultContext {
    fn zeroize(&mut self) {
        if let Cow::Owned(ref mut s) = self.message {
            s.zeroize();
        }
        if let Some(Cow::Owned(ref mut s)) = self.param_name {
            s.zeroize();
        }
    }
}

impl Drop for FaultContext {
    fn drop(&mut self) {
        self.zeroize();
    }
}

// ============================================================================
// Fault
// ============================================================================

/// An immutable fault: kind, message, optional cause and legacy code.
///
/// # Invariants
///
/// - `message()` is never empty
/// - the cause chain is finite and acyclic; each fault owns its cause
/// - `code()` equals `kind().default_code()` unless the kind accepts an
///   override and one was given at construction
/// - nothing changes after construction
///
/// Faults are `Send + Sync` and may be shared for reading across threads.
#[must_use = "faults should be propagated or handled"]
pub struct Fault {
    kind: FaultKind,
    code: LegacyCode,
    context: FaultContext,
    cause: Option<Box<Fault>>,
    token: Option<CancellationToken>,
}

impl Fault {
    pub(crate) fn from_parts(
        kind: FaultKind,
        message: Option<Cow<'static, str>>,
        param_name: Option<Cow<'static, str>>,
        cause: Option<Fault>,
        code: Option<LegacyCode>,
        token: Option<CancellationToken>,
    ) -> Self {
        let code = match code {
            Some(code) if kind.accepts_code_override() => code,
            _ => kind.default_code(),
        };
        Self {
            kind,
            code,
            context: FaultContext::compose(kind, message, param_name),
            cause: cause.map(Box::new),
            token,
        }
    }

    /// Default message, no cause.
    #[inline]
    pub fn new(kind: FaultKind) -> Self {
        Self::from_parts(kind, None, None, None, None, None)
    }

    /// Explicit message, no cause.
    #[inline]
    pub fn with_message(kind: FaultKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self::from_parts(kind, Some(message.into()), None, None, None, None)
    }

    /// Explicit message wrapping a prior fault.
    #[inline]
    pub fn with_cause(
        kind: FaultKind,
        message: impl Into<Cow<'static, str>>,
        cause: Fault,
    ) -> Self {
        Self::from_parts(kind, Some(message.into()), None, Some(cause), None, None)
    }

    /// Default message annotated with the offending parameter.
    #[inline]
    pub fn for_param(kind: FaultKind, param_name: impl Into<Cow<'static, str>>) -> Self {
        Self::from_parts(kind, None, Some(param_name.into()), None, None, None)
    }

    /// Explicit message annotated with the offending parameter.
    #[inline]
    pub fn for_param_with_message(
        kind: FaultKind,
        param_name: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::from_parts(
            kind,
            Some(message.into()),
            Some(param_name.into()),
            None,
            None,
            None,
        )
    }

    /// Explicit message and code.
    ///
    /// The code is honoured only for `InvalidCast` and `ContextMarshal`;
    /// other kinds keep their default code.
    #[inline]
    pub fn with_code(
        kind: FaultKind,
        message: impl Into<Cow<'static, str>>,
        code: LegacyCode,
    ) -> Self {
        Self::from_parts(kind, Some(message.into()), None, None, Some(code), None)
    }

    // Kind-specific shorthands.

    /// `ArgumentNull` for the named parameter.
    #[inline]
    pub fn argument_null(param_name: impl Into<Cow<'static, str>>) -> Self {
        Self::for_param(FaultKind::ArgumentNull, param_name)
    }

    /// `ArgumentOutOfRange` for the named parameter.
    #[inline]
    pub fn argument_out_of_range(
        param_name: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::for_param_with_message(FaultKind::ArgumentOutOfRange, param_name, message)
    }

    /// `InvalidOperation` with a message describing the bad state.
    #[inline]
    pub fn invalid_operation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_message(FaultKind::InvalidOperation, message)
    }

    /// `ObjectDisposed` naming the disposed object.
    pub fn object_disposed(object_name: &str) -> Self {
        let kind = FaultKind::ObjectDisposed;
        if object_name.is_empty() {
            return Self::new(kind);
        }
        Self::with_message(
            kind,
            format!("{}\nObject name: '{}'.", kind.default_message(), object_name),
        )
    }

    /// `OperationCanceled` carrying the token that triggered it.
    #[inline]
    pub fn operation_canceled(token: CancellationToken) -> Self {
        Self::from_parts(FaultKind::OperationCanceled, None, None, None, None, Some(token))
    }

    /// `NotImplemented` with the default message.
    #[inline]
    pub fn not_implemented() -> Self {
        Self::new(FaultKind::NotImplemented)
    }

    /// `NotSupported` with an explicit message.
    #[inline]
    pub fn not_supported(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_message(FaultKind::NotSupported, message)
    }

    /// `InvalidCast` with an explicit code.
    #[inline]
    pub fn invalid_cast_with_code(
        message: impl Into<Cow<'static, str>>,
        code: LegacyCode,
    ) -> Self {
        Self::with_code(FaultKind::InvalidCast, message, code)
    }

    /// `ContextMarshal` with an explicit code.
    #[inline]
    pub fn context_marshal_with_code(
        message: impl Into<Cow<'static, str>>,
        code: LegacyCode,
    ) -> Self {
        Self::with_code(FaultKind::ContextMarshal, message, code)
    }

    // Accessors.

    /// Kind discriminant.
    #[inline]
    pub const fn kind(&self) -> FaultKind {
        self.kind
    }

    /// Legacy classification code.
    #[inline]
    pub const fn code(&self) -> LegacyCode {
        self.code
    }

    /// Message text (never empty).
    #[inline]
    pub fn message(&self) -> &str {
        self.context.message.as_ref()
    }

    /// Offending parameter, when one was named.
    #[inline]
    pub fn param_name(&self) -> Option<&str> {
        self.context.param_name.as_deref()
    }

    /// Wrapped prior fault.
    #[inline]
    pub fn cause(&self) -> Option<&Fault> {
        self.cause.as_deref()
    }

    /// Consume the fault, returning its cause.
    #[inline]
    pub fn into_cause(mut self) -> Option<Fault> {
        self.cause.take().map(|cause| *cause)
    }

    /// Cancellation token payload (`OperationCanceled` only, by convention).
    #[inline]
    pub const fn cancellation_token(&self) -> Option<CancellationToken> {
        self.token
    }

    /// Whether the code differs from the kind's default.
    #[inline]
    pub fn has_overridden_code(&self) -> bool {
        self.code != self.kind.default_code()
    }

    /// This fault followed by each cause, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &Fault> {
        std::iter::successors(Some(self), |fault| fault.cause.as_deref())
    }

    /// Innermost fault of the chain (`self` when there is no cause).
    pub fn root_cause(&self) -> &Fault {
        let mut current = self;
        while let Some(cause) = current.cause() {
            current = cause;
        }
        current
    }

    /// Whether a handler registered for `kind` would catch this fault.
    #[inline]
    pub const fn is(&self, kind: FaultKind) -> bool {
        self.kind.is_a(kind)
    }

    /// Whether this fault's kind is a member of `handlers`.
    #[inline]
    pub const fn caught_by(&self, handlers: KindSet) -> bool {
        handlers.contains(self.kind)
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault")
            .field("kind", &self.kind)
            .field("code", &format_args!("{}", self.code))
            .field("message", &self.message())
            .field("param_name", &self.param_name())
            .field("token", &self.token)
            .field("cause", &self.cause().map(Fault::kind))
            .field("chain_len", &self.chain().count())
            .finish()
    }
}

// Clone, equality and drop walk the cause chain in a loop so that chains
// rebuilt from long record lists never recurse once per link.

impl Fault {
    /// This fault's own fields, without its cause.
    fn detached(&self) -> Self {
        Self {
            kind: self.kind,
            code: self.code,
            context: self.context.clone(),
            cause: None,
            token: self.token,
        }
    }

    fn same_link(&self, other: &Fault) -> bool {
        self.kind == other.kind
            && self.code == other.code
            && self.token == other.token
            && self.context == other.context
    }
}

impl Clone for Fault {
    fn clone(&self) -> Self {
        let mut links: Vec<Fault> = self.chain().map(Fault::detached).collect();
        let mut outer: Option<Box<Fault>> = None;
        while let Some(mut link) = links.pop() {
            link.cause = outer;
            outer = Some(Box::new(link));
        }
        match outer {
            Some(fault) => *fault,
            None => self.detached(),
        }
    }
}

impl PartialEq for Fault {
    fn eq(&self, other: &Self) -> bool {
        let mut left = self.chain();
        let mut right = other.chain();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return true,
                (Some(a), Some(b)) if a.same_link(b) => {}
                _ => return false,
            }
        }
    }
}

impl Eq for Fault {}

impl Drop for Fault {
    fn drop(&mut self) {
        let mut next = self.cause.take();
        while let Some(mut link) = next {
            next = link.cause.take();
        }
    }
}

impl fmt::Display for Fault {
    /// Format: `"{TypeName}: {message}"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.type_name(), self.message())
    }
}

impl Error for Fault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn Error + 'static))
    }
}

impl From<FaultKind> for Fault {
    fn from(kind: FaultKind) -> Self {
        Self::new(kind)
    }
}

// ============================================================================
// Argument Checks
// ============================================================================

/// Require a non-empty string argument.
///
/// An empty value yields an `ArgumentNull` fault naming `param_name`. The
/// Argument-family constructors never validate their own inputs, so raising
/// this fault cannot recurse.
#[inline]
pub fn require_arg<'a>(value: &'a str, param_name: &'static str) -> Result<&'a str> {
    if value.is_empty() {
        Err(Fault::argument_null(param_name))
    } else {
        Ok(value)
    }
}

// ============================================================================
// Propagation Helpers
// ============================================================================

/// Handler-style combinators on `Result<T, Fault>`.
///
/// Faults propagate unchanged until a handler's kind set matches; nothing is
/// retried automatically.
pub trait ResultExt<T> {
    /// Handle a fault whose kind is in `handlers` (a [`FaultKind`] converts to
    /// the set of it and its descendants). Other faults pass through.
    fn catch<F>(self, handlers: impl Into<KindSet>, handler: F) -> Result<T>
    where
        F: FnOnce(Fault) -> Result<T>;

    /// Wrap any fault as the cause of a new fault of `kind`.
    fn wrap(self, kind: FaultKind, message: impl Into<Cow<'static, str>>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn catch<F>(self, handlers: impl Into<KindSet>, handler: F) -> Result<T>
    where
        F: FnOnce(Fault) -> Result<T>,
    {
        match self {
            Err(fault) if fault.caught_by(handlers.into()) => handler(fault),
            other => other,
        }
    }

    fn wrap(self, kind: FaultKind, message: impl Into<Cow<'static, str>>) -> Result<T> {
        self.map_err(|cause| Fault::with_cause(kind, message, cause))
    }
}
