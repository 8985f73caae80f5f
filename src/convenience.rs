//! Convenience macros for raising faults and defining the kind table.
//!
//! # Usage
//!
//! ```rust
//! use bcl_faults::{bail, ensure_arg, fault, FaultKind, Result};
//!
//! fn parse_ratio(num: i32, den: i32) -> Result<i32> {
//!     ensure_arg!(num >= 0, "num", "Numerator must be non-negative.");
//!     if den == 0 {
//!         bail!(DivideByZero);
//!     }
//!     Ok(num / den)
//! }
//!
//! let err = parse_ratio(1, 0).unwrap_err();
//! assert!(err.is(FaultKind::Arithmetic));
//!
//! let err = fault!(Format, "Unexpected token '{}' at {}", "}", 7);
//! assert_eq!(err.message(), "Unexpected token '}' at 7");
//! ```

// ============================================================================
// Kind Table Definition
// ============================================================================

#[doc(hidden)]
#[macro_export]
macro_rules! __fault_parent {
    (_) => {
        None
    };
    ($parent:ident) => {
        Some(FaultKind::$parent)
    };
}

/// Define the fault kind enumeration and its static lookup table.
///
/// Each row reads `Kind("Platform.TypeName") => Parent, CODE, "Default message.";`
/// where `Parent` is `_` for the root kind.
///
/// The macro generates `FaultKind` with `ALL`, `COUNT`, `name()`,
/// `type_name()`, `default_code()`, `default_message()` and `parent()`.
#[doc(hidden)]
#[macro_export]
macro_rules! define_fault_kinds {
    (
        $(
            $(#[$meta:meta])*
            $kind:ident ( $type_name:literal ) => $parent:tt , $code:expr , $message:literal
        );+ $(;)?
    ) => {
        /// Discriminant identifying which category of fault a [`Fault`](crate::Fault) represents.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum FaultKind {
            $( $(#[$meta])* $kind, )+
        }

        impl FaultKind {
            /// Every kind, in table order.
            pub const ALL: &'static [FaultKind] = &[ $( FaultKind::$kind, )+ ];

            /// Number of kinds in the table.
            pub const COUNT: usize = Self::ALL.len();

            /// Short kind name (`"DivideByZero"`).
            pub const fn name(self) -> &'static str {
                match self {
                    $( FaultKind::$kind => stringify!($kind), )+
                }
            }

            /// Platform type name (`"System.DivideByZeroException"`).
            pub const fn type_name(self) -> &'static str {
                match self {
                    $( FaultKind::$kind => $type_name, )+
                }
            }

            /// Legacy code every fault of this kind carries by default.
            pub const fn default_code(self) -> $crate::LegacyCode {
                match self {
                    $( FaultKind::$kind => $code, )+
                }
            }

            /// Message used when none is supplied.
            pub const fn default_message(self) -> &'static str {
                match self {
                    $( FaultKind::$kind => $message, )+
                }
            }

            /// Immediate parent in the classification hierarchy.
            pub const fn parent(self) -> Option<FaultKind> {
                match self {
                    $( FaultKind::$kind => $crate::__fault_parent!($parent), )+
                }
            }
        }
    };
}

// ============================================================================
// Fault Creation Macros
// ============================================================================

/// Create a [`Fault`](crate::Fault) of the named kind.
///
/// - `fault!(Kind)`: default message
/// - `fault!(Kind, "literal")`: explicit message
/// - `fault!(Kind, "format {}", args...)`: formatted message
///
/// # Example
///
/// ```rust
/// # use bcl_faults::{fault, FaultKind};
/// let err = fault!(Timeout);
/// assert_eq!(err.kind(), FaultKind::Timeout);
/// assert_eq!(err.message(), "The operation has timed out.");
/// ```
#[macro_export]
macro_rules! fault {
    ($kind:ident) => {
        $crate::Fault::new($crate::FaultKind::$kind)
    };
    ($kind:ident, $msg:literal) => {
        $crate::Fault::with_message($crate::FaultKind::$kind, $msg)
    };
    ($kind:ident, $fmt:literal, $($arg:tt)+) => {
        $crate::Fault::with_message($crate::FaultKind::$kind, format!($fmt, $($arg)+))
    };
}

/// Return early with a fault built by [`fault!`].
#[macro_export]
macro_rules! bail {
    ($($tokens:tt)+) => {
        return Err($crate::fault!($($tokens)+).into())
    };
}

/// Return early with an `Argument` fault naming `param` when `cond` is false.
///
/// # Example
///
/// ```rust
/// # use bcl_faults::{ensure_arg, Result};
/// fn set_volume(level: u8) -> Result<()> {
///     ensure_arg!(level <= 100, "level");
///     Ok(())
/// }
///
/// let err = set_volume(120).unwrap_err();
/// assert_eq!(err.param_name(), Some("level"));
/// ```
#[macro_export]
macro_rules! ensure_arg {
    ($cond:expr, $param:literal) => {
        if !$cond {
            return Err($crate::Fault::for_param($crate::FaultKind::Argument, $param).into());
        }
    };
    ($cond:expr, $param:literal, $msg:literal) => {
        if !$cond {
            return Err($crate::Fault::for_param_with_message(
                $crate::FaultKind::Argument,
                $param,
                $msg,
            )
            .into());
        }
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use crate::{Fault, FaultKind, Result};

    fn checked_divide(a: i32, b: i32) -> Result<i32> {
        if b == 0 {
            bail!(DivideByZero);
        }
        a.checked_div(b)
            .ok_or_else(|| fault!(Overflow, "{} / {} does not fit", a, b))
    }

    fn scale(factor: i32) -> Result<i32> {
        ensure_arg!(factor > 0, "factor", "Factor must be positive.");
        Ok(factor * 2)
    }

    #[test]
    fn fault_macro_shapes() {
        assert_eq!(fault!(Rank).message(), FaultKind::Rank.default_message());
        assert_eq!(fault!(Format, "bad").message(), "bad");
        assert_eq!(fault!(Format, "bad {}", 3).message(), "bad 3");
    }

    #[test]
    fn bail_returns_early() {
        let err = checked_divide(4, 0).unwrap_err();
        assert_eq!(err.kind(), FaultKind::DivideByZero);

        let err = checked_divide(i32::MIN, -1).unwrap_err();
        assert_eq!(err.kind(), FaultKind::Overflow);
        assert_eq!(err.message(), "-2147483648 / -1 does not fit");

        assert_eq!(checked_divide(9, 3).unwrap(), 3);
    }

    #[test]
    fn ensure_arg_interpolates_param() {
        let err: Fault = scale(0).unwrap_err();
        assert_eq!(err.kind(), FaultKind::Argument);
        assert_eq!(err.message(), "Factor must be positive. (Parameter 'factor')");
        assert_eq!(scale(2).unwrap(), 4);
    }
}
