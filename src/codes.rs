//! Legacy classification codes - the only artifact that outlives a fault.
//!
//! Every fault kind carries a signed 32-bit code inherited from the platform
//! the shim imitates. Game code, crash reporters and log scrapers key off these
//! numbers, so they are reproduced bit-for-bit and never derived at runtime.
//!
//! # Layout
//!
//! Codes follow the HRESULT bit layout:
//!
//! ```text
//!  31  30..29  28..16     15..0
//! [S] [ R  ] [facility] [ code ]
//! ```
//!
//! - **S**: severity, set for every failure code in this crate
//! - **facility**: which subsystem minted the code (runtime, Win32, dispatch...)
//! - **code**: subsystem-local number
//!
//! # Example
//!
//! ```rust
//! use bcl_faults::{codes, Facility};
//!
//! assert_eq!(codes::COR_E_ARITHMETIC.value(), -2147024362);
//! assert_eq!(codes::COR_E_ARITHMETIC.facility(), Facility::Win32);
//! assert_eq!(codes::COR_E_ARITHMETIC.to_string(), "0x80070216");
//! ```

use std::fmt;

// ============================================================================
// Legacy Code (Primary Identity Type)
// ============================================================================

/// Signed 32-bit legacy classification code.
///
/// Stored exactly as the platform stores it (a signed integer); the unsigned
/// HRESULT view is available through [`LegacyCode::bits`].
///
/// # Copy Semantics
///
/// A code is a plain integer tag. Copying it carries no governance risk, so
/// the type is `Copy` and is passed by value everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LegacyCode(i32);

impl LegacyCode {
    /// Build a code from its unsigned HRESULT bit pattern.
    #[inline]
    pub const fn from_hresult(bits: u32) -> Self {
        Self(bits as i32)
    }

    /// Build a code from its signed representation.
    #[inline]
    pub const fn from_value(value: i32) -> Self {
        Self(value)
    }

    /// Signed value, as written to logs by the platform.
    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Unsigned HRESULT bit pattern.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0 as u32
    }

    /// Whether the severity bit marks this code as a failure.
    #[inline]
    pub const fn is_failure(self) -> bool {
        self.0 < 0
    }

    /// Raw 13-bit facility field.
    #[inline]
    pub const fn facility_bits(self) -> u16 {
        ((self.bits() >> 16) & 0x1FFF) as u16
    }

    /// Subsystem that minted this code.
    #[inline]
    pub const fn facility(self) -> Facility {
        Facility::from_bits(self.facility_bits())
    }

    /// Subsystem-local code number (low 16 bits).
    #[inline]
    pub const fn local_code(self) -> u16 {
        (self.bits() & 0xFFFF) as u16
    }
}

impl fmt::Display for LegacyCode {
    /// Writes `0x80131500` form directly to the formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010X}", self.bits())
    }
}

impl From<LegacyCode> for i32 {
    fn from(code: LegacyCode) -> Self {
        code.value()
    }
}

impl From<i32> for LegacyCode {
    fn from(value: i32) -> Self {
        Self::from_value(value)
    }
}

// ============================================================================
// Facility Classification
// ============================================================================

/// Facility field of a legacy code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facility {
    /// Generic COM codes (`E_POINTER`, `E_NOTIMPL`, ...).
    Null,
    /// OLE automation dispatch codes.
    Dispatch,
    /// Codes wrapping a Win32 error number.
    Win32,
    /// Managed runtime codes (`COR_E_*`).
    Runtime,
    /// Any facility this crate does not name.
    Other(u16),
}

impl Facility {
    /// Classify a raw facility field.
    pub const fn from_bits(bits: u16) -> Self {
        match bits {
            0x0 => Self::Null,
            0x2 => Self::Dispatch,
            0x7 => Self::Win32,
            0x13 => Self::Runtime,
            other => Self::Other(other),
        }
    }

    /// Human-readable facility label for log output.
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Dispatch => "Dispatch",
            Self::Win32 => "Win32",
            Self::Runtime => "Runtime",
            Self::Other(_) => "Other",
        }
    }
}

// ============================================================================
// Code Table
// ============================================================================
//
// Values are the platform's published constants. Two kinds share E_POINTER
// (ArgumentNull and NullReference); that duplication is inherited, not a typo.

/// Root exception.
pub const COR_E_EXCEPTION: LegacyCode = LegacyCode::from_hresult(0x8013_1500);
/// Runtime-raised faults.
pub const COR_E_SYSTEM: LegacyCode = LegacyCode::from_hresult(0x8013_1501);
/// Application-raised faults.
pub const COR_E_APPLICATION: LegacyCode = LegacyCode::from_hresult(0x8013_1600);

/// Invalid argument (`E_INVALIDARG`).
pub const COR_E_ARGUMENT: LegacyCode = LegacyCode::from_hresult(0x8007_0057);
/// Null pointer; shared by ArgumentNull and NullReference.
pub const E_POINTER: LegacyCode = LegacyCode::from_hresult(0x8000_4003);
/// Argument outside its valid range.
pub const COR_E_ARGUMENTOUTOFRANGE: LegacyCode = LegacyCode::from_hresult(0x8013_1502);
/// Same wait handle passed twice.
pub const COR_E_DUPLICATEWAITOBJECT: LegacyCode = LegacyCode::from_hresult(0x8013_1529);

/// Arithmetic failure.
pub const COR_E_ARITHMETIC: LegacyCode = LegacyCode::from_hresult(0x8007_0216);
/// Division by zero.
pub const COR_E_DIVIDEBYZERO: LegacyCode = LegacyCode::from_hresult(0x8002_0012);
/// Checked arithmetic overflow.
pub const COR_E_OVERFLOW: LegacyCode = LegacyCode::from_hresult(0x8013_1516);
/// NaN or infinity where a finite number was required.
pub const COR_E_NOTFINITENUMBER: LegacyCode = LegacyCode::from_hresult(0x8013_1528);

/// Array element stored with an incompatible type.
pub const COR_E_ARRAYTYPEMISMATCH: LegacyCode = LegacyCode::from_hresult(0x8013_1503);
/// Object marshalled across a context boundary.
pub const COR_E_CONTEXTMARSHAL: LegacyCode = LegacyCode::from_hresult(0x8013_1504);
/// Operation timed out.
pub const COR_E_TIMEOUT: LegacyCode = LegacyCode::from_hresult(0x8013_1505);
/// Internal runtime failure.
pub const COR_E_EXECUTIONENGINE: LegacyCode = LegacyCode::from_hresult(0x8013_1506);
/// Array index outside bounds.
pub const COR_E_INDEXOUTOFRANGE: LegacyCode = LegacyCode::from_hresult(0x8013_1508);
/// Call invalid for the object's current state.
pub const COR_E_INVALIDOPERATION: LegacyCode = LegacyCode::from_hresult(0x8013_1509);
/// Object used after disposal.
pub const COR_E_OBJECTDISPOSED: LegacyCode = LegacyCode::from_hresult(0x8013_1622);

/// Member access failure.
pub const COR_E_MEMBERACCESS: LegacyCode = LegacyCode::from_hresult(0x8013_151A);
/// Inaccessible field.
pub const COR_E_FIELDACCESS: LegacyCode = LegacyCode::from_hresult(0x8013_1507);
/// Inaccessible method.
pub const COR_E_METHODACCESS: LegacyCode = LegacyCode::from_hresult(0x8013_1510);
/// Missing member.
pub const COR_E_MISSINGMEMBER: LegacyCode = LegacyCode::from_hresult(0x8013_1512);
/// Missing field.
pub const COR_E_MISSINGFIELD: LegacyCode = LegacyCode::from_hresult(0x8013_1511);
/// Missing method.
pub const COR_E_MISSINGMETHOD: LegacyCode = LegacyCode::from_hresult(0x8013_1513);

/// Multiple callbacks added to a single-cast delegate.
pub const COR_E_MULTICASTNOTSUPPORTED: LegacyCode = LegacyCode::from_hresult(0x8013_1514);
/// Unsupported operation.
pub const COR_E_NOTSUPPORTED: LegacyCode = LegacyCode::from_hresult(0x8013_1515);
/// Operation unsupported on the current platform.
pub const COR_E_PLATFORMNOTSUPPORTED: LegacyCode = LegacyCode::from_hresult(0x8013_1539);
/// Wrong array rank.
pub const COR_E_RANK: LegacyCode = LegacyCode::from_hresult(0x8013_1517);
/// Monitor method called outside a synchronized block.
pub const COR_E_SYNCHRONIZATIONLOCK: LegacyCode = LegacyCode::from_hresult(0x8013_1518);

/// Type failed to load.
pub const COR_E_TYPELOAD: LegacyCode = LegacyCode::from_hresult(0x8013_1522);
/// Native entry point not found.
pub const COR_E_ENTRYPOINTNOTFOUND: LegacyCode = LegacyCode::from_hresult(0x8013_1523);
/// Native library not found.
pub const COR_E_DLLNOTFOUND: LegacyCode = LegacyCode::from_hresult(0x8013_1524);
/// Inaccessible type.
pub const COR_E_TYPEACCESS: LegacyCode = LegacyCode::from_hresult(0x8013_1543);
/// Type initializer failed.
pub const COR_E_TYPEINITIALIZATION: LegacyCode = LegacyCode::from_hresult(0x8013_1534);
/// Type already unloaded.
pub const COR_E_TYPEUNLOADED: LegacyCode = LegacyCode::from_hresult(0x8013_1013);
/// Access to an unloaded application domain.
pub const COR_E_APPDOMAINUNLOADED: LegacyCode = LegacyCode::from_hresult(0x8013_1014);
/// Application domain unload failed.
pub const COR_E_CANNOTUNLOADAPPDOMAIN: LegacyCode = LegacyCode::from_hresult(0x8013_1015);

/// Malformed input text.
pub const COR_E_FORMAT: LegacyCode = LegacyCode::from_hresult(0x8013_1537);
/// Invalid intermediate code.
pub const COR_E_INVALIDPROGRAM: LegacyCode = LegacyCode::from_hresult(0x8013_153A);
/// Operation cancelled through a token.
pub const COR_E_OPERATIONCANCELED: LegacyCode = LegacyCode::from_hresult(0x8013_153B);
/// Dictionary key missing.
pub const COR_E_KEYNOTFOUND: LegacyCode = LegacyCode::from_hresult(0x8013_1577);
/// Not enough stack left to continue safely.
pub const COR_E_INSUFFICIENTEXECUTIONSTACK: LegacyCode = LegacyCode::from_hresult(0x8013_1578);

/// Invalid cast (`E_NOINTERFACE`).
pub const E_NOINTERFACE: LegacyCode = LegacyCode::from_hresult(0x8000_4002);
/// Not implemented (`E_NOTIMPL`).
pub const E_NOTIMPL: LegacyCode = LegacyCode::from_hresult(0x8000_4001);
/// Out of memory.
pub const COR_E_OUTOFMEMORY: LegacyCode = LegacyCode::from_hresult(0x8007_000E);
/// Bad executable image.
pub const COR_E_BADIMAGEFORMAT: LegacyCode = LegacyCode::from_hresult(0x8007_000B);
/// Access denied.
pub const COR_E_UNAUTHORIZEDACCESS: LegacyCode = LegacyCode::from_hresult(0x8007_0005);
/// Stack overflow.
pub const COR_E_STACKOVERFLOW: LegacyCode = LegacyCode::from_hresult(0x8007_03E9);

// ============================================================================
// Tests
// ============================================================================
