//! The fault kind table.
//!
//! # Taxonomy
//!
//! One row per platform exception type. Rows are grouped by family so the
//! hierarchy reads top-down:
//!
//! - **Root**: `Exception`, with two families beneath it
//! - **Application**: user and business-logic faults
//! - **System**: everything the runtime raises, subdivided into the Argument,
//!   Arithmetic, Member-Access and Type-Load families plus single-leaf kinds
//!
//! # Governance
//!
//! Codes and default messages are compatibility surface. Changing either
//! breaks log scrapers that match on them; the `tests` module at the bottom
//! pins the values callers are known to depend on.

use crate::codes::*;
use crate::define_fault_kinds;

define_fault_kinds! {
    // -------------------------------------------------------------------------
    // Root and families
    // -------------------------------------------------------------------------
    /// Root of the hierarchy; catches everything.
    Exception("System.Exception") => _, COR_E_EXCEPTION,
        "Exception of type 'System.Exception' was thrown.";
    /// Faults raised by the runtime.
    System("System.SystemException") => Exception, COR_E_SYSTEM,
        "System error.";
    /// Faults raised by application code.
    Application("System.ApplicationException") => Exception, COR_E_APPLICATION,
        "Error in the application.";

    // -------------------------------------------------------------------------
    // Argument family
    // -------------------------------------------------------------------------
    /// An argument was invalid.
    Argument("System.ArgumentException") => System, COR_E_ARGUMENT,
        "Value does not fall within the expected range.";
    /// A required argument was missing.
    ArgumentNull("System.ArgumentNullException") => Argument, E_POINTER,
        "Value cannot be null.";
    /// An argument was outside its permitted range.
    ArgumentOutOfRange("System.ArgumentOutOfRangeException") => Argument, COR_E_ARGUMENTOUTOFRANGE,
        "Specified argument was out of the range of valid values.";
    /// The same wait object appeared twice in a wait set.
    DuplicateWaitObject("System.DuplicateWaitObjectException") => Argument, COR_E_DUPLICATEWAITOBJECT,
        "Duplicate objects in argument.";

    // -------------------------------------------------------------------------
    // Arithmetic family
    // -------------------------------------------------------------------------
    /// Arithmetic, casting or conversion failure.
    Arithmetic("System.ArithmeticException") => System, COR_E_ARITHMETIC,
        "Overflow or underflow in the arithmetic operation.";
    /// Integral or decimal division by zero.
    DivideByZero("System.DivideByZeroException") => Arithmetic, COR_E_DIVIDEBYZERO,
        "Attempted to divide by zero.";
    /// Checked operation overflowed.
    Overflow("System.OverflowException") => Arithmetic, COR_E_OVERFLOW,
        "Arithmetic operation resulted in an overflow.";
    /// A floating-point value was NaN or infinite.
    NotFiniteNumber("System.NotFiniteNumberException") => Arithmetic, COR_E_NOTFINITENUMBER,
        "Number encountered was not a finite quantity.";

    // -------------------------------------------------------------------------
    // State and operation
    // -------------------------------------------------------------------------
    ArrayTypeMismatch("System.ArrayTypeMismatchException") => System, COR_E_ARRAYTYPEMISMATCH,
        "Attempted to access an element as a type incompatible with the array.";
    /// Accepts an explicit code override at construction.
    ContextMarshal("System.ContextMarshalException") => System, COR_E_CONTEXTMARSHAL,
        "Attempted to marshal an object across a context boundary.";
    Timeout("System.TimeoutException") => System, COR_E_TIMEOUT,
        "The operation has timed out.";
    ExecutionEngine("System.ExecutionEngineException") => System, COR_E_EXECUTIONENGINE,
        "Internal error in the runtime.";
    IndexOutOfRange("System.IndexOutOfRangeException") => System, COR_E_INDEXOUTOFRANGE,
        "Index was outside the bounds of the array.";
    /// The call is invalid for the object's current state.
    InvalidOperation("System.InvalidOperationException") => System, COR_E_INVALIDOPERATION,
        "Operation is not valid due to the current state of the object.";
    /// The object was used after disposal.
    ObjectDisposed("System.ObjectDisposedException") => InvalidOperation, COR_E_OBJECTDISPOSED,
        "Cannot access a disposed object.";

    // -------------------------------------------------------------------------
    // Member-Access family
    // -------------------------------------------------------------------------
    MemberAccess("System.MemberAccessException") => System, COR_E_MEMBERACCESS,
        "Cannot access member.";
    FieldAccess("System.FieldAccessException") => MemberAccess, COR_E_FIELDACCESS,
        "Attempted to access a field that is not accessible by the caller.";
    MethodAccess("System.MethodAccessException") => MemberAccess, COR_E_METHODACCESS,
        "Attempt to access the method failed.";
    MissingMember("System.MissingMemberException") => MemberAccess, COR_E_MISSINGMEMBER,
        "Attempted to access a missing member.";
    MissingField("System.MissingFieldException") => MissingMember, COR_E_MISSINGFIELD,
        "Attempted to access a non-existing field.";
    MissingMethod("System.MissingMethodException") => MissingMember, COR_E_MISSINGMETHOD,
        "Attempted to access a missing method.";

    // -------------------------------------------------------------------------
    // Support and dispatch
    // -------------------------------------------------------------------------
    MulticastNotSupported("System.MulticastNotSupportedException") => System, COR_E_MULTICASTNOTSUPPORTED,
        "Attempted to add multiple callbacks to a delegate that does not support multicast.";
    NotSupported("System.NotSupportedException") => System, COR_E_NOTSUPPORTED,
        "Specified method is not supported.";
    PlatformNotSupported("System.PlatformNotSupportedException") => NotSupported, COR_E_PLATFORMNOTSUPPORTED,
        "Operation is not supported on this platform.";
    Rank("System.RankException") => System, COR_E_RANK,
        "Attempted to operate on an array with the incorrect number of dimensions.";
    SynchronizationLock("System.Threading.SynchronizationLockException") => System, COR_E_SYNCHRONIZATIONLOCK,
        "Object synchronization method was called from an unsynchronized block of code.";

    // -------------------------------------------------------------------------
    // Type-Load family and loader state
    // -------------------------------------------------------------------------
    TypeLoad("System.TypeLoadException") => System, COR_E_TYPELOAD,
        "Failure has occurred while loading a type.";
    EntryPointNotFound("System.EntryPointNotFoundException") => TypeLoad, COR_E_ENTRYPOINTNOTFOUND,
        "Entry point was not found.";
    DllNotFound("System.DllNotFoundException") => TypeLoad, COR_E_DLLNOTFOUND,
        "Dll was not found.";
    TypeAccess("System.TypeAccessException") => TypeLoad, COR_E_TYPEACCESS,
        "Attempt to access the type failed.";
    TypeInitialization("System.TypeInitializationException") => System, COR_E_TYPEINITIALIZATION,
        "The type initializer threw an exception.";
    TypeUnloaded("System.TypeUnloadedException") => System, COR_E_TYPEUNLOADED,
        "Type had been unloaded.";
    AppDomainUnloaded("System.AppDomainUnloadedException") => System, COR_E_APPDOMAINUNLOADED,
        "Attempted to access an unloaded AppDomain.";
    CannotUnloadAppDomain("System.CannotUnloadAppDomainException") => System, COR_E_CANNOTUNLOADAPPDOMAIN,
        "Attempt to unload the AppDomain failed.";

    // -------------------------------------------------------------------------
    // Single-leaf runtime kinds
    // -------------------------------------------------------------------------
    Format("System.FormatException") => System, COR_E_FORMAT,
        "One of the identified items was in an invalid format.";
    InvalidProgram("System.InvalidProgramException") => System, COR_E_INVALIDPROGRAM,
        "Common Language Runtime detected an invalid program.";
    /// Carries an opaque cancellation token as payload.
    OperationCanceled("System.OperationCanceledException") => System, COR_E_OPERATIONCANCELED,
        "The operation was canceled.";
    KeyNotFound("System.Collections.Generic.KeyNotFoundException") => System, COR_E_KEYNOTFOUND,
        "The given key was not present in the dictionary.";
    InsufficientExecutionStack("System.InsufficientExecutionStackException") => System, COR_E_INSUFFICIENTEXECUTIONSTACK,
        "Insufficient stack to continue executing the program safely.";
    /// Accepts an explicit code override at construction.
    InvalidCast("System.InvalidCastException") => System, E_NOINTERFACE,
        "Specified cast is not valid.";
    NotImplemented("System.NotImplementedException") => System, E_NOTIMPL,
        "The method or operation is not implemented.";
    NullReference("System.NullReferenceException") => System, E_POINTER,
        "Object reference not set to an instance of an object.";
    OutOfMemory("System.OutOfMemoryException") => System, COR_E_OUTOFMEMORY,
        "Insufficient memory to continue the execution of the program.";
    BadImageFormat("System.BadImageFormatException") => System, COR_E_BADIMAGEFORMAT,
        "Format of the executable (.exe) or library (.dll) is invalid.";
    UnauthorizedAccess("System.UnauthorizedAccessException") => System, COR_E_UNAUTHORIZEDACCESS,
        "Attempted to perform an unauthorized operation.";
    StackOverflow("System.StackOverflowException") => System, COR_E_STACKOVERFLOW,
        "Operation caused a stack overflow.";
}

impl FaultKind {
    /// Look a kind up by its platform type name.
    ///
    /// Used when rebuilding faults from persisted records.
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.type_name() == type_name)
    }

    /// Look a kind up by its short name (`"DivideByZero"`).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Whether construction may replace the default code.
    ///
    /// Only two kinds ever allowed this; the list is closed.
    #[inline]
    pub const fn accepts_code_override(self) -> bool {
        matches!(self, Self::InvalidCast | Self::ContextMarshal)
    }

    /// Whether this kind identifies an offending parameter by name.
    #[inline]
    pub const fn carries_param(self) -> bool {
        self.is_a(Self::Argument)
    }
}
