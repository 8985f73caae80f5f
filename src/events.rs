//! Process-boundary events: console cancel keys and unhandled faults.
//!
//! # Cancel keys
//!
//! [`CancelKeyPress`] holds the handlers for Ctrl+C / Ctrl+Break. Each
//! handler sees the same [`ConsoleCancelEventArgs`] in subscription order
//! and may set `cancel` to veto termination.
//!
//! # Unhandled faults
//!
//! [`UnhandledFaultReporter`] receives faults that no handler caught. Every
//! report is written to a [`FaultJournal`] and then passed to subscribers as
//! [`UnhandledFaultEventArgs`].
//!
//! ```rust
//! use bcl_faults::{Fault, FaultKind, UnhandledFaultReporter};
//!
//! let reporter = UnhandledFaultReporter::new();
//! reporter.subscribe(|args| {
//!     if let Some(fault) = args.fault() {
//!         eprintln!("unhandled: {}", fault);
//!     }
//! });
//!
//! let result = reporter.guard(true, || -> bcl_faults::Result<()> {
//!     Err(Fault::new(FaultKind::OutOfMemory))
//! });
//! assert!(result.is_err());
//! assert_eq!(reporter.journal().len(), 1);
//! ```

use crate::{Fault, FaultJournal, Result};
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

// ============================================================================
// Handler Registry
// ============================================================================

/// Identifies a subscription so it can be removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

struct HandlerList<H: ?Sized> {
    next_id: AtomicU64,
    handlers: RwLock<Vec<(HandlerId, Arc<H>)>>,
}

impl<H: ?Sized> HandlerList<H> {
    fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            handlers: RwLock::new(Vec::new()),
        }
    }

    #[inline]
    fn read(&self) -> RwLockReadGuard<'_, Vec<(HandlerId, Arc<H>)>> {
        match self.handlers.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[inline]
    fn write(&self) -> RwLockWriteGuard<'_, Vec<(HandlerId, Arc<H>)>> {
        match self.handlers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn add(&self, handler: Arc<H>) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.write().push((id, handler));
        id
    }

    fn remove(&self, id: HandlerId) -> bool {
        let mut handlers = self.write();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    /// Handlers in subscription order, copied out so none run under the lock.
    fn snapshot(&self) -> Vec<Arc<H>> {
        self.read().iter().map(|(_, h)| Arc::clone(h)).collect()
    }

    fn len(&self) -> usize {
        self.read().len()
    }
}

// ============================================================================
// Console Cancel
// ============================================================================

/// Key combination that raised a cancel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleSpecialKey {
    /// Ctrl+C.
    ControlC,
    /// Ctrl+Break.
    ControlBreak,
}

impl fmt::Display for ConsoleSpecialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ControlC => "ControlC",
            Self::ControlBreak => "ControlBreak",
        })
    }
}

/// Arguments of a console cancel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleCancelEventArgs {
    special_key: ConsoleSpecialKey,
    cancel: bool,
}

impl ConsoleCancelEventArgs {
    /// Event for `special_key`, not yet cancelled.
    #[inline]
    pub const fn new(special_key: ConsoleSpecialKey) -> Self {
        Self {
            special_key,
            cancel: false,
        }
    }

    /// Key that raised the event.
    #[inline]
    pub const fn special_key(&self) -> ConsoleSpecialKey {
        self.special_key
    }

    /// Whether termination has been vetoed.
    #[inline]
    pub const fn cancel(&self) -> bool {
        self.cancel
    }

    /// Veto (or un-veto) termination.
    #[inline]
    pub fn set_cancel(&mut self, cancel: bool) {
        self.cancel = cancel;
    }
}

type CancelHandler = dyn Fn(&mut ConsoleCancelEventArgs) + Send + Sync;

/// Registry of cancel-key handlers.
pub struct CancelKeyPress {
    handlers: HandlerList<CancelHandler>,
}

impl CancelKeyPress {
    /// Registry with no handlers.
    pub fn new() -> Self {
        Self {
            handlers: HandlerList::new(),
        }
    }

    /// Add a handler; it runs after every earlier subscriber.
    pub fn subscribe<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&mut ConsoleCancelEventArgs) + Send + Sync + 'static,
    {
        self.handlers.add(Arc::new(handler))
    }

    /// Remove a handler. Returns whether it was registered.
    pub fn unsubscribe(&self, id: HandlerId) -> bool {
        self.handlers.remove(id)
    }

    /// Run every handler for `key`.
    ///
    /// Returns `true` when termination should proceed, i.e. no handler left
    /// `cancel` set. With no handlers, termination proceeds.
    pub fn dispatch(&self, key: ConsoleSpecialKey) -> bool {
        let mut args = ConsoleCancelEventArgs::new(key);
        for handler in self.handlers.snapshot() {
            handler(&mut args);
        }
        !args.cancel()
    }

    /// Number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for CancelKeyPress {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Unhandled Faults
// ============================================================================

/// Arguments of an unhandled-fault event.
///
/// The faulting value is opaque; [`UnhandledFaultEventArgs::fault`] recovers
/// it when it is a [`Fault`].
#[derive(Clone)]
pub struct UnhandledFaultEventArgs {
    exception_object: Arc<dyn Any + Send + Sync>,
    is_terminating: bool,
}

impl UnhandledFaultEventArgs {
    /// Wrap any faulting value.
    pub fn new(exception_object: Arc<dyn Any + Send + Sync>, is_terminating: bool) -> Self {
        Self {
            exception_object,
            is_terminating,
        }
    }

    /// Wrap a fault.
    pub fn from_fault(fault: Fault, is_terminating: bool) -> Self {
        Self::new(Arc::new(fault), is_terminating)
    }

    /// The faulting value.
    #[inline]
    pub fn exception_object(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.exception_object
    }

    /// Whether the process is about to exit.
    #[inline]
    pub const fn is_terminating(&self) -> bool {
        self.is_terminating
    }

    /// The faulting value as a [`Fault`], when it is one.
    pub fn fault(&self) -> Option<&Fault> {
        self.exception_object.downcast_ref::<Fault>()
    }
}

impl fmt::Debug for UnhandledFaultEventArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnhandledFaultEventArgs")
            .field("fault", &self.fault())
            .field("is_terminating", &self.is_terminating)
            .finish()
    }
}

type UnhandledHandler = dyn Fn(&UnhandledFaultEventArgs) + Send + Sync;

/// Process-boundary sink for faults no handler caught.
pub struct UnhandledFaultReporter {
    handlers: HandlerList<UnhandledHandler>,
    journal: FaultJournal,
}

impl UnhandledFaultReporter {
    /// Reporter with a default-sized journal.
    pub fn new() -> Self {
        Self::with_journal(FaultJournal::default())
    }

    /// Reporter writing into `journal` (clones of a journal share entries).
    pub fn with_journal(journal: FaultJournal) -> Self {
        Self {
            handlers: HandlerList::new(),
            journal,
        }
    }

    /// Add a subscriber.
    pub fn subscribe<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&UnhandledFaultEventArgs) + Send + Sync + 'static,
    {
        self.handlers.add(Arc::new(handler))
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&self, id: HandlerId) -> bool {
        self.handlers.remove(id)
    }

    /// Journal and publish an unhandled fault.
    pub fn report(&self, fault: Fault, is_terminating: bool) -> UnhandledFaultEventArgs {
        self.journal.record(&fault, is_terminating);
        let args = UnhandledFaultEventArgs::from_fault(fault, is_terminating);
        self.publish(&args);
        args
    }

    /// Publish a faulting value of any type. Only [`Fault`]s are journaled.
    pub fn report_object(
        &self,
        exception_object: Arc<dyn Any + Send + Sync>,
        is_terminating: bool,
    ) -> UnhandledFaultEventArgs {
        let args = UnhandledFaultEventArgs::new(exception_object, is_terminating);
        if let Some(fault) = args.fault() {
            self.journal.record(fault, is_terminating);
        }
        self.publish(&args);
        args
    }

    /// Run `op` at the process boundary, reporting a fault it returns.
    ///
    /// The fault is passed back unchanged after reporting.
    pub fn guard<T, F>(&self, is_terminating: bool, op: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        op().map_err(|fault| {
            self.report(fault.clone(), is_terminating);
            fault
        })
    }

    /// Journal of every reported fault.
    #[inline]
    pub fn journal(&self) -> &FaultJournal {
        &self.journal
    }

    /// Number of subscribers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    fn publish(&self, args: &UnhandledFaultEventArgs) {
        for handler in self.handlers.snapshot() {
            handler(args);
        }
    }
}

impl Default for UnhandledFaultReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FaultKind;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn dispatch_without_handlers_terminates() {
        let registry = CancelKeyPress::new();
        assert!(registry.dispatch(ConsoleSpecialKey::ControlC));
    }

    #[test]
    fn handler_can_veto() {
        let registry = CancelKeyPress::new();
        registry.subscribe(|args| {
            if args.special_key() == ConsoleSpecialKey::ControlC {
                args.set_cancel(true);
            }
        });
        assert!(!registry.dispatch(ConsoleSpecialKey::ControlC));
        assert!(registry.dispatch(ConsoleSpecialKey::ControlBreak));
    }

    #[test]
    fn later_handler_sees_and_can_undo_veto() {
        let registry = CancelKeyPress::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        registry.subscribe(|args| args.set_cancel(true));
        let log = Arc::clone(&seen);
        let id = registry.subscribe(move |args| {
            log.lock().unwrap().push(args.cancel());
            args.set_cancel(false);
        });

        assert!(registry.dispatch(ConsoleSpecialKey::ControlC));
        assert_eq!(*seen.lock().unwrap(), [true]);

        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        assert_eq!(registry.handler_count(), 1);
        assert!(!registry.dispatch(ConsoleSpecialKey::ControlC));
    }

    #[test]
    fn report_reaches_subscribers_and_journal() {
        let reporter = UnhandledFaultReporter::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        reporter.subscribe(move |args| {
            assert!(args.is_terminating());
            assert_eq!(args.fault().map(Fault::kind), Some(FaultKind::StackOverflow));
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let args = reporter.report(Fault::new(FaultKind::StackOverflow), true);
        assert!(args.is_terminating());
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let entry = &reporter.journal().get_recent(1)[0];
        assert_eq!(entry.kind, FaultKind::StackOverflow);
        assert!(entry.is_terminating);
    }

    #[test]
    fn foreign_objects_are_published_not_journaled() {
        let reporter = UnhandledFaultReporter::new();
        let args = reporter.report_object(Arc::new("panic payload"), false);
        assert!(args.fault().is_none());
        assert_eq!(
            args.exception_object().downcast_ref::<&str>(),
            Some(&"panic payload")
        );
        assert!(reporter.journal().is_empty());
    }

    #[test]
    fn guard_reports_and_passes_fault_through() {
        let journal = FaultJournal::new(4, 256);
        let reporter = UnhandledFaultReporter::with_journal(journal.clone());

        let ok = reporter.guard(false, || Ok::<_, Fault>(7));
        assert_eq!(ok.unwrap(), 7);
        assert!(journal.is_empty());

        let err = reporter
            .guard(false, || -> Result<()> { Err(Fault::new(FaultKind::KeyNotFound)) })
            .unwrap_err();
        assert_eq!(err.kind(), FaultKind::KeyNotFound);
        assert_eq!(journal.len(), 1);
        assert!(!journal.get_recent(1)[0].is_terminating);
    }

    #[test]
    fn handler_may_subscribe_during_dispatch() {
        let registry = Arc::new(CancelKeyPress::new());
        let inner = Arc::clone(&registry);
        registry.subscribe(move |_| {
            inner.subscribe(|_| {});
        });
        registry.dispatch(ConsoleSpecialKey::ControlBreak);
        assert_eq!(registry.handler_count(), 2);
    }
}
