//! Thread-local data slots.
//!
//! A [`LocalDataStoreManager`] owns a table of slot indices. Allocating a slot
//! hands out a [`LocalDataSlot`] handle; each thread sees its own value per
//! slot. Dropping the last clone of a handle returns the index to the manager.
//!
//! # Cookies
//!
//! Every allocation stamps the slot with a fresh cookie. A handle releases
//! its index only while the table still carries the handle's cookie, so a
//! stale handle can never free an index that has since been reused. Values
//! are stored under the same cookie, so a recycled index never exposes the
//! previous slot's data.
//!
//! Values hidden this way are reclaimed the next time the owning thread
//! stores a value, or when the thread exits. Dropping a manager reclaims
//! the dropping thread's values for it at once.
//!
//! # Example
//!
//! ```rust
//! use bcl_faults::LocalDataStoreManager;
//!
//! let manager = LocalDataStoreManager::new();
//! let slot = manager.allocate_slot();
//! manager.set_data(&slot, 42u32).unwrap();
//! assert_eq!(manager.get_data::<u32>(&slot).unwrap(), Some(42));
//!
//! // Another thread starts empty.
//! let other = std::thread::scope(|s| {
//!     s.spawn(|| manager.get_data::<u32>(&slot).unwrap()).join().unwrap()
//! });
//! assert_eq!(other, None);
//! ```

use crate::{Fault, FaultKind, Result, require_arg};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Source of manager identities; values never repeat within a process.
static MANAGER_IDS: AtomicU64 = AtomicU64::new(1);

// Per-thread slot values, keyed by (manager id, slot index).
thread_local! {
    static SLOT_VALUES: RefCell<SlotValues> =
        RefCell::new(HashMap::new());
}

struct StoredValue {
    cookie: u64,
    owner: Weak<ManagerInner>,
    value: Box<dyn Any>,
}

type SlotValues = HashMap<(u64, usize), StoredValue>;

// ============================================================================
// Slot Table
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct SlotEntry {
    in_use: bool,
    cookie: u64,
}

#[derive(Default)]
struct SlotTable {
    entries: Vec<SlotEntry>,
    next_cookie: u64,
    named: HashMap<String, LocalDataSlot>,
}

impl SlotTable {
    fn allocate(&mut self) -> (usize, u64) {
        self.next_cookie += 1;
        let cookie = self.next_cookie;
        let entry = SlotEntry {
            in_use: true,
            cookie,
        };
        match self.entries.iter().position(|e| !e.in_use) {
            Some(index) => {
                self.entries[index] = entry;
                (index, cookie)
            }
            None => {
                self.entries.push(entry);
                (self.entries.len() - 1, cookie)
            }
        }
    }

    fn release(&mut self, index: usize, cookie: u64) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) if entry.in_use && entry.cookie == cookie => {
                entry.in_use = false;
                true
            }
            _ => false,
        }
    }

    fn is_live(&self, index: usize, cookie: u64) -> bool {
        self.entries
            .get(index)
            .is_some_and(|e| e.in_use && e.cookie == cookie)
    }
}

struct ManagerInner {
    id: u64,
    table: Mutex<SlotTable>,
}

impl ManagerInner {
    fn lock_table(&self) -> MutexGuard<'_, SlotTable> {
        match self.table.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn release(&self, index: usize, cookie: u64) {
        let released = self.lock_table().release(index, cookie);
        if released {
            // Other threads' values stay behind, keyed by the dead cookie.
            let removed = SLOT_VALUES
                .try_with(|values| match values.try_borrow_mut() {
                    Ok(mut values) => values.remove(&(self.id, index)),
                    Err(_) => None,
                })
                .ok()
                .flatten();
            drop(removed);
        }
    }
}

impl Drop for ManagerInner {
    fn drop(&mut self) {
        let id = self.id;
        let removed = SLOT_VALUES
            .try_with(|values| match values.try_borrow_mut() {
                Ok(mut values) => take_where(&mut values, |&(owner, _), _| owner == id),
                Err(_) => Vec::new(),
            })
            .unwrap_or_default();
        // Removed values may own handles into live managers.
        drop(removed);
    }
}

fn take_where<F>(values: &mut SlotValues, mut dead: F) -> Vec<StoredValue>
where
    F: FnMut(&(u64, usize), &StoredValue) -> bool,
{
    let keys: Vec<(u64, usize)> = values
        .iter()
        .filter(|(key, stored)| dead(*key, *stored))
        .map(|(key, _)| *key)
        .collect();
    keys.iter().filter_map(|key| values.remove(key)).collect()
}

// ============================================================================
// Slot Handle
// ============================================================================

struct SlotHandle {
    manager: Weak<ManagerInner>,
    index: usize,
    cookie: u64,
}

impl Drop for SlotHandle {
    fn drop(&mut self) {
        if let Some(manager) = self.manager.upgrade() {
            manager.release(self.index, self.cookie);
        }
    }
}

/// Handle to an allocated slot.
///
/// Clones share one allocation; the index is released when the last clone
/// drops. A handle whose cookie no longer matches the table releases nothing.
#[derive(Clone)]
pub struct LocalDataSlot {
    handle: Arc<SlotHandle>,
}

impl LocalDataSlot {
    pub(crate) fn from_parts(manager: &LocalDataStoreManager, index: usize, cookie: u64) -> Self {
        Self {
            handle: Arc::new(SlotHandle {
                manager: Arc::downgrade(&manager.inner),
                index,
                cookie,
            }),
        }
    }

    /// Slot index within its manager's table.
    #[inline]
    pub fn index(&self) -> usize {
        self.handle.index
    }

    /// Allocation stamp.
    #[inline]
    pub fn cookie(&self) -> u64 {
        self.handle.cookie
    }
}

impl fmt::Debug for LocalDataSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalDataSlot")
            .field("index", &self.handle.index)
            .field("cookie", &self.handle.cookie)
            .finish()
    }
}

// ============================================================================
// Manager
// ============================================================================

/// Owner of a slot table. Clones share the table.
#[derive(Clone)]
pub struct LocalDataStoreManager {
    inner: Arc<ManagerInner>,
}

impl LocalDataStoreManager {
    /// Create a manager with an empty table.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                id: MANAGER_IDS.fetch_add(1, Ordering::Relaxed),
                table: Mutex::new(SlotTable::default()),
            }),
        }
    }

    /// Allocate an unnamed slot, reusing the lowest free index.
    pub fn allocate_slot(&self) -> LocalDataSlot {
        let (index, cookie) = self.inner.lock_table().allocate();
        LocalDataSlot::from_parts(self, index, cookie)
    }

    /// Allocate a slot registered under `name`.
    ///
    /// Fails with `Argument` when the name is taken and `ArgumentNull` when
    /// it is empty.
    pub fn allocate_named_slot(&self, name: &str) -> Result<LocalDataSlot> {
        require_arg(name, "name")?;
        let mut table = self.inner.lock_table();
        if table.named.contains_key(name) {
            return Err(Fault::for_param_with_message(
                FaultKind::Argument,
                "name",
                format!("Item has already been added. Key in dictionary: '{}'.", name),
            ));
        }
        let (index, cookie) = table.allocate();
        let slot = LocalDataSlot::from_parts(self, index, cookie);
        table.named.insert(name.to_owned(), slot.clone());
        Ok(slot)
    }

    /// Slot registered under `name`, allocating it on first use.
    pub fn get_named_slot(&self, name: &str) -> Result<LocalDataSlot> {
        require_arg(name, "name")?;
        let mut table = self.inner.lock_table();
        if let Some(slot) = table.named.get(name) {
            return Ok(slot.clone());
        }
        let (index, cookie) = table.allocate();
        let slot = LocalDataSlot::from_parts(self, index, cookie);
        table.named.insert(name.to_owned(), slot.clone());
        Ok(slot)
    }

    /// Forget the name. The slot itself is released once outstanding handles
    /// drop. Unknown names are ignored.
    pub fn free_named_slot(&self, name: &str) {
        let removed = self.inner.lock_table().named.remove(name);
        // Dropped outside the lock: releasing the slot locks the table again.
        drop(removed);
    }

    /// Store a value for the calling thread.
    ///
    /// Also reclaims the calling thread's values for released slots and
    /// dropped managers.
    pub fn set_data<T: Any>(&self, slot: &LocalDataSlot, value: T) -> Result<()> {
        self.check_slot(slot)?;
        let stored = StoredValue {
            cookie: slot.cookie(),
            owner: Arc::downgrade(&self.inner),
            value: Box::new(value),
        };
        let replaced = {
            let table = self.inner.lock_table();
            SLOT_VALUES.with(|values| {
                let mut values = values.borrow_mut();
                let mut replaced = take_where(&mut values, |&(owner, index), entry| {
                    if owner == self.inner.id {
                        !table.is_live(index, entry.cookie)
                    } else {
                        entry.owner.strong_count() == 0
                    }
                });
                replaced.extend(values.insert((self.inner.id, slot.index()), stored));
                replaced
            })
        };
        // Replaced values may own slot handles; drop them with the map
        // unborrowed and the table unlocked.
        drop(replaced);
        Ok(())
    }

    /// The calling thread's value, or `None` when it never stored one.
    ///
    /// Fails with `InvalidCast` when the stored value has another type.
    pub fn get_data<T: Any + Clone>(&self, slot: &LocalDataSlot) -> Result<Option<T>> {
        self.check_slot(slot)?;
        SLOT_VALUES.with(|values| {
            let values = values.borrow();
            let Some(stored) = values.get(&(self.inner.id, slot.index())) else {
                return Ok(None);
            };
            if stored.cookie != slot.cookie() {
                return Ok(None);
            }
            stored
                .value
                .downcast_ref::<T>()
                .cloned()
                .map(Some)
                .ok_or_else(|| {
                    Fault::with_message(
                        FaultKind::InvalidCast,
                        format!(
                            "Slot value is not of type '{}'.",
                            std::any::type_name::<T>()
                        ),
                    )
                })
        })
    }

    /// Number of indices currently allocated.
    pub fn in_use_count(&self) -> usize {
        self.inner
            .lock_table()
            .entries
            .iter()
            .filter(|e| e.in_use)
            .count()
    }

    fn check_slot(&self, slot: &LocalDataSlot) -> Result<()> {
        if !Weak::ptr_eq(&slot.handle.manager, &Arc::downgrade(&self.inner)) {
            return Err(Fault::for_param_with_message(
                FaultKind::Argument,
                "slot",
                "Slot belongs to a different data store.",
            ));
        }
        if !self.inner.lock_table().is_live(slot.index(), slot.cookie()) {
            return Err(Fault::object_disposed("LocalDataSlot"));
        }
        Ok(())
    }
}

impl Default for LocalDataStoreManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LocalDataStoreManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalDataStoreManager")
            .field("id", &self.inner.id)
            .field("in_use", &self.in_use_count())
            .finish()
    }
}
