//! Cursor over the characters of a string.
//!
//! # States
//!
//! ```text
//!  before-first --move_next--> on-char --move_next--> ... --move_next--> after-last
//!        ^                                                                   |
//!        +------------------------------- reset ----------------------------+
//!  any state --dispose--> disposed (terminal)
//! ```
//!
//! `current()` only succeeds on a character. Reading before the first
//! `move_next()` or after the end is an `InvalidOperation` fault; reading
//! after `dispose()` is an `ObjectDisposed` fault.

use crate::{Fault, Result};
use std::sync::Arc;

const NOT_STARTED: &str = "Enumeration has not started. Call MoveNext.";
const ALREADY_FINISHED: &str = "Enumeration already finished.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    BeforeFirst,
    At(usize),
    AfterLast,
    Disposed,
}

/// Enumerator over a string's characters.
///
/// ```rust
/// use bcl_faults::{CharEnumerator, FaultKind};
///
/// let mut chars = CharEnumerator::new("ab");
/// assert_eq!(chars.current().unwrap_err().kind(), FaultKind::InvalidOperation);
/// assert!(chars.move_next());
/// assert_eq!(chars.current().unwrap(), 'a');
/// assert!(chars.move_next());
/// assert!(!chars.move_next());
/// ```
///
/// Clones share the underlying text and copy the cursor position.
#[derive(Debug, Clone)]
pub struct CharEnumerator {
    chars: Arc<[char]>,
    cursor: Cursor,
}

impl CharEnumerator {
    /// Enumerator positioned before the first character.
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            cursor: Cursor::BeforeFirst,
        }
    }

    /// Advance; `false` once the end is reached or after disposal.
    pub fn move_next(&mut self) -> bool {
        let next = match self.cursor {
            Cursor::BeforeFirst => 0,
            Cursor::At(index) => index + 1,
            Cursor::AfterLast | Cursor::Disposed => return false,
        };
        if next < self.chars.len() {
            self.cursor = Cursor::At(next);
            true
        } else {
            self.cursor = Cursor::AfterLast;
            false
        }
    }

    /// Character under the cursor.
    pub fn current(&self) -> Result<char> {
        match self.cursor {
            Cursor::At(index) => Ok(self.chars[index]),
            Cursor::BeforeFirst => Err(Fault::invalid_operation(NOT_STARTED)),
            Cursor::AfterLast => Err(Fault::invalid_operation(ALREADY_FINISHED)),
            Cursor::Disposed => Err(Fault::object_disposed("CharEnumerator")),
        }
    }

    /// Return to before the first character.
    ///
    /// Fails with `ObjectDisposed` after disposal.
    pub fn reset(&mut self) -> Result<()> {
        if self.cursor == Cursor::Disposed {
            return Err(Fault::object_disposed("CharEnumerator"));
        }
        self.cursor = Cursor::BeforeFirst;
        Ok(())
    }

    /// Release the text. Further reads fail and `move_next()` returns `false`.
    pub fn dispose(&mut self) {
        self.chars = Arc::from(Vec::new());
        self.cursor = Cursor::Disposed;
    }

    /// Whether `dispose()` has been called.
    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.cursor == Cursor::Disposed
    }
}

impl Iterator for CharEnumerator {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        if self.move_next() {
            self.current().ok()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FaultKind;

    #[test]
    fn walks_two_chars() {
        let mut e = CharEnumerator::new("ab");

        let err = e.current().unwrap_err();
        assert_eq!(err.kind(), FaultKind::InvalidOperation);
        assert_eq!(err.message(), NOT_STARTED);

        assert!(e.move_next());
        assert_eq!(e.current().unwrap(), 'a');
        assert!(e.move_next());
        assert_eq!(e.current().unwrap(), 'b');
        assert!(!e.move_next());

        let err = e.current().unwrap_err();
        assert_eq!(err.kind(), FaultKind::InvalidOperation);
        assert_eq!(err.message(), ALREADY_FINISHED);

        assert!(!e.move_next());
    }

    #[test]
    fn reset_restarts() {
        let mut e = CharEnumerator::new("xy");
        while e.move_next() {}
        e.reset().unwrap();
        assert!(e.current().is_err());
        assert!(e.move_next());
        assert_eq!(e.current().unwrap(), 'x');
    }

    #[test]
    fn empty_string_finishes_immediately() {
        let mut e = CharEnumerator::new("");
        assert!(!e.move_next());
        assert_eq!(e.current().unwrap_err().message(), ALREADY_FINISHED);
    }

    #[test]
    fn dispose_is_terminal() {
        let mut e = CharEnumerator::new("ab");
        assert!(e.move_next());
        e.dispose();
        assert!(e.is_disposed());
        assert!(!e.move_next());

        let err = e.current().unwrap_err();
        assert_eq!(err.kind(), FaultKind::ObjectDisposed);
        assert!(err.is(FaultKind::InvalidOperation));
        assert_eq!(e.reset().unwrap_err().kind(), FaultKind::ObjectDisposed);
    }

    #[test]
    fn iterates_unicode_scalars() {
        let collected: String = CharEnumerator::new("héllo🔥").collect();
        assert_eq!(collected, "héllo🔥");
    }

    #[test]
    fn clones_move_independently() {
        let mut first = CharEnumerator::new("abc");
        assert!(first.move_next());
        let mut second = first.clone();
        assert!(second.move_next());
        assert_eq!(first.current().unwrap(), 'a');
        assert_eq!(second.current().unwrap(), 'b');
    }
}
