//! Classification hierarchy and catch sets.
//!
//! # Architecture
//!
//! The platform expressed its hierarchy through class inheritance and matched
//! handlers by virtual dispatch. Here the hierarchy is data: every kind names
//! its parent in the kind table, and "catching by ancestor" is an explicit
//! membership test.
//!
//! - [`FaultKind::is_a`] walks the parent chain (reflexive, transitive)
//! - [`KindSet`] is a fixed-size bitset of kinds; [`KindSet::catching`]
//!   precomputes a kind plus all of its descendants
//!
//! # Example
//!
//! ```rust
//! use bcl_faults::{FaultKind, KindSet};
//!
//! let arithmetic = KindSet::catching(FaultKind::Arithmetic);
//! assert!(arithmetic.contains(FaultKind::DivideByZero));
//! assert!(arithmetic.contains(FaultKind::Overflow));
//! assert!(!arithmetic.contains(FaultKind::Format));
//! ```

use crate::FaultKind;
use smallvec::SmallVec;
use std::fmt;

// Every kind must fit in the bitset.
const _: () = assert!(FaultKind::COUNT <= 64);

// ============================================================================
// Fault Family
// ============================================================================

/// Top-level family a kind belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultFamily {
    /// The root kind itself, which belongs to neither family.
    Base,
    /// User and business-logic faults.
    Application,
    /// Runtime-raised faults.
    System,
}

impl FaultFamily {
    /// Display name for log output.
    #[inline]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Base => "Base",
            Self::Application => "Application",
            Self::System => "System",
        }
    }
}

impl fmt::Display for FaultFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// Hierarchy Walks
// ============================================================================

/// Inline capacity covers the deepest chain in the table
/// (`MissingField -> MissingMember -> MemberAccess -> System -> Exception`).
pub type AncestorChain = SmallVec<[FaultKind; 5]>;

impl FaultKind {
    /// Whether `self` is `ancestor` or one of its descendants.
    pub const fn is_a(self, ancestor: FaultKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind as u8 == ancestor as u8 {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Chain from `self` up to the root, `self` first.
    pub fn ancestors(self) -> AncestorChain {
        let mut chain = AncestorChain::new();
        let mut current = Some(self);
        while let Some(kind) = current {
            chain.push(kind);
            current = kind.parent();
        }
        chain
    }

    /// Distance from the root (`Exception` is 0).
    pub const fn depth(self) -> usize {
        let mut depth = 0;
        let mut current = self.parent();
        while let Some(kind) = current {
            depth += 1;
            current = kind.parent();
        }
        depth
    }

    /// Top-level family.
    pub const fn family(self) -> FaultFamily {
        if self.is_a(FaultKind::Application) {
            FaultFamily::Application
        } else if self.is_a(FaultKind::System) {
            FaultFamily::System
        } else {
            FaultFamily::Base
        }
    }

    /// Kinds whose parent is `self`, in table order.
    pub fn children(self) -> impl Iterator<Item = FaultKind> {
        Self::ALL
            .iter()
            .copied()
            .filter(move |kind| kind.parent() == Some(self))
    }

    #[inline]
    const fn bit(self) -> u64 {
        1u64 << (self as u8)
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

// ============================================================================
// Kind Set
// ============================================================================

/// Set of fault kinds, used as the match list of a handler.
///
/// `Copy` because it is a single machine word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KindSet(u64);

impl KindSet {
    /// The empty set.
    #[inline]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Set holding exactly one kind.
    #[inline]
    pub const fn only(kind: FaultKind) -> Self {
        Self(kind.bit())
    }

    /// Set a handler registered for `kind` matches: `kind` and every descendant.
    pub const fn catching(kind: FaultKind) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < FaultKind::COUNT {
            let candidate = FaultKind::ALL[i];
            if candidate.is_a(kind) {
                bits |= candidate.bit();
            }
            i += 1;
        }
        Self(bits)
    }

    /// Build a set from several handler kinds, each with its descendants.
    pub fn catching_any(kinds: &[FaultKind]) -> Self {
        kinds
            .iter()
            .fold(Self::empty(), |set, kind| set.union(Self::catching(*kind)))
    }

    /// Membership test.
    #[inline]
    pub const fn contains(self, kind: FaultKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Return a copy with `kind` added.
    #[inline]
    #[must_use]
    pub const fn with(self, kind: FaultKind) -> Self {
        Self(self.0 | kind.bit())
    }

    /// Add `kind` in place.
    #[inline]
    pub fn insert(&mut self, kind: FaultKind) {
        self.0 |= kind.bit();
    }

    /// Union of two sets.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Number of kinds in the set.
    #[inline]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether the set is empty.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in table order.
    pub fn iter(self) -> impl Iterator<Item = FaultKind> {
        FaultKind::ALL
            .iter()
            .copied()
            .filter(move |kind| self.contains(*kind))
    }
}

impl From<FaultKind> for KindSet {
    fn from(kind: FaultKind) -> Self {
        Self::catching(kind)
    }
}

impl FromIterator<FaultKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = FaultKind>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |set, kind| set.with(kind))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_a_is_reflexive_and_transitive() {
        assert!(FaultKind::DivideByZero.is_a(FaultKind::DivideByZero));
        assert!(FaultKind::DivideByZero.is_a(FaultKind::Arithmetic));
        assert!(FaultKind::DivideByZero.is_a(FaultKind::System));
        assert!(FaultKind::DivideByZero.is_a(FaultKind::Exception));
        assert!(!FaultKind::Arithmetic.is_a(FaultKind::DivideByZero));
        assert!(!FaultKind::Overflow.is_a(FaultKind::DivideByZero));
    }

    #[test]
    fn every_kind_reaches_the_root() {
        for kind in FaultKind::ALL {
            assert!(kind.is_a(FaultKind::Exception));
            assert_eq!(kind.ancestors().last(), Some(&FaultKind::Exception));
            assert_eq!(kind.ancestors().len(), kind.depth() + 1);
        }
    }

    #[test]
    fn ancestor_chain_order() {
        let chain = FaultKind::MissingField.ancestors();
        assert_eq!(
            chain.as_slice(),
            &[
                FaultKind::MissingField,
                FaultKind::MissingMember,
                FaultKind::MemberAccess,
                FaultKind::System,
                FaultKind::Exception,
            ]
        );
        assert!(!chain.spilled());
    }

    #[test]
    fn families() {
        assert_eq!(FaultKind::Exception.family(), FaultFamily::Base);
        assert_eq!(FaultKind::Application.family(), FaultFamily::Application);
        assert_eq!(FaultKind::TypeAccess.family(), FaultFamily::System);
        assert_eq!(FaultKind::System.family(), FaultFamily::System);
    }

    #[test]
    fn catching_arithmetic() {
        let set = KindSet::catching(FaultKind::Arithmetic);
        let members: Vec<_> = set.iter().collect();
        assert_eq!(
            members,
            [
                FaultKind::Arithmetic,
                FaultKind::DivideByZero,
                FaultKind::Overflow,
                FaultKind::NotFiniteNumber,
            ]
        );
    }

    #[test]
    fn catching_root_covers_everything() {
        assert_eq!(KindSet::catching(FaultKind::Exception).len(), FaultKind::COUNT);
        assert!(KindSet::catching(FaultKind::Application).len() == 1);
    }

    #[test]
    fn type_load_family() {
        let set = KindSet::catching(FaultKind::TypeLoad);
        assert!(set.contains(FaultKind::DllNotFound));
        assert!(set.contains(FaultKind::EntryPointNotFound));
        assert!(set.contains(FaultKind::TypeAccess));
        assert!(!set.contains(FaultKind::TypeInitialization));
    }

    #[test]
    fn set_operations() {
        let mut set = KindSet::only(FaultKind::Timeout);
        set.insert(FaultKind::Format);
        assert_eq!(set.len(), 2);
        assert!(!set.contains(FaultKind::Arithmetic));

        let combined = KindSet::catching_any(&[FaultKind::Arithmetic, FaultKind::Timeout]);
        assert!(combined.contains(FaultKind::Overflow));
        assert!(combined.contains(FaultKind::Timeout));

        let collected: KindSet = [FaultKind::Rank, FaultKind::Rank].into_iter().collect();
        assert_eq!(collected.len(), 1);
        assert!(KindSet::empty().is_empty());
    }

    #[test]
    fn children_of_member_access() {
        let children: Vec<_> = FaultKind::MemberAccess.children().collect();
        assert_eq!(
            children,
            [
                FaultKind::FieldAccess,
                FaultKind::MethodAccess,
                FaultKind::MissingMember,
            ]
        );
    }
}
