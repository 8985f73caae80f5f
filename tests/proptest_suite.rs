//! Property-based tests for bcl_faults
//!
//! These tests use proptest to generate random inputs and verify invariants hold.

use bcl_faults::{
    CharEnumerator, Fault, FaultBuilder, FaultJournal, FaultKind, FaultRecord, KindSet,
    LegacyCode,
};
use proptest::prelude::*;

fn any_kind() -> impl Strategy<Value = FaultKind> {
    (0..FaultKind::COUNT).prop_map(|i| FaultKind::ALL[i])
}

fn any_chain() -> impl Strategy<Value = Fault> {
    prop::collection::vec((any_kind(), "\\PC{0,64}"), 1..8).prop_map(|links| {
        let mut links = links.into_iter();
        let (kind, message) = links.next().unwrap();
        let mut fault = Fault::with_message(kind, message);
        for (kind, message) in links {
            fault = Fault::with_cause(kind, message, fault);
        }
        fault
    })
}

// ============================================================================
// CONSTRUCTION PROPERTIES
// ============================================================================

proptest! {
    /// Messages are never empty, whatever is supplied
    #[test]
    fn message_never_empty(kind in any_kind(), message in "\\PC{0,200}") {
        let fault = Fault::with_message(kind, message.clone());
        prop_assert!(!fault.message().is_empty());
        if !message.is_empty() {
            prop_assert_eq!(fault.message(), message.as_str());
        }
    }

    /// Parameter names always land at the end of the message
    #[test]
    fn param_suffix(kind in any_kind(), param in "[a-zA-Z_][a-zA-Z0-9_]{0,20}") {
        let fault = Fault::for_param(kind, param.clone());
        let suffix = format!(" (Parameter '{}')", param);
        prop_assert!(fault.message().ends_with(&suffix));
        prop_assert!(fault.message().starts_with(kind.default_message()));
        prop_assert_eq!(fault.param_name(), Some(param.as_str()));
    }

    /// A code override never changes kind or message, and only sticks on the
    /// two kinds that accept one
    #[test]
    fn code_override_is_isolated(kind in any_kind(), raw in any::<i32>(), message in "\\PC{1,40}") {
        let code = LegacyCode::from_value(raw);
        let fault = FaultBuilder::new(kind).message(message.clone()).code(code).build();
        prop_assert_eq!(fault.kind(), kind);
        prop_assert_eq!(fault.message(), message.as_str());
        if kind.accepts_code_override() {
            prop_assert_eq!(fault.code(), code);
        } else {
            prop_assert_eq!(fault.code(), kind.default_code());
        }
    }

    /// Display never panics and always leads with the type name
    #[test]
    fn display_leads_with_type_name(fault in any_chain()) {
        let text = fault.to_string();
        let prefix = format!("{}: ", fault.kind().type_name());
        prop_assert!(text.starts_with(&prefix));
    }
}

// ============================================================================
// HIERARCHY PROPERTIES
// ============================================================================

proptest! {
    /// `is_a` agrees with the precomputed catch set
    #[test]
    fn catch_set_matches_is_a(kind in any_kind(), handler in any_kind()) {
        prop_assert_eq!(KindSet::catching(handler).contains(kind), kind.is_a(handler));
    }

    /// Catching is transitive through the parent link
    #[test]
    fn parent_handlers_catch_children(kind in any_kind()) {
        if let Some(parent) = kind.parent() {
            for ancestor in parent.ancestors() {
                prop_assert!(kind.is_a(ancestor));
            }
        }
        prop_assert!(kind.is_a(FaultKind::Exception));
    }

    /// No kind other than itself is both its ancestor and descendant
    #[test]
    fn hierarchy_is_antisymmetric(a in any_kind(), b in any_kind()) {
        if a.is_a(b) && b.is_a(a) {
            prop_assert_eq!(a, b);
        }
    }
}

// ============================================================================
// LOGGING PROPERTIES
// ============================================================================

proptest! {
    /// Log output is valid UTF-8 and bounded regardless of message length
    #[test]
    fn log_output_is_bounded(kind in any_kind(), message in "\\PC{0,10000}") {
        let fault = Fault::with_message(kind, message);
        let mut buffer = String::new();
        fault.log().write_to(&mut buffer).unwrap();
        prop_assert!(std::str::from_utf8(buffer.as_bytes()).is_ok());
        prop_assert!(buffer.len() < 1200);
    }

    /// The journal never exceeds its capacity
    #[test]
    fn journal_respects_capacity(capacity in 1usize..32, reports in 0usize..100) {
        let journal = FaultJournal::new(capacity, 64);
        for i in 0..reports {
            journal.record(&Fault::with_message(FaultKind::Format, format!("r{}", i)), false);
        }
        prop_assert_eq!(journal.len(), reports.min(capacity));
        prop_assert_eq!(journal.eviction_count() as usize, reports.saturating_sub(capacity));
    }
}

// ============================================================================
// RECORD PROPERTIES
// ============================================================================

proptest! {
    /// Flattening then rebuilding a chain yields an equal chain
    #[test]
    fn records_rebuild_chain(fault in any_chain()) {
        let records = fault.to_records();
        prop_assert_eq!(records.len(), fault.chain().count());
        let rebuilt = Fault::from_records(&records).unwrap();
        prop_assert_eq!(rebuilt, fault);
    }

    /// Record lines are single-line and parse back to the same record
    #[test]
    fn record_lines_parse(fault in any_chain()) {
        for record in fault.to_records() {
            let line = record.to_string();
            prop_assert!(!line.contains('\n'));
            prop_assert_eq!(FaultRecord::parse_line(&line).unwrap(), record);
        }
    }

    /// Parsing arbitrary text never panics
    #[test]
    fn record_parse_never_panics(line in "\\PC{0,200}") {
        let _ = FaultRecord::parse_line(&line);
    }
}

// ============================================================================
// ENUMERATOR PROPERTIES
// ============================================================================

proptest! {
    /// The enumerator yields exactly the string's characters, then fails
    #[test]
    fn enumerator_yields_every_char(text in "\\PC{0,100}") {
        let mut e = CharEnumerator::new(&text);
        let mut seen = String::new();
        while e.move_next() {
            seen.push(e.current().unwrap());
        }
        prop_assert_eq!(&seen, &text);
        prop_assert_eq!(e.current().unwrap_err().kind(), FaultKind::InvalidOperation);

        e.reset().unwrap();
        let again: String = e.collect();
        prop_assert_eq!(again, text);
    }
}
