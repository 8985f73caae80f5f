//! Process-boundary reporting: cancel keys, unhandled faults and a crash
//! report built from the journal.

use bcl_faults::{
    CancelKeyPress, ConsoleSpecialKey, Fault, FaultJournal, FaultKind, FaultRecord, Result,
    UnhandledFaultReporter,
};
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn load_level(name: &str) -> Result<()> {
    let missing = Fault::with_message(
        FaultKind::DllNotFound,
        format!("Unable to load 'physics_{}.so'.", name),
    );
    Err(Fault::with_cause(
        FaultKind::TypeInitialization,
        "The type initializer for 'PhysicsWorld' threw an exception.",
        missing,
    ))
}

fn main() {
    println!("--- Process Boundary Example ---\n");

    // 1. Cancel keys: the first Ctrl+C is vetoed so the game can save.
    let cancel_keys = CancelKeyPress::new();
    let saving = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&saving);
    cancel_keys.subscribe(move |args| {
        if args.special_key() == ConsoleSpecialKey::ControlC && !flag.swap(true, Ordering::SeqCst) {
            println!("   Ctrl+C: saving before exit");
            args.set_cancel(true);
        }
    });
    println!("first Ctrl+C terminates:  {}", cancel_keys.dispatch(ConsoleSpecialKey::ControlC));
    println!("second Ctrl+C terminates: {}", cancel_keys.dispatch(ConsoleSpecialKey::ControlC));

    // 2. Unhandled faults are journaled and published.
    let journal = FaultJournal::new(64, 512);
    let reporter = UnhandledFaultReporter::with_journal(journal.clone());
    reporter.subscribe(|args| {
        if let Some(fault) = args.fault() {
            let mut line = String::new();
            if fault.log().write_to(&mut line).is_ok() {
                println!("\n[unhandled terminating={}] {}", args.is_terminating(), line);
            }
        }
    });

    let _ = reporter.guard(false, || load_level("harbor"));
    let _ = reporter.guard(true, || -> Result<()> { Err(Fault::new(FaultKind::OutOfMemory)) });

    // 3. Crash report: journal entries as JSON, plus the persisted chain.
    let entries: Vec<_> = journal
        .get_all()
        .into_iter()
        .map(|entry| {
            let reported_at = Utc
                .timestamp_opt(entry.timestamp as i64, 0)
                .single()
                .map(|t| t.to_rfc3339())
                .unwrap_or_default();
            json!({
                "reported_at": reported_at,
                "type": entry.kind.type_name(),
                "code": entry.code.value(),
                "message": entry.message.as_ref(),
                "causes": entry.causes.iter().map(|k| k.type_name()).collect::<Vec<_>>(),
                "terminating": entry.is_terminating,
            })
        })
        .collect();
    let report = json!({ "faults": entries });
    match serde_json::to_string_pretty(&report) {
        Ok(text) => println!("\ncrash report:\n{}", text),
        Err(err) => println!("\ncrash report failed: {}", err),
    }

    if let Err(fault) = load_level("docks") {
        println!("\npersisted chain:");
        let lines: Vec<String> = fault.to_records().iter().map(ToString::to_string).collect();
        for line in &lines {
            println!("   {}", line);
        }

        let parsed: Result<Vec<FaultRecord>> =
            lines.iter().map(|line| FaultRecord::parse_line(line)).collect();
        match parsed.and_then(|records| Fault::from_records(&records)) {
            Ok(rebuilt) => println!("rebuilt equal to original: {}", rebuilt == fault),
            Err(err) => println!("rebuild failed: {}", err),
        }
    }
}
