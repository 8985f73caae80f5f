use bcl_faults::{
    ApplicationIdentity, CharEnumerator, Fault, FaultKind, KindSet, Result, ResultExt,
    ensure_arg, fault,
};

fn parse_volume(text: &str) -> Result<u8> {
    let value: i64 = text
        .trim()
        .parse()
        .map_err(|_| fault!(Format, "'{}' is not a number.", text))?;
    ensure_arg!(value >= 0, "text", "Volume cannot be negative.");
    u8::try_from(value).map_err(|_| fault!(Overflow, "{} does not fit in a byte.", value))
}

fn main() {
    println!("--- Basic Usage Example ---\n");

    // 1. Raising and matching by ancestor
    for input in ["40", "abc", "-3", "900"] {
        let outcome = parse_volume(input).catch(FaultKind::Arithmetic, |fault| {
            println!("   clamped after {}", fault.kind().name());
            Ok(u8::MAX)
        });
        match outcome {
            Ok(volume) => println!("{:>5} -> {}", input, volume),
            Err(fault) => println!("{:>5} -> {}", input, fault),
        }
    }

    // 2. Codes stay stable for log scrapers
    let err = Fault::argument_null("texture");
    println!("\n{} [{}]", err, err.code());

    // 3. Handler sets cover several families at once
    let handlers = KindSet::catching_any(&[FaultKind::Argument, FaultKind::Format]);
    println!(
        "handlers catch {} kinds; ArgumentNull caught: {}",
        handlers.len(),
        err.caught_by(handlers)
    );

    // 4. Cause chains
    let wrapped: Result<()> = Err(Fault::new(FaultKind::DllNotFound));
    if let Err(chain) = wrapped.wrap(FaultKind::TypeInitialization, "Audio backend failed.") {
        for (depth, link) in chain.chain().enumerate() {
            println!("{:indent$}{}", "", link, indent = depth * 2);
        }
    }

    // 5. Utility types
    match ApplicationIdentity::new("Game, Version=1.2.0.0") {
        Ok(identity) => println!("\nidentity: {} ({})", identity, identity.name()),
        Err(err) => println!("\nidentity failed: {}", err),
    }

    let letters: String = CharEnumerator::new("shim").map(|c| c.to_ascii_uppercase()).collect();
    println!("enumerated: {}", letters);
}
