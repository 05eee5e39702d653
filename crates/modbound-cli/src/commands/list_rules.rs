//! List rules command implementation.

use modbound_core::ViolationKind;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<8} {:<22} {:<36} Description", "Code", "Name", "Identifier");
    println!("{}", "-".repeat(110));

    for kind in ViolationKind::ALL {
        println!(
            "{:<8} {:<22} {:<36} {}",
            kind.code(),
            kind.rule_name(),
            kind.identifier(),
            kind.description()
        );
    }

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  modbound check --rules cross-module-import");
    println!("  modbound check --rules MB002");
}
