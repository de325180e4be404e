//! Guest keyboard typing demo.
//!
//! Types the given text into whatever has focus in the guest, one
//! send-key chord per character. Append `\n` inside the quotes to
//! press return.
//!
//! Usage:
//!   SOCKET_PATH=/tmp/qmp.sock cargo run --example type_text -- "echo hello"
//!   SOCKET_PATH=/tmp/qmp.sock cargo run --example type_text -- --debug "ls -la"

mod common;

// ============================================================================
// Imports
// ============================================================================

use common::Args;
use qemu_autopilot::{Driver, Result};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    let Some(text) = args.rest.first().cloned() else {
        eprintln!("Usage: cargo run --example type_text -- \"<text>\"");
        std::process::exit(2);
    };

    if let Err(e) = run(&text).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(text: &str) -> Result<()> {
    println!("=== Guest Typing ===\n");

    println!("[Setup] Connecting to monitor...");
    let driver = Driver::from_env()?;
    let monitor = driver.connect().await?;
    monitor.negotiate_capabilities().await?;
    println!(
        "        ✓ Connected to {}\n",
        driver.socket_path().display()
    );

    println!("[1] Typing {} characters...", text.chars().count());
    monitor.type_text(text).await?;
    println!("    ✓ Done");

    monitor.close();
    Ok(())
}
