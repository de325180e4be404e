//! Unattended macOS installer bootstrap.
//!
//! Drives a macOS recovery installer from boot to a running init
//! script, with no VNC session attached:
//! - Waits for the installer to finish booting (OCR on screendumps)
//! - Opens Utilities > Terminal via menu-bar keyboard navigation
//! - Launches /Volumes/QEMU\ VVFAT/init.sh inside the terminal
//!
//! The VM must expose its monitor as a Unix socket:
//!   qemu-system-x86_64 ... -qmp unix:/tmp/qmp.sock,server=on,wait=off
//!
//! Usage:
//!   SOCKET_PATH=/tmp/qmp.sock cargo run --example install_macos
//!   SOCKET_PATH=/tmp/qmp.sock cargo run --example install_macos -- --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tokio::time::sleep;

use common::Args;
use qemu_autopilot::{Driver, KeyChord, Result, Wait};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    println!("=== macOS Installer Bootstrap ===\n");

    // ========================================================================
    // Setup
    // ========================================================================

    println!("[Setup] Connecting to monitor...");

    let driver = Driver::from_env()?;
    let monitor = driver.connect().await?;
    monitor.negotiate_capabilities().await?;
    println!(
        "        ✓ Connected to {}\n",
        driver.socket_path().display()
    );

    // ========================================================================
    // Wait for the installer to boot
    // ========================================================================

    println!("[1] Waiting for boot...");
    monitor
        .wait_for_text("installer boot", "macOS Utilities", Wait::seconds(300))
        .await?;
    println!("    ✓ Installer is up\n");

    // ========================================================================
    // Open Utilities > Terminal from the menu bar
    // ========================================================================

    println!("[2] Starting terminal...");
    monitor.press(&KeyChord::parse("ctrl-f2")).await?;
    sleep(Duration::from_secs(1)).await;
    monitor.type_text("u\nt\n").await?;

    monitor
        .wait_for_text("terminal prompt", "bash", Wait::seconds(10))
        .await?;
    println!("    ✓ Terminal is up\n");

    // ========================================================================
    // Kick off the init script
    // ========================================================================

    println!("[3] Starting init script...");
    monitor.type_text("/Volumes/QEMU\\ VVFAT/init.sh\n").await?;
    println!("    ✓ Script launched\n");

    // ========================================================================
    // Done
    // ========================================================================

    println!("=== Done ===");
    monitor.close();

    Ok(())
}
