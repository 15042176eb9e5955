//! Implementation of the lock commands: `acquire`, `release`, `locks`, `sweep`.

use crate::cli::{AcquireArgs, ReleaseArgs};
use crate::context::RunContext;
use crate::error::{GateError, Result};
use crate::key::LockKey;
use crate::locks::{Acquisition, LockStatus, Release, Ttl};

/// Acquire a lock; contention becomes [`GateError::LockHeld`] (exit 1).
pub fn cmd_acquire(ctx: &RunContext, args: AcquireArgs) -> Result<()> {
    let key = LockKey::parse(&args.lock_key)?;
    let ttl = match args.ttl_minutes {
        Some(minutes) => Ttl::from_minutes(minutes)?,
        None => ctx.config.lock_ttl()?,
    };

    match ctx.lock_manager().acquire(&key, ttl)? {
        Acquisition::Acquired(record) => {
            println!("ACQUIRED {}", key);
            println!("  Owner:      {}", record.owner);
            println!(
                "  Expires:    {}",
                record.expires_at_utc().format("%Y-%m-%d %H:%M:%S UTC")
            );
            Ok(())
        }
        Acquisition::AlreadyHeld { holder } => {
            println!("ALREADY_HELD {}", key);
            let detail = match holder {
                Some(record) => format!("{} (owner: {})", key, record.owner),
                None => key.to_string(),
            };
            Err(GateError::LockHeld(detail))
        }
    }
}

/// Release a lock. Releasing a missing lock is not an error.
pub fn cmd_release(ctx: &RunContext, args: ReleaseArgs) -> Result<()> {
    let key = LockKey::parse(&args.lock_key)?;

    match ctx.lock_manager().release(&key)? {
        Release::Released => println!("RELEASED {}", key),
        Release::NotFound => println!("NOT_FOUND {}", key),
    }
    Ok(())
}

/// List lock records in the configured table.
pub fn cmd_locks(ctx: &RunContext) -> Result<()> {
    let locks = ctx.lock_manager().list()?;

    if locks.is_empty() {
        println!("No locks in table '{}'.", ctx.config.lock_table);
        return Ok(());
    }

    println!("Locks in '{}' ({}):", ctx.config.lock_table, locks.len());
    println!();
    for status in &locks {
        print_status(status);
    }

    let expired = locks.iter().filter(|s| s.expired).count();
    if expired > 0 {
        println!(
            "Note: {} lock(s) have expired. Run `buildgate sweep` to remove them.",
            expired
        );
    }

    Ok(())
}

fn print_status(status: &LockStatus) {
    println!("  {}:", status.record.lock_key);
    println!("    Owner:      {}", status.record.owner);
    println!(
        "    Expires:    {}",
        status.record.expires_at_utc().format("%Y-%m-%d %H:%M:%S UTC")
    );
    if status.expired {
        println!("    Status:     EXPIRED");
    } else {
        println!("    Remaining:  {}", status.remaining_string());
    }
    println!();
}

/// Delete expired records.
pub fn cmd_sweep(ctx: &RunContext) -> Result<()> {
    let report = ctx.lock_manager().sweep()?;

    for key in &report.reclaimed {
        println!("Removed expired lock: {}", key);
    }
    println!(
        "Sweep complete: {} removed, {} live.",
        report.reclaimed.len(),
        report.live
    );
    Ok(())
}
