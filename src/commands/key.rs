//! Implementation of the `buildgate key` command.

use crate::cli::KeyArgs;
use crate::context::RunContext;
use crate::error::Result;
use crate::key::{LockKey, WorkItemId};

/// Print the lock key a runner must acquire for an issue.
pub fn cmd_key(ctx: &RunContext, args: KeyArgs) -> Result<()> {
    let source = ctx.config.source_id()?;
    let issue = WorkItemId::new(args.issue)?;
    println!("{}", LockKey::for_work_item(&source, issue));
    Ok(())
}
