use crate::activity::{Action, ActivityLog};
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::lock::LockGate;
use crate::path::NodePath;
use crate::store::TreeStore;

pub fn lock<S: TreeStore>(
    store: &S,
    actor: &str,
    path: &NodePath,
    password: &str,
) -> Result<CmdResult> {
    let node = LockGate::new(store).lock(path, password)?;
    ActivityLog::new(store).record(actor, Action::Lock, &node.name, None)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Locked {}", node.name)));
    Ok(result.with_affected_nodes(vec![node]))
}

pub fn unlock<S: TreeStore>(
    store: &S,
    actor: &str,
    path: &NodePath,
    password: &str,
) -> Result<CmdResult> {
    let node = LockGate::new(store).unlock(path, password)?;
    ActivityLog::new(store).record(actor, Action::Unlock, &node.name, None)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Unlocked {}", node.name)));
    Ok(result.with_affected_nodes(vec![node]))
}
