//! Scheduled device/format operations.
//!
//! An `Action` records an intent (create this device, destroy that format)
//! without performing it; `process_actions` is the point where a caller
//! would actually invoke the [`crate::ops`] tool boundary, in precedence
//! order, the way blivet's `ActionList.process` walks its own queue.

use crate::device::DeviceId;
use crate::error::Result;

/// One of the eight precedence slots spec §4.4 assigns an action, in
/// execution order: a format must be destroyed before its device is
/// destroyed or shrunk; a device must be shrunk before anything new is
/// created in the freed space; a device is grown only after whatever it
/// depends on has been created, and its format is grown only once the
/// device underneath it already has its new size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionType {
    DestroyFormat,
    DestroyDevice,
    ResizeFormatShrink,
    ResizeDeviceShrink,
    CreateDevice,
    ResizeDeviceGrow,
    ResizeFormatGrow,
    CreateFormat,
}

impl ActionType {
    /// Lower sorts first (spec §4.4's eight-slot precedence).
    fn precedence(self) -> u8 {
        match self {
            ActionType::DestroyFormat => 0,
            ActionType::DestroyDevice => 1,
            ActionType::ResizeFormatShrink => 2,
            ActionType::ResizeDeviceShrink => 3,
            ActionType::CreateDevice => 4,
            ActionType::ResizeDeviceGrow => 5,
            ActionType::ResizeFormatGrow => 6,
            ActionType::CreateFormat => 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionObject {
    Device,
    Format,
}

#[derive(Debug, Clone)]
pub struct Action {
    pub id: u64,
    pub action_type: ActionType,
    pub object: ActionObject,
    pub device: DeviceId,
}

#[derive(Debug, Default)]
pub struct ActionList {
    actions: Vec<Action>,
    next_id: u64,
}

impl ActionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, mut action: Action) -> u64 {
        action.id = self.next_id;
        self.next_id += 1;
        let id = action.id;
        self.actions.push(action);
        id
    }

    pub fn find(&self, predicate: impl Fn(&Action) -> bool) -> Vec<&Action> {
        self.actions.iter().filter(|a| predicate(a)).collect()
    }

    pub fn cancel_action(&mut self, id: u64) -> Option<Action> {
        let pos = self.actions.iter().position(|a| a.id == id)?;
        Some(self.actions.remove(pos))
    }

    /// Cancels every action touching `device`, in reverse registration
    /// order, mirroring blivet's `cancel_disk_actions`: the most recently
    /// scheduled action on a device is undone first.
    pub fn cancel_for_device(&mut self, device: DeviceId) {
        let ids: Vec<u64> = self
            .actions
            .iter()
            .filter(|a| a.device == device)
            .map(|a| a.id)
            .rev()
            .collect();
        for id in ids {
            self.cancel_action(id);
        }
    }

    /// Drains the queue in precedence order, invoking `apply` for each
    /// action. Stops and leaves the remainder queued on the first error, so
    /// a caller can inspect what did and didn't run.
    pub fn process_actions(&mut self, mut apply: impl FnMut(&Action) -> Result<()>) -> Result<()> {
        self.actions.sort_by_key(|a| a.action_type.precedence());
        while !self.actions.is_empty() {
            let action = self.actions.remove(0);
            apply(&action)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }
}
