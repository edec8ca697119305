//! The device graph itself.
//!
//! `DeviceTree` owns every [`Device`] in an arena (`DeviceId` -> `Device`)
//! and enforces the invariants spec §8 calls universal: names are unique
//! among non-hidden devices, no device lists a parent id the tree doesn't
//! contain, and removal cascades to dependents rather than leaving dangling
//! parent references. Python blivet enforces the same invariants by walking
//! live object references; here they are checked explicitly on each
//! mutating call since nothing holds a reference back.

use std::collections::HashMap;

use crate::action::{Action, ActionList};
use crate::device::{Device, DeviceId, DeviceKind};
use crate::error::{Error, Result, TreeError};

#[derive(Debug, Default)]
pub struct DeviceTree {
    devices: HashMap<DeviceId, Device>,
    /// Devices excluded from the ordinary listing (internal LVM LVs, BTRFS
    /// members subsumed by their volume) but still present for lookups that
    /// need them, mirroring blivet's `hidden` list.
    hidden: std::collections::HashSet<DeviceId>,
    next_id: u64,
    actions: ActionList,
}

impl DeviceTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self) -> DeviceId {
        let id = DeviceId::from_raw(self.next_id);
        self.next_id += 1;
        id
    }

    /// Adds `device`, rejecting a name collision with any other non-hidden
    /// device (spec §8: name uniqueness is a universal invariant). Every
    /// parent id referenced by `device.parents` must already be present.
    pub fn add_device(&mut self, mut device: Device) -> Result<DeviceId> {
        if self.visible_device_by_name(&device.name).is_some() {
            return Err(Error::device(format!("a device named {} already exists", device.name)));
        }
        for parent in device.parents.iter() {
            if !self.devices.contains_key(&parent) {
                return Err(Error::Tree(TreeError::UnusableConfiguration(format!(
                    "parent {parent} of {} is not in the tree",
                    device.name
                ))));
            }
        }
        device.recompute_device_id();
        let id = self.alloc_id();
        self.devices.insert(id, device);
        log::info!("added device {} ({})", self.devices[&id].name, id);
        Ok(id)
    }

    pub fn get(&self, id: DeviceId) -> Option<&Device> {
        self.devices.get(&id)
    }

    pub fn get_mut(&mut self, id: DeviceId) -> Option<&mut Device> {
        self.devices.get_mut(&id)
    }

    /// Mutable iterator over every device in the tree, hidden or not.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (DeviceId, &mut Device)> {
        self.devices.iter_mut().map(|(id, d)| (*id, d))
    }

    fn visible_device_by_name(&self, name: &str) -> Option<DeviceId> {
        self.devices
            .iter()
            .find(|(id, d)| d.name == name && !self.hidden.contains(id))
            .map(|(id, _)| *id)
    }

    fn visible(&self, id: &DeviceId, hidden: bool) -> bool {
        hidden || !self.hidden.contains(id)
    }

    /// Looks up a device by name. `hidden` controls whether a hidden device
    /// (an internal LVM LV, say) is eligible to match, not just a visible
    /// one (spec §4.2: every named lookup takes this flag).
    pub fn get_by_name(&self, name: &str, hidden: bool) -> Option<(DeviceId, &Device)> {
        self.devices
            .iter()
            .filter(|(id, _)| self.visible(id, hidden))
            .find(|(_, d)| d.name == name)
            .map(|(id, d)| (*id, d))
    }

    pub fn get_by_uuid(&self, uuid: &uuid::Uuid, hidden: bool) -> Option<(DeviceId, &Device)> {
        self.devices
            .iter()
            .filter(|(id, _)| self.visible(id, hidden))
            .find(|(_, d)| d.uuid.as_ref() == Some(uuid))
            .map(|(id, d)| (*id, d))
    }

    pub fn get_by_sysfs_path(&self, path: &str, hidden: bool) -> Option<(DeviceId, &Device)> {
        self.devices
            .iter()
            .filter(|(id, _)| self.visible(id, hidden))
            .find(|(_, d)| d.sysfs_path.as_deref() == Some(path))
            .map(|(id, d)| (*id, d))
    }

    /// Looks up a device by its persisted `device_id` (spec §6).
    pub fn get_by_device_id(&self, device_id: &str, hidden: bool) -> Option<(DeviceId, &Device)> {
        self.devices
            .iter()
            .filter(|(id, _)| self.visible(id, hidden))
            .find(|(_, d)| d.device_id == device_id)
            .map(|(id, d)| (*id, d))
    }

    /// Looks up a device by devnode path or any of its symlinks.
    pub fn get_by_path(&self, path: &str, hidden: bool) -> Option<(DeviceId, &Device)> {
        self.devices
            .iter()
            .filter(|(id, _)| self.visible(id, hidden))
            .find(|(_, d)| d.path.as_deref() == Some(path) || d.symlinks.iter().any(|s| s == path))
            .map(|(id, d)| (*id, d))
    }

    /// All device ids whose `parents` list contains `id`.
    pub fn get_children(&self, id: DeviceId) -> Vec<DeviceId> {
        self.devices
            .iter()
            .filter(|(_, d)| d.parents.contains(id))
            .map(|(child_id, _)| *child_id)
            .collect()
    }

    /// Transitive closure of [`DeviceTree::get_children`]: every device that
    /// depends, directly or indirectly, on `id`.
    pub fn get_dependent_devices(&self, id: DeviceId) -> Vec<DeviceId> {
        let mut seen = Vec::new();
        let mut stack = self.get_children(id);
        while let Some(child) = stack.pop() {
            if seen.contains(&child) {
                continue;
            }
            seen.push(child);
            stack.extend(self.get_children(child));
        }
        seen
    }

    /// Every device name in the tree. `hidden` controls whether hidden
    /// devices are included (spec §4.2).
    pub fn names(&self, hidden: bool) -> Vec<&str> {
        self.devices
            .iter()
            .filter(|(id, _)| self.visible(id, hidden))
            .map(|(_, d)| d.name.as_str())
            .collect()
    }

    pub fn hide(&mut self, id: DeviceId) {
        self.hidden.insert(id);
    }

    pub fn unhide(&mut self, id: DeviceId) {
        self.hidden.remove(&id);
    }

    pub fn is_hidden(&self, id: DeviceId) -> bool {
        self.hidden.contains(&id)
    }

    /// Removes `id` after removing every device that depends on it first
    /// (spec §4.2: removal cascades rather than leaving dangling parents).
    /// Returns the full set of ids removed, deepest dependents first.
    pub fn recursive_remove(&mut self, id: DeviceId) -> Result<Vec<DeviceId>> {
        if !self.devices.contains_key(&id) {
            return Err(Error::device(format!("no such device: {id}")));
        }
        let mut dependents = self.get_dependent_devices(id);
        // Deepest dependents must go first; get_dependent_devices doesn't
        // guarantee topological order on its own, so remove in passes until
        // nothing remains.
        let mut removed = Vec::new();
        while !dependents.is_empty() {
            let leaves: Vec<DeviceId> = dependents
                .iter()
                .copied()
                .filter(|candidate| self.get_children(*candidate).iter().all(|c| !dependents.contains(c)))
                .collect();
            if leaves.is_empty() {
                return Err(Error::Tree(TreeError::UnusableConfiguration(
                    "cycle detected while removing dependents".to_string(),
                )));
            }
            for leaf in &leaves {
                self.devices.remove(leaf);
                self.hidden.remove(leaf);
                removed.push(*leaf);
            }
            dependents.retain(|d| !leaves.contains(d));
        }
        if let Some(device) = self.devices.remove(&id) {
            log::info!("removed device {} ({id})", device.name);
        }
        self.hidden.remove(&id);
        removed.push(id);
        Ok(removed)
    }

    /// Structural check invoked by the populator once a pass quiesces:
    /// every container device must still have at least one member, per
    /// spec §8's `NoSlaves` invariant.
    pub fn check_container_membership(&self) -> Result<()> {
        for device in self.devices.values() {
            let requires_members = matches!(
                device.kind,
                DeviceKind::MdArray(_) | DeviceKind::LvmVolumeGroup(_) | DeviceKind::BtrfsVolume(_)
            );
            if requires_members && device.parents.is_empty() {
                return Err(Error::Tree(TreeError::NoSlaves(device.name.clone())));
            }
        }
        Ok(())
    }

    pub fn register_action(&mut self, action: Action) {
        self.actions.register(action);
    }

    pub fn find_actions(&self, predicate: impl Fn(&Action) -> bool) -> Vec<&Action> {
        self.actions.find(predicate)
    }

    /// Cancels every pending action touching `id`, in reverse registration
    /// order (spec §4.2), as blivet's `cancel_disk_actions` does when a
    /// device is pulled out from under a scheduled action.
    pub fn cancel_disk_actions(&mut self, id: DeviceId) {
        self.actions.cancel_for_device(id);
    }
}
