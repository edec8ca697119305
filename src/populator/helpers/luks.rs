//! LUKS cascade: given a device already carrying a LUKS format and a
//! passphrase, opens the mapping via [`crate::ops::CryptoOps`] and creates
//! the mapped clear-text [`DmDevice`](crate::device::dm::DmDevice) as its
//! child, the way [`super::device::LuksMappedHelper`] would have if udev had
//! reported the mapping as its own descriptor. Exists because a fresh LUKS
//! unlock has no descriptor of its own until this crate (or a caller) has
//! actually opened it.

use crate::device::dm::{DmDevice, DmKind};
use crate::device::{Device, DeviceId, DeviceKind};
use crate::error::{Error, Result};
use crate::format::FormatKind;
use crate::ops::CryptoOps;
use crate::tree::DeviceTree;

/// Unlocks the LUKS format on `locked_id` with `passphrase` and registers
/// the mapped device as its child. Fails if `locked_id` isn't LUKS-formatted
/// or if `crypto_ops` rejects the passphrase.
pub fn unlock(tree: &mut DeviceTree, crypto_ops: &dyn CryptoOps, locked_id: DeviceId, passphrase: &str) -> Result<DeviceId> {
    let locked = tree
        .get(locked_id)
        .ok_or_else(|| Error::device(format!("no such device: {locked_id}")))?;
    if !matches!(locked.format.kind, FormatKind::Luks(_)) {
        return Err(Error::device(format!("{} is not LUKS-formatted", locked.name)));
    }
    let map_name = format!("luks-{}", locked.name);
    let backing_path = locked.sysfs_path.clone().unwrap_or_else(|| locked.name.clone());
    let size = locked.size;

    crypto_ops.luks_open(&backing_path, &map_name, passphrase)?;

    let dm = DmDevice::new(DmKind::Luks { map_name: map_name.clone() });
    let mut device = Device::new(map_name, size, DeviceKind::Dm(dm));
    device.exists = true;
    device.lifecycle = crate::device::Lifecycle::Active;
    device.parents.append(locked_id, |_| Ok(()))?;

    if let Some(locked_mut) = tree.get_mut(locked_id) {
        if let FormatKind::Luks(luks) = &mut locked_mut.format.kind {
            luks.unlocked = true;
        }
    }

    tree.add_device(device)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::disk::{DiskDevice, DiskKind};
    use crate::format::{luks::{LuksFormat, LuksVersion}, Format};
    use crate::ops::fake::FakeCryptoOps;
    use crate::size::Size;

    fn locked_device() -> Device {
        let mut device = Device::new("sda2", Size::from_gib(10), DeviceKind::Disk(DiskDevice::new(DiskKind::Local)));
        device.format = Format::new(FormatKind::Luks(LuksFormat::new(LuksVersion::Luks2)));
        device
    }

    #[test]
    fn unlock_creates_mapped_device() {
        let mut tree = DeviceTree::new();
        let id = tree.add_device(locked_device()).unwrap();
        let crypto = FakeCryptoOps::default();

        let mapped_id = unlock(&mut tree, &crypto, id, "secret").unwrap();
        let mapped = tree.get(mapped_id).unwrap();
        assert!(mapped.parents.contains(id));
        if let FormatKind::Luks(luks) = &tree.get(id).unwrap().format.kind {
            assert!(luks.unlocked);
        } else {
            panic!("expected LUKS format");
        }
    }

    #[test]
    fn unlock_rejects_non_luks_device() {
        let mut tree = DeviceTree::new();
        let id = tree
            .add_device(Device::new("sda", Size::from_gib(10), DeviceKind::Disk(DiskDevice::new(DiskKind::Local))))
            .unwrap();
        let crypto = FakeCryptoOps::default();
        assert!(unlock(&mut tree, &crypto, id, "secret").is_err());
    }
}
