//! External tool boundaries.
//!
//! Everything that would shell out to `parted`, `lvm`, `mdadm`,
//! `dmsetup`/`cryptsetup`, `udevadm`, or an `mkfs.*` binary is expressed as a
//! trait here instead of being called directly, per spec Non-goals: this
//! crate models the device graph and the discovery algorithm, not process
//! invocation. A downstream binary crate wires real implementations; this
//! crate ships [`fake`] implementations it uses for its own populator tests.

use crate::error::Result;
use crate::size::Size;

/// Reads and writes partition tables.
pub trait DiskLabelOps {
    fn read_label(&self, device: &str) -> Result<Option<crate::format::disklabel::DiskLabelFormat>>;
    fn write_label(&self, device: &str, label: &crate::format::disklabel::DiskLabelFormat) -> Result<()>;
}

/// Queries and mutates LVM metadata.
pub trait LvmOps {
    fn pv_info(&self, device: &str) -> Result<Option<String>>;
    fn vg_create(&self, name: &str, pvs: &[String]) -> Result<()>;
    fn lv_create(&self, vg: &str, name: &str, size: Size) -> Result<()>;
}

/// Assembles and inspects MD arrays.
pub trait MdOps {
    fn array_create(&self, name: &str, level: &str, members: &[String]) -> Result<()>;
    fn array_detail(&self, name: &str) -> Result<Option<String>>;
}

/// device-mapper table load/remove, shared by dm-crypt, dm-raid and
/// multipath devices.
pub trait DmOps {
    fn map_create(&self, name: &str, table: &str) -> Result<()>;
    fn map_remove(&self, name: &str) -> Result<()>;
}

/// LUKS header and key management.
pub trait CryptoOps {
    fn luks_format(&self, device: &str, passphrase: &str) -> Result<()>;
    fn luks_open(&self, device: &str, map_name: &str, passphrase: &str) -> Result<()>;
    fn luks_close(&self, map_name: &str) -> Result<()>;
}

/// Kernel/udev descriptor enumeration, the populator's primary input.
pub trait UdevOps {
    fn list_devices(&self) -> Result<Vec<crate::populator::descriptor::Descriptor>>;
}

/// Filesystem creation, resize and labeling.
pub trait FsOps {
    fn mkfs(&self, device: &str, fstype: &str) -> Result<()>;
    fn resize(&self, device: &str, fstype: &str, new_size: Size) -> Result<()>;
}

/// In-memory fakes used by this crate's own tests, standing in for the
/// downstream tool bindings.
pub mod fake {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    pub struct FakeDiskLabelOps {
        pub labels: RefCell<HashMap<String, crate::format::disklabel::DiskLabelFormat>>,
    }

    impl DiskLabelOps for FakeDiskLabelOps {
        fn read_label(&self, device: &str) -> Result<Option<crate::format::disklabel::DiskLabelFormat>> {
            Ok(self.labels.borrow().get(device).cloned())
        }

        fn write_label(&self, device: &str, label: &crate::format::disklabel::DiskLabelFormat) -> Result<()> {
            self.labels.borrow_mut().insert(device.to_string(), label.clone());
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    pub struct FakeLvmOps {
        pub vgs: RefCell<HashMap<String, Vec<String>>>,
    }

    impl LvmOps for FakeLvmOps {
        fn pv_info(&self, device: &str) -> Result<Option<String>> {
            Ok(self
                .vgs
                .borrow()
                .iter()
                .find(|(_, members)| members.iter().any(|m| m == device))
                .map(|(vg, _)| vg.clone()))
        }

        fn vg_create(&self, name: &str, pvs: &[String]) -> Result<()> {
            self.vgs.borrow_mut().insert(name.to_string(), pvs.to_vec());
            Ok(())
        }

        fn lv_create(&self, vg: &str, _name: &str, _size: Size) -> Result<()> {
            if !self.vgs.borrow().contains_key(vg) {
                return Err(crate::error::Error::device(format!("no such volume group: {vg}")));
            }
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    pub struct FakeMdOps {
        pub arrays: RefCell<HashMap<String, Vec<String>>>,
    }

    impl MdOps for FakeMdOps {
        fn array_create(&self, name: &str, _level: &str, members: &[String]) -> Result<()> {
            self.arrays.borrow_mut().insert(name.to_string(), members.to_vec());
            Ok(())
        }

        fn array_detail(&self, name: &str) -> Result<Option<String>> {
            Ok(self.arrays.borrow().get(name).map(|members| members.join(",")))
        }
    }

    #[derive(Debug, Default)]
    pub struct FakeDmOps {
        pub maps: RefCell<HashMap<String, String>>,
    }

    impl DmOps for FakeDmOps {
        fn map_create(&self, name: &str, table: &str) -> Result<()> {
            self.maps.borrow_mut().insert(name.to_string(), table.to_string());
            Ok(())
        }

        fn map_remove(&self, name: &str) -> Result<()> {
            self.maps.borrow_mut().remove(name);
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    pub struct FakeCryptoOps {
        pub opened: RefCell<HashMap<String, String>>,
    }

    impl CryptoOps for FakeCryptoOps {
        fn luks_format(&self, _device: &str, _passphrase: &str) -> Result<()> {
            Ok(())
        }

        fn luks_open(&self, device: &str, map_name: &str, passphrase: &str) -> Result<()> {
            if passphrase.is_empty() {
                return Err(crate::error::Error::Crypto("empty passphrase rejected".to_string()));
            }
            self.opened.borrow_mut().insert(map_name.to_string(), device.to_string());
            Ok(())
        }

        fn luks_close(&self, map_name: &str) -> Result<()> {
            self.opened.borrow_mut().remove(map_name);
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    pub struct FakeUdevOps {
        pub descriptors: Vec<crate::populator::descriptor::Descriptor>,
    }

    impl UdevOps for FakeUdevOps {
        fn list_devices(&self) -> Result<Vec<crate::populator::descriptor::Descriptor>> {
            Ok(self.descriptors.clone())
        }
    }

    #[derive(Debug, Default)]
    pub struct FakeFsOps;

    impl FsOps for FakeFsOps {
        fn mkfs(&self, _device: &str, _fstype: &str) -> Result<()> {
            Ok(())
        }

        fn resize(&self, _device: &str, _fstype: &str, _new_size: Size) -> Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::*;
    use super::*;

    #[test]
    fn fake_lvm_rejects_lv_create_on_unknown_vg() {
        let lvm = FakeLvmOps::default();
        assert!(lvm.lv_create("missing", "lv0", Size::from_gib(1)).is_err());
    }

    #[test]
    fn fake_crypto_rejects_empty_passphrase() {
        let crypto = FakeCryptoOps::default();
        assert!(crypto.luks_open("/dev/sda2", "luks-abc", "").is_err());
        assert!(crypto.luks_open("/dev/sda2", "luks-abc", "secret").is_ok());
    }
}
