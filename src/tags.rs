//! Device tags.
//!
//! Tags are a set of strings attached to a device. Four are built in and
//! computed automatically by the populator from bus/transport information;
//! callers may add arbitrary additional string tags.

use enumflags2::{bitflags, BitFlags};
use std::collections::BTreeSet;

/// Built-in tags the populator derives from a device's transport.
#[bitflags]
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Copy, Clone, serde::Serialize, serde::Deserialize)]
pub enum BuiltinTag {
    /// Backed by local, directly attached storage.
    Local = 1 << 0,
    /// Backed by a network transport (iSCSI, FCoE, zFCP, NVMe-oF).
    Remote = 1 << 1,
    /// Rotational flag in sysfs is `0`.
    Ssd = 1 << 2,
    /// Attached over USB.
    Usb = 1 << 3,
}

/// The set of tags on a device: the built-ins plus arbitrary strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    builtin: BitFlags<BuiltinTag>,
    extra: BTreeSet<String>,
}

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_builtin(&mut self, tag: BuiltinTag, present: bool) {
        if present {
            self.builtin.insert(tag);
        } else {
            self.builtin.remove(tag);
        }
    }

    pub fn has_builtin(&self, tag: BuiltinTag) -> bool {
        self.builtin.contains(tag)
    }

    pub fn add(&mut self, tag: impl Into<String>) {
        self.extra.insert(tag.into());
    }

    pub fn remove(&mut self, tag: &str) {
        self.extra.remove(tag);
    }

    pub fn contains(&self, tag: &str) -> bool {
        match tag {
            "local" => self.has_builtin(BuiltinTag::Local),
            "remote" => self.has_builtin(BuiltinTag::Remote),
            "ssd" => self.has_builtin(BuiltinTag::Ssd),
            "usb" => self.has_builtin(BuiltinTag::Usb),
            other => self.extra.contains(other),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
        const NAMES: &[(BuiltinTag, &str)] = &[
            (BuiltinTag::Local, "local"),
            (BuiltinTag::Remote, "remote"),
            (BuiltinTag::Ssd, "ssd"),
            (BuiltinTag::Usb, "usb"),
        ];
        NAMES
            .iter()
            .filter(move |(tag, _)| self.has_builtin(*tag))
            .map(|(_, name)| name.to_string())
            .chain(self.extra.iter().cloned())
    }
}
