//! LVM volume groups and logical volumes.
//!
//! Grounded on `other_examples/.../config/lvm/mod.rs`'s `LvmDevice`
//! (volume-group/logical-volume split, unique-id generation) and on
//! `original_source/blivet`'s thin-provisioning and snapshot LV subclasses.

use crate::size::Size;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LvmVolumeGroupDevice {
    pub extent_size: Size,
    /// Number of free extents currently unallocated to any LV.
    pub free_extents: u64,
    pub pv_count: usize,
}

impl LvmVolumeGroupDevice {
    pub fn new(extent_size: Size) -> Self {
        LvmVolumeGroupDevice { extent_size, free_extents: 0, pv_count: 0 }
    }

    pub fn total_extents(&self, total_pv_size: Size) -> u64 {
        total_pv_size.div_scalar(self.extent_size.bytes().max(1)).bytes()
    }
}

/// What an [`LvmLogicalVolumeDevice`] is, beyond a plain linear LV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LvSubtype {
    Linear,
    /// A thin pool backing one or more thin LVs.
    ThinPool { chunk_size: Size },
    /// A thin-provisioned LV allocated from a thin pool LV.
    Thin { pool_name: String },
    /// A point-in-time snapshot of another LV.
    Snapshot { origin_name: String },
    /// Internal bookkeeping LV (metadata, cache, mirror log) not meant to be
    /// surfaced to users directly.
    Internal { role: String },
    /// RAID-type LV (`lvcreate --type raidN`), backed by hidden subordinate
    /// LVs for data/metadata the way an MD array is backed by members.
    Raid { level: super::md::MdLevel },
    /// VDO pool LV backing one or more dedup/compressed VDO LVs.
    VdoPool,
    /// A VDO-backed LV allocated from a VDO pool LV.
    Vdo { pool_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LvmLogicalVolumeDevice {
    pub subtype: LvSubtype,
    pub segment_type: String,
}

impl LvmLogicalVolumeDevice {
    pub fn new(subtype: LvSubtype) -> Self {
        LvmLogicalVolumeDevice { subtype, segment_type: "linear".to_string() }
    }

    pub fn type_name(&self) -> &'static str {
        match self.subtype {
            LvSubtype::Linear => "lvmlv",
            LvSubtype::ThinPool { .. } => "lvmthinpool",
            LvSubtype::Thin { .. } => "lvmthinlv",
            LvSubtype::Snapshot { .. } => "lvmsnapshot",
            LvSubtype::Internal { .. } => "lvmlv (internal)",
            LvSubtype::Raid { .. } => "lvmlv (raid)",
            LvSubtype::VdoPool => "lvmvdopool",
            LvSubtype::Vdo { .. } => "lvmvdolv",
        }
    }

    /// `true` for LVs the populator should hide from the top-level device
    /// listing by default (internal bookkeeping LVs), mirroring blivet's
    /// `hidden` attribute on such devices.
    pub fn is_hidden_by_default(&self) -> bool {
        matches!(self.subtype, LvSubtype::Internal { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_lvs_are_hidden() {
        let lv = LvmLogicalVolumeDevice::new(LvSubtype::Internal { role: "pool metadata".into() });
        assert!(lv.is_hidden_by_default());
        assert_eq!(lv.type_name(), "lvmlv (internal)");
    }

    #[test]
    fn thin_lv_reports_its_pool() {
        let lv = LvmLogicalVolumeDevice::new(LvSubtype::Thin { pool_name: "pool00".into() });
        match &lv.subtype {
            LvSubtype::Thin { pool_name } => assert_eq!(pool_name, "pool00"),
            _ => panic!("wrong subtype"),
        }
    }
}
