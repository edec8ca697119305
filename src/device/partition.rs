//! Partitions: a slice of a parent disklabel, identified by start/end
//! sectors and a GPT/MBR part-type.
//!
//! Grounded on `other_examples/.../config/partitions/mod.rs`'s
//! `PartitionInfo` (flags, resize/format intents) and on
//! `original_source/blivet`'s `PartitionDevice` for `part_type` and weight.

use crate::platform::{weight, Platform, WeightInputs};

/// MBR/GPT partition role, mirroring blivet's `parted.PARTITION_*` use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionType {
    Primary,
    Extended,
    Logical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionDevice {
    pub part_type: PartitionType,
    /// 0-based index of this partition within its disklabel, if assigned.
    pub number: Option<u32>,
    pub start_sector: u64,
    pub end_sector: u64,
    pub bootable: bool,
    /// Caller-requested weight override; `None` defers to [`weight`].
    pub req_base_weight: Option<i32>,
}

impl PartitionDevice {
    pub fn new(part_type: PartitionType, start_sector: u64, end_sector: u64) -> Self {
        PartitionDevice {
            part_type,
            number: None,
            start_sector,
            end_sector,
            bootable: false,
            req_base_weight: None,
        }
    }

    pub fn sector_count(&self) -> u64 {
        self.end_sector.saturating_sub(self.start_sector) + 1
    }

    /// Placement weight for this partition given its planned mountpoint and
    /// filesystem type (spec §8). `mountpoint`/`fstype` normally come from
    /// the format attached to the owning [`crate::device::Device`].
    pub fn weight(&self, platform: &Platform, mountpoint: Option<&str>, fstype: Option<&str>) -> i32 {
        weight(
            platform,
            WeightInputs {
                req_base_weight: self.req_base_weight,
                mountpoint,
                fstype,
                bootable: self.bootable,
            },
        )
    }
}
