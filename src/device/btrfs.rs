//! BTRFS volumes and subvolumes.
//!
//! BTRFS blurs the device/format line: a BTRFS "volume" is simultaneously a
//! multi-device container (like an MD array) and a filesystem. This crate
//! follows blivet's split: [`BtrfsVolumeDevice`] is the device spanning one
//! or more member block devices, while the filesystem proper is represented
//! by a [`crate::format::FormatKind::Btrfs`] format attached to it.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BtrfsRaidLevel {
    Single,
    Raid0,
    Raid1,
    Raid10,
}

impl BtrfsRaidLevel {
    pub fn min_members(self) -> usize {
        match self {
            BtrfsRaidLevel::Single => 1,
            BtrfsRaidLevel::Raid0 => 2,
            BtrfsRaidLevel::Raid1 => 2,
            BtrfsRaidLevel::Raid10 => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BtrfsVolumeDevice {
    pub data_level: BtrfsRaidLevel,
    pub metadata_level: BtrfsRaidLevel,
    pub label: Option<String>,
}

impl BtrfsVolumeDevice {
    pub fn new(data_level: BtrfsRaidLevel, metadata_level: BtrfsRaidLevel) -> Self {
        BtrfsVolumeDevice { data_level, metadata_level, label: None }
    }

    pub fn has_enough_members(&self, member_count: usize) -> bool {
        member_count >= self.data_level.min_members() && member_count >= self.metadata_level.min_members()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BtrfsSubVolumeDevice {
    pub subvol_id: Option<u64>,
    pub is_snapshot: bool,
    /// Uuid of the volume this subvolume belongs to, carried here (rather
    /// than looked up through `parents`) because `device_id` (spec §6,
    /// `BTRFS-<vol-uuid>-<subvol-name>`) needs it without a tree reference.
    pub volume_uuid: Option<uuid::Uuid>,
    /// Subvolume id this one is a point-in-time snapshot of, if any.
    pub snapshot_source: Option<u64>,
}

impl BtrfsSubVolumeDevice {
    pub fn new() -> Self {
        BtrfsSubVolumeDevice { subvol_id: None, is_snapshot: false, volume_uuid: None, snapshot_source: None }
    }
}

impl Default for BtrfsSubVolumeDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raid1_needs_two_members() {
        let vol = BtrfsVolumeDevice::new(BtrfsRaidLevel::Raid1, BtrfsRaidLevel::Raid1);
        assert!(!vol.has_enough_members(1));
        assert!(vol.has_enough_members(2));
    }
}
