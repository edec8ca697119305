//! Partition tables (disklabels).
//!
//! Grounded on `original_source/blivet/formats/disklabel.py`'s `DiskLabel`:
//! an in-memory partition list plus `add_partition`/`remove_partition` that
//! validate against the label's own geometry limits before `commit_to_disk`
//! (here: before the populator/action layer marks the change as applied).
//! Actually invoking `parted`/`sfdisk` is out of scope (spec Non-goals); this
//! type only tracks what the table *would* contain.

use crate::device::partition::PartitionType;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelType {
    Gpt,
    Msdos,
    /// PReP boot / Apple partition map and other less common labels blivet
    /// still recognizes; keeps the type total without sprouting a case per
    /// rare label.
    Other,
}

impl LabelType {
    pub fn type_name(&self) -> &'static str {
        match self {
            LabelType::Gpt => "gpt",
            LabelType::Msdos => "msdos",
            LabelType::Other => "disklabel",
        }
    }

    /// Maximum number of primary-slot entries this label can hold before
    /// an extended partition (msdos) or further GPT entries become
    /// necessary. GPT's limit here is the common 128-entry default; msdos is
    /// always 4 primary slots.
    pub fn max_primary_partitions(&self) -> usize {
        match self {
            LabelType::Gpt => 128,
            LabelType::Msdos => 4,
            LabelType::Other => 4,
        }
    }

    pub fn supports_extended_partitions(&self) -> bool {
        matches!(self, LabelType::Msdos)
    }
}

/// One entry as tracked in-memory by a [`DiskLabelFormat`], prior to being
/// committed. `device_id` is left to the caller (the tree links a
/// [`crate::device::partition::PartitionDevice`] back to its containing
/// disk, not the other way around); this just tracks reserved geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionEntry {
    pub part_type: PartitionType,
    pub start_sector: u64,
    pub end_sector: u64,
}

impl PartitionEntry {
    fn overlaps(&self, other: &PartitionEntry) -> bool {
        self.start_sector <= other.end_sector && other.start_sector <= self.end_sector
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskLabelFormat {
    pub label_type: LabelType,
    pub sector_size: u64,
    pub disk_size_sectors: u64,
    entries: Vec<PartitionEntry>,
    /// `true` once `commit` has recorded a pending in-memory change that a
    /// caller still needs to push out via `commit_to_disk`.
    dirty: bool,
}

impl DiskLabelFormat {
    pub fn new(label_type: LabelType, sector_size: u64, disk_size_sectors: u64) -> Self {
        DiskLabelFormat {
            label_type,
            sector_size,
            disk_size_sectors,
            entries: Vec::new(),
            dirty: false,
        }
    }

    pub fn partitions(&self) -> &[PartitionEntry] {
        &self.entries
    }

    /// Validates `entry` against label geometry and existing entries, then
    /// stages it. Does not touch any backing storage; `commit_to_disk`
    /// represents that separate, out-of-scope step.
    pub fn add_partition(&mut self, entry: PartitionEntry) -> Result<()> {
        if entry.start_sector > entry.end_sector {
            return Err(Error::InvalidDiskLabel(
                std::path::PathBuf::new(),
                "partition start sector after end sector".to_string(),
            ));
        }
        if entry.end_sector >= self.disk_size_sectors {
            return Err(Error::InvalidDiskLabel(
                std::path::PathBuf::new(),
                "partition extends past end of disk".to_string(),
            ));
        }
        if entry.part_type == PartitionType::Extended && !self.label_type.supports_extended_partitions() {
            return Err(Error::InvalidDiskLabel(
                std::path::PathBuf::new(),
                format!("{} does not support extended partitions", self.label_type.type_name()),
            ));
        }
        if self.entries.iter().any(|existing| existing.overlaps(&entry)) {
            return Err(Error::InvalidDiskLabel(
                std::path::PathBuf::new(),
                "overlapping partition geometry".to_string(),
            ));
        }
        let primary_count = self
            .entries
            .iter()
            .filter(|e| e.part_type != PartitionType::Logical)
            .count()
            + usize::from(entry.part_type != PartitionType::Logical);
        if primary_count > self.label_type.max_primary_partitions() {
            return Err(Error::InvalidDiskLabel(
                std::path::PathBuf::new(),
                format!("{} has no free primary slot", self.label_type.type_name()),
            ));
        }

        self.entries.push(entry);
        self.entries.sort_by_key(|e| e.start_sector);
        self.dirty = true;
        Ok(())
    }

    pub fn remove_partition(&mut self, entry: PartitionEntry) -> Result<()> {
        let before = self.entries.len();
        self.entries.retain(|e| *e != entry);
        if self.entries.len() == before {
            return Err(Error::device("no such partition in this disklabel"));
        }
        self.dirty = true;
        Ok(())
    }

    /// Clears the dirty flag a caller sets after actually pushing staged
    /// changes to storage. A no-op in this crate (no storage is touched)
    /// beyond bookkeeping the transition for tests and populator logic that
    /// wants to know whether a reread is warranted.
    pub fn commit_to_disk(&mut self) {
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gpt(sectors: u64) -> DiskLabelFormat {
        DiskLabelFormat::new(LabelType::Gpt, 512, sectors)
    }

    #[test]
    fn rejects_overlap() {
        let mut label = gpt(1_000_000);
        label
            .add_partition(PartitionEntry { part_type: PartitionType::Primary, start_sector: 2048, end_sector: 4095 })
            .unwrap();
        let result = label.add_partition(PartitionEntry {
            part_type: PartitionType::Primary,
            start_sector: 4000,
            end_sector: 5000,
        });
        assert!(result.is_err());
    }

    #[test]
    fn rejects_extended_on_gpt() {
        let mut label = gpt(1_000_000);
        let result = label.add_partition(PartitionEntry {
            part_type: PartitionType::Extended,
            start_sector: 2048,
            end_sector: 4095,
        });
        assert!(result.is_err());
    }

    #[test]
    fn msdos_primary_slot_limit() {
        let mut label = DiskLabelFormat::new(LabelType::Msdos, 512, 1_000_000);
        for i in 0..4 {
            let start = 2048 + i * 2048;
            label
                .add_partition(PartitionEntry { part_type: PartitionType::Primary, start_sector: start, end_sector: start + 2047 })
                .unwrap();
        }
        let start = 2048 + 4 * 2048;
        let result = label.add_partition(PartitionEntry { part_type: PartitionType::Primary, start_sector: start, end_sector: start + 2047 });
        assert!(result.is_err());
    }

    #[test]
    fn add_then_remove_clears_entry() {
        let mut label = gpt(1_000_000);
        let entry = PartitionEntry { part_type: PartitionType::Primary, start_sector: 2048, end_sector: 4095 };
        label.add_partition(entry).unwrap();
        assert!(label.is_dirty());
        label.commit_to_disk();
        assert!(!label.is_dirty());
        label.remove_partition(entry).unwrap();
        assert!(label.partitions().is_empty());
    }
}
