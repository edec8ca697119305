//! LVM physical volume format: marks a device as a member of a volume group.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LvmPvFormat {
    pub vg_name: Option<String>,
    pub vg_uuid: Option<uuid::Uuid>,
    /// Index of this PV within its VG's member list, assigned by LVM
    /// metadata (`pvs`-equivalent), not by discovery order.
    pub pe_start_sector: u64,
}

impl LvmPvFormat {
    pub fn new() -> Self {
        LvmPvFormat { vg_name: None, vg_uuid: None, pe_start_sector: 0 }
    }
}

impl Default for LvmPvFormat {
    fn default() -> Self {
        Self::new()
    }
}
