//! MD RAID member format: marks a device as belonging to an array.

use crate::device::md::MdLevel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdMemberFormat {
    pub array_uuid: Option<String>,
    pub level: Option<MdLevel>,
    /// This member's position in the array, or `None` for a spare.
    pub slot: Option<u32>,
}

impl MdMemberFormat {
    pub fn new() -> Self {
        MdMemberFormat { array_uuid: None, level: None, slot: None }
    }

    pub fn is_spare(&self) -> bool {
        self.slot.is_none()
    }
}

impl Default for MdMemberFormat {
    fn default() -> Self {
        Self::new()
    }
}
