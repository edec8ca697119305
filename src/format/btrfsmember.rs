//! BTRFS member format: marks a device as belonging to a BTRFS volume.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BtrfsMemberFormat {
    pub volume_uuid: Option<uuid::Uuid>,
    pub device_id: Option<u64>,
}

impl BtrfsMemberFormat {
    pub fn new() -> Self {
        BtrfsMemberFormat { volume_uuid: None, device_id: None }
    }
}

impl Default for BtrfsMemberFormat {
    fn default() -> Self {
        Self::new()
    }
}
