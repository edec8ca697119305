//! The format graph's leaf type: what is written to a device, as opposed to
//! the device itself.
//!
//! Mirrors the device/kind split in [`crate::device`]: [`Format`] holds the
//! fields every format shares (uuid, label, existence), [`FormatKind`] holds
//! the subtype payload.

pub mod btrfsmember;
pub mod disklabel;
pub mod filesystem;
pub mod luks;
pub mod lvmpv;
pub mod mdmember;
pub mod misc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    pub uuid: Option<uuid::Uuid>,
    pub label: Option<String>,
    pub exists: bool,
    pub kind: FormatKind,
}

impl Format {
    pub fn new(kind: FormatKind) -> Self {
        Format { uuid: None, label: None, exists: false, kind }
    }

    /// The blank format attached to a freshly-constructed [`crate::device::Device`]
    /// before a format is assigned, equivalent to blivet's `None` formats
    /// list entries being absent rather than present-but-empty.
    pub fn unformatted() -> Self {
        Format::new(FormatKind::Unformatted)
    }

    pub fn is_unformatted(&self) -> bool {
        matches!(self.kind, FormatKind::Unformatted)
    }
}

/// The subtype-specific payload of a [`Format`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatKind {
    Unformatted,
    DiskLabel(disklabel::DiskLabelFormat),
    Filesystem(filesystem::FilesystemFormat),
    Luks(luks::LuksFormat),
    LvmPv(lvmpv::LvmPvFormat),
    MdMember(mdmember::MdMemberFormat),
    BtrfsMember(btrfsmember::BtrfsMemberFormat),
    Swap(misc::SwapFormat),
    Integrity(misc::IntegrityFormat),
    Bitlk(misc::BitlkFormat),
}

impl FormatKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            FormatKind::Unformatted => "unformatted",
            FormatKind::DiskLabel(inner) => inner.label_type.type_name(),
            FormatKind::Filesystem(inner) => inner.fstype.type_name(),
            FormatKind::Luks(_) => "luks",
            FormatKind::LvmPv(_) => "lvmpv",
            FormatKind::MdMember(_) => "mdmember",
            FormatKind::BtrfsMember(_) => "btrfs",
            FormatKind::Swap(_) => "swap",
            FormatKind::Integrity(_) => "integrity",
            FormatKind::Bitlk(_) => "BitLocker",
        }
    }
}
