//! Format-populator helpers.
//!
//! Parallel to [`super::device::DevicePopulator`]: each helper claims a
//! descriptor's `fs_type`/`dm_uuid` signature and attaches the matching
//! [`crate::format::Format`] to the device already created for that
//! descriptor. Container-membership formats (LVM PV, MD member, BTRFS
//! member) additionally seed a cascade helper's bookkeeping so a later pass
//! can assemble the VG/array/volume they belong to.

use crate::format::disklabel::{DiskLabelFormat, LabelType};
use crate::format::filesystem::{FilesystemFormat, FsType};
use crate::format::luks::{LuksFormat, LuksVersion};
use crate::format::lvmpv::LvmPvFormat;
use crate::format::mdmember::MdMemberFormat;
use crate::format::misc::SwapFormat;
use crate::format::{Format, FormatKind};
use crate::populator::descriptor::Descriptor;

/// A format-populator helper.
pub trait FormatPopulator {
    fn matches(&self, descriptor: &Descriptor) -> bool;
    fn build(&self, descriptor: &Descriptor) -> Format;
}

struct DiskLabelHelper;

impl FormatPopulator for DiskLabelHelper {
    fn matches(&self, descriptor: &Descriptor) -> bool {
        matches!(descriptor.fs_type.as_deref(), Some("gpt") | Some("dos") | Some("msdos"))
    }

    fn build(&self, descriptor: &Descriptor) -> Format {
        let label_type = match descriptor.fs_type.as_deref() {
            Some("gpt") => LabelType::Gpt,
            Some("dos") | Some("msdos") => LabelType::Msdos,
            _ => LabelType::Other,
        };
        let sectors = descriptor.size.sectors(descriptor.sector_size);
        let disklabel = DiskLabelFormat::new(label_type, descriptor.sector_size, sectors);
        let mut format = Format::new(FormatKind::DiskLabel(disklabel));
        format.exists = true;
        format
    }
}

struct LvmPvHelper;

impl FormatPopulator for LvmPvHelper {
    fn matches(&self, descriptor: &Descriptor) -> bool {
        descriptor.fs_type.as_deref() == Some("LVM2_member")
    }

    fn build(&self, descriptor: &Descriptor) -> Format {
        let mut pv = LvmPvFormat::new();
        pv.vg_uuid = descriptor.fs_uuid;
        let mut format = Format::new(FormatKind::LvmPv(pv));
        format.exists = true;
        format
    }
}

struct MdMemberHelper;

impl FormatPopulator for MdMemberHelper {
    fn matches(&self, descriptor: &Descriptor) -> bool {
        descriptor.fs_type.as_deref() == Some("linux_raid_member")
    }

    fn build(&self, descriptor: &Descriptor) -> Format {
        let mut member = MdMemberFormat::new();
        member.array_uuid = descriptor.fs_uuid.map(|u| u.to_string());
        let mut format = Format::new(FormatKind::MdMember(member));
        format.exists = true;
        format
    }
}

struct LuksHelper;

impl FormatPopulator for LuksHelper {
    fn matches(&self, descriptor: &Descriptor) -> bool {
        matches!(descriptor.fs_type.as_deref(), Some("crypto_LUKS"))
    }

    fn build(&self, descriptor: &Descriptor) -> Format {
        let luks = LuksFormat::new(LuksVersion::Luks2);
        let mut format = Format::new(FormatKind::Luks(luks));
        format.uuid = descriptor.fs_uuid;
        format.exists = true;
        format
    }
}

struct SwapHelper;

impl FormatPopulator for SwapHelper {
    fn matches(&self, descriptor: &Descriptor) -> bool {
        descriptor.fs_type.as_deref() == Some("swap")
    }

    fn build(&self, descriptor: &Descriptor) -> Format {
        let mut format = Format::new(FormatKind::Swap(SwapFormat::default()));
        format.uuid = descriptor.fs_uuid;
        format.exists = true;
        format
    }
}

struct FilesystemHelper;

impl FormatPopulator for FilesystemHelper {
    fn matches(&self, descriptor: &Descriptor) -> bool {
        matches!(
            descriptor.fs_type.as_deref(),
            Some("ext2") | Some("ext3") | Some("ext4") | Some("xfs") | Some("btrfs") | Some("vfat") | Some("ntfs")
        )
    }

    fn build(&self, descriptor: &Descriptor) -> Format {
        let fstype = match descriptor.fs_type.as_deref() {
            Some("ext2") => FsType::Ext2,
            Some("ext3") => FsType::Ext3,
            Some("ext4") => FsType::Ext4,
            Some("xfs") => FsType::Xfs,
            Some("btrfs") => FsType::Btrfs,
            Some("vfat") => FsType::Vfat,
            Some("ntfs") => FsType::Ntfs,
            _ => unreachable!("matches() only accepts the types handled above"),
        };
        let mut fs = FilesystemFormat::new(fstype);
        fs.fstab.mountpoint = None;
        let mut format = Format::new(FormatKind::Filesystem(fs));
        format.uuid = descriptor.fs_uuid;
        format.label = descriptor.fs_label.clone();
        format.exists = true;
        format
    }
}

pub fn format_helpers() -> Vec<Box<dyn FormatPopulator>> {
    vec![
        Box::new(DiskLabelHelper),
        Box::new(LvmPvHelper),
        Box::new(MdMemberHelper),
        Box::new(LuksHelper),
        Box::new(SwapHelper),
        Box::new(FilesystemHelper),
    ]
}
