//! End-to-end discovery scenarios.
//!
//! Each test builds the flat descriptor list a real binary crate would hand
//! `populate` after walking udev, and checks the resulting tree shape. These
//! mirror the scenarios blivet's own populator test fixtures exercise:
//! a plain GPT+ext4 disk, an LVM PV/VG/LV stack, an MD RAID1 mirror, a
//! corrupt GPT, a LUKS-locked partition, and a two-member BTRFS volume.

use std::collections::HashMap;

use devgraph::device::{Device, DeviceKind};
use devgraph::ops::fake::FakeCryptoOps;
use devgraph::populator::context::PopulatorConfig;
use devgraph::populator::descriptor::Descriptor;
use devgraph::populator::helpers::btrfs::SubvolumeInfo;
use devgraph::populator::helpers::luks;
use devgraph::populator::helpers::lvm::LvInfo;
use devgraph::populator::populate;
use devgraph::size::Size;
use devgraph::tree::DeviceTree;

#[test]
fn s1_gpt_disk_with_ext4_partition() {
    let descriptors = vec![
        Descriptor::disk("sda", Size::from_gib(20)).with_fs("gpt"),
        Descriptor::partition("sda1", "/sys/block/sda", Size::from_gib(19)).with_fs("ext4"),
    ];
    let mut tree = DeviceTree::new();
    let report = populate(&mut tree, &descriptors, &PopulatorConfig::default()).unwrap();

    assert_eq!(report.devices_added, 2);
    let (disk_id, disk) = tree.get_by_name("sda", false).unwrap();
    assert_eq!(disk.format.kind.type_name(), "gpt");
    let (_, partition) = tree.get_by_name("sda1", false).unwrap();
    assert_eq!(partition.format.kind.type_name(), "ext4");
    assert_eq!(tree.get_children(disk_id), vec![tree.get_by_name("sda1", false).unwrap().0]);
}

#[test]
fn s2_lvm_pv_vg_lv_stack() {
    // Two PVs sharing a VG name, as a downstream binary's metadata parser
    // would set after reading real LVM metadata (this crate's own
    // descriptor-driven LvmPvHelper only knows the VG's uuid, not its name --
    // see devgraph::populator::helpers::format::LvmPvHelper), plus an
    // `lv_info` cache standing in for `lvs`-equivalent output.
    use devgraph::format::lvmpv::LvmPvFormat;
    use devgraph::format::{Format, FormatKind};

    let mut tree = DeviceTree::new();
    for name in ["sdb1", "sdb2"] {
        let mut pv = LvmPvFormat::new();
        pv.vg_name = Some("vg_data".to_string());
        let mut d = Device::new(
            name,
            Size::from_gib(25),
            DeviceKind::Disk(devgraph::device::disk::DiskDevice::new(devgraph::device::disk::DiskKind::Local)),
        );
        d.format = Format::new(FormatKind::LvmPv(pv));
        tree.add_device(d).unwrap();
    }

    let lv_uuid = uuid::Uuid::from_u128(0x1234);
    let mut lv_info = HashMap::new();
    lv_info.insert(
        "vg_data-root".to_string(),
        LvInfo {
            lv_name: "root".to_string(),
            vg_name: "vg_data".to_string(),
            uuid: lv_uuid,
            attr: "-wi-ao----".to_string(),
            size: Size::from_gib(20),
            segtype: Some("linear".to_string()),
            origin: None,
            pool_name: None,
        },
    );

    let created = devgraph::populator::helpers::lvm::assemble_volume_groups(&mut tree, &lv_info).unwrap();
    assert_eq!(created.len(), 2);

    let (vg_id, vg) = tree.get_by_name("vg_data", false).unwrap();
    assert!(matches!(vg.kind, DeviceKind::LvmVolumeGroup(_)));
    assert_eq!(vg.parents.len(), 2);

    let (root_id, root) = tree.get_by_name("root", false).unwrap();
    assert!(matches!(root.kind, DeviceKind::LvmLogicalVolume(_)));
    assert!(root.parents.contains(vg_id));
    assert_eq!(root.size, Size::from_gib(20));
    assert_eq!(root.device_id, format!("LVM-{lv_uuid}"));
    assert_eq!(tree.get_children(vg_id), vec![root_id]);
}

#[test]
fn s3_md_raid1_mirror() {
    let mut tree = DeviceTree::new();
    let sdc_id = tree
        .add_device({
            let mut d = Device::new("sdc", Size::from_gib(10), DeviceKind::Disk(devgraph::device::disk::DiskDevice::new(devgraph::device::disk::DiskKind::Local)));
            d.format = devgraph::format::Format::new(devgraph::format::FormatKind::MdMember({
                let mut m = devgraph::format::mdmember::MdMemberFormat::new();
                m.array_uuid = Some("array-1".to_string());
                m.level = Some(devgraph::device::md::MdLevel::Raid1);
                m.slot = Some(0);
                m
            }));
            d
        })
        .unwrap();
    let sdd_id = tree
        .add_device({
            let mut d = Device::new("sdd", Size::from_gib(10), DeviceKind::Disk(devgraph::device::disk::DiskDevice::new(devgraph::device::disk::DiskKind::Local)));
            d.format = devgraph::format::Format::new(devgraph::format::FormatKind::MdMember({
                let mut m = devgraph::format::mdmember::MdMemberFormat::new();
                m.array_uuid = Some("array-1".to_string());
                m.level = Some(devgraph::device::md::MdLevel::Raid1);
                m.slot = Some(1);
                m
            }));
            d
        })
        .unwrap();

    let created = devgraph::populator::helpers::md::assemble_arrays(&mut tree).unwrap();
    assert_eq!(created.len(), 1);
    let array = tree.get(created[0]).unwrap();
    assert!(array.parents.contains(sdc_id));
    assert!(array.parents.contains(sdd_id));
}

#[test]
fn s4_corrupt_gpt_is_reported_not_panicked() {
    use devgraph::format::disklabel::{DiskLabelFormat, LabelType, PartitionEntry};
    use devgraph::device::partition::PartitionType;

    let mut label = DiskLabelFormat::new(LabelType::Gpt, 512, 1_000_000);
    label
        .add_partition(PartitionEntry { part_type: PartitionType::Primary, start_sector: 2048, end_sector: 4095 })
        .unwrap();
    let overlapping = label.add_partition(PartitionEntry {
        part_type: PartitionType::Primary,
        start_sector: 4000,
        end_sector: 5000,
    });
    assert!(overlapping.is_err());
    assert_eq!(label.partitions().len(), 1);
}

#[test]
fn s5_luks_partition_unlocks_with_passphrase() {
    use devgraph::format::luks::{LuksFormat, LuksVersion};
    use devgraph::format::{Format, FormatKind};

    let mut tree = DeviceTree::new();
    let locked_id = tree
        .add_device({
            let mut d = Device::new(
                "sde2",
                Size::from_gib(30),
                DeviceKind::Disk(devgraph::device::disk::DiskDevice::new(devgraph::device::disk::DiskKind::Local)),
            );
            d.format = Format::new(FormatKind::Luks(LuksFormat::new(LuksVersion::Luks2)));
            d
        })
        .unwrap();

    let crypto = FakeCryptoOps::default();
    let mapped_id = luks::unlock(&mut tree, &crypto, locked_id, "correct horse battery staple").unwrap();
    let mapped = tree.get(mapped_id).unwrap();
    assert!(matches!(mapped.kind, DeviceKind::Dm(_)));
    assert!(mapped.parents.contains(locked_id));
}

#[test]
fn s6_btrfs_two_member_volume_and_subvolume() {
    use devgraph::format::btrfsmember::BtrfsMemberFormat;
    use devgraph::format::{Format, FormatKind};
    use devgraph::populator::helpers::btrfs::TOP_LEVEL_SUBVOL_ID;

    let volume_uuid = uuid::Uuid::from_u128(42);
    let mut tree = DeviceTree::new();
    for name in ["sdf1", "sdg1"] {
        let mut member = BtrfsMemberFormat::new();
        member.volume_uuid = Some(volume_uuid);
        let mut d = Device::new(
            name,
            Size::from_gib(15),
            DeviceKind::Disk(devgraph::device::disk::DiskDevice::new(devgraph::device::disk::DiskKind::Local)),
        );
        d.format = Format::new(FormatKind::BtrfsMember(member));
        tree.add_device(d).unwrap();
    }

    let mut subvolumes = HashMap::new();
    subvolumes.insert(
        volume_uuid,
        vec![SubvolumeInfo { id: 256, path: "@home".to_string(), parent_id: TOP_LEVEL_SUBVOL_ID, snapshot_source: None }],
    );

    let created = devgraph::populator::helpers::btrfs::assemble_volumes(&mut tree, &subvolumes).unwrap();
    assert_eq!(created.len(), 2);
    let volume_id = created[0];
    assert!(matches!(tree.get(volume_id).unwrap().kind, DeviceKind::BtrfsVolume(_)));

    let (subvol_id, subvol) = tree.get_by_name("@home", false).unwrap();
    assert!(matches!(&subvol.kind, DeviceKind::BtrfsSubVolume(s) if s.subvol_id == Some(256)));
    assert_eq!(tree.get_children(volume_id), vec![subvol_id]);
}

/// (device_id, size, format type name, format uuid, parents as device_ids)
/// for every device in `tree`, sorted by device_id -- the comparison key
/// the round-trip invariant is defined over, since raw `DeviceId`s aren't
/// stable across two separate populate calls.
fn identity_snapshot(tree: &DeviceTree) -> Vec<(String, Size, &'static str, Option<uuid::Uuid>, Vec<String>)> {
    let mut rows: Vec<_> = tree
        .names(true)
        .into_iter()
        .map(|name| {
            let (_, device) = tree.get_by_name(name, true).unwrap();
            let mut parent_ids: Vec<String> =
                device.parents.iter().filter_map(|p| tree.get(p)).map(|p| p.device_id.clone()).collect();
            parent_ids.sort();
            (device.device_id.clone(), device.size, device.format.kind.type_name(), device.format.uuid, parent_ids)
        })
        .collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    rows
}

#[test]
fn s7_populate_is_round_trip_stable() {
    let descriptors = vec![
        Descriptor::disk("sda", Size::from_gib(20)).with_fs("gpt"),
        Descriptor::partition("sda1", "/sys/block/sda", Size::from_gib(19)).with_fs("ext4"),
    ];

    let mut first = DeviceTree::new();
    populate(&mut first, &descriptors, &PopulatorConfig::default()).unwrap();

    let mut second = DeviceTree::new();
    populate(&mut second, &descriptors, &PopulatorConfig::default()).unwrap();

    assert_eq!(identity_snapshot(&first), identity_snapshot(&second));
}
