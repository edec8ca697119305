//! LVM cascade: once enough PV-format members carrying the same VG identity
//! have been discovered, assemble the volume group device and its logical
//! volumes (spec §4.3's iterative "container assembly" step, grounded on
//! `original_source/blivet/populator/helpers/lvm.py`'s PV-then-VG-then-LV
//! handling).
//!
//! LV creation is driven by an `lv_info` cache the same shape spec §4.3/§8
//! describes a real binary crate filling in from `lvs`-equivalent output
//! (this crate never invokes `lvm` itself, per the tool-boundary Non-goal);
//! an empty cache degrades to VG-only assembly.

use std::collections::{HashMap, HashSet};

use crate::device::lvm::{LvSubtype, LvmLogicalVolumeDevice, LvmVolumeGroupDevice};
use crate::device::{Device, DeviceId, DeviceKind, Lifecycle};
use crate::error::Result;
use crate::format::FormatKind;
use crate::size::Size;
use crate::tree::DeviceTree;

/// One `lvs`-equivalent row: everything spec §4.3 step 4 needs to decide an
/// LV's subtype and wiring, keyed in the cache by whatever identifier a real
/// binary crate's metadata reader uses (e.g. `"vg0-root"`), not by
/// `lv_name` alone, since a bare `lv_name` can repeat across VGs.
#[derive(Debug, Clone)]
pub struct LvInfo {
    pub lv_name: String,
    pub vg_name: String,
    pub uuid: uuid::Uuid,
    /// LVM attribute string (`lvs -o lv_attr` shape, e.g. `"-wi-ao----"`).
    /// Only the first character is consulted, per spec §4.3 step 4's table.
    pub attr: String,
    pub size: Size,
    pub segtype: Option<String>,
    /// `blockdev.lvm.lvorigin`-equivalent: set for snapshot LVs.
    pub origin: Option<String>,
    /// Owning thin/VDO pool, for thin and VDO LVs.
    pub pool_name: Option<String>,
}

fn classify(info: &LvInfo) -> LvSubtype {
    let first = info.attr.chars().next().unwrap_or('-');
    match first {
        't' => LvSubtype::ThinPool { chunk_size: Size::from_kib(64) },
        'V' => match &info.origin {
            Some(origin) => LvSubtype::Snapshot { origin_name: origin.clone() },
            None => LvSubtype::Thin { pool_name: info.pool_name.clone().unwrap_or_default() },
        },
        's' | 'S' => LvSubtype::Snapshot { origin_name: info.origin.clone().unwrap_or_default() },
        'd' => LvSubtype::VdoPool,
        'v' if info.segtype.as_deref() == Some("vdo") => {
            LvSubtype::Vdo { pool_name: info.pool_name.clone().unwrap_or_default() }
        }
        'i' | 'r' | 'e' | 'I' | 'l' | 'T' | 'C' | 'o' if info.lv_name.ends_with(']') => {
            LvSubtype::Internal { role: first.to_string() }
        }
        _ => LvSubtype::Linear,
    }
}

fn is_internal(info: &LvInfo) -> bool {
    matches!(classify(info), LvSubtype::Internal { .. })
}

/// Suffixes LVM appends to an internal LV's bracketed name to derive the
/// visible LV it belongs to (`[root_tmeta]` belongs to `root`).
const INTERNAL_SUFFIXES: &[&str] =
    &["_tdata", "_tmeta", "_pmspare", "_cdata", "_cmeta", "_vdata", "_rimage_0", "_rimage_1", "_rmeta_0", "_rmeta_1"];

/// Finds the visible LV an internal LV's bracketed name (`[root_tmeta]`)
/// belongs to, among the LVs already created in this VG (spec §4.3 step 4).
fn determine_parent_lv(internal_name: &str, created: &HashMap<String, DeviceId>) -> Option<DeviceId> {
    let stripped = internal_name.trim_start_matches('[').trim_end_matches(']');
    INTERNAL_SUFFIXES
        .iter()
        .find_map(|suffix| stripped.strip_suffix(suffix).and_then(|owner| created.get(owner)))
        .copied()
}

/// Creates one [`LvmLogicalVolumeDevice`] per `lv_info` entry whose
/// `vg_name` matches `vg_name`, in two passes: ordinary/pool/snapshot/VDO
/// LVs first (parented directly on the VG), then internal LVs (parented on
/// the visible LV [`determine_parent_lv`] resolves, falling back to the VG
/// if none is found). Unmatched internals are not discarded by this
/// function -- they're simply parented on the VG, since this crate has no
/// notion of a caller to hand an orphan off to; a real binary crate that
/// wants spec §4.3's "discard" behavior can filter its `lv_info` cache
/// before calling this.
fn create_logical_volumes(tree: &mut DeviceTree, vg_id: DeviceId, vg_name: &str, lv_info: &HashMap<String, LvInfo>) -> Result<Vec<DeviceId>> {
    let mut created = Vec::new();
    let mut by_name: HashMap<String, DeviceId> = HashMap::new();

    let mut ours: Vec<&LvInfo> = lv_info.values().filter(|lv| lv.vg_name == vg_name).collect();
    ours.sort_by(|a, b| a.lv_name.cmp(&b.lv_name));

    for info in ours.iter().filter(|lv| !is_internal(lv)) {
        if tree.get_by_name(&info.lv_name, true).is_some() {
            continue;
        }
        let mut lv = LvmLogicalVolumeDevice::new(classify(info));
        if let Some(segtype) = &info.segtype {
            lv.segment_type = segtype.clone();
        }
        let mut device = Device::new(info.lv_name.clone(), info.size, DeviceKind::LvmLogicalVolume(lv));
        device.uuid = Some(info.uuid);
        device.exists = true;
        device.lifecycle = Lifecycle::Active;
        device.observe_current_size();
        device.parents.append(vg_id, |_| Ok(()))?;
        let id = tree.add_device(device)?;
        by_name.insert(info.lv_name.clone(), id);
        created.push(id);
    }

    for info in ours.iter().filter(|lv| is_internal(lv)) {
        if tree.get_by_name(&info.lv_name, true).is_some() {
            continue;
        }
        let mut lv = LvmLogicalVolumeDevice::new(classify(info));
        if let Some(segtype) = &info.segtype {
            lv.segment_type = segtype.clone();
        }
        let mut device = Device::new(info.lv_name.clone(), info.size, DeviceKind::LvmLogicalVolume(lv));
        device.uuid = Some(info.uuid);
        device.exists = true;
        device.lifecycle = Lifecycle::Active;
        device.observe_current_size();
        let parent = determine_parent_lv(&info.lv_name, &by_name).unwrap_or(vg_id);
        device.parents.append(parent, |_| Ok(()))?;
        let id = tree.add_device(device)?;
        created.push(id);
    }

    Ok(created)
}

/// Scans `tree` for devices formatted as an unclaimed LVM PV sharing a VG
/// identity with at least one other such device (or standing alone -- a
/// single-PV VG is legal), creates one [`LvmVolumeGroupDevice`] per identity
/// found with those PVs as parents, then creates any logical volumes
/// `lv_info` names for that VG. Returns every id created (VG and LVs both).
///
/// Idempotent: a VG already present in the tree (matched by name) is left
/// alone and its devices are skipped on subsequent calls; an LV already
/// present by name is likewise skipped.
pub fn assemble_volume_groups(tree: &mut DeviceTree, lv_info: &HashMap<String, LvInfo>) -> Result<Vec<DeviceId>> {
    let mut by_vg: HashMap<String, Vec<DeviceId>> = HashMap::new();
    let existing_vgs: HashSet<String> = tree
        .names(false)
        .iter()
        .filter(|name| tree.get_by_name(name, false).map(|(_, d)| matches!(d.kind, DeviceKind::LvmVolumeGroup(_))).unwrap_or(false))
        .map(|n| n.to_string())
        .collect();

    for name in tree.names(false) {
        let Some((id, device)) = tree.get_by_name(name, false) else { continue };
        if let FormatKind::LvmPv(pv) = &device.format.kind {
            if let Some(vg_name) = &pv.vg_name {
                if !existing_vgs.contains(vg_name) {
                    by_vg.entry(vg_name.clone()).or_default().push(id);
                }
            } else if let Some(vg_uuid) = pv.vg_uuid {
                // No name yet (bare uuid discovered before label parsed):
                // group under the uuid string so same-uuid PVs still merge.
                by_vg.entry(vg_uuid.to_string()).or_default().push(id);
            }
        }
    }

    let mut created = Vec::new();
    for (vg_name, members) in by_vg {
        let total_size = members.iter().filter_map(|id| tree.get(*id)).fold(Size::from_bytes(0), |acc, d| acc + d.size);
        let mut vg = LvmVolumeGroupDevice::new(Size::from_mib(4));
        vg.pv_count = members.len();
        let member_count = members.len();

        let mut device = Device::new(vg_name.clone(), total_size, DeviceKind::LvmVolumeGroup(vg));
        device.exists = true;
        device.lifecycle = Lifecycle::Active;
        device.observe_current_size();
        for member in &members {
            device.parents.append(*member, |_| Ok(()))?;
        }
        let vg_id = tree.add_device(device)?;
        created.push(vg_id);
        log::debug!("assembled volume group from {member_count} member(s)");

        created.extend(create_logical_volumes(tree, vg_id, &vg_name, lv_info)?);
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::disk::{DiskDevice, DiskKind};
    use crate::format::{lvmpv::LvmPvFormat, Format, FormatKind};

    fn pv_device(name: &str, vg_name: &str) -> Device {
        let mut device = Device::new(name, Size::from_gib(5), DeviceKind::Disk(DiskDevice::new(DiskKind::Local)));
        let mut pv = LvmPvFormat::new();
        pv.vg_name = Some(vg_name.to_string());
        device.format = Format::new(FormatKind::LvmPv(pv));
        device
    }

    #[test]
    fn assembles_vg_from_two_pvs() {
        let mut tree = DeviceTree::new();
        tree.add_device(pv_device("sda1", "vg0")).unwrap();
        tree.add_device(pv_device("sdb1", "vg0")).unwrap();

        let created = assemble_volume_groups(&mut tree, &HashMap::new()).unwrap();
        assert_eq!(created.len(), 1);
        let (_, vg) = tree.get_by_name("vg0", false).unwrap();
        assert_eq!(vg.parents.len(), 2);
    }

    #[test]
    fn is_idempotent() {
        let mut tree = DeviceTree::new();
        tree.add_device(pv_device("sda1", "vg0")).unwrap();
        tree.add_device(pv_device("sdb1", "vg0")).unwrap();

        assemble_volume_groups(&mut tree, &HashMap::new()).unwrap();
        let second_pass = assemble_volume_groups(&mut tree, &HashMap::new()).unwrap();
        assert!(second_pass.is_empty());
    }

    #[test]
    fn creates_ordinary_lv_from_lv_info_cache() {
        let mut tree = DeviceTree::new();
        tree.add_device(pv_device("sda1", "vg0")).unwrap();
        tree.add_device(pv_device("sdb1", "vg0")).unwrap();

        let mut lv_info = HashMap::new();
        let lv_uuid = uuid::Uuid::from_u128(0xaa);
        lv_info.insert(
            "vg0-root".to_string(),
            LvInfo {
                lv_name: "root".to_string(),
                vg_name: "vg0".to_string(),
                uuid: lv_uuid,
                attr: "-wi-ao----".to_string(),
                size: Size::from_gib(1),
                segtype: Some("linear".to_string()),
                origin: None,
                pool_name: None,
            },
        );

        let created = assemble_volume_groups(&mut tree, &lv_info).unwrap();
        assert_eq!(created.len(), 2);

        let (vg_id, _) = tree.get_by_name("vg0", false).unwrap();
        let (_, root) = tree.get_by_name("root", false).unwrap();
        assert!(matches!(root.kind, DeviceKind::LvmLogicalVolume(_)));
        assert!(root.parents.contains(vg_id));
        assert_eq!(root.size, Size::from_gib(1));
        assert_eq!(root.device_id, format!("LVM-{lv_uuid}"));
    }

    #[test]
    fn internal_lv_attaches_to_its_owning_lv_not_the_vg() {
        let mut tree = DeviceTree::new();
        tree.add_device(pv_device("sda1", "vg0")).unwrap();

        let mut lv_info = HashMap::new();
        lv_info.insert(
            "vg0-pool00".to_string(),
            LvInfo {
                lv_name: "pool00".to_string(),
                vg_name: "vg0".to_string(),
                uuid: uuid::Uuid::from_u128(1),
                attr: "twi-a-tz--".to_string(),
                size: Size::from_gib(4),
                segtype: Some("thin-pool".to_string()),
                origin: None,
                pool_name: None,
            },
        );
        lv_info.insert(
            "vg0-[pool00_tmeta]".to_string(),
            LvInfo {
                lv_name: "[pool00_tmeta]".to_string(),
                vg_name: "vg0".to_string(),
                uuid: uuid::Uuid::from_u128(2),
                attr: "ewi-ao----".to_string(),
                size: Size::from_mib(16),
                segtype: Some("linear".to_string()),
                origin: None,
                pool_name: None,
            },
        );

        assemble_volume_groups(&mut tree, &lv_info).unwrap();
        let (pool_id, _) = tree.get_by_name("pool00", false).unwrap();
        let (_, tmeta) = tree.get_by_name("[pool00_tmeta]", true).unwrap();
        assert!(tmeta.parents.contains(pool_id));
    }
}
