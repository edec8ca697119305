//! Platform predicates consulted by partition weight assignment.
//!
//! The allocator (out of scope for this crate, §1) uses
//! [`PartitionDevice::weight`](crate::device::partition::PartitionDevice::weight)
//! to order platform-role partitions (EFI, BIOS-boot, PReP, Apple-boot,
//! `/boot`, `/`) during layout. The predicates below describe the host this
//! crate is reasoning about; a caller running on behalf of a different
//! target platform (cross-install) constructs a `Platform` by hand rather
//! than relying on [`Platform::host`].

/// Minimal description of the platform's boot architecture, as consulted by
/// the partition weight table (spec §8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub is_arm: bool,
    pub is_x86: bool,
    pub is_efi: bool,
    pub is_ppc: bool,
    pub is_ipseries: bool,
    pub is_pmac: bool,
}

impl Platform {
    /// Describes the host this process is running on, to the extent the
    /// `target_arch`/firmware probing below can tell. Downstream binaries
    /// that install onto a different architecture should build a
    /// `Platform` value directly instead.
    pub fn host() -> Self {
        Platform {
            is_arm: cfg!(target_arch = "arm") || cfg!(target_arch = "aarch64"),
            is_x86: cfg!(target_arch = "x86") || cfg!(target_arch = "x86_64"),
            is_efi: std::path::Path::new("/sys/firmware/efi").is_dir(),
            is_ppc: cfg!(target_arch = "powerpc") || cfg!(target_arch = "powerpc64"),
            is_ipseries: false,
            is_pmac: false,
        }
    }
}

/// Inputs to the partition weight table (spec §8).
#[derive(Debug, Clone, Copy)]
pub struct WeightInputs<'a> {
    pub req_base_weight: Option<i32>,
    pub mountpoint: Option<&'a str>,
    pub fstype: Option<&'a str>,
    pub bootable: bool,
}

/// Pure function computing a partition's placement weight. Lower values are
/// allocated first. See spec §8's weight table for the rule set this
/// implements verbatim.
pub fn weight(platform: &Platform, inputs: WeightInputs<'_>) -> i32 {
    if let Some(base) = inputs.req_base_weight {
        return base;
    }

    match inputs.mountpoint {
        Some("/") if platform.is_arm => return -100,
        Some("/") => return 0,
        Some("/boot") => return 2000,
        _ => {}
    }

    match inputs.fstype {
        Some("biosboot") if platform.is_x86 => return 5000,
        Some("efi") if inputs.mountpoint == Some("/boot/efi") && platform.is_efi => return 5000,
        Some("prepboot") if platform.is_ppc && platform.is_ipseries => return 5000,
        Some("appleboot") if platform.is_ppc && platform.is_pmac => return 5000,
        _ => {}
    }

    0
}
