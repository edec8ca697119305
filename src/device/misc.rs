//! Small device kinds that don't warrant their own module: plain files used
//! as a format target (without a loop mapping), optical media, `tmpfs`
//! mounts, and the `NoDevice` placeholder blivet uses for pseudo-filesystems
//! that have no backing block device at all (e.g. a bind mount).

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDevice {
    pub path: String,
}

impl FileDevice {
    pub fn new(path: impl Into<String>) -> Self {
        FileDevice { path: path.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpticalDevice {
    pub media_present: bool,
}

impl OpticalDevice {
    pub fn new() -> Self {
        OpticalDevice { media_present: false }
    }
}

impl Default for OpticalDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmpfsDevice {
    pub mountpoint: String,
}

/// Placeholder for a mount entry that has a format and a mountpoint but no
/// real backing device (e.g. `bind` mounts encountered while scanning
/// `/etc/fstab`-shaped input, see SPEC_FULL.md §B).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoDevice {
    pub mountpoint: Option<String>,
}
