//! Exact byte quantities with unit-aware arithmetic.
//!
//! Every device and format capacity in this crate is a [`Size`]. Unlike a
//! bare `u64`, `Size` exists so a capacity can never be silently added to a
//! sector count or a percentage.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// An exact quantity of bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct Size(u64);

impl Size {
    pub const fn from_bytes(bytes: u64) -> Self {
        Size(bytes)
    }

    pub const fn from_kib(kib: u64) -> Self {
        Size(kib * 1024)
    }

    pub const fn from_mib(mib: u64) -> Self {
        Size(mib * 1024 * 1024)
    }

    pub const fn from_gib(gib: u64) -> Self {
        Size(gib * 1024 * 1024 * 1024)
    }

    pub const fn from_sectors(sectors: u64, sector_size: u64) -> Self {
        Size(sectors * sector_size)
    }

    pub const fn bytes(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Number of whole sectors this size spans at the given sector size.
    /// Rounds down; callers that need to fit a size onto a device round up
    /// themselves by adding `sector_size - 1` first.
    pub const fn sectors(self, sector_size: u64) -> u64 {
        self.0 / sector_size
    }

    /// `self * scalar`, for non-negative integer scalars (extent counts,
    /// copies, replica counts).
    pub fn scale(self, scalar: u64) -> Self {
        Size(self.0.saturating_mul(scalar))
    }

    /// `self / scalar`, truncating. Used to recover a per-extent or
    /// per-member size from a total.
    pub fn div_scalar(self, scalar: u64) -> Self {
        assert!(scalar != 0, "division by zero Size scalar");
        Size(self.0 / scalar)
    }

    pub fn checked_sub(self, other: Size) -> Option<Size> {
        self.0.checked_sub(other.0).map(Size)
    }
}

impl Add for Size {
    type Output = Size;
    fn add(self, rhs: Size) -> Size {
        Size(self.0 + rhs.0)
    }
}

impl AddAssign for Size {
    fn add_assign(&mut self, rhs: Size) {
        self.0 += rhs.0;
    }
}

impl Sub for Size {
    type Output = Size;
    fn sub(self, rhs: Size) -> Size {
        Size(self.0 - rhs.0)
    }
}

impl SubAssign for Size {
    fn sub_assign(&mut self, rhs: Size) {
        self.0 -= rhs.0;
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const UNITS: &[(&str, u64)] = &[
            ("TiB", 1024 * 1024 * 1024 * 1024),
            ("GiB", 1024 * 1024 * 1024),
            ("MiB", 1024 * 1024),
            ("KiB", 1024),
        ];
        for (suffix, factor) in UNITS {
            if self.0 >= *factor {
                return write!(f, "{:.2} {}", self.0 as f64 / *factor as f64, suffix);
            }
        }
        write!(f, "{} B", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic() {
        let a = Size::from_mib(500);
        let b = Size::from_mib(20);
        assert_eq!((a + b).bytes(), Size::from_mib(520).bytes());
        assert_eq!((a - b).bytes(), Size::from_mib(480).bytes());
    }

    #[test]
    fn scale_and_divide() {
        let pe = Size::from_mib(4);
        assert_eq!(pe.scale(256), Size::from_mib(1024));
        assert_eq!(Size::from_mib(1024).div_scalar(256), pe);
    }

    #[test]
    fn sector_conversion() {
        let size = Size::from_sectors(2048, 512);
        assert_eq!(size.bytes(), 1024 * 1024);
        assert_eq!(size.sectors(512), 2048);
    }

    #[test]
    fn display_picks_largest_unit() {
        assert_eq!(Size::from_mib(500).to_string(), "500.00 MiB");
        assert_eq!(Size::from_bytes(512).to_string(), "512 B");
    }
}
