//! Priority-ordered discovery helpers (spec §4.3).
//!
//! [`device`] and [`format`] hold the per-descriptor helpers the main
//! populator loop dispatches to every pass. [`lvm`], [`md`] and [`btrfs`]
//! hold the cascade helpers that assemble container devices once enough
//! member formats have been discovered; [`dmraid`] and [`luks`] handle the
//! two container shapes that need caller-supplied input (parsed firmware
//! metadata, a passphrase) the in-process discovery loop can't produce on
//! its own.

pub mod btrfs;
pub mod device;
pub mod dmraid;
pub mod format;
pub mod lvm;
pub mod luks;
pub mod md;
