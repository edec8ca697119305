//! Ordered, hook-gated parent membership (spec §4.1).
//!
//! `index`/`insert`/`pop` are deliberately absent: callers must go through
//! `append`/`remove` so a device subtype's membership invariants (format
//! match, minimum/maximum member counts) are always checked on the way in
//! and out.

use crate::device::DeviceId;
use crate::error::Result;

/// An ordered, duplicate-free list of parent device handles.
///
/// Mutation always goes through [`ParentList::append`], [`ParentList::remove`]
/// or [`ParentList::set`], each of which is given a `hook` closure that may
/// reject the change (membership violation, format mismatch, a container
/// that would drop below its minimum member count). A rejected `set` leaves
/// the list exactly as it was before the call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentList {
    parents: Vec<DeviceId>,
}

impl ParentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn contains(&self, id: DeviceId) -> bool {
        self.parents.contains(&id)
    }

    pub fn get(&self, index: usize) -> Option<DeviceId> {
        self.parents.get(index).copied()
    }

    pub fn as_slice(&self) -> &[DeviceId] {
        &self.parents
    }

    pub fn iter(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.parents.iter().copied()
    }

    /// Appends `id`, after `pre_add` approves it. A duplicate append is
    /// rejected without consulting `pre_add`.
    pub fn append(&mut self, id: DeviceId, pre_add: impl FnOnce(DeviceId) -> Result<()>) -> Result<()> {
        if self.parents.contains(&id) {
            return Err(crate::error::Error::device(format!(
                "device is already a parent: {id:?}"
            )));
        }
        pre_add(id)?;
        self.parents.push(id);
        Ok(())
    }

    /// Removes `id`, after `pre_remove` approves it (e.g. rejecting removal
    /// that would breach a minimum member count).
    pub fn remove(&mut self, id: DeviceId, pre_remove: impl FnOnce(DeviceId) -> Result<()>) -> Result<()> {
        if !self.parents.contains(&id) {
            return Err(crate::error::Error::device(format!(
                "device is not a parent: {id:?}"
            )));
        }
        pre_remove(id)?;
        self.parents.retain(|p| *p != id);
        Ok(())
    }

    /// Replaces the whole list: removes all current parents (consulting
    /// `pre_remove` for each), then appends each of `new_parents` in order
    /// (consulting `pre_add` for each). If any step fails, the list is left
    /// exactly as it was before the call.
    pub fn set(
        &mut self,
        new_parents: &[DeviceId],
        mut pre_add: impl FnMut(DeviceId) -> Result<()>,
        mut pre_remove: impl FnMut(DeviceId) -> Result<()>,
    ) -> Result<()> {
        let backup = self.parents.clone();
        let attempt = || -> Result<Vec<DeviceId>> {
            let mut parents = backup.clone();
            for id in backup.iter().copied() {
                pre_remove(id)?;
            }
            parents.clear();
            for id in new_parents {
                pre_add(*id)?;
                if parents.contains(id) {
                    return Err(crate::error::Error::device(format!(
                        "duplicate parent in assignment: {id:?}"
                    )));
                }
                parents.push(*id);
            }
            Ok(parents)
        };

        match attempt() {
            Ok(parents) => {
                self.parents = parents;
                Ok(())
            }
            Err(e) => {
                self.parents = backup;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> DeviceId {
        DeviceId::from_raw(n)
    }

    #[test]
    fn append_and_remove() {
        let mut list = ParentList::new();
        list.append(id(1), |_| Ok(())).unwrap();
        assert!(list.contains(id(1)));
        list.remove(id(1), |_| Ok(())).unwrap();
        assert!(!list.contains(id(1)));
    }

    #[test]
    fn duplicate_append_rejected() {
        let mut list = ParentList::new();
        list.append(id(1), |_| Ok(())).unwrap();
        assert!(list.append(id(1), |_| Ok(())).is_err());
    }

    #[test]
    fn pre_add_rejection_is_surfaced() {
        let mut list = ParentList::new();
        let err = list.append(id(1), |_| Err(crate::error::Error::device("nope")));
        assert!(err.is_err());
        assert!(list.is_empty());
    }

    #[test]
    fn set_restores_prior_state_on_failure() {
        let mut list = ParentList::new();
        list.append(id(1), |_| Ok(())).unwrap();
        list.append(id(2), |_| Ok(())).unwrap();

        let result = list.set(
            &[id(3), id(4)],
            |candidate| {
                if candidate == id(4) {
                    Err(crate::error::Error::device("format mismatch"))
                } else {
                    Ok(())
                }
            },
            |_| Ok(()),
        );

        assert!(result.is_err());
        assert_eq!(list.as_slice(), &[id(1), id(2)]);
    }

    #[test]
    fn set_replaces_on_success() {
        let mut list = ParentList::new();
        list.append(id(1), |_| Ok(())).unwrap();
        list.set(&[id(2), id(3)], |_| Ok(()), |_| Ok(())).unwrap();
        assert_eq!(list.as_slice(), &[id(2), id(3)]);
    }
}
