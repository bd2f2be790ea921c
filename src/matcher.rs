//! Snapshot comparison producing upgrade records

use crate::domain::{Upgrade, VersionSnapshot};

/// Compare pre/post snapshots of one manifest and emit an upgrade for every
/// dependency present in both with differing versions.
///
/// Names present only on one side (added or removed dependencies) are not
/// upgrades by design: the tool answers "what version did X move to", not
/// "what dependencies were added or removed".
pub fn match_upgrades(pre: &VersionSnapshot, post: &VersionSnapshot) -> Vec<Upgrade> {
    pre.iter()
        .filter_map(|(name, old_version)| {
            let new_version = post.get(name)?;
            if new_version == old_version {
                return None;
            }
            Some(Upgrade::new(name, old_version, new_version))
        })
        .collect()
}
