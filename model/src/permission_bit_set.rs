use crate::channel::Permission;
use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::fmt::Formatter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PermissionBitSet(pub u64);

impl PermissionBitSet {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.contains(permission as u64)
    }

    /// True when every bit of `mask` is set.
    pub fn contains(&self, mask: u64) -> bool {
        self.0 & mask == mask
    }
}

impl From<&[Permission]> for PermissionBitSet {
    fn from(permissions: &[Permission]) -> Self {
        PermissionBitSet(Permission::sum(permissions))
    }
}

impl Serialize for PermissionBitSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for PermissionBitSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(PermissionBitSet(s.parse().map_err(Error::custom)?)),
            Value::Number(n) => n
                .as_u64()
                .map(PermissionBitSet)
                .ok_or_else(|| Error::custom("permission bit set was not a u64")),
            other => Err(Error::invalid_type(
                crate::util::to_unexpected(other),
                &"a string or u64",
            )),
        }
    }
}

impl fmt::Display for PermissionBitSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_permission() {
        let perms: PermissionBitSet = serde_json::from_str(r#""2056""#).unwrap();
        assert!(perms.has_permission(Permission::SendMessages));
        assert!(perms.has_permission(Permission::Administrator));
        assert!(!perms.has_permission(Permission::KickMembers));
    }

    #[test]
    fn test_contains_mask() {
        let perms = PermissionBitSet::from(&[Permission::ViewChannel, Permission::SendMessages][..]);
        assert!(perms.contains(1 << 10 | 1 << 11));
        assert!(!perms.contains(1 << 10 | 1 << 3));
    }
}
