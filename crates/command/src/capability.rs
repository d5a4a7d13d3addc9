//! Abstract key operations and per-backend capability sets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One abstract key operation a backend may or may not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    CreateKey,
    LoadKey,
    DeleteKey,
    RenameKey,
    ChangeKeyTTL,
    LoadKeyTTL,
    Publish,
    Subscribe,
    SelectDB,
    FlushDB,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Capability; 10] = [
        Capability::CreateKey,
        Capability::LoadKey,
        Capability::DeleteKey,
        Capability::RenameKey,
        Capability::ChangeKeyTTL,
        Capability::LoadKeyTTL,
        Capability::Publish,
        Capability::Subscribe,
        Capability::SelectDB,
        Capability::FlushDB,
    ];

    /// Name used in `NotSupported` errors
    pub fn name(self) -> &'static str {
        match self {
            Capability::CreateKey => "CreateKeyCommand",
            Capability::LoadKey => "LoadKeyCommand",
            Capability::DeleteKey => "DeleteKeyCommand",
            Capability::RenameKey => "RenameKeyCommand",
            Capability::ChangeKeyTTL => "ChangeKeyTTLCommand",
            Capability::LoadKeyTTL => "LoadKeyTTLCommand",
            Capability::Publish => "PublishCommand",
            Capability::Subscribe => "SubscribeCommand",
            Capability::SelectDB => "SelectDBCommand",
            Capability::FlushDB => "FlushDBCommand",
        }
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of capabilities, usable in `const` context.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CapabilitySet(u16);

impl CapabilitySet {
    /// Every capability
    pub const ALL: CapabilitySet = CapabilitySet((1 << Capability::ALL.len()) - 1);

    /// No capability
    pub const fn empty() -> Self {
        CapabilitySet(0)
    }

    /// Add a capability.
    pub const fn with(self, capability: Capability) -> Self {
        CapabilitySet(self.0 | (1 << capability as u16))
    }

    /// Remove a capability.
    pub const fn without(self, capability: Capability) -> Self {
        CapabilitySet(self.0 & !(1 << capability as u16))
    }

    /// Whether `capability` is in the set
    pub fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    /// True when no capability is declared
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Capabilities in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(CapabilitySet::empty(), CapabilitySet::with)
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_contains_every_capability() {
        for c in Capability::ALL {
            assert!(CapabilitySet::ALL.contains(c), "{} missing", c);
        }
        assert_eq!(CapabilitySet::ALL.iter().count(), 10);
    }

    #[test]
    fn test_with_and_without() {
        const SET: CapabilitySet = CapabilitySet::empty()
            .with(Capability::CreateKey)
            .with(Capability::LoadKey);
        assert!(SET.contains(Capability::LoadKey));
        assert!(!SET.contains(Capability::Publish));
        assert!(!SET.without(Capability::LoadKey).contains(Capability::LoadKey));
        assert!(CapabilitySet::empty().is_empty());
    }

    #[test]
    fn test_collect_and_iter_order() {
        let set: CapabilitySet = [Capability::FlushDB, Capability::CreateKey].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Capability::CreateKey, Capability::FlushDB]);
    }
}
