use std::fmt;
use uuid::Uuid;

/// Unique identifier of a [`Session`](crate::Session), attached to its log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionId(u128);

impl SessionId {
    /// Draws a fresh random (v4) id; every [`Session`](crate::Session) gets one.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().as_u128())
    }

    /// The raw 128 bits. Log lines show the same id in UUID form.
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Uuid::from_u128(self.0))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        SessionId::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_get_distinct_ids_shown_as_uuids() {
        let a = SessionId::new();
        let b = SessionId::default();
        assert_ne!(a, b);

        let shown = a.to_string();
        assert_eq!(Uuid::parse_str(&shown).map(|id| id.as_u128()), Ok(a.value()));
    }
}
