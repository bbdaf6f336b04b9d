use quiz_core::model::PlayerId;

/// Who is playing right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub is_authenticated: bool,
    pub player_id: PlayerId,
}

impl Identity {
    /// Remote sync is only allowed for authenticated, non-guest players.
    #[must_use]
    pub fn can_sync(&self) -> bool {
        self.is_authenticated && !self.player_id.is_guest()
    }
}

pub trait IdentityProvider: Send + Sync {
    fn current(&self) -> Identity;
}

/// Identity fixed at construction, e.g. from a command-line flag.
#[derive(Debug, Clone)]
pub struct StaticIdentity(Identity);

impl StaticIdentity {
    #[must_use]
    pub fn authenticated(player_id: PlayerId) -> Self {
        Self(Identity {
            is_authenticated: true,
            player_id,
        })
    }

    #[must_use]
    pub fn guest(suffix: impl std::fmt::Display) -> Self {
        Self(Identity {
            is_authenticated: false,
            player_id: PlayerId::guest(suffix),
        })
    }
}

impl IdentityProvider for StaticIdentity {
    fn current(&self) -> Identity {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guests_never_sync() {
        assert!(!StaticIdentity::guest("local").current().can_sync());
        assert!(StaticIdentity::authenticated(PlayerId::new("ada")).current().can_sync());

        let spoofed = Identity {
            is_authenticated: true,
            player_id: PlayerId::new("guest_123"),
        };
        assert!(!spoofed.can_sync());
    }
}
