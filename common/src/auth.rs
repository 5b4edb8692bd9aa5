use crate::types::Role;

pub const PASS_LEN: usize = 4;

/// Ordered digits of one stored password. Compared digit by digit; the
/// set-password flow overwrites all digits before accepting new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credential([u8; PASS_LEN]);

impl Credential {
    pub fn new(digits: [u8; PASS_LEN]) -> Self {
        Self(digits)
    }

    fn matches(&self, entered: &[u8; PASS_LEN]) -> bool {
        self.0.iter().zip(entered.iter()).all(|(a, b)| a == b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Accepted,
    Rejected { tries_left: u8 },
    LockedOut,
}

/// Credential verification and the consecutive-failure lockout policy.
///
/// The caller owns the lockout countdown itself (20 audible ticks on the
/// panel); `clear_lockout` is invoked once that countdown expires.
#[derive(Debug, Clone)]
pub struct AuthGate {
    admin: Credential,
    guest: Credential,
    tries_allowed: u8,
    failed_attempts: u8,
    locked: bool,
}

impl AuthGate {
    pub fn new(admin: Credential, guest: Credential, tries_allowed: u8) -> Self {
        Self {
            admin,
            guest,
            tries_allowed,
            failed_attempts: 0,
            locked: false,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Verify `entered` against the stored credential for `role`.
    ///
    /// The third consecutive rejection locks the gate; the attempt ends
    /// and the session role stays `None`.
    pub fn attempt(&mut self, role: Role, entered: &[u8; PASS_LEN]) -> AttemptOutcome {
        let credential = match role {
            Role::Admin => &self.admin,
            Role::Guest => &self.guest,
            Role::None => return AttemptOutcome::Rejected { tries_left: 0 },
        };

        if credential.matches(entered) {
            self.failed_attempts = 0;
            return AttemptOutcome::Accepted;
        }

        self.failed_attempts += 1;
        if self.failed_attempts >= self.tries_allowed {
            self.locked = true;
            return AttemptOutcome::LockedOut;
        }

        AttemptOutcome::Rejected {
            tries_left: self.tries_allowed - self.failed_attempts,
        }
    }

    /// Unconditionally overwrite the stored credential for `role`.
    /// Used for first-boot provisioning and the password-change menus;
    /// no old-password confirmation by design.
    pub fn set_credential(&mut self, role: Role, digits: [u8; PASS_LEN]) {
        match role {
            Role::Admin => self.admin = Credential::new(digits),
            Role::Guest => self.guest = Credential::new(digits),
            Role::None => {}
        }
    }

    /// Called after the lockout countdown has run to completion.
    pub fn clear_lockout(&mut self) {
        self.locked = false;
        self.failed_attempts = 0;
    }
}
