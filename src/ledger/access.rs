use std::collections::BTreeSet;

use crate::model::common::Identity;

use super::error::{LedgerError, LedgerResult};

/// The set of identities holding the admin capability.
///
/// There is always at least one admin: the set is seeded at construction and
/// revocation refuses to empty it.
#[derive(Debug, Clone)]
pub struct AccessControl {
    admins: BTreeSet<Identity>,
}

impl AccessControl {
    /// Create the access list with its bootstrap admin.
    pub fn new(initial_admin: Identity) -> Self {
        Self {
            admins: BTreeSet::from([initial_admin]),
        }
    }

    pub fn is_admin(&self, identity: &Identity) -> bool {
        self.admins.contains(identity)
    }

    /// Fail closed unless `caller` is an admin.
    pub fn ensure_admin(&self, caller: &Identity) -> LedgerResult<()> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized)
        }
    }

    /// Grant the admin capability. Returns whether `identity` was newly granted.
    pub fn grant_admin(&mut self, caller: &Identity, identity: Identity) -> LedgerResult<bool> {
        self.ensure_admin(caller)?;
        Ok(self.admins.insert(identity))
    }

    /// Revoke the admin capability. Returns whether `identity` was an admin.
    pub fn revoke_admin(&mut self, caller: &Identity, identity: &Identity) -> LedgerResult<bool> {
        self.ensure_admin(caller)?;
        if !self.admins.contains(identity) {
            return Ok(false);
        }
        if self.admins.len() == 1 {
            return Err(LedgerError::LastAdmin);
        }
        Ok(self.admins.remove(identity))
    }

    /// All admins, in identity order.
    pub fn admins(&self) -> impl Iterator<Item = &Identity> {
        self.admins.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_admin_is_admin() {
        let access = AccessControl::new(Identity::example_admin());
        assert!(access.is_admin(&Identity::example_admin()));
        assert!(!access.is_admin(&Identity::example_voter1()));
        assert_eq!(access.admins().count(), 1);
    }

    #[test]
    fn only_admins_can_grant() {
        let mut access = AccessControl::new(Identity::example_admin());

        let result = access.grant_admin(&Identity::example_voter1(), Identity::example_voter2());
        assert_eq!(result, Err(LedgerError::Unauthorized));
        assert!(!access.is_admin(&Identity::example_voter2()));

        let granted = access
            .grant_admin(&Identity::example_admin(), Identity::example_voter2())
            .unwrap();
        assert!(granted);
        assert!(access.is_admin(&Identity::example_voter2()));

        // Granting twice is harmless.
        let granted = access
            .grant_admin(&Identity::example_admin(), Identity::example_voter2())
            .unwrap();
        assert!(!granted);
        assert_eq!(access.admins().count(), 2);
    }

    #[test]
    fn cannot_revoke_last_admin() {
        let mut access = AccessControl::new(Identity::example_admin());
        let admin = Identity::example_admin();

        assert_eq!(
            access.revoke_admin(&admin, &admin),
            Err(LedgerError::LastAdmin)
        );
        assert!(access.is_admin(&admin));

        access.grant_admin(&admin, Identity::example_voter1()).unwrap();
        assert_eq!(access.revoke_admin(&admin, &admin), Ok(true));
        assert!(!access.is_admin(&admin));

        // The remaining admin is now the last one.
        let remaining = Identity::example_voter1();
        assert_eq!(
            access.revoke_admin(&remaining, &remaining),
            Err(LedgerError::LastAdmin)
        );
    }

    #[test]
    fn revoking_non_admin_is_noop() {
        let mut access = AccessControl::new(Identity::example_admin());
        let result = access.revoke_admin(&Identity::example_admin(), &Identity::example_outsider());
        assert_eq!(result, Ok(false));
        assert_eq!(access.admins().count(), 1);
    }
}
