use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::model::common::{ElectionId, Identity, SybilMethod};

type HmacSha256 = Hmac<Sha256>;

/// An external check deciding whether a proof entitles an identity to vote in an election.
pub trait ProofVerifier: Send + Sync {
    fn verify(&self, election_id: ElectionId, voter: &Identity, proof: &[u8]) -> bool;
}

/// Accepts nothing. Used for any method that has not been configured.
#[derive(Debug, Default, Copy, Clone)]
pub struct RejectAll;

impl ProofVerifier for RejectAll {
    fn verify(&self, _election_id: ElectionId, _voter: &Identity, _proof: &[u8]) -> bool {
        false
    }
}

/// KYC attestations: an identity-verification provider sharing `secret` with us
/// vouches for a voter by issuing `HMAC-SHA256(secret, election_id || identity)`.
#[derive(Clone)]
pub struct KycAttestation {
    secret: Vec<u8>,
}

impl KycAttestation {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self, election_id: ElectionId, voter: &Identity) -> HmacSha256 {
        // HMAC accepts keys of any length.
        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("any key length is valid");
        mac.update(&election_id.to_be_bytes());
        mac.update(voter.as_bytes());
        mac
    }

    /// Issue the attestation for a voter. This is the provider's side of the exchange.
    pub fn attest(&self, election_id: ElectionId, voter: &Identity) -> Vec<u8> {
        self.mac(election_id, voter).finalize().into_bytes().to_vec()
    }
}

impl ProofVerifier for KycAttestation {
    fn verify(&self, election_id: ElectionId, voter: &Identity, proof: &[u8]) -> bool {
        // Constant-time comparison.
        self.mac(election_id, voter).verify_slice(proof).is_ok()
    }
}

/// Which verifier guards self-registration for each Sybil-resistance method.
/// Elections with [`SybilMethod::None`] have no verifier: only admins add voters.
pub struct GatingPolicy {
    semaphore: Box<dyn ProofVerifier>,
    kyc: Box<dyn ProofVerifier>,
}

impl GatingPolicy {
    pub fn with_semaphore(mut self, verifier: impl ProofVerifier + 'static) -> Self {
        self.semaphore = Box::new(verifier);
        self
    }

    pub fn with_kyc(mut self, verifier: impl ProofVerifier + 'static) -> Self {
        self.kyc = Box::new(verifier);
        self
    }

    pub fn verifier_for(&self, method: SybilMethod) -> Option<&dyn ProofVerifier> {
        match method {
            SybilMethod::None => None,
            SybilMethod::Semaphore => Some(self.semaphore.as_ref()),
            SybilMethod::Kyc => Some(self.kyc.as_ref()),
        }
    }
}

impl Default for GatingPolicy {
    fn default() -> Self {
        Self {
            semaphore: Box::new(RejectAll),
            kyc: Box::new(RejectAll),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attestation_binds_election_and_voter() {
        let kyc = KycAttestation::new("provider secret");
        let voter = Identity::example_voter1();
        let proof = kyc.attest(3, &voter);

        assert!(kyc.verify(3, &voter, &proof));
        assert!(!kyc.verify(4, &voter, &proof));
        assert!(!kyc.verify(3, &Identity::example_voter2(), &proof));
        assert!(!kyc.verify(3, &voter, &proof[1..]));
    }

    #[test]
    fn attestation_depends_on_secret() {
        let voter = Identity::example_voter1();
        let forged = KycAttestation::new("guessed").attest(0, &voter);
        assert!(!KycAttestation::new("provider secret").verify(0, &voter, &forged));
    }

    #[test]
    fn default_policy_rejects() {
        let policy = GatingPolicy::default();
        let voter = Identity::example_voter1();
        assert!(policy.verifier_for(SybilMethod::None).is_none());
        for method in [SybilMethod::Semaphore, SybilMethod::Kyc] {
            let verifier = policy.verifier_for(method).unwrap();
            assert!(!verifier.verify(0, &voter, b"anything"));
        }
    }

    #[test]
    fn configured_kyc_is_used() {
        let kyc = KycAttestation::new("s3cret");
        let voter = Identity::example_voter2();
        let proof = kyc.attest(1, &voter);
        let policy = GatingPolicy::default().with_kyc(kyc);

        let verifier = policy.verifier_for(SybilMethod::Kyc).unwrap();
        assert!(verifier.verify(1, &voter, &proof));
        let semaphore = policy.verifier_for(SybilMethod::Semaphore).unwrap();
        assert!(!semaphore.verify(1, &voter, &proof));
    }
}
