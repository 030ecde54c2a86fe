//! Operator tool for the election ledger: manage login keys, answer login
//! challenges and issue KYC attestations.
//! This uses the server's own key and proof handling, so its output is accepted
//! by our API endpoints.

use clap::{Arg, ArgAction, ArgMatches, Command};
use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use ed25519_dalek::SigningKey;
use rocket::serde::json::serde_json;

use dvote_ledger::{
    ledger::KycAttestation,
    model::{
        api::auth::LoginRequest,
        common::{ElectionId, Identity},
    },
};

const PROGRAM_NAME: &str = "dvote-cli";

const ABOUT_TEXT: &str = "Operator tool for the dvote election ledger.

EXIT CODES:
     0: Success.
     1: Invalid input.";

const SECRET: &str = "SECRET";
const NONCE: &str = "NONCE";
const KYC_SECRET: &str = "KYC_SECRET";
const ELECTION: &str = "ELECTION";
const IDENTITY: &str = "IDENTITY";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    let secret = Arg::new(SECRET)
        .help("Hex-encoded 32-byte Ed25519 secret key")
        .action(ArgAction::Set)
        .required(true);

    clap::command!(PROGRAM_NAME)
        .about(ABOUT_TEXT)
        .subcommand_required(true)
        .subcommand(Command::new("keygen").about("Generate a login key and print its identity"))
        .subcommand(
            Command::new("identity")
                .about("Print the identity belonging to a login key")
                .arg(secret.clone()),
        )
        .subcommand(
            Command::new("sign")
                .about("Sign a login challenge, printing the body for `POST /auth/verify`")
                .arg(secret)
                .arg(
                    Arg::new(NONCE)
                        .help("Hex-encoded nonce from `GET /auth/challenge`")
                        .action(ArgAction::Set)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("attest")
                .about("Issue a KYC attestation for a voter")
                .arg(
                    Arg::new(KYC_SECRET)
                        .help("Secret shared with the ledger's `kyc_secret`")
                        .action(ArgAction::Set)
                        .required(true),
                )
                .arg(
                    Arg::new(ELECTION)
                        .help("Election ID")
                        .value_parser(clap::value_parser!(ElectionId))
                        .action(ArgAction::Set)
                        .required(true),
                )
                .arg(
                    Arg::new(IDENTITY)
                        .help("Voter identity, `0x` followed by 40 hex digits")
                        .action(ArgAction::Set)
                        .required(true),
                ),
        )
}

/// Errors that this program may produce.
#[derive(Debug, Eq, PartialEq)]
enum Error {
    /// A secret key that is not 32 hex-encoded bytes.
    Secret,
    /// A nonce that is not hex.
    Nonce,
    /// An identity that failed to parse, with the reason.
    Identity(String),
}

/// Decode a hex secret key.
fn signing_key(secret: &str) -> Result<SigningKey, Error> {
    let bytes: [u8; 32] = HEXLOWER_PERMISSIVE
        .decode(secret.as_bytes())
        .ok()
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(Error::Secret)?;
    Ok(SigningKey::from_bytes(&bytes))
}

fn identity(secret: &str) -> Result<Identity, Error> {
    let key = signing_key(secret)?;
    Ok(Identity::from_verifying_key(&key.verifying_key()))
}

fn sign(secret: &str, nonce: &str) -> Result<LoginRequest, Error> {
    let key = signing_key(secret)?;
    let nonce = HEXLOWER_PERMISSIVE
        .decode(nonce.as_bytes())
        .map_err(|_| Error::Nonce)?;
    Ok(LoginRequest::sign(&key, &nonce))
}

/// Produce the hex proof a voter presents to `POST /elections/<id>/register`.
fn attest(kyc_secret: &str, election: ElectionId, voter: &str) -> Result<String, Error> {
    let voter: Identity = voter
        .parse()
        .map_err(|e: dvote_ledger::model::common::IdentityError| Error::Identity(e.to_string()))?;
    let proof = KycAttestation::new(kyc_secret).attest(election, &voter);
    Ok(HEXLOWER.encode(&proof))
}

/// Run the chosen subcommand, report the result, and return the exit code.
fn run(args: &ArgMatches) -> u8 {
    // Required arguments are guaranteed to be present.
    let result = match args.subcommand() {
        Some(("keygen", _)) => {
            let key = SigningKey::generate(&mut rand::rngs::OsRng);
            println!("secret:   {}", HEXLOWER.encode(key.as_bytes()));
            println!(
                "identity: {}",
                Identity::from_verifying_key(&key.verifying_key())
            );
            Ok(())
        }
        Some(("identity", sub)) => {
            identity(sub.get_one::<String>(SECRET).unwrap()).map(|id| println!("{id}"))
        }
        Some(("sign", sub)) => sign(
            sub.get_one::<String>(SECRET).unwrap(),
            sub.get_one::<String>(NONCE).unwrap(),
        )
        .map(|request| match serde_json::to_string_pretty(&request) {
            Ok(json) => println!("{json}"),
            Err(_) => println!("{request:?}"),
        }),
        Some(("attest", sub)) => attest(
            sub.get_one::<String>(KYC_SECRET).unwrap(),
            *sub.get_one::<ElectionId>(ELECTION).unwrap(),
            sub.get_one::<String>(IDENTITY).unwrap(),
        )
        .map(|proof| println!("{proof}")),
        _ => unreachable!("subcommand is required"),
    };

    match result {
        Ok(()) => 0,
        Err(Error::Secret) => {
            println!("Secret key must be 32 hex-encoded bytes.");
            1
        }
        Err(Error::Nonce) => {
            println!("Nonce must be hex-encoded.");
            1
        }
        Err(Error::Identity(msg)) => {
            println!("Invalid identity: {msg}");
            1
        }
    }
}

fn main() {
    let args = cli().get_matches();
    let exit_code = run(&args);
    std::process::exit(exit_code.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET_HEX: &str = "0202020202020202020202020202020202020202020202020202020202020202";

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn identity_matches_key() {
        let key = SigningKey::from_bytes(&[2; 32]);
        assert_eq!(
            identity(SECRET_HEX),
            Ok(Identity::from_verifying_key(&key.verifying_key()))
        );
        assert_eq!(identity("0202"), Err(Error::Secret));
        assert_eq!(identity("not hex"), Err(Error::Secret));
    }

    #[test]
    fn signed_challenge_verifies() {
        let nonce = [7; 32];
        let request = sign(SECRET_HEX, &HEXLOWER.encode(&nonce)).unwrap();
        assert_eq!(request.verify(&nonce).ok(), identity(SECRET_HEX).ok());
        assert_eq!(sign(SECRET_HEX, "xyz").err(), Some(Error::Nonce));
    }

    #[test]
    fn attestation_is_accepted_by_ledger_verifier() {
        use dvote_ledger::ledger::ProofVerifier;

        let voter = identity(SECRET_HEX).unwrap();
        let proof = attest("kyc secret", 4, &voter.to_string()).unwrap();
        let proof = HEXLOWER.decode(proof.as_bytes()).unwrap();

        let verifier = KycAttestation::new("kyc secret");
        assert!(verifier.verify(4, &voter, &proof));
        assert!(!verifier.verify(5, &voter, &proof));

        assert!(matches!(
            attest("kyc secret", 4, "0x12"),
            Err(Error::Identity(_))
        ));
    }
}
