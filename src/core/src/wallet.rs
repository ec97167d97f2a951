//! Wallet handles.
//!
//! [`WalletHandle`] is the capability the pipeline borrows: an address, a
//! variant, and the ability to build and sign transfers. [`SeedWallet`] is the
//! implementation backed by a 24-word seed phrase.

use crate::address::Address;
use crate::chain::{seqno_of, ChainClient};
use crate::errors::ClientError;
use crate::kind::WalletKind;
use crate::types::{ExternalMessage, MessageBody, Nanotons, Sequence, TransferMessage};
use async_trait::async_trait;
use ed25519_dalek::{Keypair, PublicKey, SecretKey, Signature, Signer, Verifier};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::{Digest, Sha256, Sha512};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Subwallet id used by standard wallets on workchain 0.
pub const DEFAULT_SUBWALLET_ID: u32 = 698_983_191;

/// How long an assembled message stays valid.
pub const MESSAGE_TTL: Duration = Duration::from_secs(60);

/// Number of words in a seed phrase.
pub const SEED_WORDS: usize = 24;

const SEED_SALT: &[u8] = b"TON default seed";
const SEED_ROUNDS: u32 = 100_000;

/// HighloadV3 query ids are 23 bits wide.
const HIGHLOAD_V3_QUERY_MASK: u64 = (1 << 23) - 1;

/// Shared by every HighloadV3 wallet in the process.
static QUERY_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// A keyed account the pipeline can send from.
#[async_trait]
pub trait WalletHandle: Send + Sync {
    /// The wallet's address.
    fn address(&self) -> &Address;

    /// The wallet's contract variant.
    fn kind(&self) -> WalletKind;

    /// Builds one transfer from this wallet.
    fn build_transfer(
        &self,
        to: Address,
        amount: Nanotons,
        bounce: bool,
        comment: &str,
    ) -> Result<TransferMessage, ClientError> {
        TransferMessage::new(to, amount, bounce, comment)
    }

    /// Combines `transfers`, in order, into one signed external message.
    ///
    /// Any chain query made while assembling is bounded by `deadline` and
    /// aborted when `cancel` fires.
    async fn build_external_message(
        &self,
        transfers: Vec<TransferMessage>,
        cancel: &CancellationToken,
        deadline: Duration,
    ) -> Result<ExternalMessage, ClientError>;
}

/// Stretches a seed phrase into an Ed25519 secret key.
pub fn derive_secret(words: &[String]) -> Result<[u8; 32], ClientError> {
    let phrase = words.join(" ");
    let mut mac = Hmac::<Sha512>::new_from_slice(phrase.as_bytes())
        .map_err(|e| ClientError::MessageAssemblyError(format!("invalid seed phrase: {}", e)))?;
    mac.update(b"");
    let entropy = mac.finalize().into_bytes();

    let mut seed = [0u8; 64];
    pbkdf2::pbkdf2_hmac::<Sha512>(&entropy, SEED_SALT, SEED_ROUNDS, &mut seed);

    let mut secret = [0u8; 32];
    secret.copy_from_slice(&seed[..32]);
    Ok(secret)
}

/// Derives the account hash of a wallet contract.
fn account_hash(kind: WalletKind, subwallet_id: u32, public_key: &PublicKey) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update([kind.code_tag()]);
    hasher.update(subwallet_id.to_be_bytes());
    hasher.update(public_key.as_bytes());
    hasher.finalize().into()
}

fn unix_now() -> Result<Duration, ClientError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| ClientError::MessageAssemblyError(format!("system clock: {}", e)))
}

/// A wallet derived from a seed phrase.
pub struct SeedWallet<C> {
    keypair: Keypair,
    address: Address,
    kind: WalletKind,
    subwallet_id: u32,
    query_base: u64,
    chain: Arc<C>,
}

impl<C: ChainClient> SeedWallet<C> {
    /// Builds a wallet of the declared `kind` from a 24-word phrase.
    pub fn from_seed(chain: Arc<C>, words: &[String], kind: WalletKind) -> Result<Self, ClientError> {
        let secret = derive_secret(words)?;
        Self::from_secret(chain, &secret, kind)
    }

    /// Builds a wallet from a raw 32-byte secret key.
    pub fn from_secret(chain: Arc<C>, secret: &[u8; 32], kind: WalletKind) -> Result<Self, ClientError> {
        let secret = SecretKey::from_bytes(secret)
            .map_err(|e| ClientError::MessageAssemblyError(format!("invalid secret key: {}", e)))?;
        let public = PublicKey::from(&secret);
        let address = Address::new(0, account_hash(kind, DEFAULT_SUBWALLET_ID, &public));

        Ok(Self {
            keypair: Keypair { secret, public },
            address,
            kind,
            subwallet_id: DEFAULT_SUBWALLET_ID,
            query_base: unix_now()?.as_millis() as u64,
            chain,
        })
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.keypair.public.to_bytes()
    }

    async fn next_sequence(
        &self,
        valid_until: u32,
        cancel: &CancellationToken,
        deadline: Duration,
    ) -> Result<Sequence, ClientError> {
        if self.kind.uses_seqno() {
            let seqno = seqno_of(self.chain.as_ref(), &self.address, cancel, deadline).await?;
            return Ok(Sequence::Seqno(seqno));
        }

        let query_id = match self.kind {
            WalletKind::HighloadV3 => {
                let step = QUERY_SEQUENCE.fetch_add(1, Ordering::SeqCst);
                self.query_base.wrapping_add(step) & HIGHLOAD_V3_QUERY_MASK
            }
            _ => {
                let nonce: u32 = rand::thread_rng().gen();
                ((valid_until as u64) << 32) | nonce as u64
            }
        };
        Ok(Sequence::QueryId(query_id))
    }
}

#[async_trait]
impl<C: ChainClient> WalletHandle for SeedWallet<C> {
    fn address(&self) -> &Address {
        &self.address
    }

    fn kind(&self) -> WalletKind {
        self.kind
    }

    async fn build_external_message(
        &self,
        transfers: Vec<TransferMessage>,
        cancel: &CancellationToken,
        deadline: Duration,
    ) -> Result<ExternalMessage, ClientError> {
        if transfers.is_empty() {
            return Err(ClientError::MessageAssemblyError("no transfers to send".to_string()));
        }
        if transfers.len() > self.kind.max_messages() {
            return Err(ClientError::MessageAssemblyError(format!(
                "{} transfers exceed the {} limit of {}",
                transfers.len(),
                self.kind,
                self.kind.max_messages()
            )));
        }

        let valid_until = (unix_now()? + MESSAGE_TTL).as_secs() as u32;
        let sequence = self.next_sequence(valid_until, cancel, deadline).await?;
        debug!("Assembling {} transfers with {:?}", transfers.len(), sequence);

        let body = MessageBody {
            subwallet_id: self.subwallet_id,
            valid_until,
            sequence,
            transfers,
        };
        let signature = self.keypair.sign(&body.signing_bytes()?);

        Ok(ExternalMessage::new(
            self.address,
            self.kind,
            self.public_key(),
            body,
            signature.to_bytes().to_vec(),
        ))
    }
}

/// Checks the signature of an assembled message against its embedded key.
pub fn verify_signature(message: &ExternalMessage) -> Result<(), ClientError> {
    let public = PublicKey::from_bytes(message.public_key())
        .map_err(|e| ClientError::MessageAssemblyError(format!("invalid public key: {}", e)))?;
    let signature = Signature::try_from(message.signature())
        .map_err(|e| ClientError::MessageAssemblyError(format!("invalid signature: {}", e)))?;
    public
        .verify(&message.body().signing_bytes()?, &signature)
        .map_err(|e| ClientError::MessageAssemblyError(format!("signature mismatch: {}", e)))
}
