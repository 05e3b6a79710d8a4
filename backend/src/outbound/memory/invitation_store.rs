//! In-memory invitation store.
//!
//! Codes are kept in insertion order behind a Tokio `RwLock`. Each code is
//! `{label}-{24 alphanumerics}` (or just the random part without a label) and
//! is checked against every code issued so far. Idempotency fingerprints are
//! remembered for the lifetime of the process, and replays report each code
//! in its current state.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use pagination::{Page, PageRequest};
use rand::Rng;
use rand::distributions::Alphanumeric;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::ports::{
    CreateInvitationsRequest, IdempotencyFingerprint, InvitationStore, InvitationStoreError,
};
use crate::domain::{
    IdempotencyKey, InvitationCode, InvitationLabel, InvitationStatus, PayloadHash, UserId,
};

const RANDOM_LEN: usize = 24;
const MAX_ATTEMPTS: usize = 8;

/// Produces a candidate code for an optional batch label.
pub type CodeGenerator = fn(Option<&InvitationLabel>) -> String;

/// Random alphanumeric code, prefixed by the label when present.
pub fn random_code(label: Option<&InvitationLabel>) -> String {
    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_LEN)
        .map(char::from)
        .collect();
    match label {
        Some(label) => format!("{label}-{random}"),
        None => random,
    }
}

#[derive(Default)]
struct Ledger {
    codes: Vec<InvitationCode>,
    issued: HashSet<String>,
    replays: HashMap<IdempotencyKey, (PayloadHash, Vec<InvitationCode>)>,
}

impl Ledger {
    fn replayed(
        &self,
        fingerprint: &IdempotencyFingerprint,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<InvitationCode>>, InvitationStoreError> {
        let Some((hash, codes)) = self.replays.get(&fingerprint.key) else {
            return Ok(None);
        };
        if *hash != fingerprint.payload_hash {
            return Err(InvitationStoreError::idempotency_conflict(
                fingerprint.key.as_ref(),
            ));
        }
        let current = codes
            .iter()
            .map(|issued| {
                self.codes
                    .iter()
                    .find(|code| code.code() == issued.code())
                    .unwrap_or(issued)
                    .clone()
                    .observed_at(now)
            })
            .collect();
        Ok(Some(current))
    }
}

/// Process-local [`InvitationStore`].
pub struct InMemoryInvitationStore {
    ledger: RwLock<Ledger>,
    clock: Arc<dyn Clock>,
    generate: CodeGenerator,
}

impl InMemoryInvitationStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            ledger: RwLock::new(Ledger::default()),
            clock,
            generate: random_code,
        }
    }

    /// Replace the code generator.
    #[must_use]
    pub fn with_code_generator(mut self, generate: CodeGenerator) -> Self {
        self.generate = generate;
        self
    }

    /// Mark `code` as redeemed by `user`.
    ///
    /// This is the redemption hook for the signup flow sharing this store.
    /// Only an unused code that has not expired is marked; the updated code
    /// is returned, and `None` means nothing changed.
    pub async fn redeem(&self, code: &str, user: UserId) -> Option<InvitationCode> {
        let now = self.clock.utc();
        let mut ledger = self.ledger.write().await;
        let slot = ledger.codes.iter_mut().find(|issued| issued.code() == code)?;
        let current = slot.clone().observed_at(now);
        if current.status() != InvitationStatus::Unused {
            debug!(code, status = ?current.status(), "invitation code not redeemable");
            return None;
        }
        *slot = current.redeem(user);
        info!(code, "invitation code redeemed");
        Some(slot.clone())
    }

    fn fresh_code(
        &self,
        ledger: &Ledger,
        pending: &HashSet<String>,
        label: Option<&InvitationLabel>,
    ) -> Result<String, InvitationStoreError> {
        let mut last = String::new();
        for _ in 0..MAX_ATTEMPTS {
            let candidate = (self.generate)(label);
            if !ledger.issued.contains(&candidate) && !pending.contains(&candidate) {
                return Ok(candidate);
            }
            debug!(code = %candidate, "invitation code collision, retrying");
            last = candidate;
        }
        Err(InvitationStoreError::duplicate(last))
    }
}

#[async_trait]
impl InvitationStore for InMemoryInvitationStore {
    async fn list(&self, page: &PageRequest) -> Result<Page<InvitationCode>, InvitationStoreError> {
        let now = self.clock.utc();
        let ledger = self.ledger.read().await;
        let items = page
            .slice(&ledger.codes)
            .iter()
            .cloned()
            .map(|code| code.observed_at(now))
            .collect();
        Ok(Page::new(items, page, ledger.codes.len() as u64))
    }

    async fn replay(
        &self,
        fingerprint: &IdempotencyFingerprint,
    ) -> Result<Option<Vec<InvitationCode>>, InvitationStoreError> {
        let now = self.clock.utc();
        let replayed = self.ledger.read().await.replayed(fingerprint, now)?;
        if replayed.is_some() {
            info!(key = fingerprint.key.as_ref(), "replaying invitation batch");
        }
        Ok(replayed)
    }

    async fn create(
        &self,
        request: &CreateInvitationsRequest,
    ) -> Result<Vec<InvitationCode>, InvitationStoreError> {
        let now = self.clock.utc();
        let mut ledger = self.ledger.write().await;

        if let Some(fingerprint) = &request.idempotency {
            if let Some(codes) = ledger.replayed(fingerprint, now)? {
                info!(key = fingerprint.key.as_ref(), "replaying invitation batch");
                return Ok(codes);
            }
        }

        let batch = &request.batch;
        let mut pending = HashSet::new();
        let mut created = Vec::with_capacity(batch.quantity() as usize);
        for _ in 0..batch.quantity() {
            let code = self.fresh_code(&ledger, &pending, batch.label())?;
            pending.insert(code.clone());
            created.push(InvitationCode::issue(code, batch, now));
        }

        ledger.issued.extend(pending);
        ledger.codes.extend(created.iter().cloned());
        if let Some(fingerprint) = &request.idempotency {
            ledger.replays.insert(
                fingerprint.key.clone(),
                (fingerprint.payload_hash, created.clone()),
            );
        }
        info!(quantity = created.len(), "invitation batch stored");
        Ok(created)
    }
}
