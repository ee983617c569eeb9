//! # Chain Manager Service

use crate::domain::errors::ChainError;
use crate::domain::ledger::{
    assets_of, balance_of, check_block_shape, check_funds, check_transaction_shape,
    validate_chain,
};
use crate::domain::outcomes::{
    Assets, BlockOutcome, ChainOrigin, RejectionReason, TransactionOutcome, Work,
};
use crate::ports::inbound::LedgerApi;
use crate::ports::outbound::{BlockBroadcaster, ChainSource};
use async_trait::async_trait;
use cc_02_chain_storage::{read_json, BlobStore, Resource, StorageError};
use cc_03_proof_of_work::ProofOfWork;
use cc_04_signature_verification::TransactionAuthenticator;
use cc_06_mempool::{MempoolError, TransactionPool};
use serde_json::Value;
use shared_types::{Block, BlockAnnouncement, PendingEntry, Transaction};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

/// Static chain manager settings.
#[derive(Debug, Clone)]
pub struct ChainManagerConfig {
    pub pow: ProofOfWork,
    /// Reserved node-operator identity; may not receive transfers.
    pub operator: String,
    /// Threads used to mine the genesis block.
    pub mining_workers: usize,
}

/// Driven ports and shared state the manager depends on.
pub struct Collaborators {
    pub store: Arc<dyn BlobStore>,
    pub pool: Arc<TransactionPool>,
    pub authenticator: Arc<dyn TransactionAuthenticator>,
    pub broadcaster: Arc<dyn BlockBroadcaster>,
    pub source: Arc<dyn ChainSource>,
}

/// Owner of the canonical chain.
pub struct ChainManager {
    config: ChainManagerConfig,
    chain: Mutex<Vec<Block>>,
    store: Arc<dyn BlobStore>,
    pool: Arc<TransactionPool>,
    authenticator: Arc<dyn TransactionAuthenticator>,
    broadcaster: Arc<dyn BlockBroadcaster>,
    source: Arc<dyn ChainSource>,
}

impl ChainManager {
    /// Create a manager with an empty chain; call [`initialize`](Self::initialize) next.
    pub fn new(config: ChainManagerConfig, collaborators: Collaborators) -> Self {
        Self {
            config,
            chain: Mutex::new(Vec::new()),
            store: collaborators.store,
            pool: collaborators.pool,
            authenticator: collaborators.authenticator,
            broadcaster: collaborators.broadcaster,
            source: collaborators.source,
        }
    }

    pub fn pow(&self) -> &ProofOfWork {
        &self.config.pow
    }

    pub fn operator(&self) -> &str {
        &self.config.operator
    }

    pub fn pool(&self) -> &Arc<TransactionPool> {
        &self.pool
    }

    // =========================================================================
    // BOOTSTRAP
    // =========================================================================

    /// Establish the chain at startup.
    ///
    /// With `force_bootstrap`, or when nothing is persisted, a chain is fetched
    /// from the chain source and adopted only if it is strictly longer than
    /// the local one and passes [`validate_chain`]. Otherwise the persisted
    /// chain is loaded unchanged. With neither, a genesis block is mined.
    pub async fn initialize(&self, force_bootstrap: bool) -> Result<ChainOrigin, ChainError> {
        let mut chain = self.chain.lock().await;
        let local: Vec<Block> =
            read_json(self.store.as_ref(), Resource::Chain)?.unwrap_or_default();

        if force_bootstrap || local.is_empty() {
            match self.source.fetch_chain().await {
                Ok(remote) if remote.blocks.len() <= local.len() => {
                    tracing::info!(
                        source = %remote.source,
                        remote = remote.blocks.len(),
                        local = local.len(),
                        "Remote chain not longer, keeping local"
                    );
                }
                Ok(remote) => match validate_chain(&self.config.pow, &remote.blocks) {
                    Ok(()) => {
                        self.persist_chain(&remote.blocks).await?;
                        tracing::info!(source = %remote.source, length = remote.blocks.len(), "Adopted remote chain");
                        *chain = remote.blocks;
                        return Ok(ChainOrigin::Peer(remote.source));
                    }
                    Err(fault) => {
                        tracing::warn!(
                            source = %remote.source,
                            index = fault.index,
                            reason = fault.reason,
                            "Remote chain failed validation"
                        );
                    }
                },
                Err(e) => tracing::warn!(error = %e, "Bootstrap fetch failed, falling back to local chain"),
            }
        }

        if !local.is_empty() {
            tracing::info!(length = local.len(), "Loaded local chain");
            *chain = local;
            return Ok(ChainOrigin::Local);
        }

        let genesis = self.mine_genesis().await?;
        self.persist_chain(std::slice::from_ref(&genesis)).await?;
        tracing::info!(hash = %genesis.hash(), "Created genesis block");
        *chain = vec![genesis];
        Ok(ChainOrigin::Genesis)
    }

    async fn mine_genesis(&self) -> Result<Block, ChainError> {
        let template = Block::genesis(now_millis(), &self.config.operator);
        let pow = self.config.pow;
        let workers = self.config.mining_workers;
        let solved = tokio::task::spawn_blocking(move || {
            pow.mine_parallel(&template, workers)
                .map(|solution| solution.apply(template))
        })
        .await
        .map_err(|e| ChainError::Worker(e.to_string()))??;
        Ok(solved)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub async fn chain(&self) -> Vec<Block> {
        self.chain.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.chain.lock().await.len()
    }

    pub async fn latest_block(&self) -> Result<Block, ChainError> {
        self.chain
            .lock()
            .await
            .last()
            .cloned()
            .ok_or(ChainError::EmptyChain)
    }

    pub async fn get_balance(&self, address: &str) -> f64 {
        balance_of(&self.chain.lock().await, address)
    }

    pub async fn get_user_assets(&self, address: &str) -> Assets {
        assets_of(&self.chain.lock().await, address)
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Validate and commit a candidate block.
    ///
    /// Proof, signature and shape checks run without the chain lock, so a
    /// slow authenticator never stalls readers. The link to the tail is
    /// checked again under the lock before the block is appended.
    #[tracing::instrument(skip(self, block, proof), fields(index = block.index))]
    pub async fn add_block(
        &self,
        block: Block,
        proof: String,
        from_miner: bool,
    ) -> Result<BlockOutcome, ChainError> {
        let tail_hash = self.latest_block().await?.hash();
        if let Err(reason) = self.check_block(&block, &proof, &tail_hash).await {
            tracing::warn!(%reason, "Block rejected");
            return Ok(BlockOutcome::Rejected(reason));
        }

        let mut chain = self.chain.lock().await;
        let tail_hash = chain.last().ok_or(ChainError::EmptyChain)?.hash();
        if let Err(reason) = check_link(&block, &tail_hash) {
            tracing::warn!(%reason, "Block rejected, tail moved during validation");
            return Ok(BlockOutcome::Rejected(reason));
        }

        chain.push(block.clone());
        if let Err(e) = self.persist_chain(&chain).await {
            chain.pop();
            return Err(e);
        }
        let index = block.index;
        tracing::info!(hash = %proof, length = chain.len(), from_miner, "Block accepted");
        drop(chain);

        if from_miner {
            self.broadcaster
                .announce(BlockAnnouncement {
                    new_block: block,
                    proof: proof.clone(),
                })
                .await;
        }
        Ok(BlockOutcome::Accepted { index, hash: proof })
    }

    async fn check_block(
        &self,
        block: &Block,
        proof: &str,
        tail_hash: &str,
    ) -> Result<(), RejectionReason> {
        check_link(block, tail_hash)?;
        if !self.config.pow.verify(block, proof) {
            return Err(RejectionReason::InvalidProof);
        }
        let principal = block
            .principal()
            .ok_or(RejectionReason::WrongTransactionCount { found: 0 })?;
        if !self
            .authenticator
            .authenticate(principal, &block.public_key)
            .await
        {
            return Err(RejectionReason::InvalidSignature);
        }
        check_block_shape(block)
    }

    /// Write the whole chain on the blocking pool.
    async fn persist_chain(&self, chain: &[Block]) -> Result<(), ChainError> {
        let bytes = serde_json::to_vec(chain).map_err(|source| StorageError::Serialization {
            resource: Resource::Chain,
            source,
        })?;
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.write(Resource::Chain, &bytes))
            .await
            .map_err(|e| ChainError::Worker(e.to_string()))??;
        Ok(())
    }

    /// Run a persisting pool operation on the blocking pool.
    async fn with_pool<T, F>(&self, op: F) -> Result<T, ChainError>
    where
        T: Send + 'static,
        F: FnOnce(&TransactionPool) -> Result<T, MempoolError> + Send + 'static,
    {
        let pool = Arc::clone(&self.pool);
        let result = tokio::task::spawn_blocking(move || op(pool.as_ref()))
            .await
            .map_err(|e| ChainError::Worker(e.to_string()))??;
        Ok(result)
    }

    /// Admit a wallet transfer to the pending pool. Never touches the chain.
    #[tracing::instrument(skip(self, transaction, metadata, public_key), fields(from = %transaction.from_address, amount = transaction.amount))]
    pub async fn add_transaction(
        &self,
        transaction: Transaction,
        metadata: Value,
        public_key: String,
    ) -> Result<TransactionOutcome, ChainError> {
        if let Err(reason) = check_transaction_shape(&transaction, &self.config.operator) {
            tracing::warn!(%reason, "Transaction rejected");
            return Ok(TransactionOutcome::rejected(reason));
        }

        let chain = self.chain.lock().await;
        if let Err(reason) = check_funds(&chain, &transaction) {
            tracing::warn!(%reason, "Transaction rejected");
            return Ok(TransactionOutcome::rejected(reason));
        }
        let entry = PendingEntry {
            index: chain.len() as u64 + 1,
            transaction,
            timestamp: now_millis(),
            data: metadata,
            node: self.config.operator.clone(),
            public_key,
        };
        drop(chain);

        self.with_pool(move |pool| pool.enqueue(entry)).await?;
        tracing::info!("Transaction queued for mining");
        Ok(TransactionOutcome::accepted())
    }

    /// Take the pool head (at most once) together with the current tail.
    pub async fn next_work(&self) -> Result<Work, ChainError> {
        let latest_block = self.latest_block().await?;
        let transaction = self.with_pool(TransactionPool::take_head).await?;
        Ok(Work {
            transaction,
            latest_block,
        })
    }
}

#[async_trait]
impl LedgerApi for ChainManager {
    async fn chain(&self) -> Vec<Block> {
        ChainManager::chain(self).await
    }

    async fn latest_block(&self) -> Result<Block, ChainError> {
        ChainManager::latest_block(self).await
    }

    async fn balance(&self, address: &str) -> f64 {
        self.get_balance(address).await
    }

    async fn user_assets(&self, address: &str) -> Assets {
        self.get_user_assets(address).await
    }

    async fn add_block(
        &self,
        block: Block,
        proof: String,
        from_miner: bool,
    ) -> Result<BlockOutcome, ChainError> {
        ChainManager::add_block(self, block, proof, from_miner).await
    }

    async fn add_transaction(
        &self,
        transaction: Transaction,
        metadata: Value,
        public_key: String,
    ) -> Result<TransactionOutcome, ChainError> {
        ChainManager::add_transaction(self, transaction, metadata, public_key).await
    }

    async fn next_work(&self) -> Result<Work, ChainError> {
        ChainManager::next_work(self).await
    }
}

fn check_link(block: &Block, tail_hash: &str) -> Result<(), RejectionReason> {
    if block.previous_hash == tail_hash {
        Ok(())
    } else {
        Err(RejectionReason::PreviousHashMismatch {
            expected: tail_hash.to_string(),
            found: block.previous_hash.clone(),
        })
    }
}

/// Milliseconds since the Unix epoch.
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::SourceUnavailable;
    use crate::domain::outcomes::TransactionRejection;
    use crate::ports::outbound::RemoteChain;
    use cc_02_chain_storage::{write_json, MemoryBlobStore};
    use cc_04_signature_verification::{public_key_hex, sign_transaction, LocalEcdsaAuthenticator};
    use k256::ecdsa::SigningKey;
    use parking_lot::Mutex as SyncMutex;
    use serde_json::json;
    use shared_types::gas_share;
    use std::time::{Duration, Instant};

    const OPERATOR: &str = "operator";

    #[derive(Default)]
    struct RecordingBroadcaster {
        sent: SyncMutex<Vec<BlockAnnouncement>>,
    }

    #[async_trait]
    impl BlockBroadcaster for RecordingBroadcaster {
        async fn announce(&self, announcement: BlockAnnouncement) {
            self.sent.lock().push(announcement);
        }
    }

    struct StaticSource(Option<Vec<Block>>);

    #[async_trait]
    impl ChainSource for StaticSource {
        async fn fetch_chain(&self) -> Result<RemoteChain, SourceUnavailable> {
            self.0
                .clone()
                .map(|blocks| RemoteChain {
                    source: "peer-1".into(),
                    blocks,
                })
                .ok_or_else(|| SourceUnavailable("no peers".into()))
        }
    }

    struct Harness {
        manager: ChainManager,
        store: Arc<MemoryBlobStore>,
        broadcaster: Arc<RecordingBroadcaster>,
        key: SigningKey,
    }

    fn pow() -> ProofOfWork {
        ProofOfWork::with_zeros(1).unwrap()
    }

    fn manager_with(
        store: Arc<dyn BlobStore>,
        authenticator: Arc<dyn TransactionAuthenticator>,
        broadcaster: Arc<RecordingBroadcaster>,
        remote: Option<Vec<Block>>,
    ) -> ChainManager {
        let pool = Arc::new(TransactionPool::open(Arc::clone(&store)).unwrap());
        ChainManager::new(
            ChainManagerConfig {
                pow: pow(),
                operator: OPERATOR.into(),
                mining_workers: 2,
            },
            Collaborators {
                store,
                pool,
                authenticator,
                broadcaster,
                source: Arc::new(StaticSource(remote)),
            },
        )
    }

    fn harness_with(store: Arc<MemoryBlobStore>, remote: Option<Vec<Block>>) -> Harness {
        let broadcaster = Arc::new(RecordingBroadcaster::default());
        let manager = manager_with(
            store.clone(),
            Arc::new(LocalEcdsaAuthenticator::new()),
            broadcaster.clone(),
            remote,
        );
        Harness {
            manager,
            store,
            broadcaster,
            key: SigningKey::from_slice(&[11u8; 32]).unwrap(),
        }
    }

    async fn ready() -> Harness {
        let h = harness_with(Arc::new(MemoryBlobStore::new()), None);
        assert_eq!(h.manager.initialize(false).await.unwrap(), ChainOrigin::Genesis);
        h
    }

    /// A properly mined, signed transfer block on top of `prev`.
    fn transfer(key: &SigningKey, prev: &Block, from: &str, to: &str, amount: f64) -> (Block, String) {
        let gas = gas_share(amount);
        let block = Block::new(
            prev.index + 1,
            vec![
                sign_transaction(key, Transaction::new(from, to, amount)),
                Transaction::new(from, OPERATOR, gas),
                Transaction::new(from, "miner", gas),
            ],
            prev.timestamp + 1,
            prev.hash(),
        )
        .with_public_key(public_key_hex(key));
        seal(block)
    }

    fn seal(block: Block) -> (Block, String) {
        let solution = pow().mine(&block).unwrap();
        (solution.apply(block), solution.digest)
    }

    fn persisted_len(store: &MemoryBlobStore) -> usize {
        read_json::<Vec<Block>>(store, Resource::Chain)
            .unwrap()
            .map_or(0, |c| c.len())
    }

    #[tokio::test]
    async fn test_genesis_created_and_persisted() {
        let h = ready().await;
        let genesis = h.manager.latest_block().await.unwrap();
        assert_eq!(genesis.index, 0);
        assert!(h.manager.pow().is_sealed(&genesis));
        assert_eq!(persisted_len(&h.store), 1);
    }

    #[tokio::test]
    async fn test_accepts_valid_block_and_balances() {
        let h = ready().await;
        let genesis = h.manager.latest_block().await.unwrap();
        let (block, proof) = transfer(&h.key, &genesis, "A", "B", 100.0);

        let outcome = h.manager.add_block(block, proof, false).await.unwrap();
        assert!(outcome.is_accepted());
        assert_eq!(h.manager.get_balance("A").await, -115.0);
        assert_eq!(h.manager.get_balance("B").await, 100.0);
        assert_eq!(persisted_len(&h.store), 2);
        // Peer-relayed blocks are not re-broadcast.
        assert!(h.broadcaster.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_miner_blocks_are_broadcast() {
        let h = ready().await;
        let genesis = h.manager.latest_block().await.unwrap();
        let (block, proof) = transfer(&h.key, &genesis, "A", "B", 10.0);
        h.manager
            .add_block(block.clone(), proof.clone(), true)
            .await
            .unwrap();
        let sent = h.broadcaster.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].new_block, block);
        assert_eq!(sent[0].proof, proof);
    }

    #[tokio::test]
    async fn test_rejects_stale_previous_hash_without_mutation() {
        let h = ready().await;
        let genesis = h.manager.latest_block().await.unwrap();
        let (first, proof) = transfer(&h.key, &genesis, "A", "B", 10.0);
        h.manager.add_block(first, proof, false).await.unwrap();

        // Built on genesis again: no longer the tail.
        let (stale, proof) = transfer(&h.key, &genesis, "A", "C", 10.0);
        let outcome = h.manager.add_block(stale, proof, true).await.unwrap();
        assert!(matches!(
            outcome,
            BlockOutcome::Rejected(RejectionReason::PreviousHashMismatch { .. })
        ));
        assert_eq!(h.manager.len().await, 2);
        assert_eq!(persisted_len(&h.store), 2);
        assert!(h.broadcaster.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_bad_proof() {
        let h = ready().await;
        let genesis = h.manager.latest_block().await.unwrap();
        let (block, _) = transfer(&h.key, &genesis, "A", "B", 10.0);
        let outcome = h
            .manager
            .add_block(block, "0".repeat(64), false)
            .await
            .unwrap();
        assert_eq!(outcome, BlockOutcome::Rejected(RejectionReason::InvalidProof));
    }

    #[tokio::test]
    async fn test_rejects_bad_signature() {
        let h = ready().await;
        let genesis = h.manager.latest_block().await.unwrap();
        let (mut block, _) = transfer(&h.key, &genesis, "A", "B", 10.0);
        let other = SigningKey::from_slice(&[12u8; 32]).unwrap();
        block.public_key = public_key_hex(&other);
        let (block, proof) = seal(block);
        let outcome = h.manager.add_block(block, proof, false).await.unwrap();
        assert_eq!(
            outcome,
            BlockOutcome::Rejected(RejectionReason::InvalidSignature)
        );
    }

    #[tokio::test]
    async fn test_rejects_four_transactions() {
        let h = ready().await;
        let genesis = h.manager.latest_block().await.unwrap();
        let (mut block, _) = transfer(&h.key, &genesis, "A", "B", 10.0);
        block.transactions.push(Transaction::new("A", "D", 1.0));
        let (block, proof) = seal(block);
        let outcome = h.manager.add_block(block, proof, false).await.unwrap();
        assert_eq!(
            outcome,
            BlockOutcome::Rejected(RejectionReason::TooManyTransactions { found: 4 })
        );
    }

    #[tokio::test]
    async fn test_rejects_short_block_without_fault() {
        let h = ready().await;
        let genesis = h.manager.latest_block().await.unwrap();
        let (mut block, _) = transfer(&h.key, &genesis, "A", "B", 10.0);
        block.transactions.truncate(1);
        let (block, proof) = seal(block);
        let outcome = h.manager.add_block(block, proof, false).await.unwrap();
        assert_eq!(
            outcome,
            BlockOutcome::Rejected(RejectionReason::WrongTransactionCount { found: 1 })
        );
    }

    #[tokio::test]
    async fn test_rejects_bad_gas_split() {
        let h = ready().await;
        let genesis = h.manager.latest_block().await.unwrap();
        let (mut block, _) = transfer(&h.key, &genesis, "A", "B", 100.0);
        block.transactions[1].amount = 10.0;
        let (block, proof) = seal(block);
        let outcome = h.manager.add_block(block, proof, false).await.unwrap();
        assert!(matches!(
            outcome,
            BlockOutcome::Rejected(RejectionReason::GasMismatch { .. })
        ));
        assert_eq!(h.manager.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_blocks_on_same_tail_only_one_wins() {
        let h = Arc::new(ready().await);
        let genesis = h.manager.latest_block().await.unwrap();
        let (a, pa) = transfer(&h.key, &genesis, "A", "B", 1.0);
        let (b, pb) = transfer(&h.key, &genesis, "A", "C", 2.0);

        let h1 = Arc::clone(&h);
        let h2 = Arc::clone(&h);
        let (ra, rb) = tokio::join!(
            tokio::spawn(async move { h1.manager.add_block(a, pa, false).await.unwrap() }),
            tokio::spawn(async move { h2.manager.add_block(b, pb, false).await.unwrap() }),
        );
        let accepted = [ra.unwrap(), rb.unwrap()]
            .iter()
            .filter(|o| o.is_accepted())
            .count();
        assert_eq!(accepted, 1);
        assert_eq!(h.manager.len().await, 2);
    }

    /// Local verification behind a fixed network delay.
    struct SlowAuthenticator(Duration);

    #[async_trait]
    impl TransactionAuthenticator for SlowAuthenticator {
        async fn authenticate(&self, transaction: &Transaction, public_key: &str) -> bool {
            tokio::time::sleep(self.0).await;
            LocalEcdsaAuthenticator::new()
                .authenticate(transaction, public_key)
                .await
        }
    }

    /// Memory store whose writes block the calling thread once armed.
    #[derive(Default)]
    struct SlowStore {
        inner: MemoryBlobStore,
        write_delay: SyncMutex<Duration>,
    }

    impl BlobStore for SlowStore {
        fn read(&self, resource: Resource) -> Result<Option<Vec<u8>>, StorageError> {
            self.inner.read(resource)
        }

        fn write(&self, resource: Resource, bytes: &[u8]) -> Result<(), StorageError> {
            std::thread::sleep(*self.write_delay.lock());
            self.inner.write(resource, bytes)
        }
    }

    #[tokio::test]
    async fn test_slow_authentication_does_not_block_queries() {
        let key = SigningKey::from_slice(&[11u8; 32]).unwrap();
        let manager = Arc::new(manager_with(
            Arc::new(MemoryBlobStore::new()),
            Arc::new(SlowAuthenticator(Duration::from_millis(800))),
            Arc::new(RecordingBroadcaster::default()),
            None,
        ));
        manager.initialize(false).await.unwrap();
        let genesis = manager.latest_block().await.unwrap();
        let (block, proof) = transfer(&key, &genesis, "A", "B", 10.0);

        let adding = Arc::clone(&manager);
        let pending =
            tokio::spawn(async move { adding.add_block(block, proof, false).await.unwrap() });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let started = Instant::now();
        assert_eq!(manager.get_balance("A").await, 0.0);
        assert_eq!(manager.len().await, 1);
        assert!(started.elapsed() < Duration::from_millis(300));

        assert!(pending.await.unwrap().is_accepted());
        assert_eq!(manager.get_balance("B").await, 10.0);
    }

    #[tokio::test]
    async fn test_tail_moving_during_authentication_rejects_late_block() {
        let key = SigningKey::from_slice(&[11u8; 32]).unwrap();
        let manager = Arc::new(manager_with(
            Arc::new(MemoryBlobStore::new()),
            Arc::new(SlowAuthenticator(Duration::from_millis(200))),
            Arc::new(RecordingBroadcaster::default()),
            None,
        ));
        manager.initialize(false).await.unwrap();
        let genesis = manager.latest_block().await.unwrap();
        let (first, first_proof) = transfer(&key, &genesis, "A", "B", 1.0);
        let (late, late_proof) = transfer(&key, &genesis, "A", "C", 2.0);

        let adding = Arc::clone(&manager);
        let early =
            tokio::spawn(async move { adding.add_block(first, first_proof, false).await.unwrap() });
        tokio::time::sleep(Duration::from_millis(20)).await;
        let outcome = manager.add_block(late, late_proof, false).await.unwrap();

        assert!(early.await.unwrap().is_accepted());
        assert!(matches!(
            outcome,
            BlockOutcome::Rejected(RejectionReason::PreviousHashMismatch { .. })
        ));
        assert_eq!(manager.len().await, 2);
    }

    #[tokio::test]
    async fn test_chain_write_runs_off_the_async_workers() {
        let key = SigningKey::from_slice(&[11u8; 32]).unwrap();
        let store = Arc::new(SlowStore::default());
        let manager = Arc::new(manager_with(
            store.clone(),
            Arc::new(LocalEcdsaAuthenticator::new()),
            Arc::new(RecordingBroadcaster::default()),
            None,
        ));
        manager.initialize(false).await.unwrap();
        *store.write_delay.lock() = Duration::from_millis(400);
        let genesis = manager.latest_block().await.unwrap();
        let (block, proof) = transfer(&key, &genesis, "A", "B", 10.0);

        let adding = Arc::clone(&manager);
        let pending =
            tokio::spawn(async move { adding.add_block(block, proof, false).await.unwrap() });

        // Single-threaded runtime: a write on this thread would hold the timer up.
        let started = Instant::now();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(started.elapsed() < Duration::from_millis(200));

        assert!(pending.await.unwrap().is_accepted());
        let persisted: Vec<Block> = read_json(store.as_ref(), Resource::Chain).unwrap().unwrap();
        assert_eq!(persisted.len(), 2);
    }

    #[tokio::test]
    async fn test_principal_key_is_not_bound_to_sender() {
        // Any key that signs the principal is accepted for any sender.
        let h = ready().await;
        let genesis = h.manager.latest_block().await.unwrap();
        let stranger = SigningKey::from_slice(&[42u8; 32]).unwrap();
        let (block, proof) = transfer(&stranger, &genesis, "A", "B", 10.0);
        assert!(h.manager.add_block(block, proof, false).await.unwrap().is_accepted());
        assert_eq!(h.manager.get_balance("A").await, -11.5);
    }

    async fn funded() -> Harness {
        // B ends up with 100 after A's transfer.
        let h = ready().await;
        let genesis = h.manager.latest_block().await.unwrap();
        let (block, proof) = transfer(&h.key, &genesis, "A", "B", 100.0);
        h.manager.add_block(block, proof, false).await.unwrap();
        h
    }

    #[tokio::test]
    async fn test_add_transaction_enqueues_entry() {
        let h = funded().await;
        let tx = sign_transaction(&h.key, Transaction::new("B", "C", 10.0));
        let outcome = h
            .manager
            .add_transaction(tx.clone(), json!({"memo": "x"}), public_key_hex(&h.key))
            .await
            .unwrap();
        assert_eq!(outcome, TransactionOutcome::accepted());

        let entry = h.manager.pool().peek_head().unwrap();
        assert_eq!(entry.transaction, tx);
        assert_eq!(entry.index, 3);
        assert_eq!(entry.node, OPERATOR);
        assert_eq!(entry.data, json!({"memo": "x"}));
        // The chain is untouched.
        assert_eq!(h.manager.len().await, 2);
    }

    #[tokio::test]
    async fn test_add_transaction_rejections() {
        let h = funded().await;
        let sign = |from: &str, to: &str, amount: f64| {
            sign_transaction(&h.key, Transaction::new(from, to, amount))
        };
        let cases = vec![
            (sign("A", "C", 1.0), "insufficient"),
            (sign("B", "C", 90.0), "insufficient"),
            (sign("B", "B", 1.0), "self"),
            (sign("B", OPERATOR, 1.0), "operator"),
            (sign("B", "", 1.0), "empty"),
            (sign("B", "C", -1.0), "amount"),
            (Transaction::new("B", "C", 1.0), "unsigned"),
        ];
        for (tx, label) in cases {
            let outcome = h
                .manager
                .add_transaction(tx, Value::Null, String::new())
                .await
                .unwrap();
            assert!(!outcome.accepted, "{label} should be rejected");
        }
        assert!(h.manager.pool().is_empty());

        let outcome = h
            .manager
            .add_transaction(sign("B", "C", 90.0), Value::Null, String::new())
            .await
            .unwrap();
        assert_eq!(
            outcome.reason,
            Some(TransactionRejection::InsufficientFunds {
                balance: 100.0,
                required: 90.0 + 90.0 * 0.15
            })
        );
    }

    #[tokio::test]
    async fn test_next_work_hands_out_head_once() {
        let h = funded().await;
        let tx = sign_transaction(&h.key, Transaction::new("B", "C", 1.0));
        h.manager
            .add_transaction(tx, Value::Null, public_key_hex(&h.key))
            .await
            .unwrap();

        let first = h.manager.next_work().await.unwrap();
        assert!(first.transaction.is_some());
        assert_eq!(first.latest_block, h.manager.latest_block().await.unwrap());
        let second = h.manager.next_work().await.unwrap();
        assert!(second.transaction.is_none());
    }

    #[tokio::test]
    async fn test_user_assets() {
        let h = ready().await;
        let genesis = h.manager.latest_block().await.unwrap();
        let gas = gas_share(1.0);
        let block = Block::new(
            1,
            vec![
                sign_transaction(
                    &h.key,
                    Transaction::new("A", "B", 1.0).with_data(json!({"nft": "cat"})),
                ),
                Transaction::new("A", OPERATOR, gas),
                Transaction::new("A", "miner", gas),
            ],
            genesis.timestamp + 1,
            genesis.hash(),
        )
        .with_public_key(public_key_hex(&h.key));
        let (block, proof) = seal(block);
        assert!(h.manager.add_block(block, proof, false).await.unwrap().is_accepted());
        assert_eq!(h.manager.get_user_assets("B").await, vec![json!({"nft": "cat"})]);
    }

    // -------------------------------------------------------------------------
    // Bootstrap
    // -------------------------------------------------------------------------

    async fn remote_chain(len: usize) -> Vec<Block> {
        let h = ready().await;
        let key = SigningKey::from_slice(&[11u8; 32]).unwrap();
        for _ in 1..len {
            let tail = h.manager.latest_block().await.unwrap();
            let (block, proof) = transfer(&key, &tail, "A", "B", 1.0);
            assert!(h.manager.add_block(block, proof, false).await.unwrap().is_accepted());
        }
        h.manager.chain().await
    }

    #[tokio::test]
    async fn test_bootstrap_adopts_longer_valid_chain() {
        let remote = remote_chain(3).await;
        let store = Arc::new(MemoryBlobStore::new());
        let h = harness_with(store.clone(), Some(remote.clone()));
        assert_eq!(
            h.manager.initialize(false).await.unwrap(),
            ChainOrigin::Peer("peer-1".into())
        );
        assert_eq!(h.manager.chain().await, remote);
        assert_eq!(persisted_len(&store), 3);
    }

    #[tokio::test]
    async fn test_bootstrap_rejects_tampered_chain() {
        let mut remote = remote_chain(3).await;
        remote[1].transactions[0].amount = 1_000_000.0;
        let h = harness_with(Arc::new(MemoryBlobStore::new()), Some(remote));
        assert_eq!(h.manager.initialize(false).await.unwrap(), ChainOrigin::Genesis);
        assert_eq!(h.manager.len().await, 1);
    }

    #[tokio::test]
    async fn test_forced_bootstrap_keeps_longer_local_chain() {
        let local = remote_chain(3).await;
        let store = Arc::new(MemoryBlobStore::new());
        write_json(store.as_ref(), Resource::Chain, &local).unwrap();
        let shorter = remote_chain(2).await;

        let h = harness_with(store, Some(shorter));
        assert_eq!(h.manager.initialize(true).await.unwrap(), ChainOrigin::Local);
        assert_eq!(h.manager.chain().await, local);
    }

    #[tokio::test]
    async fn test_unreachable_source_falls_back_to_local() {
        let local = remote_chain(2).await;
        let store = Arc::new(MemoryBlobStore::new());
        write_json(store.as_ref(), Resource::Chain, &local).unwrap();
        let h = harness_with(store, None);
        assert_eq!(h.manager.initialize(true).await.unwrap(), ChainOrigin::Local);
        assert_eq!(h.manager.len().await, 2);
    }

    #[tokio::test]
    async fn test_operations_before_initialize_fail_cleanly() {
        let h = harness_with(Arc::new(MemoryBlobStore::new()), None);
        assert!(matches!(
            h.manager.latest_block().await,
            Err(ChainError::EmptyChain)
        ));
        let (block, proof) = seal(Block::new(1, vec![], 0, "x"));
        assert!(matches!(
            h.manager.add_block(block, proof, false).await,
            Err(ChainError::EmptyChain)
        ));
    }
}
