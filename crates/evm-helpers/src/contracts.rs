// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::providers::fillers::BlobGasFiller;
use alloy::{
    network::{Ethereum, EthereumWallet, ReceiptResponse},
    primitives::{Address, TxHash, U256},
    providers::fillers::{
        ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller, WalletFiller,
    },
    providers::{Identity, Provider, ProviderBuilder, RootProvider},
    rpc::types::TransactionReceipt,
    signers::local::PrivateKeySigner,
    sol,
};
use async_trait::async_trait;
use eyre::{bail, Result};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

sol! {
    /// Encrypted uint32 input as produced by the coprocessor client
    #[derive(Debug, PartialEq, Eq)]
    struct InEuint32 {
        uint256 ctHash;
        uint8 securityZone;
        uint8 utype;
        bytes signature;
    }

    /// ACL permission passed to the permissioned decrypt entry points
    #[derive(Debug, PartialEq, Eq)]
    struct Permission {
        address issuer;
        uint64 expiration;
        address recipient;
        uint256 validatorId;
        address validatorContract;
        bytes32 sealingKey;
        bytes issuerSignature;
        bytes recipientSignature;
    }

    #[derive(Debug)]
    #[sol(rpc)]
    contract FhenixOGNFT {
        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);

        function mint(InEuint32 calldata encryptedRarity, InEuint32 calldata encryptedAttribute, string calldata tokenUri) external payable returns (uint256 tokenId);
        function requestDecryptAll(uint256 tokenId) external;
        function requestDecryptAllWithPermission(uint256 tokenId, Permission calldata permission) external;
        function getDecryptedRarity(uint256 tokenId) external view returns (uint32 value, bool ready);
        function getDecryptedRarityWithPermission(uint256 tokenId, Permission calldata permission) external view returns (uint32 value, bool ready);
        function getDecryptedAttribute(uint256 tokenId) external view returns (uint32 value, bool ready);
        function getDecryptedAttributeWithPermission(uint256 tokenId, Permission calldata permission) external view returns (uint32 value, bool ready);
        function ownerOf(uint256 tokenId) external view returns (address owner);
        function tokenURI(uint256 tokenId) external view returns (string memory uri);
        function getCurrentSupply() external view returns (uint256 supply);
    }
}

/// How a decrypted result is read back from the contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptAccess {
    /// Plain owner getters, authorised by `msg.sender`
    Owner,
    /// `*WithPermission` getters, authorised by a signed permission
    Permission(Permission),
}

/// One `(value, ready)` pair from a decrypted getter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecryptedField {
    pub value: u32,
    pub ready: bool,
}

impl DecryptedField {
    pub fn ready(value: u32) -> Self {
        Self { value, ready: true }
    }

    pub fn pending() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    pub tx_hash: TxHash,
    /// Decoded from the `Transfer` event. None if the receipt carried no mint event.
    pub token_id: Option<U256>,
}

/// Trait for read-only operations on the collection contract
#[async_trait]
pub trait NftRead: Send + Sync {
    /// Get the current owner of a token
    async fn owner_of(&self, token_id: U256) -> Result<Address>;

    /// Get the metadata uri of a token
    async fn token_uri(&self, token_id: U256) -> Result<String>;

    /// Number of tokens minted so far. Token ids run from zero.
    async fn current_supply(&self) -> Result<U256>;

    /// Read the decrypted rarity slot
    async fn decrypted_rarity(&self, token_id: U256, access: &DecryptAccess)
        -> Result<DecryptedField>;

    /// Read the decrypted special attribute slot
    async fn decrypted_attribute(
        &self,
        token_id: U256,
        access: &DecryptAccess,
    ) -> Result<DecryptedField>;
}

/// Trait for write operations on the collection contract.
///
/// Every write waits for one confirmation and fails if the transaction reverted.
#[async_trait]
pub trait NftWrite: Send + Sync {
    /// The account transactions are sent from
    fn account(&self) -> Address;

    /// Mint a token with encrypted traits
    async fn mint(
        &self,
        encrypted_rarity: InEuint32,
        encrypted_attribute: InEuint32,
        token_uri: String,
        value: U256,
    ) -> Result<MintReceipt>;

    /// Dry run `requestDecryptAllWithPermission` without broadcasting
    async fn simulate_request_decrypt_all_with_permission(
        &self,
        token_id: U256,
        permission: &Permission,
    ) -> Result<()>;

    /// Ask the coprocessor to decrypt every trait, authorised by a permission
    async fn request_decrypt_all_with_permission(
        &self,
        token_id: U256,
        permission: Permission,
    ) -> Result<TxHash>;

    /// Ask the coprocessor to decrypt every trait, authorised by ownership
    async fn request_decrypt_all(&self, token_id: U256) -> Result<TxHash>;
}

/// Everything the decrypt and mint flows need from the collection contract
pub trait NftClient: NftRead + NftWrite {}
impl<T: NftRead + NftWrite> NftClient for T {}

/// Generic type to represent different provider types
pub trait ProviderType: Send {
    type Provider: Provider + Send + Sync + 'static;
}

/// Marker type for read-only provider
#[derive(Clone)]
pub struct ReadOnly;
impl ProviderType for ReadOnly {
    type Provider = NftReadOnlyProvider;
}
/// Marker type for read-write provider
#[derive(Clone)]
pub struct ReadWrite;
impl ProviderType for ReadWrite {
    type Provider = NftWriteProvider;
}

/// Type alias for read-only provider
pub type NftReadOnlyProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
>;

/// Type alias for read-write provider
pub type NftWriteProvider = FillProvider<
    JoinFill<
        JoinFill<
            JoinFill<
                Identity,
                JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
            >,
            WalletFiller<EthereumWallet>,
        >,
        NonceFiller,
    >,
    RootProvider<Ethereum>,
    Ethereum,
>;

/// Generic collection contract
#[derive(Clone)]
pub struct NftContract<T: ProviderType> {
    pub provider: Arc<T::Provider>,
    pub contract_address: Address,
    /// Sender for view calls. The decrypted getters check `msg.sender`.
    pub account: Option<Address>,
    nonce_lock: Arc<Mutex<()>>,
    _marker: PhantomData<T>,
}

impl<T: ProviderType> NftContract<T> {
    pub fn address(&self) -> &Address {
        &self.contract_address
    }

    /// Chain id reported by the connected node
    pub async fn chain_id(&self) -> Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }
}

/// Type aliases for the two contract variants
pub type NftReadContract = NftContract<ReadOnly>;
pub type NftWriteContract = NftContract<ReadWrite>;

// Factory for creating contract instances
pub struct NftContractFactory;

impl NftContractFactory {
    /// Create a write-capable contract
    pub async fn create_write(
        http_rpc_url: &str,
        contract_address: Address,
        signer: PrivateKeySigner,
    ) -> Result<NftContract<ReadWrite>> {
        let account = signer.address();
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .with_cached_nonce_management()
            .connect(http_rpc_url)
            .await?;

        Ok(NftContract::<ReadWrite> {
            provider: Arc::new(provider),
            contract_address,
            account: Some(account),
            nonce_lock: Arc::new(Mutex::new(())),
            _marker: PhantomData,
        })
    }

    /// Create a read-only contract
    pub async fn create_read(
        http_rpc_url: &str,
        contract_address: Address,
        account: Option<Address>,
    ) -> Result<NftContract<ReadOnly>> {
        let provider = ProviderBuilder::new().connect(http_rpc_url).await?;

        Ok(NftContract::<ReadOnly> {
            provider: Arc::new(provider),
            contract_address,
            account,
            nonce_lock: Arc::new(Mutex::new(())),
            _marker: PhantomData,
        })
    }
}

fn into_field(value: u32, ready: bool) -> DecryptedField {
    DecryptedField { value, ready }
}

// Implement NftRead for any NftContract regardless of provider type
#[async_trait]
impl<T: Send + Sync> NftRead for NftContract<T>
where
    T: ProviderType,
{
    async fn owner_of(&self, token_id: U256) -> Result<Address> {
        let contract = FhenixOGNFT::new(self.contract_address, &self.provider);
        let owner = contract.ownerOf(token_id).call().await?;
        Ok(owner)
    }

    async fn token_uri(&self, token_id: U256) -> Result<String> {
        let contract = FhenixOGNFT::new(self.contract_address, &self.provider);
        let uri = contract.tokenURI(token_id).call().await?;
        Ok(uri)
    }

    async fn current_supply(&self) -> Result<U256> {
        let contract = FhenixOGNFT::new(self.contract_address, &self.provider);
        let supply = contract.getCurrentSupply().call().await?;
        Ok(supply)
    }

    async fn decrypted_rarity(
        &self,
        token_id: U256,
        access: &DecryptAccess,
    ) -> Result<DecryptedField> {
        let contract = FhenixOGNFT::new(self.contract_address, &self.provider);
        let from = self.account.unwrap_or_default();
        let result = match access {
            DecryptAccess::Owner => {
                let r = contract.getDecryptedRarity(token_id).from(from).call().await?;
                into_field(r.value, r.ready)
            }
            DecryptAccess::Permission(permission) => {
                let r = contract
                    .getDecryptedRarityWithPermission(token_id, permission.clone())
                    .from(from)
                    .call()
                    .await?;
                into_field(r.value, r.ready)
            }
        };
        Ok(result)
    }

    async fn decrypted_attribute(
        &self,
        token_id: U256,
        access: &DecryptAccess,
    ) -> Result<DecryptedField> {
        let contract = FhenixOGNFT::new(self.contract_address, &self.provider);
        let from = self.account.unwrap_or_default();
        let result = match access {
            DecryptAccess::Owner => {
                let r = contract
                    .getDecryptedAttribute(token_id)
                    .from(from)
                    .call()
                    .await?;
                into_field(r.value, r.ready)
            }
            DecryptAccess::Permission(permission) => {
                let r = contract
                    .getDecryptedAttributeWithPermission(token_id, permission.clone())
                    .from(from)
                    .call()
                    .await?;
                into_field(r.value, r.ready)
            }
        };
        Ok(result)
    }
}

impl NftContract<ReadWrite> {
    async fn next_pending_nonce(&self) -> Result<u64> {
        let from = self.write_account();
        Ok(self.provider.get_transaction_count(from).pending().await?)
    }

    fn write_account(&self) -> Address {
        // Write contracts are always built with the signer's address
        self.account.unwrap_or_default()
    }
}

fn ensure_success(operation: &str, receipt: &TransactionReceipt) -> Result<()> {
    if !ReceiptResponse::status(receipt) {
        bail!(
            "{} transaction {} reverted",
            operation,
            receipt.transaction_hash
        );
    }
    debug!(
        tx = %receipt.transaction_hash,
        block = ?receipt.block_number,
        "{} confirmed", operation
    );
    Ok(())
}

// Implement NftWrite only for contracts with ReadWrite marker
#[async_trait]
impl NftWrite for NftContract<ReadWrite> {
    fn account(&self) -> Address {
        self.write_account()
    }

    async fn mint(
        &self,
        encrypted_rarity: InEuint32,
        encrypted_attribute: InEuint32,
        token_uri: String,
        value: U256,
    ) -> Result<MintReceipt> {
        let _guard = self.nonce_lock.lock().await;
        let nonce = self.next_pending_nonce().await?;

        let contract = FhenixOGNFT::new(self.contract_address, &self.provider);
        let builder = contract
            .mint(encrypted_rarity, encrypted_attribute, token_uri)
            .value(value)
            .nonce(nonce);
        let receipt = builder.send().await?.get_receipt().await?;
        ensure_success("mint", &receipt)?;

        let token_id = receipt
            .inner
            .logs()
            .iter()
            .find_map(|log| log.log_decode::<FhenixOGNFT::Transfer>().ok())
            .map(|log| log.inner.data.tokenId);
        info!(tx = %receipt.transaction_hash, token_id = ?token_id, "Minted");

        Ok(MintReceipt {
            tx_hash: receipt.transaction_hash,
            token_id,
        })
    }

    async fn simulate_request_decrypt_all_with_permission(
        &self,
        token_id: U256,
        permission: &Permission,
    ) -> Result<()> {
        let contract = FhenixOGNFT::new(self.contract_address, &self.provider);
        contract
            .requestDecryptAllWithPermission(token_id, permission.clone())
            .from(self.write_account())
            .call()
            .await?;
        Ok(())
    }

    async fn request_decrypt_all_with_permission(
        &self,
        token_id: U256,
        permission: Permission,
    ) -> Result<TxHash> {
        let _guard = self.nonce_lock.lock().await;
        let nonce = self.next_pending_nonce().await?;

        let contract = FhenixOGNFT::new(self.contract_address, &self.provider);
        let builder = contract
            .requestDecryptAllWithPermission(token_id, permission)
            .nonce(nonce);
        let receipt = builder.send().await?.get_receipt().await?;
        ensure_success("requestDecryptAllWithPermission", &receipt)?;

        Ok(receipt.transaction_hash)
    }

    async fn request_decrypt_all(&self, token_id: U256) -> Result<TxHash> {
        let _guard = self.nonce_lock.lock().await;
        let nonce = self.next_pending_nonce().await?;

        let contract = FhenixOGNFT::new(self.contract_address, &self.provider);
        let builder = contract.requestDecryptAll(token_id).nonce(nonce);
        let receipt = builder.send().await?.get_receipt().await?;
        ensure_success("requestDecryptAll", &receipt)?;

        Ok(receipt.transaction_hash)
    }
}
