//! External chain collaborators
//!
//! Wallet provider, block explorer and contract address book.

pub mod addresses;
pub mod explorer;
pub mod wallet;

pub use addresses::{AddressLookupError, AddressResolver, ContractKey, StaticAddressBook};
pub use explorer::{Balance, BlockscoutClient};
pub use wallet::{Eip1193Client, TransactionReceipt, TransactionRequest, WalletError, WalletProvider};
