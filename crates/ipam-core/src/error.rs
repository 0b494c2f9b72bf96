//! Error types for address and CIDR parsing

use thiserror::Error;

/// Parse failures for addresses and networks coming from external input
/// (inventory files, routing tables, store records). Never fatal to a run;
/// callers skip the offending item and report it.
#[derive(Debug, Error)]
pub enum AddressError {
    #[error("invalid IP address: {value}")]
    InvalidAddress { value: String },

    #[error("invalid CIDR network: {value}")]
    InvalidCidr { value: String },
}
