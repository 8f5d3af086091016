//! Field validation
//!
//! One edit routine ([`FieldRule::apply`]) parameterized per field by a
//! character filter, a normalizer and a semantic predicate.

pub mod fields;
pub mod policy;

pub use fields::{
    is_valid_macaroon, is_valid_pairing_phrase, is_valid_port, is_valid_rune,
    is_valid_server_address, is_valid_username, is_valid_wallet_connect_url, AddressRules,
};
pub use policy::{EditOutcome, EditPolicy, FieldRule};
