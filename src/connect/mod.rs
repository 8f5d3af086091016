//! Connection strings and external account sources
//!
//! - `parser`: lndconnect / clnrest / lndhub / bluewallet URIs
//! - `import`: paste-source suggestions
//! - `account`: managed account creation

pub mod account;
pub mod import;
pub mod parser;

pub use account::{AccountLogin, AccountProvisioner, HttpAccountProvisioner};
pub use import::{ImportCandidate, MemoryPasteSource, PasteSource};
pub use parser::{parse, ParsedConnection};
