//! Per-field filters and semantic predicates

use lazy_static::lazy_static;
use regex::Regex;

use super::policy::{collapse_whitespace, trim, FieldRule};

/// Number of words in a remote-pairing phrase
pub const PAIRING_PHRASE_WORDS: usize = 10;

/// Prefix every Nostr Wallet Connect URL starts with
pub const WALLET_CONNECT_PREFIX: &str = "nostr+walletconnect://";

lazy_static! {
    /// Characters allowed while typing a server address
    static ref SERVER_ADDRESS_STRIP: Regex =
        Regex::new(r"[^a-zA-Z0-9\-._~!$&'()*+,;=:/]").unwrap();

    /// scheme? host (:port)? path?
    static ref SERVER_ADDRESS: Regex = Regex::new(
        r"(?x)^
        (?:(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*)://)?
        (?P<host>
            \[[0-9A-Fa-f:.]+\]
          | [A-Za-z0-9](?:[A-Za-z0-9\-]{0,61}[A-Za-z0-9])?
            (?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]{0,61}[A-Za-z0-9])?)*
        )
        (?::(?P<port>[0-9]{1,5}))?
        (?P<path>/[A-Za-z0-9\-._~!$&'()*+,;=:@/%]*)?
        $"
    )
    .unwrap();

    static ref HEX: Regex = Regex::new(r"^[0-9a-fA-F]+$").unwrap();

    static ref RUNE: Regex = Regex::new(r"^[A-Za-z0-9\-_=]+$").unwrap();
}

/// Options for server address validation
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressRules {
    /// Allow a `:port` suffix
    pub allow_port: bool,

    /// Require an `https://` scheme
    pub require_https: bool,
}

/// Validate a server address: optional scheme, host, optional port, optional path
pub fn is_valid_server_address(address: &str, rules: AddressRules) -> bool {
    let Some(caps) = SERVER_ADDRESS.captures(address) else {
        return false;
    };

    match caps.name("scheme").map(|m| m.as_str().to_ascii_lowercase()) {
        Some(scheme) if scheme == "https" => {}
        Some(scheme) if scheme == "http" && !rules.require_https => {}
        Some(_) => return false,
        None if rules.require_https => return false,
        None => {}
    }

    if let Some(port) = caps.name("port") {
        if !rules.allow_port || !is_valid_port(port.as_str()) {
            return false;
        }
    }

    true
}

/// Validate a TCP port: digits only, 1-65535
pub fn is_valid_port(port: &str) -> bool {
    if port.is_empty() || port.len() > 5 || !port.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    matches!(port.parse::<u32>(), Ok(1..=65535))
}

/// Validate a hex-encoded macaroon
pub fn is_valid_macaroon(macaroon: &str) -> bool {
    HEX.is_match(macaroon)
}

/// Validate rune characters
pub fn is_valid_rune(rune: &str) -> bool {
    RUNE.is_match(rune)
}

/// Validate a pairing phrase: fixed word count, letters only, single spaces
pub fn is_valid_pairing_phrase(phrase: &str) -> bool {
    let words: Vec<&str> = phrase.split(' ').collect();
    words.len() == PAIRING_PHRASE_WORDS
        && words
            .iter()
            .all(|w| !w.is_empty() && w.chars().all(|c| c.is_ascii_alphabetic()))
}

/// Validate a Nostr Wallet Connect URL
pub fn is_valid_wallet_connect_url(url: &str) -> bool {
    url.strip_prefix(WALLET_CONNECT_PREFIX)
        .map(|rest| !rest.is_empty())
        .unwrap_or(false)
}

/// Validate a managed-account username
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty() && !username.chars().any(char::is_whitespace)
}

fn strip_server_address(input: &str) -> Option<String> {
    Some(SERVER_ADDRESS_STRIP.replace_all(input, "").into_owned())
}

fn strip_relay_address(input: &str) -> Option<String> {
    if input.contains("::") {
        return None;
    }
    strip_server_address(input)
}

fn strip_port(input: &str) -> Option<String> {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    Some(digits.trim_start_matches('0').to_string())
}

fn strip_hex(input: &str) -> Option<String> {
    Some(input.chars().filter(|c| c.is_ascii_hexdigit()).collect())
}

fn strip_rune(input: &str) -> Option<String> {
    Some(
        input
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '='))
            .collect(),
    )
}

fn strip_pairing_phrase(input: &str) -> Option<String> {
    if input == " " || input.contains("  ") {
        return None;
    }
    Some(
        input
            .chars()
            .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
            .collect(),
    )
}

fn strip_whitespace(input: &str) -> Option<String> {
    Some(input.chars().filter(|c| !c.is_whitespace()).collect())
}

fn host_predicate(value: &str) -> bool {
    is_valid_server_address(
        value,
        AddressRules {
            allow_port: true,
            require_https: false,
        },
    )
}

fn relay_predicate(value: &str) -> bool {
    is_valid_server_address(
        value,
        AddressRules {
            allow_port: true,
            require_https: true,
        },
    )
}

/// Node host (lnd, cln-rest)
pub const HOST: FieldRule = FieldRule {
    name: "host",
    filter: strip_server_address,
    normalize: trim,
    predicate: host_predicate,
};

/// Node port
pub const PORT: FieldRule = FieldRule {
    name: "port",
    filter: strip_port,
    normalize: trim,
    predicate: is_valid_port,
};

/// Hex macaroon
pub const MACAROON: FieldRule = FieldRule {
    name: "macaroon",
    filter: strip_hex,
    normalize: trim,
    predicate: is_valid_macaroon,
};

/// CLN rune
pub const RUNE_FIELD: FieldRule = FieldRule {
    name: "rune",
    filter: strip_rune,
    normalize: trim,
    predicate: is_valid_rune,
};

/// Managed-account server URL
pub const ACCOUNT_URL: FieldRule = FieldRule {
    name: "account_url",
    filter: strip_server_address,
    normalize: trim,
    predicate: host_predicate,
};

/// Managed-account username
pub const USERNAME: FieldRule = FieldRule {
    name: "username",
    filter: strip_whitespace,
    normalize: trim,
    predicate: is_valid_username,
};

/// Remote-pairing phrase
pub const PAIRING_PHRASE: FieldRule = FieldRule {
    name: "pairing_phrase",
    filter: strip_pairing_phrase,
    normalize: collapse_whitespace,
    predicate: is_valid_pairing_phrase,
};

/// Custom remote-pairing relay
pub const CUSTOM_RELAY: FieldRule = FieldRule {
    name: "custom_relay_server",
    filter: strip_relay_address,
    normalize: trim,
    predicate: relay_predicate,
};

/// Nostr Wallet Connect URL
pub const WALLET_CONNECT_URL: FieldRule = FieldRule {
    name: "wallet_connect_url",
    filter: strip_whitespace,
    normalize: collapse_whitespace,
    predicate: is_valid_wallet_connect_url,
};

/// Every validated field, for table-driven checks
pub const ALL_RULES: [FieldRule; 9] = [
    HOST,
    PORT,
    MACAROON,
    RUNE_FIELD,
    ACCOUNT_URL,
    USERNAME,
    PAIRING_PHRASE,
    CUSTOM_RELAY,
    WALLET_CONNECT_URL,
];
