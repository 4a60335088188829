//! Static token directory: symbolic name → on-chain address.

use alloy_primitives::{address, Address};

use crate::error::{Error, Result};

/// One selectable token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRef {
    pub name: String,
    pub address: Address,
}

impl TokenRef {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        TokenRef { name: name.into(), address }
    }
}

/// The fixed list of tokens the client offers in its selectors.
///
/// Loaded once at startup; directory order is preserved in every view.
#[derive(Debug, Clone)]
pub struct TokenDirectory {
    tokens: Vec<TokenRef>,
}

impl TokenDirectory {
    /// Build a directory, enforcing address uniqueness.
    pub fn new(tokens: Vec<TokenRef>) -> Result<Self> {
        for (i, token) in tokens.iter().enumerate() {
            if tokens[..i].iter().any(|t| t.address == token.address) {
                return Err(Error::InvalidPair(format!(
                    "duplicate directory address {} ({})",
                    token.address, token.name
                )));
            }
        }
        Ok(TokenDirectory { tokens })
    }

    /// The default mainnet token list.
    pub fn builtin() -> Self {
        TokenDirectory {
            tokens: vec![
                TokenRef::new("WETH", address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2")),
                TokenRef::new("DAI", address!("6B175474E89094C44Da98b954EedeAC495271d0F")),
                TokenRef::new("USDC", address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")),
                TokenRef::new("WBTC", address!("2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599")),
                TokenRef::new("UNI", address!("1f9840a85d5aF5bf1D1762F925BDADdC4201F984")),
            ],
        }
    }

    /// All tokens, in directory order.
    pub fn tokens(&self) -> &[TokenRef] {
        &self.tokens
    }

    /// Every token except `address` — the candidates for the second selector
    /// once the first token is chosen. Guarantees a token can never be paired
    /// against itself.
    pub fn counterparts_of(&self, address: Address) -> Vec<&TokenRef> {
        self.tokens.iter().filter(|t| t.address != address).collect()
    }

    /// Look up a token by its symbolic name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&TokenRef> {
        self.tokens.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Look up a token by address.
    pub fn find_by_address(&self, address: Address) -> Option<&TokenRef> {
        self.tokens.iter().find(|t| t.address == address)
    }

    /// `"WETH"` for a directory token, shortened hex for unknowns.
    pub fn label(&self, address: Address) -> String {
        match self.find_by_address(address) {
            Some(token) => token.name.clone(),
            None => {
                let hex = address.to_string();
                format!("{}…{}", &hex[..6], &hex[hex.len() - 4..])
            }
        }
    }
}

impl Default for TokenDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    #[test]
    fn preserves_directory_order() {
        let dir = TokenDirectory::new(vec![
            TokenRef::new("TKA", addr(1)),
            TokenRef::new("TKB", addr(2)),
            TokenRef::new("TKC", addr(3)),
        ])
        .unwrap();
        let names: Vec<_> = dir.tokens().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["TKA", "TKB", "TKC"]);
    }

    #[test]
    fn rejects_duplicate_addresses() {
        let result = TokenDirectory::new(vec![
            TokenRef::new("TKA", addr(1)),
            TokenRef::new("ALSO_TKA", addr(1)),
        ]);
        assert!(matches!(result, Err(Error::InvalidPair(_))));
    }

    #[test]
    fn counterparts_exclude_the_chosen_token() {
        let dir = TokenDirectory::new(vec![
            TokenRef::new("TKA", addr(1)),
            TokenRef::new("TKB", addr(2)),
        ])
        .unwrap();
        let counterparts = dir.counterparts_of(addr(1));
        assert_eq!(counterparts.len(), 1);
        assert_eq!(counterparts[0].name, "TKB");
    }

    #[test]
    fn sole_token_has_no_counterparts() {
        let dir = TokenDirectory::new(vec![TokenRef::new("TKA", addr(1))]).unwrap();
        assert!(dir.counterparts_of(addr(1)).is_empty());
    }

    #[test]
    fn name_lookup_ignores_case() {
        let dir = TokenDirectory::builtin();
        assert_eq!(
            dir.find_by_name("weth").map(|t| t.address),
            dir.find_by_name("WETH").map(|t| t.address),
        );
    }
}
