use crate::error::{Error, Result};
use crate::models::SymbolEntry;

pub fn validate_symbol(symbol: &str) -> Result<()> {
    if symbol.is_empty() {
        return Err(Error::ValidationError("Symbol cannot be empty".to_string()));
    }
    if symbol.chars().any(char::is_whitespace) {
        return Err(Error::ValidationError(format!("Symbol cannot contain whitespace: {}", symbol)));
    }
    Ok(())
}

pub fn validate_pair(pair: &str) -> Result<()> {
    if pair.is_empty() {
        return Err(Error::ValidationError("Pair cannot be empty".to_string()));
    }
    if pair.chars().any(char::is_whitespace) {
        return Err(Error::ValidationError(format!("Pair cannot contain whitespace: {}", pair)));
    }
    Ok(())
}

/// `0x` followed by 40 hex digits.
pub fn validate_token_address(address: &str) -> Result<()> {
    let hex = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| Error::ValidationError(format!("Token address must start with 0x: {}", address)))?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::ValidationError(format!("Invalid token address: {}", address)));
    }
    Ok(())
}

pub fn validate_symbol_entry(entry: &SymbolEntry) -> Result<()> {
    validate_symbol(&entry.symbol)?;
    validate_pair(&entry.pair)?;
    if entry.exchange.is_empty() {
        return Err(Error::ValidationError(format!("Exchange cannot be empty for {}", entry.symbol)));
    }
    if let Some(address) = &entry.token_address {
        validate_token_address(address)?;
    }
    Ok(())
}
