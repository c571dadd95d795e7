use crate::error::{Error, Result};
use crate::models::SymbolEntry;
use crate::validation::validate_symbol_entry;
use csv::{ReaderBuilder, Trim};
use log::{error, info};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SymbolRow {
    symbol: String,
    #[serde(alias = "borsa")]
    exchange: String,
    pair: String,
    #[serde(default)]
    token_address: Option<String>,
    #[serde(default)]
    coingecko_id: Option<String>,
    #[serde(default)]
    is_stable: Option<String>,
}

impl SymbolRow {
    fn into_entry(self) -> SymbolEntry {
        let mut entry = SymbolEntry::new(&self.symbol, &self.exchange, &self.pair);
        entry.token_address = non_blank(self.token_address);
        entry.asset_id = non_blank(self.coingecko_id);
        entry.is_stable = self
            .is_stable
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        entry
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Loads the symbol list, keeping file order.
///
/// Expected headers: `symbol,exchange,pair,token_address,coingecko_id,is_stable`.
/// The three optional columns may be blank or missing. Any malformed row rejects
/// the whole file.
pub fn load_symbols_from_csv(file_path: &Path) -> Result<Vec<SymbolEntry>> {
    info!("Loading symbol list from {:?}", file_path);

    let file = File::open(file_path).map_err(|e| {
        error!("Failed to open symbol list {:?}: {}", file_path, e);
        Error::IoError(e)
    })?;

    let entries = parse_symbols(file)?;
    info!("Loaded {} symbols from {:?}", entries.len(), file_path);
    Ok(entries)
}

pub fn parse_symbols<R: Read>(reader: R) -> Result<Vec<SymbolEntry>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).trim(Trim::All).from_reader(reader);

    let mut entries = Vec::new();
    for (index, result) in rdr.deserialize::<SymbolRow>().enumerate() {
        // Line 1 is the header.
        let line = index + 2;
        let row = result.map_err(|e| Error::ParseError(format!("Symbol list line {}: {}", line, e)))?;
        let entry = row.into_entry();
        validate_symbol_entry(&entry)
            .map_err(|e| Error::ValidationError(format!("Symbol list line {}: {}", line, e)))?;
        entries.push(entry);
    }
    Ok(entries)
}
