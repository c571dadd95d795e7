/// Suffixes used by leveraged and derivative tokens.
pub const LEVERAGED_SUFFIXES: [&str; 14] = [
    "3S", "3L", "5S", "5L", "2S", "2L", "4S", "4L", "BULL", "BEAR", "DOWN", "UP", "HALF", "HEDGE",
];

/// True when neither the pair nor the symbol looks like a leveraged token.
pub fn is_spot(pair: &str, symbol: &str) -> bool {
    let pair = pair.to_uppercase();
    let symbol = symbol.to_uppercase();
    !LEVERAGED_SUFFIXES
        .iter()
        .any(|suffix| pair.ends_with(suffix) || symbol.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spot_pairs() {
        assert!(is_spot("BTCUSDT", "BTC"));
        assert!(is_spot("ethusdt", "eth"));
    }

    #[test]
    fn test_leveraged_tokens_rejected() {
        assert!(!is_spot("BTC3LUSDT", "BTC3L"));
        assert!(!is_spot("ETHBULLUSDT", "ethbull"));
        assert!(!is_spot("XRPDOWNUSDT", "XRPDOWN"));
        assert!(!is_spot("BNBHEDGE", "BNB"));
    }
}
