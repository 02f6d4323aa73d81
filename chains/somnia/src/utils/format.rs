use ethers::types::{Address, H256, U256};

/// Token amounts on this chain use 18 decimals.
pub const TOKEN_DECIMALS: usize = 18;

/// `0x1234...abcd` form used in log lines.
pub fn short_address(address: &Address) -> String {
    shorten(&format!("{:?}", address))
}

pub fn short_hash(hash: &H256) -> String {
    shorten(&format!("{:?}", hash))
}

/// Keeps the first 6 and last 4 characters of a hex string.
pub fn shorten(hex: &str) -> String {
    if hex.len() <= 10 {
        return hex.to_string();
    }
    format!("{}...{}", &hex[..6], &hex[hex.len() - 4..])
}

/// `n` whole tokens in base units.
pub fn whole_tokens(n: u64) -> U256 {
    U256::from(n) * U256::exp10(TOKEN_DECIMALS)
}

/// Decimal string for an 18-decimal amount: trailing zeros trimmed, at least one fractional digit.
pub fn format_token_amount(amount: U256) -> String {
    let formatted = ethers::utils::format_units(amount, TOKEN_DECIMALS as u32)
        .unwrap_or_else(|_| amount.to_string());

    match formatted.split_once('.') {
        Some((int, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                format!("{}.0", int)
            } else {
                format!("{}.{}", int, frac)
            }
        }
        None => formatted,
    }
}
