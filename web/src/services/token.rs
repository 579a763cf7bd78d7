//! RIZZ Token Contract Client
//!
//! Talks to the fixed-address RIZZ contract through the wallet provider.
//! The ABI surface is four functions (`balanceOf`, `transfer`, `register`,
//! `isRegistered`), so calldata is assembled by hand rather than pulling in
//! a full ABI codec. Amounts are 18-decimal fixed point and are compared as
//! integers in minor units, never as floats or decimal strings.

use std::fmt;

use crate::services::ethereum::{self, WalletError};
use crate::utils::constants::{
    CHAIN_NAME, RECEIPT_POLL_ATTEMPTS, RECEIPT_POLL_INTERVAL_MS, RIZZ_CONTRACT_ADDRESS,
    RIZZ_DECIMALS, RIZZ_SYMBOL,
};

// Function selectors from the fixed contract ABI.
const SELECTOR_BALANCE_OF: [u8; 4] = [0x70, 0xa0, 0x82, 0x31]; // balanceOf(address)
const SELECTOR_TRANSFER: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb]; // transfer(address,uint256)
const SELECTOR_REGISTER: [u8; 4] = [0x1a, 0xa3, 0xa0, 0x08]; // register()
const SELECTOR_IS_REGISTERED: [u8; 4] = [0xc3, 0xc5, 0xa5, 0x47]; // isRegistered(address)

/// A RIZZ amount in minor units (10^-18 RIZZ).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: TokenAmount = TokenAmount(0);

    pub fn from_minor(minor: u128) -> Self {
        TokenAmount(minor)
    }

    /// Whole tokens, e.g. `TokenAmount::whole(5)` is 5 RIZZ.
    pub fn whole(tokens: u64) -> Self {
        TokenAmount(tokens as u128 * 10u128.pow(RIZZ_DECIMALS))
    }

    pub fn minor(&self) -> u128 {
        self.0
    }

    /// Lossy whole-token value, for the directory's float-typed balance
    /// field only. Comparisons always go through minor units.
    pub fn as_tokens_f64(&self) -> f64 {
        self.0 as f64 / 10f64.powi(RIZZ_DECIMALS as i32)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parse a decimal token string ("5", "0.5", ".25") into minor units.
    pub fn parse(input: &str) -> Result<Self, TokenError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(TokenError::InvalidAmount("amount is empty".to_string()));
        }
        let (int_part, frac_part) = match input.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (input, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(TokenError::InvalidAmount("amount is empty".to_string()));
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(TokenError::InvalidAmount(format!(
                "not a decimal number: {input}"
            )));
        }
        let decimals = RIZZ_DECIMALS as usize;
        if frac_part.len() > decimals {
            return Err(TokenError::InvalidAmount(format!(
                "more than {decimals} decimal places"
            )));
        }
        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| TokenError::InvalidAmount("amount too large".to_string()))?
        };
        let frac: u128 = if frac_part.is_empty() {
            0
        } else {
            let parsed: u128 = frac_part
                .parse()
                .map_err(|_| TokenError::InvalidAmount("amount too large".to_string()))?;
            parsed * 10u128.pow((decimals - frac_part.len()) as u32)
        };
        whole
            .checked_mul(10u128.pow(RIZZ_DECIMALS))
            .and_then(|w| w.checked_add(frac))
            .map(TokenAmount)
            .ok_or_else(|| TokenError::InvalidAmount("amount too large".to_string()))
    }
}

impl fmt::Display for TokenAmount {
    /// Renders with trailing zeros trimmed: 5 RIZZ is "5", half a token "0.5".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = 10u128.pow(RIZZ_DECIMALS);
        let whole = self.0 / scale;
        let frac = self.0 % scale;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let frac = format!("{:018}", frac);
        write!(f, "{whole}.{}", frac.trim_end_matches('0'))
    }
}

/// Token contract failures.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("transaction reverted on-chain")]
    Reverted,
    #[error("timed out waiting for transaction confirmation")]
    ConfirmationTimeout,
}

/// Whether `input` looks like a 20-byte hex address.
pub fn is_address(input: &str) -> bool {
    input.len() == 42
        && input.starts_with("0x")
        && input[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

fn address_word(address: &str) -> Result<[u8; 32], TokenError> {
    if !is_address(address) {
        return Err(TokenError::InvalidAddress(address.to_string()));
    }
    let bytes = hex::decode(&address[2..])
        .map_err(|_| TokenError::InvalidAddress(address.to_string()))?;
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(&bytes);
    Ok(word)
}

fn amount_word(amount: TokenAmount) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&amount.minor().to_be_bytes());
    word
}

/// Calldata for `balanceOf(owner)`.
pub fn balance_of_calldata(owner: &str) -> Result<String, TokenError> {
    let mut data = SELECTOR_BALANCE_OF.to_vec();
    data.extend_from_slice(&address_word(owner)?);
    Ok(format!("0x{}", hex::encode(data)))
}

/// Calldata for `transfer(to, amount)`.
pub fn transfer_calldata(to: &str, amount: TokenAmount) -> Result<String, TokenError> {
    let mut data = SELECTOR_TRANSFER.to_vec();
    data.extend_from_slice(&address_word(to)?);
    data.extend_from_slice(&amount_word(amount));
    Ok(format!("0x{}", hex::encode(data)))
}

/// Calldata for `register()`.
pub fn register_calldata() -> String {
    format!("0x{}", hex::encode(SELECTOR_REGISTER))
}

/// Calldata for `isRegistered(owner)`.
pub fn is_registered_calldata(owner: &str) -> Result<String, TokenError> {
    let mut data = SELECTOR_IS_REGISTERED.to_vec();
    data.extend_from_slice(&address_word(owner)?);
    Ok(format!("0x{}", hex::encode(data)))
}

/// Decode a single uint256 return word. Values beyond u128 range saturate;
/// RIZZ supply never gets near that.
fn decode_uint_word(raw: &str) -> Result<u128, TokenError> {
    let stripped = raw.trim().trim_start_matches("0x");
    if stripped.is_empty() {
        return Ok(0);
    }
    let bytes = hex::decode(stripped)
        .map_err(|_| WalletError::Decode(format!("not a hex word: {raw}")))?;
    if bytes.len() > 16 {
        let (high, low) = bytes.split_at(bytes.len() - 16);
        if high.iter().any(|&b| b != 0) {
            return Ok(u128::MAX);
        }
        let mut word = [0u8; 16];
        word.copy_from_slice(low);
        Ok(u128::from_be_bytes(word))
    } else {
        let mut word = [0u8; 16];
        word[16 - bytes.len()..].copy_from_slice(&bytes);
        Ok(u128::from_be_bytes(word))
    }
}

/// RIZZ balance of `owner`.
pub async fn balance_of(owner: &str) -> Result<TokenAmount, TokenError> {
    let data = balance_of_calldata(owner)?;
    let raw = ethereum::call(RIZZ_CONTRACT_ADDRESS, &data).await?;
    Ok(TokenAmount::from_minor(decode_uint_word(&raw)?))
}

/// Whether `owner` has claimed the one-time registration bonus.
pub async fn is_registered(owner: &str) -> Result<bool, TokenError> {
    let data = is_registered_calldata(owner)?;
    let raw = ethereum::call(RIZZ_CONTRACT_ADDRESS, &data).await?;
    Ok(decode_uint_word(&raw)? != 0)
}

/// Submit `register()` and wait for confirmation.
pub async fn register(from: &str) -> Result<(), TokenError> {
    let tx_hash = ethereum::send_transaction(from, RIZZ_CONTRACT_ADDRESS, &register_calldata())
        .await?;
    wait_for_confirmation(&tx_hash).await
}

/// Submit `transfer(to, amount)` and wait for confirmation.
pub async fn transfer(from: &str, to: &str, amount: TokenAmount) -> Result<(), TokenError> {
    let data = transfer_calldata(to, amount)?;
    let tx_hash = ethereum::send_transaction(from, RIZZ_CONTRACT_ADDRESS, &data).await?;
    wait_for_confirmation(&tx_hash).await
}

async fn wait_for_confirmation(tx_hash: &str) -> Result<(), TokenError> {
    for _ in 0..RECEIPT_POLL_ATTEMPTS {
        gloo_timers::future::TimeoutFuture::new(RECEIPT_POLL_INTERVAL_MS).await;
        match ethereum::transaction_status(tx_hash).await? {
            Some(true) => return Ok(()),
            Some(false) => return Err(TokenError::Reverted),
            None => continue,
        }
    }
    Err(TokenError::ConfirmationTimeout)
}

/// Why a tip was refused before any contract call was issued. Each variant
/// renders as the message shown to the user.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TipError {
    #[error("Connect your wallet before sending a tip")]
    NotConnected,
    #[error("Please register your account first to receive {RIZZ_SYMBOL} tokens")]
    NotRegistered,
    #[error("Enter a valid {RIZZ_SYMBOL} amount")]
    InvalidAmount,
    #[error("Friend wallet address missing or malformed")]
    InvalidRecipient,
    #[error("Not enough {RIZZ_SYMBOL} tokens. You have {balance} {RIZZ_SYMBOL}")]
    InsufficientBalance { balance: TokenAmount },
    #[error("Please switch to the {CHAIN_NAME} network in your wallet")]
    WrongNetwork,
}

/// Check every tip precondition. Returns the parsed amount to send, or the
/// first precondition failure; callers must not touch the contract unless
/// this passes. Unlike sign-up, a tip never registers the sender implicitly.
pub fn validate_tip(
    sender: Option<&str>,
    sender_registered: bool,
    on_expected_chain: bool,
    balance: TokenAmount,
    amount: &str,
    recipient: &str,
) -> Result<TokenAmount, TipError> {
    if sender.is_none() {
        return Err(TipError::NotConnected);
    }
    if !sender_registered {
        return Err(TipError::NotRegistered);
    }
    let amount = TokenAmount::parse(amount).map_err(|_| TipError::InvalidAmount)?;
    if amount.is_zero() {
        return Err(TipError::InvalidAmount);
    }
    if !is_address(recipient) {
        return Err(TipError::InvalidRecipient);
    }
    // Integer minor-unit comparison; decimal strings never compare directly.
    if amount > balance {
        return Err(TipError::InsufficientBalance { balance });
    }
    if !on_expected_chain {
        return Err(TipError::WrongNetwork);
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPIENT: &str = "0x7B7E367B6F328F16cfe61336928908cc91289353";

    #[test]
    fn parse_whole_and_fractional_amounts() {
        assert_eq!(TokenAmount::parse("5").unwrap(), TokenAmount::whole(5));
        assert_eq!(
            TokenAmount::parse("0.5").unwrap().minor(),
            500_000_000_000_000_000
        );
        assert_eq!(
            TokenAmount::parse(".25").unwrap().minor(),
            250_000_000_000_000_000
        );
        assert_eq!(TokenAmount::parse(" 2 ").unwrap(), TokenAmount::whole(2));
        assert_eq!(
            TokenAmount::parse("1.000000000000000001").unwrap().minor(),
            1_000_000_000_000_000_001
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        for input in ["", " ", ".", "-1", "+1", "1.2.3", "1e18", "0x5", "1,5"] {
            assert!(TokenAmount::parse(input).is_err(), "accepted {input:?}");
        }
        // 19 decimal places
        assert!(TokenAmount::parse("0.0000000000000000001").is_err());
    }

    #[test]
    fn amounts_compare_numerically_not_lexically() {
        // As strings "9" > "10"; as amounts it must be the other way around.
        assert!(TokenAmount::parse("10").unwrap() > TokenAmount::parse("9").unwrap());
        assert!(TokenAmount::parse("1.9").unwrap() > TokenAmount::parse("1.10").unwrap());
    }

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(TokenAmount::whole(5).to_string(), "5");
        assert_eq!(TokenAmount::parse("0.50").unwrap().to_string(), "0.5");
        assert_eq!(TokenAmount::ZERO.to_string(), "0");
        assert_eq!(
            TokenAmount::from_minor(1_000_000_000_000_000_001).to_string(),
            "1.000000000000000001"
        );
    }

    #[test]
    fn calldata_layout_matches_the_abi() {
        let addr_padded = format!("{:0>64}", RECIPIENT[2..].to_lowercase());

        assert_eq!(
            balance_of_calldata(RECIPIENT).unwrap(),
            format!("0x70a08231{addr_padded}")
        );
        assert_eq!(
            transfer_calldata(RECIPIENT, TokenAmount::whole(1)).unwrap(),
            format!("0xa9059cbb{addr_padded}{:0>64}", "de0b6b3a7640000")
        );
        assert_eq!(register_calldata(), "0x1aa3a008");
        assert_eq!(
            is_registered_calldata(RECIPIENT).unwrap(),
            format!("0xc3c5a547{addr_padded}")
        );
    }

    #[test]
    fn calldata_rejects_malformed_addresses() {
        assert!(balance_of_calldata("0x1234").is_err());
        assert!(transfer_calldata("7B7E367B", TokenAmount::whole(1)).is_err());
    }

    #[test]
    fn decode_uint_word_handles_real_and_degenerate_shapes() {
        assert_eq!(
            decode_uint_word(
                "0x0000000000000000000000000000000000000000000000000de0b6b3a7640000"
            )
            .unwrap(),
            1_000_000_000_000_000_000
        );
        assert_eq!(decode_uint_word("0x").unwrap(), 0);
        assert_eq!(decode_uint_word("0x01").unwrap(), 1);
        // High 16 bytes set: saturates instead of wrapping.
        assert_eq!(
            decode_uint_word(
                "0x0000000000000000000000000000000100000000000000000000000000000000"
            )
            .unwrap(),
            u128::MAX
        );
        assert!(decode_uint_word("0xzz").is_err());
    }

    #[test]
    fn tip_rejected_when_not_connected() {
        let result = validate_tip(None, true, true, TokenAmount::whole(5), "1", RECIPIENT);
        assert_eq!(result, Err(TipError::NotConnected));
    }

    #[test]
    fn tip_rejected_when_sender_not_registered() {
        let result = validate_tip(
            Some("0xAAA"),
            false,
            true,
            TokenAmount::whole(5),
            "1",
            RECIPIENT,
        );
        assert_eq!(result, Err(TipError::NotRegistered));
    }

    #[test]
    fn tip_refuses_amounts_above_balance_in_minor_units() {
        // Balance 5 RIZZ; 5.000000000000000001 must be refused even though a
        // naive float comparison would round both sides to 5.0.
        let result = validate_tip(
            Some("0xAAA"),
            true,
            true,
            TokenAmount::whole(5),
            "5.000000000000000001",
            RECIPIENT,
        );
        assert_eq!(
            result,
            Err(TipError::InsufficientBalance {
                balance: TokenAmount::whole(5)
            })
        );

        // Exactly the balance is fine.
        let exact = validate_tip(
            Some("0xAAA"),
            true,
            true,
            TokenAmount::whole(5),
            "5",
            RECIPIENT,
        );
        assert_eq!(exact, Ok(TokenAmount::whole(5)));
    }

    #[test]
    fn tip_rejected_on_wrong_network() {
        let result = validate_tip(
            Some("0xAAA"),
            true,
            false,
            TokenAmount::whole(5),
            "1",
            RECIPIENT,
        );
        assert_eq!(result, Err(TipError::WrongNetwork));
    }

    #[test]
    fn tip_rejects_zero_and_malformed_inputs() {
        let balance = TokenAmount::whole(5);
        assert_eq!(
            validate_tip(Some("0xAAA"), true, true, balance, "0", RECIPIENT),
            Err(TipError::InvalidAmount)
        );
        assert_eq!(
            validate_tip(Some("0xAAA"), true, true, balance, "abc", RECIPIENT),
            Err(TipError::InvalidAmount)
        );
        assert_eq!(
            validate_tip(Some("0xAAA"), true, true, balance, "1", "0xnope"),
            Err(TipError::InvalidRecipient)
        );
    }
}
