//! EIP-1193 Wallet Provider Integration via wasm-bindgen
//!
//! JavaScript interop for the browser-injected Ethereum provider
//! (`window.ethereum`, e.g. MetaMask). All provider traffic goes through a
//! single `request` bridge; provider errors come back as `code|message`
//! strings so the Rust side can recover the EIP-1193 error code.

use serde_json::json;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::utils::constants::{
    CHAIN_EXPLORER_URL, CHAIN_ID_HEX, CHAIN_NAME, CHAIN_RPC_URL, NATIVE_CURRENCY_SYMBOL,
};

/// EIP-1193: user rejected the request.
pub const ERROR_CODE_REJECTED: i32 = 4001;
/// MetaMask: requested chain has not been added to the wallet.
pub const ERROR_CODE_UNKNOWN_CHAIN: i32 = 4902;

#[wasm_bindgen(inline_js = "
export function hasEthereumProvider() {
    return typeof window !== 'undefined' && typeof window.ethereum !== 'undefined';
}

export async function ethRequest(method, paramsJson) {
    if (typeof window === 'undefined' || !window.ethereum) {
        throw new Error('0|No Ethereum provider found');
    }
    const args = { method: method };
    if (paramsJson) {
        args.params = JSON.parse(paramsJson);
    }
    try {
        return await window.ethereum.request(args);
    } catch (err) {
        const code = (err && typeof err.code === 'number') ? err.code : 0;
        const message = (err && err.message) ? err.message : String(err);
        throw new Error(code + '|' + message);
    }
}

export function onProviderEvent(event, callback) {
    if (typeof window === 'undefined' || !window.ethereum ||
        typeof window.ethereum.on !== 'function') {
        return false;
    }
    window.ethereum.on(event, (payload) => callback(payload));
    return true;
}
")]
extern "C" {
    /// Whether a provider is injected at `window.ethereum`.
    pub fn hasEthereumProvider() -> bool;

    /// Issue a raw EIP-1193 request. `params_json` is a JSON-encoded array.
    #[wasm_bindgen(catch)]
    async fn ethRequest(method: &str, params_json: Option<String>) -> Result<JsValue, JsValue>;

    /// Subscribe to a provider event; returns false when unsupported.
    fn onProviderEvent(event: &str, callback: &js_sys::Function) -> bool;
}

/// Wallet provider failures, mapped from EIP-1193 error codes.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("No Ethereum wallet found. Please install the MetaMask extension to continue.")]
    NoProvider,
    /// User dismissed the wallet prompt; callers treat this as a silent
    /// cancellation, never as a failure to report.
    #[error("request rejected in wallet")]
    Rejected,
    #[error("wallet provider error {code}: {message}")]
    Provider { code: i32, message: String },
    #[error("unexpected provider response: {0}")]
    Decode(String),
}

impl WalletError {
    fn from_js(value: JsValue) -> Self {
        let raw = value
            .dyn_ref::<js_sys::Error>()
            .map(|e| String::from(e.message()))
            .or_else(|| value.as_string())
            .unwrap_or_else(|| format!("{:?}", value));
        let (code, message) = match raw.split_once('|') {
            Some((code, message)) => (code.parse::<i32>().unwrap_or(0), message.to_string()),
            None => (0, raw),
        };
        match code {
            ERROR_CODE_REJECTED => WalletError::Rejected,
            _ if message.contains("No Ethereum provider") => WalletError::NoProvider,
            _ => WalletError::Provider { code, message },
        }
    }

    fn code(&self) -> i32 {
        match self {
            WalletError::Provider { code, .. } => *code,
            WalletError::Rejected => ERROR_CODE_REJECTED,
            _ => 0,
        }
    }
}

/// Whether the browser has an injected Ethereum provider.
pub fn provider_available() -> bool {
    hasEthereumProvider()
}

async fn request(method: &str, params: Option<serde_json::Value>) -> Result<JsValue, WalletError> {
    ethRequest(method, params.map(|p| p.to_string()))
        .await
        .map_err(WalletError::from_js)
}

fn accounts_from(value: JsValue) -> Result<Vec<String>, WalletError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| WalletError::Decode(format!("accounts list: {}", e)))
}

/// Prompt the wallet for account access (`eth_requestAccounts`).
pub async fn request_accounts() -> Result<Vec<String>, WalletError> {
    let value = request("eth_requestAccounts", None).await?;
    accounts_from(value)
}

/// Query already-authorized accounts without prompting (`eth_accounts`).
pub async fn current_accounts() -> Result<Vec<String>, WalletError> {
    let value = request("eth_accounts", None).await?;
    accounts_from(value)
}

/// The wallet's current chain id as a hex string (`eth_chainId`).
pub async fn chain_id() -> Result<String, WalletError> {
    let value = request("eth_chainId", None).await?;
    value
        .as_string()
        .ok_or_else(|| WalletError::Decode("chain id is not a string".to_string()))
}

/// Whether the wallet is on the application chain.
pub async fn on_expected_chain() -> Result<bool, WalletError> {
    Ok(chain_id().await?.eq_ignore_ascii_case(CHAIN_ID_HEX))
}

/// Switch the wallet to the application chain, adding the chain definition
/// first when the wallet does not know it (error 4902).
pub async fn ensure_chain() -> Result<(), WalletError> {
    if on_expected_chain().await? {
        return Ok(());
    }
    let switch = request(
        "wallet_switchEthereumChain",
        Some(json!([{ "chainId": CHAIN_ID_HEX }])),
    )
    .await;
    match switch {
        Ok(_) => Ok(()),
        Err(err) if err.code() == ERROR_CODE_UNKNOWN_CHAIN => {
            request(
                "wallet_addEthereumChain",
                Some(json!([{
                    "chainId": CHAIN_ID_HEX,
                    "chainName": CHAIN_NAME,
                    "nativeCurrency": {
                        "name": NATIVE_CURRENCY_SYMBOL,
                        "symbol": NATIVE_CURRENCY_SYMBOL,
                        "decimals": 18,
                    },
                    "rpcUrls": [CHAIN_RPC_URL],
                    "blockExplorerUrls": [CHAIN_EXPLORER_URL],
                }])),
            )
            .await?;
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Read-only contract call (`eth_call` against latest).
pub async fn call(to: &str, data: &str) -> Result<String, WalletError> {
    let value = request(
        "eth_call",
        Some(json!([{ "to": to, "data": data }, "latest"])),
    )
    .await?;
    value
        .as_string()
        .ok_or_else(|| WalletError::Decode("eth_call result is not a string".to_string()))
}

/// Submit a contract transaction; resolves to the transaction hash once the
/// user signs in the wallet.
pub async fn send_transaction(from: &str, to: &str, data: &str) -> Result<String, WalletError> {
    let value = request(
        "eth_sendTransaction",
        Some(json!([{ "from": from, "to": to, "data": data }])),
    )
    .await?;
    value
        .as_string()
        .ok_or_else(|| WalletError::Decode("transaction hash is not a string".to_string()))
}

/// Fetch a transaction receipt. `Ok(None)` while the transaction is pending;
/// `Ok(Some(true))` once mined successfully, `Ok(Some(false))` on revert.
pub async fn transaction_status(tx_hash: &str) -> Result<Option<bool>, WalletError> {
    let value = request("eth_getTransactionReceipt", Some(json!([tx_hash]))).await?;
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    let status = js_sys::Reflect::get(&value, &JsValue::from_str("status"))
        .ok()
        .and_then(|s| s.as_string());
    Ok(Some(matches!(status.as_deref(), Some("0x1"))))
}

/// Subscribe to `accountsChanged`. The callback receives the new accounts
/// list; an empty list means the provider disconnected us.
pub fn on_accounts_changed(handler: impl Fn(Vec<String>) + 'static) {
    let closure = Closure::<dyn Fn(JsValue)>::new(move |payload: JsValue| {
        let accounts: Vec<String> =
            serde_wasm_bindgen::from_value(payload).unwrap_or_default();
        handler(accounts);
    });
    if !onProviderEvent("accountsChanged", closure.as_ref().unchecked_ref()) {
        log::warn!("provider does not support accountsChanged events");
    }
    // Listener lives for the whole page; leak the closure deliberately.
    closure.forget();
}

/// Subscribe to `chainChanged`.
pub fn on_chain_changed(handler: impl Fn(String) + 'static) {
    let closure = Closure::<dyn Fn(JsValue)>::new(move |payload: JsValue| {
        if let Some(chain) = payload.as_string() {
            handler(chain);
        }
    });
    if !onProviderEvent("chainChanged", closure.as_ref().unchecked_ref()) {
        log::warn!("provider does not support chainChanged events");
    }
    closure.forget();
}

/// Subscribe to provider `disconnect`.
pub fn on_disconnect(handler: impl Fn() + 'static) {
    let closure = Closure::<dyn Fn(JsValue)>::new(move |_payload: JsValue| handler());
    if !onProviderEvent("disconnect", closure.as_ref().unchecked_ref()) {
        log::warn!("provider does not support disconnect events");
    }
    closure.forget();
}

/// Ask the wallet to revoke the account permission. MetaMask exposes this as
/// `wallet_revokePermissions`; failure is expected on providers that do not
/// implement it, and the caller resets the local session regardless.
pub async fn revoke_permissions() -> Result<(), WalletError> {
    request(
        "wallet_revokePermissions",
        Some(json!([{ "eth_accounts": {} }])),
    )
    .await?;
    Ok(())
}
