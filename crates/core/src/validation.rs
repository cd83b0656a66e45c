//! Payload validation for match proposals and payments.
//!
//! Field checks return `Err(String)` with a user-facing message; the API
//! layer wraps it in [`CoreError::Validation`].

use std::str::FromStr;

use crate::error::CoreError;

/// Maximum length of a free-form payment method label (e.g. `"card"`).
pub const MAX_PAYMENT_METHOD_LEN: usize = 50;

/// Maximum length of an opaque processor reference.
pub const MAX_EXTERNAL_REF_LEN: usize = 255;

/// A proposed transport fee may be absent, but never negative or NaN.
pub fn validate_price(price: Option<f64>) -> Result<(), String> {
    match price {
        Some(p) if !p.is_finite() => Err("price must be a finite number".to_string()),
        Some(p) if p < 0.0 => Err(format!("price must not be negative, got {p}")),
        _ => Ok(()),
    }
}

/// Payment amounts are in the currency's major unit and strictly positive.
pub fn validate_amount(amount: f64) -> Result<(), String> {
    if !amount.is_finite() {
        return Err("amount must be a finite number".to_string());
    }
    if amount <= 0.0 {
        return Err(format!("amount must be greater than zero, got {amount}"));
    }
    Ok(())
}

/// Normalize an ISO-4217 style code to upper case (`"eur"` -> `"EUR"`).
pub fn normalize_currency(currency: &str) -> Result<String, String> {
    let trimmed = currency.trim();
    if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!(
            "currency must be a three-letter code, got '{currency}'"
        ));
    }
    Ok(trimmed.to_ascii_uppercase())
}

pub fn validate_payment_method(method: &str) -> Result<(), String> {
    let trimmed = method.trim();
    if trimmed.is_empty() {
        return Err("paymentMethod must not be empty".to_string());
    }
    if trimmed.len() > MAX_PAYMENT_METHOD_LEN {
        return Err(format!(
            "paymentMethod must be at most {MAX_PAYMENT_METHOD_LEN} characters"
        ));
    }
    Ok(())
}

pub fn validate_external_ref(field: &str, value: Option<&str>) -> Result<(), String> {
    match value {
        Some(v) if v.trim().is_empty() => Err(format!("{field} must not be blank")),
        Some(v) if v.len() > MAX_EXTERNAL_REF_LEN => Err(format!(
            "{field} must be at most {MAX_EXTERNAL_REF_LEN} characters"
        )),
        _ => Ok(()),
    }
}

/// Parse a comma-separated status filter such as `"PROPOSED,CONFIRMED"`.
///
/// Blank segments are skipped and duplicates collapsed; `None` or an empty
/// string yields an empty list, meaning "no filter".
pub fn parse_status_list<S>(raw: Option<&str>) -> Result<Vec<S>, CoreError>
where
    S: FromStr<Err = CoreError> + PartialEq,
{
    let mut statuses = Vec::new();
    for token in raw.unwrap_or_default().split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let status = token.parse::<S>()?;
        if !statuses.contains(&status) {
            statuses.push(status);
        }
    }
    Ok(statuses)
}
