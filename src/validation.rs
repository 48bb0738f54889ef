// 🔢 BIN Validation - input cleanup before anything reaches the resolver

use crate::error::{LookupError, LookupResult};

/// Digits needed to form a lookup key
pub const BIN_KEY_LEN: usize = 6;

/// Longest BIN the card networks issue
pub const BIN_MAX_LEN: usize = 8;

/// Keep only ASCII digits
pub fn digits_only(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Strip non-digits and cap at 8 digits once the input is long enough to be a BIN.
///
/// Shorter inputs come back untouched so callers can still report them.
pub fn clean_bin(input: &str) -> String {
    let digits = digits_only(input);
    if digits.len() >= BIN_KEY_LEN {
        digits[..digits.len().min(BIN_MAX_LEN)].to_string()
    } else {
        digits
    }
}

/// 6 to 8 digits after cleanup
pub fn is_valid_bin(input: &str) -> bool {
    let digits = digits_only(input);
    (BIN_KEY_LEN..=BIN_MAX_LEN).contains(&digits.len())
}

/// Turn raw user input into the 6-digit lookup key.
///
/// Anything longer (a full card number, an 8-digit BIN) is accepted and cut down.
pub fn prepare_lookup_key(input: &str) -> LookupResult<String> {
    let digits = digits_only(input);
    if digits.len() < BIN_KEY_LEN {
        return Err(LookupError::BinTooShort { digits: digits.len() });
    }
    Ok(digits[..BIN_KEY_LEN].to_string())
}

/// Group digits in fours: "5454540000000000" → "5454 5400 0000 0000"
pub fn format_card_number(number: &str) -> String {
    let digits = digits_only(number);
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 4);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && i % 4 == 0 {
            formatted.push(' ');
        }
        formatted.push(c);
    }

    formatted
}
