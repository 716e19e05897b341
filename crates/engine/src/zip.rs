use serde::{Deserialize, Serialize};

/// A resolved ZIP code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipInfo {
    pub zip: String,
    pub city: String,
    pub state_abbr: String,
    pub state_name: String,
}

impl ZipInfo {
    /// "Scottsdale, Arizona", or just the state when the city is unknown.
    pub fn display(&self) -> String {
        if self.city.is_empty() {
            self.state_name.clone()
        } else {
            format!("{}, {}", self.city, self.state_name)
        }
    }
}

/// How input shorter than five digits is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZipPolicy {
    /// Short input is invalid.
    #[default]
    Strict,
    /// Short input is left-padded with zeros ("501" -> "00501").
    ZeroPad,
}

/// Reduce raw input to a 5-digit ZIP.
///
/// Non-digits are dropped and anything past five digits is truncated.
/// Returns `None` when no usable ZIP remains under the given policy.
pub fn normalize_zip(raw: &str, policy: ZipPolicy) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() >= 5 {
        return Some(digits[..5].to_string());
    }
    match policy {
        ZipPolicy::Strict => None,
        ZipPolicy::ZeroPad if digits.is_empty() => None,
        ZipPolicy::ZeroPad => Some(format!("{:0>5}", digits)),
    }
}

/// True for exactly five ASCII digits.
pub fn is_valid_zip(zip: &str) -> bool {
    zip.len() == 5 && zip.bytes().all(|b| b.is_ascii_digit())
}
