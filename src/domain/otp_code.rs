use rand::Rng;

/// A one-time verification code: exactly 6 ASCII digits.
///
/// Codes are drawn from `thread_rng`, which is not a cryptographic source.
/// That is acceptable here because a code is single-use and short-lived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    pub const LENGTH: usize = 6;

    /// Parse a user-submitted code. Surrounding whitespace is ignored.
    pub fn parse(code: String) -> Result<Self, String> {
        let trimmed = code.trim();
        if trimmed.len() != Self::LENGTH {
            return Err(format!(
                "Verification code must be {} digits",
                Self::LENGTH
            ));
        }
        if !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err("Verification code must be numeric".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Uniformly random code in 100000..=999999
    pub fn generate() -> Self {
        let n: u32 = rand::thread_rng().gen_range(100_000..=999_999);
        Self(n.to_string())
    }
}

impl AsRef<str> for OtpCode {
    fn as_ref(&self) -> &str { &self.0 }
}
