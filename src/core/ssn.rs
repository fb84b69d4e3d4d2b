use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fixed rendering of a taxpayer identifier; no input digits ever appear in it.
pub const SSN_MASK: &str = "***-**-****";

/// Social Security Number held as a secret.
///
/// `Debug`, `Display` and `Serialize` only ever produce [`SSN_MASK`]. The raw
/// value is visible to this crate's validation code and nothing else.
#[derive(Clone, PartialEq, Eq)]
pub struct TaxpayerId {
    secret: String,
}

impl TaxpayerId {
    pub fn new(secret: impl Into<String>) -> Self {
        TaxpayerId {
            secret: secret.into(),
        }
    }

    pub fn masked(&self) -> &'static str {
        SSN_MASK
    }

    pub(crate) fn reveal(&self) -> &str {
        &self.secret
    }

    /// Either `ddd-dd-dddd` or nine bare digits.
    pub(crate) fn is_well_formed(&self) -> bool {
        let bytes = self.reveal().as_bytes();
        match bytes.len() {
            9 => bytes.iter().all(u8::is_ascii_digit),
            11 => bytes.iter().enumerate().all(|(i, b)| match i {
                3 | 6 => *b == b'-',
                _ => b.is_ascii_digit(),
            }),
            _ => false,
        }
    }
}

impl std::fmt::Debug for TaxpayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TaxpayerId({})", SSN_MASK)
    }
}

impl std::fmt::Display for TaxpayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(SSN_MASK)
    }
}

impl Serialize for TaxpayerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(SSN_MASK)
    }
}

impl<'de> Deserialize<'de> for TaxpayerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(TaxpayerId::new)
    }
}
