use serde::{Deserialize, Serialize};

/// Pesewas per cedi.
pub const MINOR_UNITS: i64 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Ghs,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Ghs => "GHS",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Ghs => "GH₵",
        }
    }
}

pub fn cedis_to_pesewas(cedis: i64) -> i64 {
    cedis * MINOR_UNITS
}

/// Renders an amount held in pesewas the way the storefront displays it,
/// e.g. `GH₵4000.00`.
pub fn format_cedis(pesewas: i64) -> String {
    let sign = if pesewas < 0 { "-" } else { "" };
    let abs = pesewas.unsigned_abs();
    format!(
        "{}{}{}.{:02}",
        sign,
        Currency::Ghs.symbol(),
        abs / MINOR_UNITS as u64,
        abs % MINOR_UNITS as u64
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cedis() {
        assert_eq!(format_cedis(400_000), "GH₵4000.00");
        assert_eq!(format_cedis(12_345), "GH₵123.45");
        assert_eq!(format_cedis(5), "GH₵0.05");
    }

    #[test]
    fn test_currency_code() {
        assert_eq!(Currency::Ghs.code(), "GHS");
        assert_eq!(serde_json::to_string(&Currency::Ghs).unwrap(), "\"GHS\"");
    }
}
