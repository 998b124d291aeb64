use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgb8;
use crate::foundation::error::{PipelineError, PipelineResult};

/// Parse `#RGB` or `#RRGGBB` (case-insensitive, `#` required).
pub fn parse_hex_rgb(s: &str) -> PipelineResult<Rgb8> {
    let s = s.trim();
    let Some(hex) = s.strip_prefix('#') else {
        return Err(PipelineError::validation(format!(
            "color \"{s}\" must start with '#'"
        )));
    };
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PipelineError::validation(format!(
            "color \"{s}\" contains non-hex digits"
        )));
    }

    fn hex_byte(pair: &str) -> PipelineResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| PipelineError::validation(format!("invalid hex byte \"{pair}\"")))
    }

    match hex.len() {
        3 => {
            let mut out = [0u8; 3];
            for (slot, c) in out.iter_mut().zip(hex.chars()) {
                let nibble = c.to_digit(16).unwrap_or(0) as u8;
                *slot = nibble * 17;
            }
            Ok(Rgb8::new(out[0], out[1], out[2]))
        }
        6 => Ok(Rgb8::new(
            hex_byte(&hex[0..2])?,
            hex_byte(&hex[2..4])?,
            hex_byte(&hex[4..6])?,
        )),
        _ => Err(PipelineError::validation(
            "hex color must be #RGB or #RRGGBB (case-insensitive)",
        )),
    }
}

impl std::str::FromStr for Rgb8 {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_rgb(s)
    }
}

impl Serialize for Rgb8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Arr([u8; 3]),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => parse_hex_rgb(&s).map_err(serde::de::Error::custom),
            Repr::Arr([r, g, b]) => Ok(Rgb8::new(r, g, b)),
        }
    }
}
