//! Wire and pin colors.
//!
//! Colors are written as concatenated two-letter codes (`RD`, `RDBU`,
//! `GNYERD`). A single value carries one to three sub-colors; multi-colored
//! wires are drawn as bands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

/// Code of the tinned shield appearance.
pub const SHIELD_COLOR: &str = "SN";
/// Hex color used for wires without a color.
pub const DEFAULT_WIRE_HEX: &str = "#ffffff";
/// Hex color of the black frame around wires and of mate lines.
pub const BLACK_HEX: &str = "#000000";

/// Maximum number of sub-colors in one color value.
pub const MAX_SUB_COLORS: usize = 3;

struct ColorInfo {
    code: &'static str,
    hex: &'static str,
    full: &'static str,
    german: &'static str,
}

const fn info(
    code: &'static str,
    hex: &'static str,
    full: &'static str,
    german: &'static str,
) -> ColorInfo {
    ColorInfo {
        code,
        hex,
        full,
        german,
    }
}

const COLORS: &[ColorInfo] = &[
    info("BK", "#000000", "black", "sw"),
    info("WH", "#ffffff", "white", "ws"),
    info("GY", "#999999", "grey", "gr"),
    info("PK", "#ff66cc", "pink", "rs"),
    info("RD", "#ff0000", "red", "rt"),
    info("OG", "#ff8000", "orange", "or"),
    info("YE", "#ffff00", "yellow", "ge"),
    info("OL", "#708000", "olive green", "ol"),
    info("GN", "#00ff00", "green", "gn"),
    info("TQ", "#00ffff", "turquoise", "tk"),
    info("LB", "#a0dfff", "light blue", "hb"),
    info("BU", "#0066ff", "blue", "bl"),
    info("VT", "#8000ff", "violet", "vi"),
    info("BN", "#895956", "brown", "br"),
    info("BG", "#ceb673", "beige", "bg"),
    info("IV", "#f5f0d0", "ivory", "eb"),
    info("SL", "#708090", "slate", "si"),
    info("CU", "#d6775e", "copper", "cu"),
    info("SN", "#aaaaaa", "tin", "vz"),
    info("SR", "#84878c", "silver", "ag"),
    info("GD", "#ffcf80", "gold", "au"),
];

fn lookup(code: &str) -> Option<&'static ColorInfo> {
    COLORS.iter().find(|c| c.code == code)
}

/// Hex value of a single two-letter code.
pub fn hex(code: &str) -> Result<&'static str> {
    lookup(code)
        .map(|c| c.hex)
        .ok_or_else(|| HarnessError::UnknownColor {
            designator: None,
            color: code.to_string(),
        })
}

const DIN_47100: &[&str] = &[
    "WH", "BN", "GN", "YE", "GY", "PK", "BU", "RD", "BK", "VT", "GYPK", "RDBU", "WHGN", "BNGN",
    "WHYE", "YEBN", "WHGY", "GYBN", "WHPK", "PKBN", "WHBU", "BNBU", "WHRD", "BNRD", "WHBK", "BNBK",
    "GYGN", "YEGY", "PKGN", "YEPK", "GNBU", "YEBU", "GNRD", "YERD", "GNBK", "YEBK", "GYBU", "PKBU",
    "GYRD", "PKRD", "GYBK", "PKBK", "BUBK", "RDBK",
];

const IEC_60757: &[&str] = &["BN", "RD", "OG", "YE", "GN", "BU", "VT", "GY", "WH", "BK"];

const BLACK_WHITE: &[&str] = &["BK", "WH"];

const TEL: &[&str] = &[
    "BUWH", "WHBU", "OGWH", "WHOG", "GNWH", "WHGN", "BNWH", "WHBN", "SLWH", "WHSL", "BURD", "RDBU",
    "OGRD", "RDOG", "GNRD", "RDGN", "BNRD", "RDBN", "SLRD", "RDSL", "BUBK", "BKBU", "OGBK", "BKOG",
    "GNBK", "BKGN", "BNBK", "BKBN", "SLBK", "BKSL", "BUYE", "YEBU", "OGYE", "YEOG", "GNYE", "YEGN",
    "BNYE", "YEBN", "SLYE", "YESL", "BUVT", "VTBU", "OGVT", "VTOG", "GNVT", "VTGN", "BNVT", "VTBN",
    "SLVT", "VTSL",
];

const TEL_ALT: &[&str] = &[
    "WHBU", "BU", "WHOG", "OG", "WHGN", "GN", "WHBN", "BN", "WHSL", "SL", "RDBU", "BURD", "RDOG",
    "OGRD", "RDGN", "GNRD", "RDBN", "BNRD", "RDSL", "SLRD", "BKBU", "BUBK", "BKOG", "OGBK", "BKGN",
    "GNBK", "BKBN", "BNBK", "BKSL", "SLBK", "YEBU", "BUYE", "YEOG", "OGYE", "YEGN", "GNYE", "YEBN",
    "BNYE", "YESL", "SLYE", "VTBU", "BUVT", "VTOG", "OGVT", "VTGN", "GNVT", "VTBN", "BNVT", "VTSL",
    "SLVT",
];

const T568A: &[&str] = &["WHGN", "GN", "WHOG", "BU", "WHBU", "OG", "WHBN", "BN"];
const T568B: &[&str] = &["WHOG", "OG", "WHGN", "BU", "WHBU", "GN", "WHBN", "BN"];

/// Color sequence of a named color code.
pub fn color_code(name: &str) -> Result<&'static [&'static str]> {
    match name {
        "DIN" => Ok(DIN_47100),
        "IEC" => Ok(IEC_60757),
        "BW" => Ok(BLACK_WHITE),
        "TEL" => Ok(TEL),
        "TELALT" => Ok(TEL_ALT),
        "T568A" => Ok(T568A),
        "T568B" => Ok(T568B),
        _ => Err(HarnessError::UnknownColorCode(name.to_string())),
    }
}

/// Color code applied to bundles that specify neither colors nor a code.
pub const DEFAULT_BUNDLE_COLOR_CODE: &str = "DIN";

/// A color value of one to three two-letter sub-colors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MultiColor(Vec<&'static str>);

impl MultiColor {
    pub fn codes(&self) -> &[&'static str] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_multicolor(&self) -> bool {
        self.0.len() > 1
    }

    /// Hex colors of the bands a wire of this color is drawn with.
    ///
    /// Two sub-colors are extended with the first one again to give a striped
    /// look. A single sub-color is tripled when `pad` is set so that it
    /// matches the thickness of multi-colored wires in the same cable.
    pub fn bands(&self, pad: bool) -> Vec<&'static str> {
        let codes: Vec<&'static str> = match self.0.as_slice() {
            [first, second] => vec![*first, *second, *first],
            [single] if pad => vec![*single; 3],
            other => other.to_vec(),
        };
        codes
            .into_iter()
            .map(|code| lookup(code).map(|c| c.hex).unwrap_or(DEFAULT_WIRE_HEX))
            .collect()
    }

    /// Hex color of every sub-color, without padding.
    pub fn hex_colors(&self) -> Vec<&'static str> {
        self.0
            .iter()
            .map(|code| lookup(code).map(|c| c.hex).unwrap_or(DEFAULT_WIRE_HEX))
            .collect()
    }

    /// Human readable form in the requested mode.
    pub fn display(&self, mode: ColorMode) -> String {
        let parts: Vec<String> = self
            .0
            .iter()
            .filter_map(|code| lookup(code))
            .map(|c| match mode.style {
                ColorStyle::Short => c.code.to_string(),
                ColorStyle::Full => c.full.to_string(),
                ColorStyle::Hex => c.hex.to_string(),
                ColorStyle::German => c.german.to_string(),
            })
            .map(|s| {
                if mode.uppercase {
                    s.to_uppercase()
                } else {
                    s.to_lowercase()
                }
            })
            .collect();
        let separator = match mode.style {
            ColorStyle::Short => "",
            ColorStyle::German => "",
            ColorStyle::Full | ColorStyle::Hex => "/",
        };
        parts.join(separator)
    }
}

impl FromStr for MultiColor {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_uppercase();
        let unknown = || HarnessError::UnknownColor {
            designator: None,
            color: s.to_string(),
        };
        if upper.is_empty() || upper.len() % 2 != 0 || !upper.is_ascii() {
            return Err(unknown());
        }
        let codes = (0..upper.len())
            .step_by(2)
            .map(|i| lookup(&upper[i..i + 2]).map(|c| c.code).ok_or_else(unknown))
            .collect::<Result<Vec<_>>>()?;
        if codes.len() > MAX_SUB_COLORS {
            return Err(unknown());
        }
        Ok(MultiColor(codes))
    }
}

impl TryFrom<String> for MultiColor {
    type Error = HarnessError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<MultiColor> for String {
    fn from(c: MultiColor) -> Self {
        c.to_string()
    }
}

impl fmt::Display for MultiColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for code in &self.0 {
            f.write_str(code)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorStyle {
    Short,
    Full,
    Hex,
    German,
}

/// How colors are spelled in labels and BOM descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColorMode {
    pub style: ColorStyle,
    pub uppercase: bool,
}

impl Default for ColorMode {
    fn default() -> Self {
        ColorMode {
            style: ColorStyle::Short,
            uppercase: true,
        }
    }
}

impl FromStr for ColorMode {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        let style = match s.to_lowercase().as_str() {
            "short" => ColorStyle::Short,
            "full" => ColorStyle::Full,
            "hex" => ColorStyle::Hex,
            "ger" => ColorStyle::German,
            _ => return Err(HarnessError::UnknownColorMode(s.to_string())),
        };
        let uppercase = s.chars().all(|c| c.is_ascii_uppercase());
        Ok(ColorMode { style, uppercase })
    }
}

impl TryFrom<String> for ColorMode {
    type Error = HarnessError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<ColorMode> for String {
    fn from(mode: ColorMode) -> Self {
        let name = match mode.style {
            ColorStyle::Short => "short",
            ColorStyle::Full => "full",
            ColorStyle::Hex => "hex",
            ColorStyle::German => "ger",
        };
        if mode.uppercase {
            name.to_uppercase()
        } else {
            name.to_string()
        }
    }
}

/// Whether single-color wires of a cable are tripled: only when some wire in
/// the same cable has more than one sub-color.
pub fn needs_padding<'a>(colors: impl IntoIterator<Item = &'a MultiColor>) -> bool {
    colors.into_iter().any(MultiColor::is_multicolor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mc(s: &str) -> MultiColor {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_multicolor() {
        assert_eq!(mc("RD").codes(), &["RD"]);
        assert_eq!(mc("rdbu").codes(), &["RD", "BU"]);
        assert_eq!(mc("GNYERD").len(), 3);
        assert!("XX".parse::<MultiColor>().is_err());
        assert!("RDB".parse::<MultiColor>().is_err());
        assert!("RDBUGNYE".parse::<MultiColor>().is_err());
        assert!("".parse::<MultiColor>().is_err());
    }

    #[test]
    fn test_padding_is_cable_scoped() {
        let mixed = [mc("RD"), mc("RDBU")];
        let pad = needs_padding(&mixed);
        assert!(pad);
        assert_eq!(mixed[0].bands(pad), vec!["#ff0000", "#ff0000", "#ff0000"]);
        assert_eq!(mixed[1].bands(pad), vec!["#ff0000", "#0066ff", "#ff0000"]);

        let plain = [mc("RD"), mc("BU")];
        let pad = needs_padding(&plain);
        assert!(!pad);
        assert_eq!(plain[0].bands(pad), vec!["#ff0000"]);
        assert_eq!(plain[1].bands(pad), vec!["#0066ff"]);
    }

    #[test]
    fn test_two_colors_always_striped() {
        assert_eq!(mc("WHGN").bands(false).len(), 3);
        assert_eq!(mc("GNYERD").bands(true).len(), 3);
    }

    #[test]
    fn test_color_modes() {
        let c = mc("RDBU");
        assert_eq!(c.display("SHORT".parse().unwrap()), "RDBU");
        assert_eq!(c.display("short".parse().unwrap()), "rdbu");
        assert_eq!(c.display("full".parse().unwrap()), "red/blue");
        assert_eq!(c.display("HEX".parse().unwrap()), "#FF0000/#0066FF");
        assert_eq!(c.display("ger".parse().unwrap()), "rtbl");
        assert!("rainbow".parse::<ColorMode>().is_err());
    }

    #[test]
    fn test_color_codes() {
        assert_eq!(color_code("IEC").unwrap().len(), 10);
        assert_eq!(color_code("T568B").unwrap()[0], "WHOG");
        for code in DIN_47100.iter().chain(TEL).chain(TEL_ALT) {
            assert!(code.parse::<MultiColor>().is_ok(), "{code}");
        }
        assert!(matches!(
            color_code("XYZ"),
            Err(HarnessError::UnknownColorCode(_))
        ));
    }
}
