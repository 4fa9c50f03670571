//! Named codesets for `range <codeset>=<frame>` entries

/// CP1252 0x80..=0x9F (0 = undefined slot)
const CP1252_HIGH: [u32; 32] = [
    0x20AC, 0, 0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021, //
    0x02C6, 0x2030, 0x0160, 0x2039, 0x0152, 0, 0x017D, 0, //
    0, 0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014, //
    0x02DC, 0x2122, 0x0161, 0x203A, 0x0153, 0, 0x017E, 0x0178,
];

/// Frame order of numeric score fonts
const NUMBERS: &str = "0123456789%. :x";

/// Table codeset: frame slot -> codepoint, with unmapped slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codeset {
    Ascii,
    Iso8859_1,
    Cp1252,
    Numbers,
}

impl Codeset {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ascii" => Some(Self::Ascii),
            "iso-8859-1" => Some(Self::Iso8859_1),
            "cp1252" => Some(Self::Cp1252),
            "numbers" => Some(Self::Numbers),
            _ => None,
        }
    }

    /// Number of slots
    pub fn len(self) -> u32 {
        match self {
            Self::Ascii => 128,
            Self::Iso8859_1 | Self::Cp1252 => 256,
            Self::Numbers => NUMBERS.len() as u32,
        }
    }

    /// Codepoint in `slot`; `None` for unmapped or out-of-table slots
    pub fn codepoint(self, slot: u32) -> Option<u32> {
        if slot >= self.len() {
            return None;
        }
        match self {
            Self::Ascii => (0x20..=0x7E).contains(&slot).then_some(slot),
            Self::Iso8859_1 => {
                ((0x20..=0x7F).contains(&slot) || slot >= 0xA0).then_some(slot)
            }
            Self::Cp1252 => match slot {
                0x20..=0x7E | 0xA0..=0xFF => Some(slot),
                0x80..=0x9F => Some(CP1252_HIGH[(slot - 0x80) as usize]).filter(|&cp| cp != 0),
                _ => None,
            },
            Self::Numbers => NUMBERS.chars().nth(slot as usize).map(u32::from),
        }
    }
}
