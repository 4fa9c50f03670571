//! Font `.ini` reader
//!
//! Key/value-by-section source for font page settings. Section and key
//! lookups are case-insensitive; values keep their raw text so that
//! `line N=` rows may begin with a space.

use std::str::FromStr;

/// One `[section]` with its entries in file order
#[derive(Debug, Clone, Default)]
pub struct IniSection {
    name: String,
    entries: Vec<(String, String)>,
}

impl IniSection {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries in file order; keys trimmed, values raw
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Raw value of the last entry named `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Trimmed value parsed as `T`; `None` when absent or unparseable
    pub fn get_parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

    /// `1`/`true`/`yes` (case-insensitive) are true, `0`/`false`/`no` false
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        let v = self.get(key)?.trim().to_ascii_lowercase();
        match v.as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => None,
        }
    }
}

/// Parsed `.ini` file
#[derive(Debug, Clone, Default)]
pub struct IniFile {
    sections: Vec<IniSection>,
}

impl IniFile {
    /// Parse `.ini` text. Never fails: unrecognized lines are skipped.
    pub fn parse(text: &str) -> Self {
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
        let mut file = IniFile::default();
        let mut current: Option<usize> = None;

        for raw in text.lines() {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if is_comment(line) || line.trim().is_empty() {
                continue;
            }
            if let Some(name) = parse_section_header(line) {
                current = Some(file.section_index_or_insert(name));
                continue;
            }
            let Some((key, value)) = split_entry(line) else {
                continue;
            };
            // Entries before any header land in an unnamed section
            let idx = match current {
                Some(idx) => idx,
                None => {
                    let idx = file.section_index_or_insert("");
                    current = Some(idx);
                    idx
                }
            };
            file.sections[idx]
                .entries
                .push((key.to_string(), value.to_string()));
        }

        file
    }

    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn sections(&self) -> impl Iterator<Item = &IniSection> {
        self.sections.iter()
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    fn section_index_or_insert(&mut self, name: &str) -> usize {
        if let Some(idx) = self
            .sections
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
        {
            return idx;
        }
        self.sections.push(IniSection {
            name: name.to_string(),
            entries: Vec::new(),
        });
        self.sections.len() - 1
    }
}

fn is_comment(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with(';') || t.starts_with('#') || t.starts_with("//")
}

fn parse_section_header(line: &str) -> Option<&str> {
    let t = line.trim();
    if t.len() >= 2 && t.starts_with('[') && t.ends_with(']') {
        Some(t[1..t.len() - 1].trim())
    } else {
        None
    }
}

/// Split `key=value`. A quoted `map "..."` key may itself contain `=`.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let lead = line.len() - line.trim_start().len();
    let body = &line[lead..];

    let is_map = body
        .get(..4)
        .is_some_and(|p| p.eq_ignore_ascii_case("map "));
    let search_from = if is_map {
        let rest = &body[4..];
        let quote = rest.trim_start();
        if let Some(inner) = quote.strip_prefix('"') {
            let open = lead + 4 + (rest.len() - quote.len());
            inner.find('"').map(|close| open + 1 + close + 1).unwrap_or(0)
        } else {
            0
        }
    } else {
        0
    };

    let eq = search_from + line[search_from..].find('=')?;
    let key = line[..eq].trim();
    if key.is_empty() {
        return None;
    }
    Some((key, &line[eq + 1..]))
}
