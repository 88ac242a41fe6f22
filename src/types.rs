//! Validated parameter types for samtools arguments.
//!
//! These newtypes parse and validate user-supplied strings before they
//! ever reach a child process argv, and carry schema derives so MCP
//! clients see them as typed fields.

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// A genomic region in samtools syntax: `chr`, `chr:start`, or
/// `chr:start-end`. Coordinates may contain commas (`chr1:1,000-2,000`),
/// which samtools strips itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "String", into = "String")]
pub struct Region(String);

fn region_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Reference name, then optional `:start` or `:start-end`
        Regex::new(r"^[0-9A-Za-z!#$%&+./:;?@^_|~=<>*-]+?(:[0-9,]+(-[0-9,]+)?)?$").unwrap()
    })
}

impl Region {
    /// Parses and validates a region string.
    pub fn parse(s: &str) -> Result<Self, String> {
        if s.is_empty() {
            return Err("Region must not be empty".to_string());
        }
        if s.chars().any(char::is_whitespace) {
            return Err(format!("Region '{s}' must not contain whitespace"));
        }
        if !region_re().is_match(s) {
            return Err(format!(
                "Invalid region '{s}'. Expected 'chr', 'chr:start', or 'chr:start-end'"
            ));
        }
        // Range sanity: if both coordinates are present, start <= end
        if let Some((_, range)) = s.rsplit_once(':') {
            if let Some((start, end)) = range.split_once('-') {
                let start: u64 = strip_commas(start)
                    .parse()
                    .map_err(|_| format!("Invalid start coordinate in region '{s}'"))?;
                let end: u64 = strip_commas(end)
                    .parse()
                    .map_err(|_| format!("Invalid end coordinate in region '{s}'"))?;
                if start > end {
                    return Err(format!(
                        "Region '{s}' has start {start} greater than end {end}"
                    ));
                }
            }
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn strip_commas(s: &str) -> String {
    s.replace(',', "")
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Region {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Region> for String {
    fn from(r: Region) -> Self {
        r.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Output format for `view` conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Sam,
    Bam,
    Cram,
}

impl OutputFormat {
    /// The `view` flag selecting this format.
    #[must_use]
    pub const fn view_flag(self) -> &'static str {
        match self {
            Self::Sam => "-S",
            Self::Bam => "-b",
            Self::Cram => "-C",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sam => write!(f, "sam"),
            Self::Bam => write!(f, "bam"),
            Self::Cram => write!(f, "cram"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sam" => Ok(Self::Sam),
            "bam" => Ok(Self::Bam),
            "cram" => Ok(Self::Cram),
            other => Err(format!(
                "Invalid output format: '{other}'. Valid formats: sam, bam, cram"
            )),
        }
    }
}

/// A SAM FLAG bitmask as samtools accepts it: decimal, `0x` hex, or
/// `0`-prefixed octal. The original spelling is preserved for argv.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "String", into = "String")]
pub struct FlagSet(String);

fn parse_flag_bits(s: &str) -> Result<u32, String> {
    let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else if s.len() > 1 && s.starts_with('0') {
        u32::from_str_radix(&s[1..], 8)
    } else {
        s.parse()
    }
    .map_err(|_| format!("Invalid FLAG value '{s}'. Expected decimal, 0x hex, or octal"))?;
    // The SAM spec defines 12 flag bits
    if value > 0xFFF {
        return Err(format!("FLAG value {value} exceeds the SAM maximum of 4095"));
    }
    Ok(value)
}

impl FlagSet {
    /// Parses a FLAG bitmask string.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        parse_flag_bits(s)?;
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric mask. The spelling was validated at construction.
    #[must_use]
    pub fn bits(&self) -> u32 {
        parse_flag_bits(&self.0).unwrap_or(0)
    }
}

impl FromStr for FlagSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FlagSet {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<FlagSet> for String {
    fn from(f: FlagSet) -> Self {
        f.0
    }
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-thread memory for `sort -m`, e.g. `768M`, `4G`, or plain bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "String", into = "String")]
pub struct MemSize(String);

fn mem_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+(\.[0-9]+)?[KkMmGg]?$").unwrap())
}

impl MemSize {
    /// Parses a memory-size string.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if !mem_re().is_match(s) {
            return Err(format!(
                "Invalid memory size '{s}'. Expected e.g. '768M', '4G', or bytes"
            ));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for MemSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MemSize {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<MemSize> for String {
    fn from(m: MemSize) -> Self {
        m.0
    }
}

impl fmt::Display for MemSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Compile-time assertions for thread safety.
// These ensure Send+Sync remain implemented and catch regressions.
#[cfg(test)]
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<Region>();
    assert_send_sync::<OutputFormat>();
    assert_send_sync::<FlagSet>();
    assert_send_sync::<MemSize>();
};
