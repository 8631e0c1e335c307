//! Keyword-table splitting
//!
//! A [`KeywordTable`] is an ordered list of categories, each with a list of
//! keywords. A tool belongs to the first category with a keyword contained in
//! its name (case-sensitive); otherwise it falls back to the table default.
//! Markers in the manifest are treated as comments.
//!
//! Custom tables load from TOML:
//!
//! ```toml
//! default = "Utilities"
//!
//! [[category]]
//! name = "Kerberos"
//! keywords = ["Rubeus", "kerbrute", "GetUserSPNs"]
//!
//! [[category]]
//! name = "Enumeration"
//! keywords = ["BloodHound", "SharpHound", "ldapdomaindump"]
//! ```

use serde::Deserialize;
use std::io::BufRead;
use std::path::Path;

use super::sink::CategoryFiles;
use super::{Category, Line, ManifestLines, SplitReport, ToolEntry, Warning};
use crate::core::error::SplitError;

/// Fallback category when no keyword matches
pub const DEFAULT_CATEGORY: &str = "Utilities";

const LINUX: &[(&str, &[&str])] = &[
    (
        "Privilege-Escalation",
        &[
            "LinPEAS",
            "Linux Exploit Suggester",
            "LinEnum",
            "unix-privesc-check",
            "SUID3NUM",
            "GTFOBins",
            "PEASS",
            "Checksec",
            "Linux Exploit Suggester 2",
            "LES",
            "Dirty COW",
            "LinuxPrivChecker",
        ],
    ),
    (
        "Enumeration",
        &[
            "enum4linux-ng",
            "pspy",
            "lscpu",
            "lsof",
            "nmap-vulners",
            "linux-smart-enumeration",
            "Procmon",
            "VulnScan",
            "Lynis",
        ],
    ),
    (
        "Binaries",
        &[
            "busybox",
            "socat",
            "chkrootkit",
            "rkhunter",
            "nc",
            "proxychains-ng",
            "Chisel",
            "SSHuttle",
            "Wget",
            "Curl",
            "Dropbear",
            "Ngrok",
        ],
    ),
    (
        "Exploitation",
        &[
            "Metasploit Framework",
            "Exploit-DB",
            "Kernelpop",
            "CVE-2017-5638",
            "CVE-2021-4034",
        ],
    ),
    ("Networking", &["Nmap", "Masscan", "Wireshark", "Hping3"]),
    ("Persistence", &["Pupy", "Cronjob Persistence", "Rootkits"]),
    ("Utilities", &["Hashcat", "John the Ripper", "Hydra", "GDB", "Strace"]),
];

const WINDOWS: &[(&str, &[&str])] = &[
    ("Enumeration", &["WinPEAS", "PrivescCheck", "Seatbelt", "SharpUp"]),
    ("Exploitation", &["JuicyPotatoNG", "RoguePotato", "PrintSpoofer"]),
    (
        "Utilities",
        &[
            "Windows-Exploit-Suggester",
            "SessionGopher",
            "LaZagne",
            "Hashcat",
            "John-the-Ripper",
            "Hydra",
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Ordered category lookup table. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    rules: Vec<CategoryRule>,
    default: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TableFile {
    default: Option<String>,
    #[serde(rename = "category", default)]
    categories: Vec<CategoryRule>,
}

impl KeywordTable {
    pub fn new(rules: Vec<CategoryRule>, default: impl Into<String>) -> Self {
        Self {
            rules,
            default: default.into(),
        }
    }

    fn from_static(table: &[(&str, &[&str])]) -> Self {
        let rules = table
            .iter()
            .map(|(name, keywords)| CategoryRule {
                name: name.to_string(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            })
            .collect();
        Self::new(rules, DEFAULT_CATEGORY)
    }

    /// Built-in table for Linux tooling.
    pub fn linux() -> Self {
        Self::from_static(LINUX)
    }

    /// Built-in table for Windows tooling.
    pub fn windows() -> Self {
        Self::from_static(WINDOWS)
    }

    /// Parse a table from TOML text. Empty keywords and empty names are
    /// rejected since they would match every tool or name no file.
    pub fn from_toml_str(text: &str) -> Result<Self, String> {
        let file: TableFile = toml::from_str(text).map_err(|e| e.to_string())?;

        for rule in &file.categories {
            if rule.name.trim().is_empty() {
                return Err("category with an empty name".to_string());
            }
            if rule.keywords.iter().any(|k| k.is_empty()) {
                return Err(format!("category '{}' has an empty keyword", rule.name));
            }
        }

        let default = file.default.unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        if default.trim().is_empty() {
            return Err("default category is empty".to_string());
        }
        Ok(Self::new(file.categories, default))
    }

    /// Load a table from a TOML file.
    pub fn load(path: &Path) -> Result<Self, SplitError> {
        let text = std::fs::read_to_string(path).map_err(|e| SplitError::InvalidTable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text).map_err(|message| SplitError::InvalidTable {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn default_category(&self) -> &str {
        &self.default
    }

    /// Category for a tool name (already stripped of any `git:` prefix).
    pub fn categorize(&self, tool_name: &str) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| tool_name.contains(k.as_str())))
            .map(|rule| rule.name.as_str())
            .unwrap_or(&self.default)
    }
}

pub(crate) fn run<R: BufRead>(
    lines: ManifestLines<R>,
    table: &KeywordTable,
    files: &mut CategoryFiles,
    report: &mut SplitReport,
) -> Result<(), SplitError> {
    for item in lines {
        let (line_no, raw) = item?;
        let record = match Line::classify(&raw) {
            Line::Record(record) => record,
            Line::Blank | Line::Marker(_) => continue,
        };

        let Some(entry) = ToolEntry::parse(record) else {
            report.warn(Warning::Malformed {
                line_no,
                line: record.to_string(),
            });
            continue;
        };

        let category = Category::new(table.categorize(entry.bare_name()));
        files.write_line(&category, &entry.to_line())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linux_exact_name() {
        assert_eq!(KeywordTable::linux().categorize("LinPEAS"), "Privilege-Escalation");
        assert_eq!(KeywordTable::linux().categorize("pspy"), "Enumeration");
        assert_eq!(KeywordTable::linux().categorize("Masscan"), "Networking");
    }

    #[test]
    fn test_linux_keyword_substring_of_name() {
        assert_eq!(KeywordTable::linux().categorize("pspy64"), "Enumeration");
        assert_eq!(KeywordTable::linux().categorize("Chisel-linux"), "Binaries");
    }

    #[test]
    fn test_first_matching_category_wins() {
        // "PEASS" (Privilege-Escalation) is listed before anything in later categories.
        assert_eq!(KeywordTable::linux().categorize("PEASS-ng"), "Privilege-Escalation");
        // "socat-nc" hits Binaries through both keywords; order still decides.
        assert_eq!(KeywordTable::linux().categorize("socat-nc"), "Binaries");
    }

    #[test]
    fn test_match_is_case_sensitive() {
        assert_eq!(KeywordTable::windows().categorize("winpeas"), "Utilities");
        assert_eq!(KeywordTable::windows().categorize("WinPEASx64"), "Enumeration");
    }

    #[test]
    fn test_unknown_tool_falls_back_to_default() {
        assert_eq!(KeywordTable::linux().categorize("ZZZ"), "Utilities");
        assert_eq!(KeywordTable::windows().categorize("Mimikatz"), "Utilities");
    }

    #[test]
    fn test_categorize_is_deterministic() {
        let table = KeywordTable::linux();
        let first = table.categorize("linux-smart-enumeration").to_string();
        for _ in 0..10 {
            assert_eq!(table.categorize("linux-smart-enumeration"), first);
        }
    }

    #[test]
    fn test_from_toml_keeps_order_and_default() {
        let table = KeywordTable::from_toml_str(
            r#"
default = "Misc"

[[category]]
name = "Kerberos"
keywords = ["Rubeus", "kerbrute"]

[[category]]
name = "Enumeration"
keywords = ["BloodHound", "kerbrute"]
"#,
        )
        .unwrap();

        assert_eq!(table.rules().len(), 2);
        assert_eq!(table.categorize("kerbrute"), "Kerberos");
        assert_eq!(table.categorize("SharpHound"), "Misc");
        assert_eq!(table.categorize("BloodHound.py"), "Enumeration");
    }

    #[test]
    fn test_from_toml_default_category() {
        let table = KeywordTable::from_toml_str("[[category]]\nname = \"A\"\nkeywords = [\"x\"]\n").unwrap();
        assert_eq!(table.default_category(), DEFAULT_CATEGORY);
    }

    #[test]
    fn test_from_toml_rejects_empty_keyword() {
        let err = KeywordTable::from_toml_str("[[category]]\nname = \"A\"\nkeywords = [\"\"]\n")
            .unwrap_err();
        assert!(err.contains("empty keyword"));
    }

    #[test]
    fn test_from_toml_rejects_unknown_fields() {
        assert!(KeywordTable::from_toml_str("defualt = \"X\"\n").is_err());
    }
}
