//! Advanced settings: values, validation and the grouped preference listing.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 10; K) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Mobile Safari/537.36";

const DEFAULT_CONNECTIVITY_PROBE: &str = "1.1.1.1:53";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("unknown setting `{0}`")]
    UnknownKey(String),
    #[error("`{key}` expects {expected}, got `{value}`")]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("invalid user agent string: {0}")]
    InvalidUserAgent(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DohProvider {
    #[default]
    Disabled,
    Cloudflare,
    Google,
    AdGuard,
    Quad9,
    AliDns,
    DnsPod,
    Dns360,
    Quad101,
    Mullvad,
    ControlD,
    Njalla,
    Shecan,
}

impl DohProvider {
    pub const ALL: [DohProvider; 13] = [
        DohProvider::Disabled,
        DohProvider::Cloudflare,
        DohProvider::Google,
        DohProvider::AdGuard,
        DohProvider::Quad9,
        DohProvider::AliDns,
        DohProvider::DnsPod,
        DohProvider::Dns360,
        DohProvider::Quad101,
        DohProvider::Mullvad,
        DohProvider::ControlD,
        DohProvider::Njalla,
        DohProvider::Shecan,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DohProvider::Disabled => "Disabled",
            DohProvider::Cloudflare => "Cloudflare",
            DohProvider::Google => "Google",
            DohProvider::AdGuard => "AdGuard",
            DohProvider::Quad9 => "Quad9",
            DohProvider::AliDns => "AliDNS",
            DohProvider::DnsPod => "DNSPod",
            DohProvider::Dns360 => "360",
            DohProvider::Quad101 => "Quad 101",
            DohProvider::Mullvad => "Mullvad",
            DohProvider::ControlD => "Control D",
            DohProvider::Njalla => "Njalla",
            DohProvider::Shecan => "Shecan",
        }
    }

    /// Accepts the label in any case, with or without spaces.
    pub fn parse(value: &str) -> Option<Self> {
        let wanted: String = value.chars().filter(|c| !c.is_whitespace()).collect();
        Self::ALL.into_iter().find(|provider| {
            let label: String = provider
                .label()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            label.eq_ignore_ascii_case(&wanted)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedSettings {
    pub verbose_logging: bool,
    pub doh_provider: DohProvider,
    pub user_agent: String,
    pub auto_clear_chapter_cache: bool,
    /// Address dialled to decide whether the device is online.
    pub connectivity_probe: String,
}

impl Default for AdvancedSettings {
    fn default() -> Self {
        Self {
            verbose_logging: false,
            doh_provider: DohProvider::Disabled,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            auto_clear_chapter_cache: false,
            connectivity_probe: DEFAULT_CONNECTIVITY_PROBE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyOutcome {
    pub requires_restart: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceKind {
    Switch(bool),
    /// Plain action row.
    Text,
    List {
        selected: String,
        entries: Vec<String>,
    },
    EditText(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceItem {
    pub key: &'static str,
    pub title: &'static str,
    pub subtitle: Option<String>,
    pub kind: PreferenceKind,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceGroup {
    pub title: &'static str,
    pub items: Vec<PreferenceItem>,
}

/// Same rules HTTP header values follow: visible ASCII and spaces only.
pub fn validate_user_agent(value: &str) -> Result<(), SettingsError> {
    if value.trim().is_empty() {
        return Err(SettingsError::InvalidUserAgent("must not be blank"));
    }
    if value.chars().any(|c| c == '\t' || !(' '..='~').contains(&c)) {
        return Err(SettingsError::InvalidUserAgent(
            "only printable ASCII characters are allowed",
        ));
    }
    Ok(())
}

impl AdvancedSettings {
    /// Updates one setting from its textual form.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<ApplyOutcome, SettingsError> {
        match key {
            "verbose_logging" => {
                self.verbose_logging = parse_bool("verbose_logging", value)?;
                Ok(ApplyOutcome {
                    requires_restart: true,
                })
            }
            "auto_clear_chapter_cache" => {
                self.auto_clear_chapter_cache = parse_bool("auto_clear_chapter_cache", value)?;
                Ok(ApplyOutcome::default())
            }
            "doh_provider" => {
                self.doh_provider =
                    DohProvider::parse(value).ok_or_else(|| SettingsError::InvalidValue {
                        key: "doh_provider",
                        expected: "a DNS-over-HTTPS provider name",
                        value: value.to_string(),
                    })?;
                Ok(ApplyOutcome {
                    requires_restart: true,
                })
            }
            "user_agent" => {
                validate_user_agent(value)?;
                self.user_agent = value.to_string();
                Ok(ApplyOutcome {
                    requires_restart: true,
                })
            }
            "connectivity_probe" => {
                value
                    .parse::<SocketAddr>()
                    .map_err(|_| SettingsError::InvalidValue {
                        key: "connectivity_probe",
                        expected: "a socket address like 1.1.1.1:53",
                        value: value.to_string(),
                    })?;
                self.connectivity_probe = value.to_string();
                Ok(ApplyOutcome::default())
            }
            other => Err(SettingsError::UnknownKey(other.to_string())),
        }
    }

    pub fn reset_user_agent(&mut self) -> ApplyOutcome {
        let changed = self.user_agent != DEFAULT_USER_AGENT;
        self.user_agent = DEFAULT_USER_AGENT.to_string();
        ApplyOutcome {
            requires_restart: changed,
        }
    }

    pub fn preference_groups(
        &self,
        failed_updates: usize,
        chapter_cache_bytes: u64,
    ) -> Vec<PreferenceGroup> {
        vec![
            PreferenceGroup {
                title: "Advanced",
                items: vec![PreferenceItem {
                    key: "verbose_logging",
                    title: "Verbose logging",
                    subtitle: Some("Print verbose logs to the log file".to_string()),
                    kind: PreferenceKind::Switch(self.verbose_logging),
                    enabled: true,
                }],
            },
            PreferenceGroup {
                title: "Data",
                items: vec![
                    PreferenceItem {
                        key: "clear_chapter_cache",
                        title: "Clear chapter cache",
                        subtitle: Some(format!("Used: {}", readable_size(chapter_cache_bytes))),
                        kind: PreferenceKind::Text,
                        enabled: true,
                    },
                    PreferenceItem {
                        key: "auto_clear_chapter_cache",
                        title: "Clear chapter cache on app close",
                        subtitle: None,
                        kind: PreferenceKind::Switch(self.auto_clear_chapter_cache),
                        enabled: true,
                    },
                    PreferenceItem {
                        key: "clear_failed_updates",
                        title: "Clear failed updates",
                        subtitle: Some(format!("{failed_updates} recorded")),
                        kind: PreferenceKind::Text,
                        enabled: failed_updates > 0,
                    },
                ],
            },
            PreferenceGroup {
                title: "Network",
                items: vec![
                    PreferenceItem {
                        key: "doh_provider",
                        title: "DNS over HTTPS (DoH)",
                        subtitle: None,
                        kind: PreferenceKind::List {
                            selected: self.doh_provider.label().to_string(),
                            entries: DohProvider::ALL
                                .iter()
                                .map(|provider| provider.label().to_string())
                                .collect(),
                        },
                        enabled: true,
                    },
                    PreferenceItem {
                        key: "user_agent",
                        title: "Default user agent string",
                        subtitle: None,
                        kind: PreferenceKind::EditText(self.user_agent.clone()),
                        enabled: true,
                    },
                    PreferenceItem {
                        key: "reset_user_agent",
                        title: "Reset default user agent string",
                        subtitle: None,
                        kind: PreferenceKind::Text,
                        enabled: self.user_agent != DEFAULT_USER_AGENT,
                    },
                    PreferenceItem {
                        key: "connectivity_probe",
                        title: "Connectivity check address",
                        subtitle: None,
                        kind: PreferenceKind::EditText(self.connectivity_probe.clone()),
                        enabled: true,
                    },
                ],
            },
        ]
    }
}

/// Human-readable byte count in binary units.
pub fn readable_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, SettingsError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(SettingsError::InvalidValue {
            key,
            expected: "on or off",
            value: value.to_string(),
        }),
    }
}
