// InputAutoCfg.ini parsing
use crate::catalog::Catalog;
use crate::config::Platform;
use crate::model::{ControllerSettings, Profile, SettingValue};
use tracing::{debug, warn};

/// A profile fills at most this many controller slots.
pub const MAX_CONTROLLERS: usize = 4;

const NEXT_CONTROLLER: &str = "__NextController:";
const PLATFORM_PREFIXES: [&str; 5] = ["Unix:", "Linux:", "OSX:", "Win32:", "XInput:"];

pub trait Parser {
    fn parse(&self, text: &str) -> Catalog;
}

/// Reads the auto-config INI format: one `[Device Name]` section per
/// profile, `key = value` mapping lines and the `__NextController:` keyword.
/// Bad lines are logged and skipped.
pub struct IniParser {
    platform: Platform,
}

impl IniParser {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Splits an optional platform prefix off a section name and returns
    /// the pattern with its specificity. `None` when the section belongs
    /// to another platform.
    fn section_pattern<'a>(&self, section: &'a str) -> Option<(&'a str, u8)> {
        if section.is_empty() {
            return None;
        }
        for prefix in PLATFORM_PREFIXES {
            if let Some(rest) = section.strip_prefix(prefix) {
                return self
                    .platform
                    .accepts_prefix(prefix)
                    .then(|| (rest.trim(), prefix_specificity(prefix)));
            }
        }
        Some((section, 0))
    }
}

fn prefix_specificity(prefix: &str) -> u8 {
    if prefix == "XInput:" { 2 } else { 1 }
}

/// Types the keys the host reads as flags or numbers.
fn setting_value(key: &str, value: &str) -> SettingValue {
    if key.eq_ignore_ascii_case("plugged") || key.eq_ignore_ascii_case("mouse") {
        SettingValue::Bool(value.eq_ignore_ascii_case("true"))
    } else if key.eq_ignore_ascii_case("device") {
        match value.parse() {
            Ok(index) => SettingValue::Int(index),
            Err(_) => {
                warn!("Non-numeric device index '{}'", value);
                SettingValue::Text(value.to_string())
            }
        }
    } else {
        SettingValue::Text(value.to_string())
    }
}

#[derive(Default)]
struct PendingProfile {
    name: Option<String>,
    patterns: Vec<String>,
    controllers: Vec<ControllerSettings>,
    specificity: u8,
    has_body: bool,
    overflowed: bool,
}

impl PendingProfile {
    fn add_header(&mut self, section: &str, pattern: Option<(&str, u8)>) {
        let Some((pattern, specificity)) = pattern else {
            debug!("Skipping section [{}]", section);
            return;
        };
        if self.name.is_none() {
            self.name = Some(section.to_string());
            self.controllers.push(ControllerSettings::new());
        }
        self.patterns.push(pattern.to_string());
        self.specificity = self.specificity.max(specificity);
    }

    fn is_active(&self) -> bool {
        self.name.is_some()
    }

    fn set(&mut self, key: &str, value: &str) {
        if self.overflowed {
            return;
        }
        if let Some(current) = self.controllers.last_mut() {
            current.insert(key.to_string(), setting_value(key, value));
        }
    }

    fn next_controller(&mut self) {
        if self.controllers.len() >= MAX_CONTROLLERS {
            if !self.overflowed {
                warn!(
                    "Profile '{}' defines more than {} controllers, ignoring the rest",
                    self.name.as_deref().unwrap_or_default(),
                    MAX_CONTROLLERS
                );
            }
            self.overflowed = true;
            return;
        }
        self.controllers.push(ControllerSettings::new());
    }

    fn finish(self, profiles: &mut Vec<Profile>) {
        let Some(name) = self.name else {
            return;
        };
        match Profile::new(&name, self.patterns.iter().map(String::as_str)) {
            Ok(profile) => profiles.push(
                profile
                    .with_controllers(self.controllers)
                    .with_specificity(self.specificity),
            ),
            Err(e) => warn!("Skipping section [{}]: {}", name, e),
        }
    }
}

impl Parser for IniParser {
    fn parse(&self, text: &str) -> Catalog {
        let mut profiles = Vec::new();
        let mut current: Option<PendingProfile> = None;

        for (index, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
                let section = line[1..line.len() - 1].trim();
                if section.is_empty() {
                    warn!("Empty section header on line {}", index + 1);
                }
                let pattern = self.section_pattern(section);
                // headers with no body in between name the same profile
                let mut pending = match current.take() {
                    Some(p) if !p.has_body => p,
                    Some(p) => {
                        p.finish(&mut profiles);
                        PendingProfile::default()
                    }
                    None => PendingProfile::default(),
                };
                pending.add_header(section, pattern);
                current = Some(pending);
                continue;
            }

            let Some(pending) = current.as_mut() else {
                continue;
            };
            if !pending.is_active() {
                // body of a skipped section
                pending.has_body = true;
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                pending.has_body = true;
                pending.set(key.trim(), value.trim());
                continue;
            }

            if line.ends_with(':') {
                pending.has_body = true;
                if line == NEXT_CONTROLLER {
                    pending.next_controller();
                } else {
                    warn!("Unknown keyword '{}' on line {}", line, index + 1);
                }
                continue;
            }

            warn!("Invalid line {}: '{}'", index + 1, line);
        }

        if let Some(pending) = current {
            pending.finish(&mut profiles);
        }

        Catalog::new(profiles)
    }
}
