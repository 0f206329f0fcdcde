// SPDX-FileCopyrightText: 2026 mkrepo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Machine identity resolution.
//!
//! The identity is the root of the token encryption key, so it must be
//! persistent: the resolver walks an ordered list of probes and fails with
//! [`MkrepoError::Identity`] rather than inventing a fallback value.

use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::LazyLock;

use mkrepo_core::MkrepoError;
use regex::Regex;
use tracing::debug;

static IOREG_UUID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""IOPlatformUUID"\s*=\s*"([^"]+)""#).unwrap());

static REGISTRY_GUID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"MachineGuid\s+REG_SZ\s+(\S+)").unwrap());

/// A persistent, host-scoped identifier. Never logged or displayed.
#[derive(Clone, PartialEq, Eq)]
pub struct MachineId(String);

impl MachineId {
    /// Trim `raw`; returns `None` if nothing is left.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MachineId([REDACTED])")
    }
}

/// One strategy for discovering the machine identity.
pub trait IdentityProbe: Send + Sync {
    /// Short label used in logs and in the resolver's failure message.
    fn name(&self) -> &str;

    /// Returns the identity if this source has one.
    fn probe(&self) -> Option<MachineId>;
}

/// Reads an OS machine-id file such as `/etc/machine-id`.
pub struct FileProbe {
    path: PathBuf,
    label: String,
}

impl FileProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = format!("file:{}", path.display());
        Self { path, label }
    }
}

impl IdentityProbe for FileProbe {
    fn name(&self) -> &str {
        &self.label
    }

    fn probe(&self) -> Option<MachineId> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        MachineId::new(&content)
    }
}

/// Runs a platform registry query and extracts the identifier from its output.
pub struct CommandProbe {
    label: &'static str,
    program: &'static str,
    args: &'static [&'static str],
    parse: fn(&str) -> Option<String>,
}

impl CommandProbe {
    /// macOS hardware registry: `IOPlatformUUID` of the platform expert device.
    pub fn ioreg() -> Self {
        Self {
            label: "ioreg",
            program: "ioreg",
            args: &["-rd1", "-c", "IOPlatformExpertDevice"],
            parse: parse_ioreg_uuid,
        }
    }

    /// Windows registry: `HKLM\SOFTWARE\Microsoft\Cryptography\MachineGuid`.
    pub fn windows_registry() -> Self {
        Self {
            label: "registry",
            program: "reg",
            args: &[
                "query",
                r"HKLM\SOFTWARE\Microsoft\Cryptography",
                "/v",
                "MachineGuid",
            ],
            parse: parse_registry_guid,
        }
    }
}

impl IdentityProbe for CommandProbe {
    fn name(&self) -> &str {
        self.label
    }

    fn probe(&self) -> Option<MachineId> {
        let output = Command::new(self.program)
            .args(self.args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| debug!(probe = self.label, error = %e, "identity command unavailable"))
            .ok()?;
        if !output.status.success() {
            debug!(probe = self.label, status = %output.status, "identity command failed");
            return None;
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        (self.parse)(&stdout).and_then(|raw| MachineId::new(&raw))
    }
}

/// Extract the `IOPlatformUUID` value from `ioreg` output.
pub fn parse_ioreg_uuid(output: &str) -> Option<String> {
    IOREG_UUID
        .captures(output)
        .map(|caps| caps[1].to_string())
}

/// Extract the `MachineGuid` value from `reg query` output.
pub fn parse_registry_guid(output: &str) -> Option<String> {
    REGISTRY_GUID
        .captures(output)
        .map(|caps| caps[1].to_string())
}

/// Resolves the machine identity from an ordered list of probes.
pub struct MachineIdentityResolver {
    probes: Vec<Box<dyn IdentityProbe>>,
}

impl fmt::Debug for MachineIdentityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.probes.iter().map(|p| p.name()))
            .finish()
    }
}

impl MachineIdentityResolver {
    /// Use exactly these probes, in order.
    pub fn with_probes(probes: Vec<Box<dyn IdentityProbe>>) -> Self {
        Self { probes }
    }

    /// The probe order for the current platform.
    pub fn platform_default() -> Self {
        let machine_id_files = || -> Vec<Box<dyn IdentityProbe>> {
            vec![
                Box::new(FileProbe::new("/etc/machine-id")),
                Box::new(FileProbe::new("/var/lib/dbus/machine-id")),
            ]
        };

        let probes: Vec<Box<dyn IdentityProbe>> = if cfg!(target_os = "macos") {
            let mut probes: Vec<Box<dyn IdentityProbe>> = vec![Box::new(CommandProbe::ioreg())];
            probes.extend(machine_id_files());
            probes
        } else if cfg!(windows) {
            vec![Box::new(CommandProbe::windows_registry())]
        } else {
            let mut probes = machine_id_files();
            probes.push(Box::new(CommandProbe::ioreg()));
            probes
        };

        Self::with_probes(probes)
    }

    /// Return the first identity any probe yields.
    ///
    /// Deterministic and not retried: either a persistent identity exists or
    /// the caller must stop.
    pub fn resolve(&self) -> Result<MachineId, MkrepoError> {
        for probe in &self.probes {
            if let Some(id) = probe.probe() {
                debug!(probe = probe.name(), "machine identity resolved");
                return Ok(id);
            }
        }

        let tried = self
            .probes
            .iter()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(", ");
        Err(MkrepoError::Identity(format!(
            "no persistent machine identifier found (tried: {})",
            if tried.is_empty() { "nothing" } else { tried.as_str() }
        )))
    }
}
