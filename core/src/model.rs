//! Domain model types for KVM Configurator

use serde::Serialize;
use std::fmt;

/// Run state of a domain, normalized from the (possibly localized) text virsh prints
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalStatus {
    Running,
    ShutOff,
    /// Unrecognized state, kept verbatim so it is never mistaken for `Running`
    Unknown(String),
}

impl CanonicalStatus {
    /// Map a raw status token to its canonical form.
    ///
    /// Matching is case-insensitive on the trimmed token. English and German
    /// virsh output are recognized; anything else becomes `Unknown(raw)`.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "running" | "laufend" => CanonicalStatus::Running,
            "shut" | "off" | "shutoff" | "shut off" | "ausgeschaltet" => CanonicalStatus::ShutOff,
            _ => CanonicalStatus::Unknown(raw.to_string()),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, CanonicalStatus::Running)
    }

    pub fn is_shut_off(&self) -> bool {
        matches!(self, CanonicalStatus::ShutOff)
    }
}

impl fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalStatus::Running => f.write_str("running"),
            CanonicalStatus::ShutOff => f.write_str("shut off"),
            CanonicalStatus::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// One row of `virsh list --all`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainRecord {
    /// Transient numeric handle, `None` when virsh prints the `-` placeholder
    pub id: Option<String>,
    pub name: String,
    pub status: CanonicalStatus,
}

impl DomainRecord {
    pub fn new(id: &str, name: impl Into<String>, status: CanonicalStatus) -> Self {
        let id = match id.trim() {
            "" | "-" => None,
            other => Some(other.to_string()),
        };
        Self {
            id,
            name: name.into(),
            status,
        }
    }

    pub fn id_or_placeholder(&self) -> &str {
        self.id.as_deref().unwrap_or("-")
    }
}

/// Sort domains by name, ignoring case
pub fn sort_by_name(domains: &mut [DomainRecord]) {
    domains.sort_by_key(|d| d.name.to_lowercase());
}

/// Lifecycle actions offered for a selected domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Start,
    Reboot,
    Shutdown,
    ForceStop,
    DiskOps,
    Rename,
    Undefine,
}

impl Action {
    pub fn display_name(&self) -> &'static str {
        match self {
            Action::Start => "Start",
            Action::Reboot => "Restart",
            Action::Shutdown => "Shutdown",
            Action::ForceStop => "Force-Shutdown",
            Action::DiskOps => "Disk-Operations",
            Action::Rename => "Rename VM",
            Action::Undefine => "Undefine",
        }
    }

    /// Key the operator types in the action menu
    pub fn menu_key(&self) -> &'static str {
        match self {
            Action::Start => "1",
            Action::Reboot => "2",
            Action::Shutdown => "3",
            Action::ForceStop => "4",
            Action::DiskOps => "5",
            Action::Rename => "6",
            Action::Undefine => "0",
        }
    }

    /// virsh subcommand for actions that map to a single invocation
    pub fn virsh_subcommand(&self) -> Option<&'static str> {
        match self {
            Action::Start => Some("start"),
            Action::Reboot => Some("reboot"),
            Action::Shutdown => Some("shutdown"),
            Action::ForceStop => Some("destroy"),
            Action::Undefine => Some("undefine"),
            Action::DiskOps | Action::Rename => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Target image formats for `qemu-img convert`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskFormat {
    Qcow2,
    Raw,
    Vdi,
}

impl DiskFormat {
    pub const ALL: [DiskFormat; 3] = [DiskFormat::Qcow2, DiskFormat::Raw, DiskFormat::Vdi];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiskFormat::Qcow2 => "qcow2",
            DiskFormat::Raw => "raw",
            DiskFormat::Vdi => "vdi",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DiskFormat::Qcow2 => "qcow2 (default, compressed)",
            DiskFormat::Raw => "raw (uncompressed, fast)",
            DiskFormat::Vdi => "vdi (VirtualBox compatible)",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for DiskFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validates a new domain name before it is handed to `virsh domrename`
pub fn validate_domain_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("New name cannot be empty".to_string());
    }

    // the name doubles as the file name of the XML definition and system disk
    if name.chars().any(|c| c == '/' || c.is_control()) {
        return Err("Name must not contain '/' or control characters".to_string());
    }

    Ok(())
}
