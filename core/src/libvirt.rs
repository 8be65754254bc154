//! Libvirt/QEMU integration via CLI tools (virsh, qemu-img)

use crate::config::ToolsSection;
use crate::runner::{CommandOutput, CommandRunner, SystemRunner};
use crate::tabular::{parse_tabular_output, BLKLIST_HEADERS, LIST_HEADERS};
use crate::{Action, CanonicalStatus, DomainRecord, Error, Result};
use std::path::{Path, PathBuf};

/// Helper to convert Path to &str with proper error handling
pub(crate) fn path_to_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| Error::validation(format!("Invalid path encoding: {}", path.display())))
}

/// Adapter for libvirt/QEMU operations via CLI
#[derive(Debug, Clone)]
pub struct LibvirtAdapter<R = SystemRunner> {
    runner: R,
    tools: ToolsSection,
}

impl LibvirtAdapter<SystemRunner> {
    pub fn system(tools: ToolsSection) -> Self {
        Self::new(SystemRunner::new(), tools)
    }
}

impl<R: CommandRunner> LibvirtAdapter<R> {
    pub fn new(runner: R, tools: ToolsSection) -> Self {
        Self { runner, tools }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn virsh(&self, args: &[&str]) -> Result<CommandOutput> {
        self.runner.run(&self.tools.virsh, args)
    }

    fn qemu_img(&self, args: &[&str]) -> Result<CommandOutput> {
        self.runner.run(&self.tools.qemu_img, args)
    }

    fn tool_error(&self, cmd: &str, args: &[&str], output: &CommandOutput) -> Error {
        Error::ExternalTool {
            cmd: format!("{} {}", cmd, args.join(" ")),
            output: output.combined(),
        }
    }

    // ==================== Prerequisite Checks ====================

    /// Check that virsh, virt-install and qemu-img are all on PATH
    pub fn check_prerequisites(&self) -> Result<()> {
        let required = [
            &self.tools.virsh,
            &self.tools.virt_install,
            &self.tools.qemu_img,
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|cmd| !self.runner.is_available(cmd))
            .map(|cmd| cmd.as_str())
            .collect();

        if !missing.is_empty() {
            return Err(Error::CommandNotFound(format!(
                "Required commands not found: {}. Install with your package manager (e.g. libvirt-clients virtinst qemu-utils)",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    // ==================== Domain Listing ====================

    /// All defined domains, in virsh order
    pub fn list_domains(&self) -> Result<Vec<DomainRecord>> {
        self.list(&["list", "--all"])
    }

    /// Running domains only
    pub fn list_running_domains(&self) -> Result<Vec<DomainRecord>> {
        self.list(&["list"])
    }

    fn list(&self, args: &[&str]) -> Result<Vec<DomainRecord>> {
        let output = self.virsh(args)?;
        if !output.success() {
            return Err(self.tool_error(&self.tools.virsh, args, &output));
        }
        Ok(parse_domain_list(&output.stdout))
    }

    /// Check if a domain exists
    pub fn domain_exists(&self, name: &str) -> Result<bool> {
        let output = self.virsh(&["dominfo", name])?;
        Ok(output.success())
    }

    // ==================== Lifecycle ====================

    /// Rename a domain; the combined output is carried on failure
    pub fn rename_domain(&self, old_name: &str, new_name: &str) -> Result<()> {
        let args = ["domrename", old_name, new_name];
        let output = self.virsh(&args)?;
        if !output.success() {
            return Err(self.tool_error(&self.tools.virsh, &args, &output));
        }
        Ok(())
    }

    /// Run a single-command lifecycle action with output passed through
    pub fn run_action(&self, action: Action, name: &str) -> Result<()> {
        let subcommand = action.virsh_subcommand().ok_or_else(|| {
            Error::validation(format!("'{}' is not a single virsh command", action))
        })?;
        if !self.runner.run_passthrough(&self.tools.virsh, &[subcommand, name])? {
            return Err(Error::ExternalTool {
                cmd: format!("{} {} {}", self.tools.virsh, subcommand, name),
                output: format!("{} exited with a non-zero status", subcommand),
            });
        }
        Ok(())
    }

    /// Host information (`virsh nodeinfo`) passed through to the terminal
    pub fn node_info(&self) -> Result<()> {
        if !self.runner.run_passthrough(&self.tools.virsh, &["nodeinfo"])? {
            return Err(Error::ExternalTool {
                cmd: format!("{} nodeinfo", self.tools.virsh),
                output: "nodeinfo exited with a non-zero status".to_string(),
            });
        }
        Ok(())
    }

    // ==================== Block Devices ====================

    /// Disk source paths from the live `domblklist --details` view
    pub fn block_device_paths(&self, name: &str) -> Result<Vec<PathBuf>> {
        let args = ["domblklist", name, "--details"];
        let output = self.virsh(&args)?;
        if !output.success() {
            return Err(self.tool_error(&self.tools.virsh, &args, &output));
        }
        Ok(parse_block_devices(&output.stdout))
    }

    // ==================== Image Tool ====================

    pub fn image_resize(&self, path: &Path, delta_gib: u64) -> Result<CommandOutput> {
        let delta = format!("+{}G", delta_gib);
        self.qemu_img(&["resize", path_to_str(path)?, &delta])
    }

    pub fn image_convert(&self, format: &str, src: &Path, dst: &Path) -> Result<CommandOutput> {
        self.qemu_img(&["convert", "-O", format, path_to_str(src)?, path_to_str(dst)?])
    }

    pub fn image_check(&self, path: &Path) -> Result<CommandOutput> {
        self.qemu_img(&["check", path_to_str(path)?])
    }

    pub fn image_amend(&self, path: &Path) -> Result<CommandOutput> {
        self.qemu_img(&["amend", "-f", "qcow2", path_to_str(path)?])
    }
}

/// virsh states printed as two words
const TWO_WORD_STATES: &[(&str, &str)] = &[("shut", "off"), ("in", "shutdown")];

/// Parse `virsh list` output.
///
/// The first field is the id, the last the raw state, and everything in
/// between (re-joined with single spaces) the name. A two-word state such as
/// `shut off` is taken as a whole when a name field remains. Rows with fewer
/// than three fields are dropped.
pub fn parse_domain_list(raw: &str) -> Vec<DomainRecord> {
    parse_tabular_output(raw, LIST_HEADERS)
        .into_iter()
        .filter_map(|fields| {
            if fields.len() < 3 {
                log::debug!("dropping short domain row: {:?}", fields);
                return None;
            }
            let state_start = state_start(&fields);
            let name = fields[1..state_start].join(" ");
            let status = CanonicalStatus::normalize(&fields[state_start..].join(" "));
            Some(DomainRecord::new(&fields[0], name, status))
        })
        .collect()
}

fn state_start(fields: &[String]) -> usize {
    let last = fields.len() - 1;
    if fields.len() >= 4 {
        let pair = (fields[last - 1].to_lowercase(), fields[last].to_lowercase());
        if TWO_WORD_STATES
            .iter()
            .any(|(first, second)| pair.0 == *first && pair.1 == *second)
        {
            return last - 1;
        }
    }
    last
}

/// Parse `virsh domblklist --details` output into disk source paths.
///
/// Only rows whose device column (index 1) is `disk` and whose source
/// column (index 3) is present count; `-` marks an empty source.
pub fn parse_block_devices(raw: &str) -> Vec<PathBuf> {
    parse_tabular_output(raw, BLKLIST_HEADERS)
        .into_iter()
        .filter_map(|fields| {
            if fields.len() < 4 {
                log::debug!("dropping short block device row: {:?}", fields);
                return None;
            }
            let source = fields[3].as_str();
            (fields[1] == "disk" && !source.is_empty() && source != "-")
                .then(|| PathBuf::from(source))
        })
        .collect()
}
