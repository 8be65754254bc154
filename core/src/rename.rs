//! Renaming a domain together with its XML definition and system disk

use crate::disks::DiskLocator;
use crate::libvirt::LibvirtAdapter;
use crate::model::validate_domain_name;
use crate::operator::Operator;
use crate::outcome::{Moved, RenameOutcome, StepLog, StepPolicy};
use crate::runner::CommandRunner;
use crate::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Rename `old_name`, prompting for the new name.
///
/// Only the `virsh domrename` step can fail the operation. Renaming the XML
/// definition and the system disk afterwards is best effort: failures come
/// back as warnings on the outcome and nothing is rolled back.
pub fn rename<R: CommandRunner>(
    adapter: &LibvirtAdapter<R>,
    xml_dir: &Path,
    operator: &mut impl Operator,
    old_name: &str,
) -> Result<RenameOutcome> {
    if !adapter.domain_exists(old_name)? {
        return Err(Error::DomainNotFound(old_name.to_string()));
    }

    let new_name = operator
        .read_line(&format!("New name for VM '{}': ", old_name))?
        .trim()
        .to_string();
    validate_domain_name(&new_name).map_err(Error::Validation)?;
    if new_name == old_name {
        return Err(Error::validation(
            "New name is identical to the old one, nothing to do",
        ));
    }

    let mut steps = StepLog::new();
    steps.run("Rename domain", StepPolicy::HardStop, || {
        adapter.rename_domain(old_name, &new_name)
    })?;
    log::info!("renamed domain '{}' to '{}'", old_name, &new_name);
    operator.success(&format!("Renamed VM {} to {}", old_name, new_name));

    let locator = DiskLocator::new(adapter, xml_dir);
    let xml = steps.run("Rename XML definition", StepPolicy::BestEffort, || {
        move_file(&locator.xml_path(old_name), locator.xml_path(&new_name))
    })?;
    if let Some(moved) = &xml {
        operator.info(&format!(
            "XML file renamed: {} → {}",
            moved.from.display(),
            moved.to.display()
        ));
    }

    let disk = steps.run("Rename system disk", StepPolicy::BestEffort, || {
        let mut paths = locator.resolve_live(&new_name)?;
        let old_disk = paths.swap_remove(0);
        let new_disk = renamed_disk_path(&old_disk, &new_name);
        move_file(&old_disk, new_disk)
    })?;
    if let Some(moved) = &disk {
        operator.info(&format!(
            "Disk file renamed: {} → {}",
            moved.from.display(),
            moved.to.display()
        ));
        operator.info(&format!(
            "The domain definition still references {}; update it with `virsh edit {}`",
            moved.from.display(),
            new_name
        ));
    }

    let warnings = steps.into_warnings();
    for w in &warnings {
        operator.warn(&w.to_string());
    }
    Ok(RenameOutcome {
        old_name: old_name.to_string(),
        new_name,
        xml,
        disk,
        warnings,
    })
}

/// Same directory and extension, file stem replaced by the domain name
pub fn renamed_disk_path(disk: &Path, new_name: &str) -> PathBuf {
    let file_name = match disk.extension() {
        Some(ext) => format!("{}.{}", new_name, ext.to_string_lossy()),
        None => new_name.to_string(),
    };
    disk.with_file_name(file_name)
}

fn move_file(from: &Path, to: PathBuf) -> Result<Moved> {
    if !from.exists() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} not found", from.display()),
        )));
    }
    if to.exists() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", to.display()),
        )));
    }
    fs::rename(from, &to)?;
    Ok(Moved {
        from: from.to_path_buf(),
        to,
    })
}
