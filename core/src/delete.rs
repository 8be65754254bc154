//! Undefining a domain and removing its disk images

use crate::disks::DiskLocator;
use crate::error::StepFailure;
use crate::libvirt::LibvirtAdapter;
use crate::model::Action;
use crate::operator::Operator;
use crate::outcome::DeleteOutcome;
use crate::runner::CommandRunner;
use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Undefine `name`, then offer to delete every disk file it used.
///
/// A failed undefine aborts before any disk lookup. Disk paths are resolved
/// after the undefine, XML definition first, so a domain that libvirt no
/// longer knows can still be cleaned up. Every file is attempted; failures
/// are collected into [`Error::PartialFailure`].
pub fn delete_with_disks<R: CommandRunner>(
    adapter: &LibvirtAdapter<R>,
    xml_dir: &Path,
    operator: &mut impl Operator,
    name: &str,
) -> Result<DeleteOutcome> {
    adapter.run_action(Action::Undefine, name)?;
    log::info!("undefined domain '{}'", name);
    operator.success(&format!("VM {} undefined", name));

    let locator = DiskLocator::new(adapter, xml_dir);
    let paths = match locator.resolve(name) {
        Ok(paths) => paths,
        Err(Error::NoDiskFound(_)) => {
            operator.info("No disks found to delete.");
            return Ok(DeleteOutcome::NothingToDelete);
        }
        Err(e) => return Err(e),
    };

    operator.info("Found disks:");
    for path in &paths {
        operator.info(&format!("  {}", path.display()));
    }

    let question = format!("Should {} disk files really be deleted?", paths.len());
    if !operator.confirm(&question)? {
        operator.info("Disk deletion cancelled.");
        return Ok(DeleteOutcome::DeletionSkipped { count: paths.len() });
    }

    let mut failures = Vec::new();
    for path in &paths {
        match fs::remove_file(path) {
            Ok(()) => {
                log::info!("deleted {}", path.display());
                operator.success(&format!("Deleted: {}", path.display()));
            }
            Err(e) => {
                log::warn!("failed to delete {}: {}", path.display(), e);
                operator.warn(&format!("Error deleting {}: {}", path.display(), e));
                failures.push(StepFailure::new(path.display().to_string(), e));
            }
        }
    }

    if !failures.is_empty() {
        return Err(Error::PartialFailure {
            operation: format!("Deleting disks of '{}'", name),
            failures,
        });
    }
    Ok(DeleteOutcome::Removed(paths))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolsSection;
    use crate::testing::{blklist, ScriptedOperator, ScriptedRunner};
    use tempfile::tempdir;

    fn adapter(runner: ScriptedRunner) -> LibvirtAdapter<ScriptedRunner> {
        LibvirtAdapter::new(runner, ToolsSection::default())
    }

    fn domain_xml(disks: &[&Path]) -> String {
        let mut xml = String::from("<domain type=\"kvm\"><name>vm1</name><devices>");
        for disk in disks {
            xml.push_str(&format!(
                "<disk type=\"file\" device=\"disk\"><source file=\"{}\"/></disk>",
                disk.display()
            ));
        }
        xml.push_str("</devices></domain>");
        xml
    }

    #[test]
    fn test_undefine_failure_stops_everything() {
        let dir = tempdir().unwrap();
        let disk = dir.path().join("vm1.qcow2");
        fs::write(&disk, "disk").unwrap();
        fs::write(dir.path().join("vm1.xml"), domain_xml(&[&disk])).unwrap();

        let adapter = adapter(ScriptedRunner::new().fail("virsh undefine vm1", "error"));
        let mut op = ScriptedOperator::new().confirm_with(true);
        let err = delete_with_disks(&adapter, dir.path(), &mut op, "vm1").unwrap_err();

        assert!(matches!(err, Error::ExternalTool { .. }));
        assert!(op.prompts.is_empty());
        assert!(disk.exists());
    }

    #[test]
    fn test_nothing_to_delete() {
        let dir = tempdir().unwrap();
        let adapter = adapter(
            ScriptedRunner::new()
                .ok("virsh undefine vm1", "")
                .fail("virsh domblklist vm1", "error: failed to get domain 'vm1'"),
        );
        let mut op = ScriptedOperator::new();
        let outcome = delete_with_disks(&adapter, dir.path(), &mut op, "vm1").unwrap();
        assert_eq!(outcome, DeleteOutcome::NothingToDelete);
        assert!(op.prompts.is_empty());
    }

    #[test]
    fn test_declined_keeps_files() {
        let dir = tempdir().unwrap();
        let disk = dir.path().join("vm1.qcow2");
        fs::write(&disk, "disk").unwrap();
        let adapter = adapter(
            ScriptedRunner::new()
                .ok("virsh undefine vm1", "")
                .ok("virsh domblklist vm1", &blklist(&[disk.to_str().unwrap()])),
        );
        let mut op = ScriptedOperator::new().confirm_with(false);
        let outcome = delete_with_disks(&adapter, dir.path(), &mut op, "vm1").unwrap();

        assert_eq!(outcome, DeleteOutcome::DeletionSkipped { count: 1 });
        assert_eq!(op.prompts, ["Should 1 disk files really be deleted?"]);
        assert!(disk.exists());
    }

    #[test]
    fn test_xml_definition_preferred() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.qcow2");
        let b = dir.path().join("b.raw");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();
        fs::write(dir.path().join("vm1.xml"), domain_xml(&[&a, &b])).unwrap();

        let adapter = adapter(ScriptedRunner::new().ok("virsh undefine vm1", ""));
        let mut op = ScriptedOperator::new().confirm_with(true);
        let outcome = delete_with_disks(&adapter, dir.path(), &mut op, "vm1").unwrap();

        assert_eq!(outcome, DeleteOutcome::Removed(vec![a.clone(), b.clone()]));
        assert!(!a.exists());
        assert!(!b.exists());
        assert!(!adapter.runner().was_called("virsh domblklist"));
    }

    #[test]
    fn test_one_failed_removal_does_not_stop_the_rest() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.qcow2");
        let missing = dir.path().join("missing.qcow2");
        let third = dir.path().join("third.qcow2");
        fs::write(&first, "1").unwrap();
        fs::write(&third, "3").unwrap();
        fs::write(
            dir.path().join("vm1.xml"),
            domain_xml(&[&first, &missing, &third]),
        )
        .unwrap();

        let adapter = adapter(ScriptedRunner::new().ok("virsh undefine vm1", ""));
        let mut op = ScriptedOperator::new().confirm_with(true);
        let err = delete_with_disks(&adapter, dir.path(), &mut op, "vm1").unwrap_err();

        match err {
            Error::PartialFailure { failures, .. } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].target, missing.display().to_string());
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!first.exists());
        assert!(!third.exists());
        assert_eq!(op.warnings().len(), 1);
    }
}
