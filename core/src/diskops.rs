//! Resize, convert and check/repair of a domain's system disk via qemu-img

use crate::disks::DiskLocator;
use crate::libvirt::{path_to_str, LibvirtAdapter};
use crate::operator::Operator;
use crate::outcome::{ConvertOutcome, RepairOutcome, ResizeOutcome, StepLog, StepPolicy};
use crate::runner::CommandRunner;
use crate::{DiskFormat, Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Grow the system disk by `delta_gib` GiB
pub fn resize<R: CommandRunner>(
    adapter: &LibvirtAdapter<R>,
    xml_dir: &Path,
    operator: &mut impl Operator,
    domain: &str,
    delta_gib: i64,
) -> Result<ResizeOutcome> {
    if delta_gib <= 0 {
        return Err(Error::validation("Please enter a positive whole number of GiB"));
    }
    let delta_gib = delta_gib as u64;
    let path = DiskLocator::new(adapter, xml_dir).primary_disk(domain)?;

    let output = {
        let _spinner = operator.spinner("Resizing disk…");
        adapter.image_resize(&path, delta_gib)?
    };
    if !output.success() {
        return Err(Error::Resize {
            path,
            output: output.combined(),
        });
    }

    log::info!("resized {} by {} GiB", path.display(), delta_gib);
    operator.success(&format!("Disk {} grown by {} GiB", file_name(&path), delta_gib));
    Ok(ResizeOutcome {
        path,
        delta_gib,
        output: output.combined(),
    })
}

/// Ask for the increment, then [`resize`]
pub fn resize_interactive<R: CommandRunner>(
    adapter: &LibvirtAdapter<R>,
    xml_dir: &Path,
    operator: &mut impl Operator,
    domain: &str,
) -> Result<ResizeOutcome> {
    let answer = operator.read_line("Grow disk by (GiB, positive): ")?;
    let delta_gib = answer
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::validation("Please enter a positive whole number of GiB"))?;
    resize(adapter, xml_dir, operator, domain, delta_gib)
}

/// Convert the system disk to `format` next to the original file.
///
/// The converted image is the primary effect; rewriting the path in the XML
/// definition afterwards is best effort and only produces warnings.
pub fn convert<R: CommandRunner>(
    adapter: &LibvirtAdapter<R>,
    xml_dir: &Path,
    operator: &mut impl Operator,
    domain: &str,
    format: DiskFormat,
) -> Result<ConvertOutcome> {
    let locator = DiskLocator::new(adapter, xml_dir);
    let source = locator.primary_disk(domain)?;
    let destination = converted_path(&source, format);
    if destination == source {
        return Err(Error::validation(format!(
            "{} already has the .{} extension",
            source.display(),
            format.extension()
        )));
    }
    if destination.exists() {
        return Err(Error::validation(format!(
            "{} already exists, refusing to overwrite it",
            destination.display()
        )));
    }

    let output = {
        let _spinner = operator.spinner("Converting disk…");
        adapter.image_convert(format.as_str(), &source, &destination)?
    };
    if !output.success() {
        return Err(Error::Convert {
            path: source,
            output: output.combined(),
        });
    }
    log::info!("converted {} to {}", source.display(), destination.display());
    operator.success(&format!("Disk {} converted to {}", file_name(&source), format));

    let mut steps = StepLog::new();
    let xml_path = locator.xml_path(domain);
    let replaced = steps.run("Update XML definition", StepPolicy::BestEffort, || {
        replace_path_in_xml(&xml_path, &source, &destination)
    })?;
    match replaced {
        Some(true) => operator.info(&format!("Updated disk path in {}", xml_path.display())),
        Some(false) => steps.warn(
            "Update XML definition",
            format!("{} does not reference {}", xml_path.display(), source.display()),
        ),
        None => {}
    }
    let xml_updated = replaced == Some(true);

    let warnings = steps.into_warnings();
    for w in &warnings {
        operator.warn(&w.to_string());
    }
    Ok(ConvertOutcome {
        source,
        destination,
        xml_updated,
        warnings,
    })
}

/// Offer the target formats, then [`convert`]. `Ok(None)` when the operator backs out.
pub fn convert_interactive<R: CommandRunner>(
    adapter: &LibvirtAdapter<R>,
    xml_dir: &Path,
    operator: &mut impl Operator,
    domain: &str,
) -> Result<Option<ConvertOutcome>> {
    let options: Vec<String> = DiskFormat::ALL
        .iter()
        .map(|f| f.description().to_string())
        .collect();
    match operator.choose("Target format", &options)? {
        Some(index) => {
            let format = DiskFormat::ALL
                .get(index)
                .copied()
                .ok_or_else(|| Error::validation("Unknown format"))?;
            convert(adapter, xml_dir, operator, domain, format).map(Some)
        }
        None => Ok(None),
    }
}

/// Check the system disk; only run the destructive amend when the check fails
pub fn repair<R: CommandRunner>(
    adapter: &LibvirtAdapter<R>,
    xml_dir: &Path,
    operator: &mut impl Operator,
    domain: &str,
) -> Result<RepairOutcome> {
    let path = DiskLocator::new(adapter, xml_dir).primary_disk(domain)?;

    let check = adapter.image_check(&path)?;
    let check_output = check.combined();
    operator.show_output("qemu-img check", &check_output);
    if check.success() {
        operator.success("Disk is intact, no repair needed");
        return Ok(RepairOutcome::Intact { check_output });
    }

    operator.warn("Inconsistency detected, attempting repair…");
    let amend = {
        let _spinner = operator.spinner("Repairing disk…");
        adapter.image_amend(&path)?
    };
    let repair_output = amend.combined();
    if !amend.success() {
        return Err(Error::Repair {
            path,
            output: repair_output,
        });
    }
    operator.show_output("qemu-img amend", &repair_output);
    operator.success(&format!("Disk {} repaired", file_name(&path)));
    log::info!("repaired {}", path.display());
    Ok(RepairOutcome::Repaired {
        check_output,
        repair_output,
    })
}

/// `source` with its extension replaced by the format's
pub fn converted_path(source: &Path, format: DiskFormat) -> PathBuf {
    source.with_extension(format.extension())
}

/// Replace quoted occurrences of `old` with `new` in an XML definition,
/// treating the file as text. Returns whether anything was replaced.
pub fn replace_path_in_xml(xml_path: &Path, old: &Path, new: &Path) -> Result<bool> {
    let content = fs::read_to_string(xml_path)?;
    let old = path_to_str(old)?;
    let new = path_to_str(new)?;

    let mut updated = content.clone();
    for quote in ['\'', '"'] {
        updated = updated.replace(
            &format!("{quote}{old}{quote}"),
            &format!("{quote}{new}{quote}"),
        );
    }
    if updated == content {
        return Ok(false);
    }
    fs::write(xml_path, updated)?;
    Ok(true)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
