//! Locating the backing files of a domain's disks
//!
//! Two sources are consulted: the cached `<xml_dir>/<domain>.xml` definition
//! and the live `virsh domblklist --details` view. Index 0 of every result is
//! the system disk.

use crate::config::xml_path;
use crate::libvirt::LibvirtAdapter;
use crate::runner::CommandRunner;
use crate::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::{Path, PathBuf};

/// Read an XML definition file and return its disk sources in document order
pub fn disk_paths_from_xml(path: &Path) -> Result<Vec<PathBuf>> {
    let content = fs::read_to_string(path)?;
    parse_disk_sources(&content)
}

/// Source files of every `<disk device="disk">` under `<devices>`.
///
/// CD-ROM and floppy entries are skipped, as is a `<disk>` without an
/// explicit `device` attribute.
pub fn parse_disk_sources(xml: &str) -> Result<Vec<PathBuf>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut paths = Vec::new();
    let mut in_devices = false;
    // device kind and source of the <disk> currently open
    let mut current: Option<(String, Option<String>)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"devices" => in_devices = true,
                b"disk" if in_devices => {
                    let device = attr(e, b"device")?.unwrap_or_default();
                    current = Some((device, None));
                }
                b"source" => record_source(e, &mut current)?,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if e.name().as_ref() == b"source" {
                    record_source(e, &mut current)?;
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"devices" => in_devices = false,
                b"disk" => {
                    if let Some((device, Some(file))) = current.take() {
                        if device == "disk" {
                            paths.push(PathBuf::from(file));
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::xml(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(paths)
}

fn record_source(e: &BytesStart<'_>, current: &mut Option<(String, Option<String>)>) -> Result<()> {
    // the first <source> wins; later ones belong to <backingStore>
    if let Some((_, source @ None)) = current.as_mut() {
        if let Some(file) = attr(e, b"file")?.filter(|f| !f.is_empty()) {
            *source = Some(file);
        }
    }
    Ok(())
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| Error::xml(err.to_string()))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|err| Error::xml(err.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Resolves a domain's disk paths against the XML cache and libvirt
pub struct DiskLocator<'a, R> {
    adapter: &'a LibvirtAdapter<R>,
    xml_dir: &'a Path,
}

impl<'a, R: CommandRunner> DiskLocator<'a, R> {
    pub fn new(adapter: &'a LibvirtAdapter<R>, xml_dir: &'a Path) -> Self {
        Self { adapter, xml_dir }
    }

    pub fn xml_path(&self, domain: &str) -> PathBuf {
        xml_path(self.xml_dir, domain)
    }

    /// Disk paths from the XML definition; an absent or unreadable file
    /// yields an empty list
    pub fn from_xml(&self, domain: &str) -> Vec<PathBuf> {
        let path = self.xml_path(domain);
        match disk_paths_from_xml(&path) {
            Ok(paths) => paths,
            Err(e) => {
                log::debug!("no disks from {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    /// Disk paths from the live block device list; a failing query yields an
    /// empty list, a missing virsh is an error
    pub fn from_live(&self, domain: &str) -> Result<Vec<PathBuf>> {
        match self.adapter.block_device_paths(domain) {
            Ok(paths) => Ok(paths),
            Err(e @ Error::CommandNotFound(_)) => Err(e),
            Err(e) => {
                log::debug!("no disks from live query for '{}': {}", domain, e);
                Ok(Vec::new())
            }
        }
    }

    /// XML first, then the live query
    pub fn resolve(&self, domain: &str) -> Result<Vec<PathBuf>> {
        let paths = self.from_xml(domain);
        if !paths.is_empty() {
            return Ok(paths);
        }
        self.non_empty(domain, self.from_live(domain)?)
    }

    /// Live query first, then the XML definition
    pub fn resolve_live_first(&self, domain: &str) -> Result<Vec<PathBuf>> {
        let paths = self.from_live(domain)?;
        if !paths.is_empty() {
            return Ok(paths);
        }
        self.non_empty(domain, self.from_xml(domain))
    }

    /// Live query only
    pub fn resolve_live(&self, domain: &str) -> Result<Vec<PathBuf>> {
        let paths = self.from_live(domain)?;
        self.non_empty(domain, paths)
    }

    /// The system disk (index 0), live view preferred
    pub fn primary_disk(&self, domain: &str) -> Result<PathBuf> {
        let mut paths = self.resolve_live_first(domain)?;
        Ok(paths.swap_remove(0))
    }

    fn non_empty(&self, domain: &str, paths: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
        if paths.is_empty() {
            Err(Error::NoDiskFound(domain.to_string()))
        } else {
            Ok(paths)
        }
    }
}
