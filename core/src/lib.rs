//! KVM Configurator Core Library
//!
//! This crate provides the domain logic behind the KVM Configurator menu:
//! listing libvirt domains, gating lifecycle actions on their run state,
//! renaming and deleting domains together with their files, and disk image
//! maintenance through qemu-img.

pub mod config;
pub mod delete;
pub mod diskops;
pub mod disks;
pub mod error;
pub mod gate;
pub mod libvirt;
pub mod model;
pub mod operator;
pub mod outcome;
pub mod progress;
pub mod rename;
pub mod runner;
pub mod tabular;

#[cfg(test)]
mod testing;

pub use config::{GlobalConfig, ToolsSection};
pub use disks::DiskLocator;
pub use error::{Error, Result, StepFailure};
pub use gate::{eligible_actions, select_action};
pub use libvirt::LibvirtAdapter;
pub use model::*;
pub use operator::Operator;
pub use outcome::{ConvertOutcome, DeleteOutcome, RenameOutcome, RepairOutcome, ResizeOutcome};
pub use progress::Spinner;
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
