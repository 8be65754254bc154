use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "kvm-configurator",
    version,
    about = "Terminal menu for managing KVM/libvirt guests"
)]
pub struct Cli {
    /// Path to config file (defaults to the per-user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding the domains' XML definitions (overrides config)
    #[arg(long)]
    pub xml_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive VM menu (default)
    Menu,

    /// Print the domain table
    List {
        /// Only running domains
        #[arg(long)]
        running: bool,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show host information from `virsh nodeinfo`
    Nodeinfo,
}
