//! KVM Configurator - terminal application
//!
//! Menu-driven management of libvirt guests: lifecycle actions, rename,
//! undefine with disk cleanup, and qemu-img disk maintenance.

mod cli;
mod menu;
mod terminal;

use clap::Parser;
use cli::{Cli, Command};
use kvm_configurator_core::{model, Error, GlobalConfig, LibvirtAdapter, Result};
use std::process::ExitCode;
use terminal::{report_error, TerminalOperator};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Cancelled) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    log::debug!("xml directory: {}", config.paths.xml_dir.display());

    let adapter = LibvirtAdapter::system(config.tools.clone());
    adapter.check_prerequisites()?;

    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => {
            let mut operator = TerminalOperator::new(config.ui.spinner);
            menu::run(&adapter, &config, &mut operator)
        }
        Command::List { running, json } => {
            let mut domains = if running {
                adapter.list_running_domains()?
            } else {
                adapter.list_domains()?
            };
            model::sort_by_name(&mut domains);
            if json {
                println!("{}", serde_json::to_string_pretty(&domains)?);
            } else if domains.is_empty() {
                println!("No VMs found");
            } else {
                print!("{}", menu::render_domain_table(&domains));
            }
            Ok(())
        }
        Command::Nodeinfo => adapter.node_info(),
    }
}

fn load_config(cli: &Cli) -> Result<GlobalConfig> {
    let mut config = match &cli.config {
        Some(path) if !path.exists() => {
            return Err(Error::config(format!(
                "config file {} not found",
                path.display()
            )))
        }
        Some(path) => GlobalConfig::load(path)?,
        None => GlobalConfig::load_or_default()?,
    };
    if let Some(xml_dir) = &cli.xml_dir {
        config.paths.xml_dir = xml_dir.clone();
    }
    config.validate()?;
    Ok(config)
}
