//! Interactive VM menu: domain table, action menu and disk submenu

use console::style;
use kvm_configurator_core::{
    delete, diskops, eligible_actions, model, rename, select_action, Action, CommandRunner,
    DeleteOutcome, DomainRecord, Error, GlobalConfig, LibvirtAdapter, Operator, Result,
};

use crate::terminal::report_error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmChoice {
    Quit,
    Index(usize),
    Invalid,
}

/// Interpret the operator's answer to the VM prompt; numbers are 1-based
pub fn parse_vm_choice(input: &str, count: usize) -> VmChoice {
    match input.trim() {
        "q" | "quit" => VmChoice::Quit,
        other => match other.parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => VmChoice::Index(n - 1),
            _ => VmChoice::Invalid,
        },
    }
}

/// Numbered table of domains with their libvirt id (`-` when not running)
pub fn render_domain_table(domains: &[DomainRecord]) -> String {
    let width = domains
        .iter()
        .map(|d| d.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Name".len());

    let mut out = format!(
        "{:<4} {:<4} {:<width$}  {}\n",
        "No.",
        "Id",
        "Name",
        "State",
        width = width
    );
    for (i, domain) in domains.iter().enumerate() {
        out.push_str(&format!(
            "{:<4} {:<4} {:<width$}  {}\n",
            i + 1,
            domain.id_or_placeholder(),
            domain.name,
            domain.status,
            width = width
        ));
    }
    out
}

/// Key/description lines for the eligible actions, plus the way back
pub fn render_action_menu(actions: &[Action]) -> String {
    let mut out = String::from("Action  Description\n");
    for action in actions {
        out.push_str(&format!("{:<7} {}\n", action.menu_key(), action.display_name()));
    }
    out.push_str(&format!("{:<7} {}\n", "q", "Back to VM overview"));
    out
}

/// Main loop. Returns when the operator quits or no domains are left.
pub fn run<R: CommandRunner>(
    adapter: &LibvirtAdapter<R>,
    config: &GlobalConfig,
    operator: &mut impl Operator,
) -> Result<()> {
    loop {
        let mut domains = adapter.list_domains()?;
        if domains.is_empty() {
            operator.warn("No VMs found");
            return Ok(());
        }
        model::sort_by_name(&mut domains);

        println!("\n{}", style("=== Available VMs ===").blue().bold());
        print!("{}", render_domain_table(&domains));

        let answer = match operator.read_line("Select VM number (or q to exit):") {
            Ok(answer) => answer,
            Err(Error::Cancelled) => return Ok(()),
            Err(e) => return Err(e),
        };
        let selected = match parse_vm_choice(&answer, domains.len()) {
            VmChoice::Quit => return Ok(()),
            VmChoice::Invalid => {
                operator.warn("Invalid selection");
                continue;
            }
            VmChoice::Index(i) => &domains[i],
        };

        let Some(action) = pick_action(operator, selected)? else {
            continue;
        };
        log::debug!("'{}' selected for {}", action, selected.name);

        match dispatch(adapter, config, operator, action, &selected.name) {
            Ok(()) | Err(Error::Cancelled) => {}
            Err(e) => report_error(&e),
        }
    }
}

fn pick_action(operator: &mut impl Operator, domain: &DomainRecord) -> Result<Option<Action>> {
    let actions = eligible_actions(&domain.status);
    println!(
        "\n{} {} ({})",
        style("VM").bold(),
        style(&domain.name).bold(),
        domain.status
    );
    print!("{}", render_action_menu(&actions));

    let answer = match operator.read_line("Select action (or q to go back):") {
        Ok(answer) => answer,
        Err(Error::Cancelled) => return Ok(None),
        Err(e) => return Err(e),
    };
    if answer.trim() == "q" {
        return Ok(None);
    }
    let action = select_action(&actions, &answer);
    if action.is_none() {
        operator.warn("Invalid selection");
    }
    Ok(action)
}

fn dispatch<R: CommandRunner>(
    adapter: &LibvirtAdapter<R>,
    config: &GlobalConfig,
    operator: &mut impl Operator,
    action: Action,
    name: &str,
) -> Result<()> {
    let xml_dir = config.paths.xml_dir.as_path();
    match action {
        Action::DiskOps => disk_menu(adapter, config, operator, name),
        Action::Rename => {
            let outcome = rename::rename(adapter, xml_dir, operator, name)?;
            if outcome.is_clean() {
                operator.success(&format!(
                    "VM {} is now {}",
                    outcome.old_name, outcome.new_name
                ));
            }
            Ok(())
        }
        Action::Undefine => {
            match delete::delete_with_disks(adapter, xml_dir, operator, name)? {
                DeleteOutcome::Removed(paths) => {
                    operator.success(&format!("Deleted {} disk file(s)", paths.len()))
                }
                DeleteOutcome::NothingToDelete | DeleteOutcome::DeletionSkipped { .. } => {}
            }
            Ok(())
        }
        Action::Start | Action::Reboot | Action::Shutdown | Action::ForceStop => {
            adapter.run_action(action, name)?;
            operator.success(&format!("{}: {} done", name, action));
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiskMenuEntry {
    Resize,
    Convert,
    Repair,
    Back,
}

static DISK_MENU: [(DiskMenuEntry, &str); 4] = [
    (DiskMenuEntry::Resize, "Resize disk"),
    (DiskMenuEntry::Convert, "Convert disk format"),
    (DiskMenuEntry::Repair, "Check / repair disk"),
    (DiskMenuEntry::Back, "Back"),
];

fn disk_menu<R: CommandRunner>(
    adapter: &LibvirtAdapter<R>,
    config: &GlobalConfig,
    operator: &mut impl Operator,
    name: &str,
) -> Result<()> {
    let xml_dir = config.paths.xml_dir.as_path();
    let options: Vec<String> = DISK_MENU.iter().map(|(_, label)| label.to_string()).collect();

    loop {
        let entry = operator
            .choose(&format!("Disk operations for {}", name), &options)?
            .and_then(|i| DISK_MENU.get(i))
            .map(|(entry, _)| *entry)
            .unwrap_or(DiskMenuEntry::Back);

        let result = match entry {
            DiskMenuEntry::Back => return Ok(()),
            DiskMenuEntry::Resize => {
                diskops::resize_interactive(adapter, xml_dir, operator, name).map(|_| ())
            }
            DiskMenuEntry::Convert => {
                diskops::convert_interactive(adapter, xml_dir, operator, name).map(|_| ())
            }
            DiskMenuEntry::Repair => diskops::repair(adapter, xml_dir, operator, name).map(|_| ()),
        };
        match result {
            Ok(()) | Err(Error::Cancelled) => {}
            Err(e) => report_error(&e),
        }
    }
}
