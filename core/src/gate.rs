//! Which lifecycle actions are legal for a domain's run state

use crate::{Action, CanonicalStatus};

type Eligibility = fn(&CanonicalStatus) -> bool;

/// Eligibility rules in menu order
pub const ACTION_TABLE: &[(Action, Eligibility)] = &[
    (Action::Start, |s| !s.is_running()),
    (Action::Reboot, CanonicalStatus::is_running),
    (Action::Shutdown, CanonicalStatus::is_running),
    (Action::ForceStop, CanonicalStatus::is_running),
    (Action::DiskOps, |_| true),
    (Action::Rename, |_| true),
    (Action::Undefine, CanonicalStatus::is_shut_off),
];

/// Actions offered for `status`, in menu order
pub fn eligible_actions(status: &CanonicalStatus) -> Vec<Action> {
    ACTION_TABLE
        .iter()
        .filter(|(_, eligible)| eligible(status))
        .map(|(action, _)| *action)
        .collect()
}

/// Map the operator's menu key to an action, `None` when the key is unknown
/// or names an action that is not in `eligible`
pub fn select_action(eligible: &[Action], choice: &str) -> Option<Action> {
    let choice = choice.trim();
    eligible
        .iter()
        .copied()
        .find(|action| action.menu_key() == choice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn set(actions: &[Action]) -> BTreeSet<Action> {
        actions.iter().copied().collect()
    }

    #[test]
    fn test_running_actions() {
        let actions = eligible_actions(&CanonicalStatus::Running);
        assert_eq!(
            set(&actions),
            set(&[
                Action::Reboot,
                Action::Shutdown,
                Action::ForceStop,
                Action::DiskOps,
                Action::Rename
            ])
        );
        assert!(!actions.contains(&Action::Start));
        assert!(!actions.contains(&Action::Undefine));
    }

    #[test]
    fn test_shut_off_actions() {
        let actions = eligible_actions(&CanonicalStatus::ShutOff);
        assert_eq!(
            actions,
            vec![Action::Start, Action::DiskOps, Action::Rename, Action::Undefine]
        );
    }

    #[test]
    fn test_unknown_state_actions() {
        let actions = eligible_actions(&CanonicalStatus::Unknown("paused".to_string()));
        assert_eq!(actions, vec![Action::Start, Action::DiskOps, Action::Rename]);
    }

    #[test]
    fn test_select_action() {
        let eligible = eligible_actions(&CanonicalStatus::Running);
        assert_eq!(select_action(&eligible, "4"), Some(Action::ForceStop));
        assert_eq!(select_action(&eligible, " 6 \n"), Some(Action::Rename));
        // Start exists but is not eligible while running
        assert_eq!(select_action(&eligible, "1"), None);
        // Undefine is not eligible either
        assert_eq!(select_action(&eligible, "0"), None);
        assert_eq!(select_action(&eligible, "q"), None);
        assert_eq!(select_action(&eligible, ""), None);
    }
}
