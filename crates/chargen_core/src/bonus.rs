use serde::{Deserialize, Serialize};

use crate::background::BonusOptions;
use crate::core_api::{CoreError, CoreErrorCode};

/// Per-session record of the background's "+1 to A or B" bonus.
///
/// `choice` is only ever one of `opts`, and `applied` is only set together
/// with a choice. A fresh background roll goes through [`BonusState::reset`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusState {
    opts: Option<BonusOptions>,
    choice: Option<String>,
    applied: bool,
}

impl BonusState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opts(&self) -> Option<&BonusOptions> {
        self.opts.as_ref()
    }

    pub fn choice(&self) -> Option<&str> {
        self.choice.as_deref()
    }

    pub fn applied(&self) -> bool {
        self.applied
    }

    pub fn reset(&mut self, opts: Option<BonusOptions>) {
        self.opts = opts;
        self.choice = None;
        self.applied = false;
    }

    /// Confirms the player's pick. Only names offered by the current
    /// background are accepted.
    pub fn select(&mut self, skill_name: &str) -> Result<(), CoreError> {
        let Some(opts) = self.opts.as_ref() else {
            return Err(CoreError::new(
                CoreErrorCode::UnknownOption,
                "current background offers no skill bonus",
            ));
        };
        let skill_name = skill_name.trim();
        if !opts.contains(skill_name) {
            return Err(CoreError::new(
                CoreErrorCode::UnknownOption,
                format!(
                    "bonus choice {skill_name:?} is not one of {:?} or {:?}",
                    opts.first, opts.second
                ),
            ));
        }
        self.choice = Some(skill_name.to_string());
        self.applied = true;
        Ok(())
    }

    /// Falls back to the first offered skill when a bonus exists but was
    /// never confirmed. Returns true when the default was taken.
    pub fn resolve_default(&mut self) -> bool {
        if self.applied {
            return false;
        }
        let Some(opts) = self.opts.as_ref() else {
            return false;
        };
        self.choice = Some(opts.first.clone());
        self.applied = true;
        true
    }

    pub fn apply(&self, skill_name: &str, base: i32) -> i32 {
        match self.choice.as_deref() {
            Some(choice) if self.applied && choice == skill_name => base + 1,
            _ => base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BonusState;
    use crate::background::BonusOptions;

    fn offered() -> BonusState {
        let mut state = BonusState::new();
        state.reset(Some(BonusOptions::new("Pilot", "Stealth")));
        state
    }

    #[test]
    fn unapplied_bonus_changes_nothing() {
        let state = offered();
        assert_eq!(state.apply("Pilot", 3), 3);
        assert_eq!(state.apply("Stealth", 3), 3);
    }

    #[test]
    fn selected_bonus_applies_once_and_is_stable() {
        let mut state = offered();
        state.select("Stealth").expect("Stealth is offered");
        for _ in 0..3 {
            assert_eq!(state.apply("Stealth", 4), 5);
            assert_eq!(state.apply("Pilot", 4), 4);
        }
    }

    #[test]
    fn selecting_an_unoffered_skill_is_rejected() {
        let mut state = offered();
        assert!(state.select("Medicine").is_err());
        assert_eq!(state.choice(), None);
        assert!(!state.applied());

        let mut empty = BonusState::new();
        assert!(empty.select("Pilot").is_err());
    }

    #[test]
    fn default_picks_first_option() {
        let mut state = offered();
        assert!(state.resolve_default());
        assert_eq!(state.choice(), Some("Pilot"));
        assert!(state.applied());
        assert!(!state.resolve_default());
    }

    #[test]
    fn default_does_not_override_confirmed_choice() {
        let mut state = offered();
        state.select("Stealth").expect("Stealth is offered");
        assert!(!state.resolve_default());
        assert_eq!(state.choice(), Some("Stealth"));
    }

    #[test]
    fn default_without_options_is_a_no_op() {
        let mut state = BonusState::new();
        assert!(!state.resolve_default());
        assert_eq!(state.choice(), None);
        assert!(!state.applied());
    }

    #[test]
    fn reset_clears_prior_choice() {
        let mut state = offered();
        state.select("Pilot").expect("Pilot is offered");
        state.reset(Some(BonusOptions::new("Medicine", "Science")));
        assert_eq!(state.choice(), None);
        assert!(!state.applied());
        assert_eq!(state.apply("Pilot", 2), 2);
        assert_eq!(
            state.opts().map(BonusOptions::as_pair),
            Some(("Medicine", "Science"))
        );
    }
}
