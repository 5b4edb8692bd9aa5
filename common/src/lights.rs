use crate::types::LightStatus;

/// What one Main-menu automation pass should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationPass {
    /// Bright outside: clear the latch, turn every room off, show status.
    /// Repeats every pass while it stays day (the commands are idempotent).
    DayReset,
    /// Dark and the user has not answered yet: show the yes/no prompt.
    NightPrompt,
    /// Dark and already answered: static status display only.
    NightStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NightAnswer {
    AllRooms,
    SelectRooms,
    No,
}

/// Follow-up the panel loop performs after a night answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerAction {
    TurnOnAllRooms,
    ManualSelect,
    Nothing,
}

/// Day/night lighting policy, evaluated once per Main-menu pass while
/// smart mode is on. The latch guarantees the prompt fires at most once
/// per uninterrupted night period.
#[derive(Debug, Clone, Default)]
pub struct LightAutomation {
    night_answered: bool,
}

impl LightAutomation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn night_answered(&self) -> bool {
        self.night_answered
    }

    pub fn observe(&mut self, status: LightStatus) -> AutomationPass {
        match status {
            LightStatus::Day => {
                self.night_answered = false;
                AutomationPass::DayReset
            }
            LightStatus::Night if !self.night_answered => AutomationPass::NightPrompt,
            LightStatus::Night => AutomationPass::NightStatus,
        }
    }

    /// Latch the answer; any of the three choices counts as answered.
    pub fn answer(&mut self, answer: NightAnswer) -> AnswerAction {
        self.night_answered = true;
        match answer {
            NightAnswer::AllRooms => AnswerAction::TurnOnAllRooms,
            NightAnswer::SelectRooms => AnswerAction::ManualSelect,
            NightAnswer::No => AnswerAction::Nothing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn prompt_fires_once_per_night_period() {
        let mut automation = LightAutomation::new();
        assert_eq!(automation.observe(LightStatus::Night), AutomationPass::NightPrompt);

        // No key during the bounded wait: still unanswered, re-prompt.
        assert_eq!(automation.observe(LightStatus::Night), AutomationPass::NightPrompt);

        assert_eq!(automation.answer(NightAnswer::No), AnswerAction::Nothing);
        assert_eq!(automation.observe(LightStatus::Night), AutomationPass::NightStatus);
        assert_eq!(automation.observe(LightStatus::Night), AutomationPass::NightStatus);
    }

    #[test]
    fn day_resets_the_latch() {
        let mut automation = LightAutomation::new();
        automation.observe(LightStatus::Night);
        automation.answer(NightAnswer::AllRooms);
        assert!(automation.night_answered());

        assert_eq!(automation.observe(LightStatus::Day), AutomationPass::DayReset);
        assert!(!automation.night_answered());

        // The next night asks again, exactly once.
        assert_eq!(automation.observe(LightStatus::Night), AutomationPass::NightPrompt);
        automation.answer(NightAnswer::SelectRooms);
        assert_eq!(automation.observe(LightStatus::Night), AutomationPass::NightStatus);
    }

    #[test]
    fn answers_map_to_their_follow_ups() {
        let mut automation = LightAutomation::new();
        assert_eq!(
            automation.answer(NightAnswer::AllRooms),
            AnswerAction::TurnOnAllRooms
        );
        assert_eq!(
            automation.answer(NightAnswer::SelectRooms),
            AnswerAction::ManualSelect
        );
    }
}
