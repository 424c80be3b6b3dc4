use crate::models::SubDivision;

/// Progress of one remote list (states, cities or categories)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Last fetch failed; calling the load operation again retries
    Failed(String),
}

impl LoadStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, LoadStatus::Failed(_))
    }
}

/// Tag carried by an in-flight city fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Ticket {
    pub generation: u64,
    pub division_code: String,
}

/// Cascading state → city selection
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    pub selected_division_code: String,
    pub selected_sub_division_code: String,
    pub sub_division_options: Vec<SubDivision>,
    pub sub_divisions_status: LoadStatus,
    /// Bumped on every division change and every city fetch
    generation: u64,
}

impl SelectionState {
    /// Change the selected division. A different code clears the city and
    /// invalidates fetches issued for the old one.
    pub(crate) fn set_division(&mut self, code: &str) -> bool {
        if self.selected_division_code == code {
            return false;
        }
        self.selected_division_code = code.to_string();
        self.selected_sub_division_code.clear();
        self.generation += 1;
        // No fetch follows an empty code, so nothing would end a pending load
        if code.is_empty() && self.sub_divisions_status == LoadStatus::Loading {
            self.sub_divisions_status = LoadStatus::Idle;
        }
        true
    }

    pub(crate) fn issue_ticket(&mut self, division_code: &str) -> Ticket {
        self.generation += 1;
        self.sub_divisions_status = LoadStatus::Loading;
        Ticket {
            generation: self.generation,
            division_code: division_code.to_string(),
        }
    }

    pub(crate) fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.generation && ticket.division_code == self.selected_division_code
    }

    /// Replace the city list if `ticket` is still current. Returns whether it was applied.
    pub(crate) fn apply(&mut self, ticket: &Ticket, result: Result<Vec<SubDivision>, String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        match result {
            Ok(options) => {
                self.sub_division_options = options;
                self.sub_divisions_status = LoadStatus::Ready;
            }
            Err(message) => {
                self.sub_division_options.clear();
                self.sub_divisions_status = LoadStatus::Failed(message);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_division_change_invalidates_ticket() {
        let mut state = SelectionState::default();
        state.set_division("SP");
        let ticket = state.issue_ticket("SP");

        state.set_division("RJ");
        assert!(!state.is_current(&ticket));
        assert!(!state.apply(&ticket, Ok(vec![SubDivision::new(1, "Campinas")])));
        assert!(state.sub_division_options.is_empty());
    }

    #[test]
    fn test_newer_ticket_for_same_division_wins() {
        let mut state = SelectionState::default();
        state.set_division("SP");
        let first = state.issue_ticket("SP");
        let second = state.issue_ticket("SP");

        assert!(!state.apply(&first, Ok(vec![SubDivision::new(1, "Old")])));
        assert!(state.apply(&second, Ok(vec![SubDivision::new(2, "New")])));
        assert_eq!(state.sub_division_options[0].name, "New");
    }

    #[test]
    fn test_reselecting_same_division_keeps_city() {
        let mut state = SelectionState::default();
        state.set_division("SP");
        state.selected_sub_division_code = "3509502".into();

        assert!(!state.set_division("SP"));
        assert_eq!(state.selected_sub_division_code, "3509502");

        assert!(state.set_division("RJ"));
        assert!(state.selected_sub_division_code.is_empty());
    }

    #[test]
    fn test_clearing_division_ends_pending_load() {
        let mut state = SelectionState::default();
        state.set_division("SP");
        let ticket = state.issue_ticket("SP");
        assert_eq!(state.sub_divisions_status, LoadStatus::Loading);

        state.set_division("");
        assert_eq!(state.sub_divisions_status, LoadStatus::Idle);
        assert!(!state.apply(&ticket, Ok(vec![SubDivision::new(1, "Campinas")])));
        assert_eq!(state.sub_divisions_status, LoadStatus::Idle);
    }

    #[test]
    fn test_failed_apply_clears_options() {
        let mut state = SelectionState::default();
        state.set_division("SP");
        state.sub_division_options = vec![SubDivision::new(1, "Campinas")];
        let ticket = state.issue_ticket("SP");

        assert!(state.apply(&ticket, Err("timeout".into())));
        assert!(state.sub_division_options.is_empty());
        assert_eq!(state.sub_divisions_status, LoadStatus::Failed("timeout".into()));
    }
}
