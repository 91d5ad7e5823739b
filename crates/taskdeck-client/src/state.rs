/// Global view flags, persisted across every screen. Kept as a plain
/// value handed to whichever view needs it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiState {
    pub sidebar_collapsed: bool,
    pub dark_mode: bool,
}

impl UiState {
    pub fn toggle_sidebar(&mut self) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_flip_independently() {
        let mut state = UiState::default();
        assert!(!state.sidebar_collapsed);
        assert!(!state.dark_mode);

        state.toggle_sidebar();
        assert!(state.sidebar_collapsed);
        assert!(!state.dark_mode);

        state.toggle_dark_mode();
        state.toggle_sidebar();
        assert!(!state.sidebar_collapsed);
        assert!(state.dark_mode);
    }
}
