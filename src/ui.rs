// src/ui.rs - Ephemeral view flags

//! Session-local UI flags.
//!
//! These flags drive the shell chrome (spinner, checkout sheet) and reset
//! on every launch; they are never persisted.

/// UI flags shared across the storefront shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub is_loading: bool,
    pub show_checkout_modal: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            is_loading: false,
            show_checkout_modal: false,
        }
    }
}

/// Actions that can be performed on the UI flags
#[derive(Debug, Clone)]
pub enum UiAction {
    SetLoading(bool),
    SetShowCheckoutModal(bool),
}

/// State reducer function
pub fn ui_state_reducer(state: &UiState, action: UiAction) -> UiState {
    let mut new_state = state.clone();

    match action {
        UiAction::SetLoading(loading) => {
            new_state.is_loading = loading;
        }
        UiAction::SetShowCheckoutModal(show) => {
            new_state.show_checkout_modal = show;
        }
    }

    new_state
}
