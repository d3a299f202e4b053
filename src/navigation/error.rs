use thiserror::Error;

use super::registry::ScreenId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("screen {0} is gone")]
    ScreenGone(ScreenId),

    #[error("screen '{screen}' is not in a navigation stack")]
    NotInNavigationStack { screen: &'static str },

    #[error("screen '{screen}' is already at the root of its navigation stack")]
    AtRoot { screen: &'static str },

    #[error("screen '{screen}' has nothing to dismiss")]
    NothingToDismiss { screen: &'static str },

    #[error("screen '{screen}' is not placed in any layer")]
    NotPlaced { screen: &'static str },
}
