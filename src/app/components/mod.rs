//! Launcher page components.

pub mod game_frame;
pub mod install_card;
pub mod layout;
pub mod notice;
pub mod theme_toggle;

pub use game_frame::{GameControls, GameFrame};
pub use install_card::InstallCard;
pub use layout::Layout;
pub use notice::Notice;
pub use theme_toggle::ThemeToggle;
