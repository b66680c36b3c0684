//! Page components.

mod home;
mod offline;

pub use home::Home;
pub use offline::OfflinePage;
