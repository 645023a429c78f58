//! UI components

pub mod activity_log;
pub mod connect_modal;
pub mod group_panel;
pub mod session_list;
pub mod settings_panel;

pub use activity_log::ActivityLogView;
pub use connect_modal::{ConnectModal, FormRefs};
pub use group_panel::GroupPanel;
pub use session_list::SessionList;
pub use settings_panel::SettingsPanel;
