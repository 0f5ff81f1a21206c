pub mod default_setting_repository;

pub use default_setting_repository::{DefaultSettingRepository, MySqlDefaultSettingRepository};
