pub mod default_setting_service;

pub use default_setting_service::DefaultSettingService;
