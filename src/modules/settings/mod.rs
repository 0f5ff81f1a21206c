// Settings module

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::DefaultSetting;
pub use repositories::DefaultSettingRepository;
pub use services::DefaultSettingService;
