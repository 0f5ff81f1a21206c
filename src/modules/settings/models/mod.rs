mod default_setting;

pub use default_setting::{DefaultSetting, DefaultSettingResponse, UpdateDefaultSettingRequest};
