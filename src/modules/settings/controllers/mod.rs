pub mod default_setting_controller;
