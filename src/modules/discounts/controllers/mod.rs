pub mod discount_controller;
