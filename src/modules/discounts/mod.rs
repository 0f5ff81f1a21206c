// Discounts module

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Discount, DiscountComputation, DiscountType, DocumentDirection, ItemNature};
pub use repositories::DiscountRepository;
pub use services::{DiscountCalculator, DiscountResolver, DiscountService};
