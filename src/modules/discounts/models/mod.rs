mod discount;

pub use discount::{
    CreateDiscountRequest, Discount, DiscountComputation, DiscountResponse, DiscountType,
    DocumentDirection, ItemNature, UpdateDiscountRequest,
};
