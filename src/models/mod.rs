pub use order_requests::*;
pub use order_utils::*;

pub mod order_requests;
pub mod order_utils;
