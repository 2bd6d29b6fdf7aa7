pub mod first_order;
pub mod model;
