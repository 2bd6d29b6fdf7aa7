pub mod aggregate;
pub mod figure;
pub mod histogram;
