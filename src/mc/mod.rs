pub mod sampler;
pub mod study;
