pub mod leverage;

pub use leverage::leverage_ratio;
