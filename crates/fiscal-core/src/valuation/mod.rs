pub mod wacc;

pub use wacc::{capital_asset_pricing_model, weighted_average_cost_of_capital, WaccInput};
