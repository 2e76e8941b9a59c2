pub mod calculator;
pub mod payout;
pub mod plan;
pub mod simulator;
