pub mod cost;
pub mod knapsack;
pub mod verify;
