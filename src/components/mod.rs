pub mod state_info;
pub mod state_space;
