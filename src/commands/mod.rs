pub mod audit_command;
pub mod menu;
pub mod scenarios_command;
pub mod simulate_command;

pub use self::{audit_command::*, menu::*, scenarios_command::*, simulate_command::*};
