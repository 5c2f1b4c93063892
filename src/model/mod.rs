pub mod attendance;
pub mod flag;
pub mod session;
pub mod slot;
