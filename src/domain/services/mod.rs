pub mod intent_interpreter;
pub mod position_closer;
pub mod session_manager;
