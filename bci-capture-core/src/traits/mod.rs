pub mod board_driver;
pub mod session_delegate;
