pub mod autorole;
pub mod welcomechannel;
