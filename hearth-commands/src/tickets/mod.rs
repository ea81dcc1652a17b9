pub mod list;
pub mod ticketcleanup;
pub mod ticketconfig;
pub mod ticketpanel;
pub mod ticketstats;

pub mod buttons;
pub mod maintenance;

mod embeds;
mod naming;
mod transcript;
