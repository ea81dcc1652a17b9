pub mod components;
pub mod leveling;
pub mod moderation;
pub mod music;
pub mod tickets;
pub mod utility;
pub mod welcome;

mod settings;

use hearth_core::{Data, Error};

pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandMeta] = &[
    utility::ping::META,
    utility::help::META,
    utility::usage::META,
    utility::userinfo::META,
    utility::serverinfo::META,
    utility::avatar::META,
    moderation::ban::META,
    moderation::unban::META,
    moderation::kick::META,
    moderation::timeout::META,
    moderation::untimeout::META,
    moderation::warn::META,
    moderation::warnings::META,
    moderation::unwarn::META,
    moderation::slowmode::META,
    moderation::lock::META,
    moderation::unlock::META,
    moderation::clearmessages::META,
    moderation::modlogchannel::META,
    leveling::level::META,
    leveling::leaderboard::META,
    leveling::dropxp::META,
    leveling::adminxp::META,
    music::play::META,
    music::stop::META,
    music::skip::META,
    music::queue::META,
    music::nowplaying::META,
    music::pause::META,
    music::volume::META,
    music::shuffle::META,
    music::clearqueue::META,
    tickets::ticketconfig::META,
    tickets::ticketpanel::META,
    tickets::list::META,
    tickets::ticketstats::META,
    tickets::ticketcleanup::META,
    welcome::welcomechannel::META,
    welcome::autorole::META,
];

pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        utility::ping::ping(),
        utility::help::help(),
        utility::usage::usage(),
        utility::userinfo::userinfo(),
        utility::serverinfo::serverinfo(),
        utility::avatar::avatar(),
        moderation::ban::ban(),
        moderation::unban::unban(),
        moderation::kick::kick(),
        moderation::timeout::timeout(),
        moderation::untimeout::untimeout(),
        moderation::warn::warn(),
        moderation::warnings::warnings(),
        moderation::unwarn::unwarn(),
        moderation::slowmode::slowmode(),
        moderation::lock::lock(),
        moderation::unlock::unlock(),
        moderation::clearmessages::clearmessages(),
        moderation::modlogchannel::modlogchannel(),
        leveling::level::level(),
        leveling::leaderboard::leaderboard(),
        leveling::dropxp::dropxp(),
        leveling::adminxp::adminxp(),
        music::play::play(),
        music::stop::stop(),
        music::skip::skip(),
        music::queue::queue(),
        music::nowplaying::nowplaying(),
        music::pause::pause(),
        music::volume::volume(),
        music::shuffle::shuffle(),
        music::clearqueue::clearqueue(),
        tickets::ticketconfig::ticketconfig(),
        tickets::ticketpanel::ticketpanel(),
        tickets::list::tickets(),
        tickets::ticketstats::ticketstats(),
        tickets::ticketcleanup::ticketcleanup(),
        welcome::welcomechannel::welcomechannel(),
        welcome::autorole::autorole(),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{COMMANDS, commands};

    #[test]
    fn metadata_matches_registered_commands() {
        let registered: HashSet<String> = commands().into_iter().map(|command| command.name).collect();
        let described: HashSet<String> = COMMANDS.iter().map(|meta| meta.name.to_owned()).collect();

        assert_eq!(registered, described);
        assert_eq!(COMMANDS.len(), described.len());
    }

    #[test]
    fn usage_strings_start_with_the_command_name() {
        for meta in COMMANDS {
            assert!(
                meta.usage.starts_with(&format!("!{}", meta.name)),
                "{} has usage {}",
                meta.name,
                meta.usage
            );
        }
    }
}
