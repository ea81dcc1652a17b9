use crate::{COMMANDS, CommandMeta};
use hearth_core::{Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "usage",
    desc: "Show usage syntax for a specific command.",
    category: "utility",
    usage: "!usage <command>",
};

fn find_command(raw_name: &str) -> Option<&'static CommandMeta> {
    let lookup = raw_name.trim().trim_start_matches('!').to_ascii_lowercase();
    COMMANDS.iter().find(|command| command.name == lookup)
}

#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn usage(
    ctx: Context<'_>,
    #[description = "Command name"] command: Option<String>,
) -> Result<(), Error> {
    let Some(raw_name) = command.as_deref() else {
        ctx.say(format!("Usage: `{}`", META.usage)).await?;
        return Ok(());
    };

    match find_command(raw_name) {
        Some(command) => ctx.say(format!("Usage: `{}`\n{}", command.usage, command.desc)).await?,
        None => ctx.say(format!("Unknown command: `{}`", raw_name.trim())).await?,
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::find_command;

    #[test]
    fn lookup_ignores_prefix_and_case() {
        assert_eq!(find_command(" !PLAY ").map(|command| command.name), Some("play"));
        assert!(find_command("nope").is_none());
    }
}
