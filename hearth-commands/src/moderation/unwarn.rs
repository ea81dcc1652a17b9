use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{guild_only_message, usage_message};
use crate::moderation::guard::ensure_invoker_permission;
use crate::moderation::logging::{ModerationLog, publish_moderation_log};
use hearth_core::{Context, Error};
use hearth_database::impls::warnings::{clear_warnings, remove_warning_by_number};

pub const META: CommandMeta = CommandMeta {
    name: "unwarn",
    desc: "Remove a warning by number, or clear all warnings for a user.",
    category: "moderation",
    usage: "!unwarn <user> <warn_number|all>",
};

#[derive(Debug, PartialEq, Eq)]
enum Selector {
    All,
    Number(usize),
}

fn parse_selector(raw: &str) -> Option<Selector> {
    let raw = raw.trim().trim_start_matches('#');
    if raw.eq_ignore_ascii_case("all") {
        return Some(Selector::All);
    }

    raw.parse::<usize>()
        .ok()
        .filter(|number| *number > 0)
        .map(Selector::Number)
}

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn unwarn(
    ctx: Context<'_>,
    #[description = "The user to modify warnings for"] user: Option<serenity::User>,
    #[description = "Warning number or 'all'"] selector: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !ensure_invoker_permission(&ctx, guild_id, serenity::Permissions::KICK_MEMBERS, "Kick Members")
        .await?
    {
        return Ok(());
    }

    let (Some(user), Some(selector)) = (user, selector) else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };
    let target_label = user.global_name.as_deref().unwrap_or(&user.name).to_owned();

    let Some(selector) = parse_selector(&selector) else {
        ctx.say("Selector must be a warning number (1 or greater) or `all`.")
            .await?;
        return Ok(());
    };

    let db = &ctx.data().db;
    let (reply, detail) = match selector {
        Selector::All => {
            let removed = clear_warnings(db, guild_id.get(), user.id.get()).await?;
            if removed == 0 {
                ctx.say(format!("{target_label} has no warnings.")).await?;
                return Ok(());
            }
            (
                format!("Removed {removed} warning(s) for {target_label}."),
                format!("**Removed :** all ({removed})"),
            )
        }
        Selector::Number(number) => {
            if !remove_warning_by_number(db, guild_id.get(), user.id.get(), number).await? {
                ctx.say(format!("Warning #{number} was not found for {target_label}."))
                    .await?;
                return Ok(());
            }
            (
                format!("Removed warning #{number} for {target_label}."),
                format!("**Removed :** #{number}"),
            )
        }
    };

    let mut log = ModerationLog::member("Unwarn", user.id, None);
    log.detail = Some(detail);
    publish_moderation_log(&ctx, guild_id, log).await;

    ctx.say(reply).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Selector, parse_selector};

    #[test]
    fn parses_selectors() {
        assert_eq!(parse_selector("ALL"), Some(Selector::All));
        assert_eq!(parse_selector("#3"), Some(Selector::Number(3)));
        assert_eq!(parse_selector("0"), None);
        assert_eq!(parse_selector("two"), None);
    }
}
