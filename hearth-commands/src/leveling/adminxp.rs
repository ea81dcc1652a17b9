use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::{ensure_invoker_permission, guild_only_message, usage_message};
use hearth_core::{Context, Error};
use hearth_database::impls::levels::{adjust_xp, reset_guild, reset_member, set_xp, transfer_xp};
use hearth_utils::confirmation::{ConfirmationText, confirm_action};
use hearth_utils::embed::{SUCCESS_EMBED_COLOR, WARNING_EMBED_COLOR, status_embed};
use hearth_utils::formatting::format_thousands;
use hearth_utils::leveling::level_for_xp;

pub const META: CommandMeta = CommandMeta {
    name: "adminxp",
    desc: "Add, remove, set, reset or transfer member XP.",
    category: "leveling",
    usage: "!adminxp <add|remove|set|reset|transfer> ...",
};

/// Largest single adjustment accepted by these commands.
const MAX_XP_ARGUMENT: u64 = 1_000_000;

async fn admin_guild(ctx: &Context<'_>) -> Result<Option<serenity::GuildId>, Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(None);
    };

    if !ensure_invoker_permission(ctx, guild_id, serenity::Permissions::ADMINISTRATOR, "Administrator")
        .await?
    {
        return Ok(None);
    }

    Ok(Some(guild_id))
}

async fn reply(ctx: &Context<'_>, text: String, color: u32) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .embed(status_embed(text, color))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

fn checked_amount(amount: Option<u64>) -> Option<u64> {
    amount.filter(|value| (1..=MAX_XP_ARGUMENT).contains(value))
}

#[poise::command(
    prefix_command,
    slash_command,
    category = "Leveling",
    subcommands("add", "remove", "set", "reset", "transfer"),
    subcommand_required
)]
pub async fn adminxp(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Give XP to a member.
#[poise::command(prefix_command, slash_command, category = "Leveling")]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Member receiving XP"] user: Option<serenity::User>,
    #[description = "Amount of XP"] amount: Option<u64>,
) -> Result<(), Error> {
    let Some(guild_id) = admin_guild(&ctx).await? else {
        return Ok(());
    };
    let (Some(user), Some(amount)) = (user, checked_amount(amount)) else {
        ctx.say(usage_message("!adminxp add <user> <amount 1-1000000>")).await?;
        return Ok(());
    };

    let change = adjust_xp(&ctx.data().db, guild_id.get(), user.id.get(), i64::try_from(amount)?).await?;
    reply(
        &ctx,
        format!(
            "Added {} XP to <@{}> (now {} XP, level {}).",
            format_thousands(amount),
            user.id.get(),
            format_thousands(change.new_xp),
            level_for_xp(change.new_xp)
        ),
        SUCCESS_EMBED_COLOR,
    )
    .await
}

/// Take XP from a member, never below zero.
#[poise::command(prefix_command, slash_command, category = "Leveling")]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Member losing XP"] user: Option<serenity::User>,
    #[description = "Amount of XP"] amount: Option<u64>,
) -> Result<(), Error> {
    let Some(guild_id) = admin_guild(&ctx).await? else {
        return Ok(());
    };
    let (Some(user), Some(amount)) = (user, checked_amount(amount)) else {
        ctx.say(usage_message("!adminxp remove <user> <amount 1-1000000>")).await?;
        return Ok(());
    };

    let change = adjust_xp(&ctx.data().db, guild_id.get(), user.id.get(), -i64::try_from(amount)?).await?;
    reply(
        &ctx,
        format!(
            "Removed {} XP from <@{}> (now {} XP).",
            format_thousands(change.previous_xp - change.new_xp),
            user.id.get(),
            format_thousands(change.new_xp)
        ),
        WARNING_EMBED_COLOR,
    )
    .await
}

/// Set a member's XP to an exact value.
#[poise::command(prefix_command, slash_command, category = "Leveling")]
pub async fn set(
    ctx: Context<'_>,
    #[description = "Member to update"] user: Option<serenity::User>,
    #[description = "New XP total"] amount: Option<u64>,
) -> Result<(), Error> {
    let Some(guild_id) = admin_guild(&ctx).await? else {
        return Ok(());
    };
    let (Some(user), Some(amount)) = (user, amount.filter(|value| *value <= MAX_XP_ARGUMENT)) else {
        ctx.say(usage_message("!adminxp set <user> <xp 0-1000000>")).await?;
        return Ok(());
    };

    set_xp(&ctx.data().db, guild_id.get(), user.id.get(), amount).await?;
    reply(
        &ctx,
        format!(
            "Set <@{}> to {} XP (level {}).",
            user.id.get(),
            format_thousands(amount),
            level_for_xp(amount)
        ),
        SUCCESS_EMBED_COLOR,
    )
    .await
}

/// Reset one member, or the whole server when no member is given.
#[poise::command(prefix_command, slash_command, category = "Leveling")]
pub async fn reset(
    ctx: Context<'_>,
    #[description = "Member to reset (omit to reset everyone)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let Some(guild_id) = admin_guild(&ctx).await? else {
        return Ok(());
    };
    let db = &ctx.data().db;

    let text = match user {
        Some(user) => {
            if reset_member(db, guild_id.get(), user.id.get()).await? {
                format!("Reset XP for <@{}>.", user.id.get())
            } else {
                format!("<@{}> had no XP to reset.", user.id.get())
            }
        }
        None => {
            let prompt = status_embed(
                "This wipes XP for **every** member of the server. Continue?",
                WARNING_EMBED_COLOR,
            );
            let text = ConfirmationText {
                timed_out: "Reset timed out.",
                declined: "Reset cancelled.",
                processing: "Resetting server XP...",
            };
            if !confirm_action(ctx, prompt, text).await? {
                return Ok(());
            }

            let removed = reset_guild(db, guild_id.get()).await?;
            format!("Reset XP for the whole server ({removed} member(s)).")
        }
    };

    reply(&ctx, text, WARNING_EMBED_COLOR).await
}

/// Move XP from one member to another.
#[poise::command(prefix_command, slash_command, category = "Leveling")]
pub async fn transfer(
    ctx: Context<'_>,
    #[description = "Member giving XP"] from: Option<serenity::User>,
    #[description = "Member receiving XP"] to: Option<serenity::User>,
    #[description = "Amount of XP"] amount: Option<u64>,
) -> Result<(), Error> {
    let Some(guild_id) = admin_guild(&ctx).await? else {
        return Ok(());
    };
    let (Some(from), Some(to), Some(amount)) = (from, to, checked_amount(amount)) else {
        ctx.say(usage_message("!adminxp transfer <from> <to> <amount 1-1000000>"))
            .await?;
        return Ok(());
    };

    if from.id == to.id {
        ctx.say("Pick two different members.").await?;
        return Ok(());
    }

    let Some(result) = transfer_xp(&ctx.data().db, guild_id.get(), from.id.get(), to.id.get(), amount).await?
    else {
        ctx.say(format!("<@{}> doesn't have enough XP.", from.id.get()))
            .await?;
        return Ok(());
    };

    reply(
        &ctx,
        format!(
            "Transferred {} XP from <@{}> ({} left) to <@{}> (now {}).",
            format_thousands(amount),
            from.id.get(),
            format_thousands(result.from_xp),
            to.id.get(),
            format_thousands(result.to_xp)
        ),
        SUCCESS_EMBED_COLOR,
    )
    .await
}
