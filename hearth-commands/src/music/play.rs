use tracing::error;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::{guild_only_message, usage_message};
use crate::music::embeds::{collection_embed, error_embed, queued_embed};
use crate::music::voice::{bot_can_speak_in, invoker_voice_channel};
use hearth_core::{Context, Error};
use hearth_music::embeds::now_playing_embed;
use hearth_music::{QueryKind, ResolveError, SessionTarget};

pub const META: CommandMeta = CommandMeta {
    name: "play",
    desc: "Play a song or playlist from YouTube or Spotify.",
    category: "music",
    usage: "!play <url or search terms>",
};

fn resolve_failure_message(source: &ResolveError) -> &'static str {
    match source {
        ResolveError::SpotifyDisabled => {
            "Spotify links are not available on this bot. Try a YouTube link or search terms instead."
        }
        ResolveError::NothingFound => "I couldn't find anything playable for that query.",
        ResolveError::Backend(_) => "Something went wrong while looking that up. Try again in a moment.",
    }
}

#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[description = "A YouTube/Spotify link or search terms"]
    #[rest]
    query: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let Some(query) = query.filter(|query| !query.trim().is_empty()) else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let Some(voice_channel_id) = invoker_voice_channel(&ctx) else {
        ctx.say("You need to be in a voice channel to play music.").await?;
        return Ok(());
    };

    if bot_can_speak_in(&ctx, voice_channel_id) == Some(false) {
        ctx.say("I need the **Connect** and **Speak** permissions in your voice channel.")
            .await?;
        return Ok(());
    }

    let music = &ctx.data().music;
    if let Some(active) = music.voice_channel(guild_id).await
        && active != voice_channel_id
    {
        ctx.say(format!("I'm already playing music in <#{}>.", active.get()))
            .await?;
        return Ok(());
    }

    ctx.defer().await?;

    let kind = QueryKind::classify(&query);
    let songs = match music.resolver().resolve(&kind, ctx.author().id).await {
        Ok(songs) => songs,
        Err(source) => {
            if let ResolveError::Backend(inner) = &source {
                error!(?inner, query = %query, "track lookup failed");
            }
            let embed = error_embed("Nothing queued", resolve_failure_message(&source));
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
            return Ok(());
        }
    };

    let target = SessionTarget {
        guild_id,
        voice_channel_id,
        text_channel_id: ctx.channel_id(),
        http: ctx.serenity_context().http.clone(),
    };

    let outcome = match music.enqueue(target, songs).await {
        Ok(outcome) => outcome,
        Err(source) => {
            error!(?source, guild_id = guild_id.get(), "failed to start music session");
            ctx.say("I couldn't join your voice channel.").await?;
            return Ok(());
        }
    };

    let embed: serenity::CreateEmbed = if kind.is_collection() {
        let queue_len = outcome.position + outcome.added - 1;
        collection_embed(outcome.added, queue_len, outcome.started)
    } else if outcome.started {
        now_playing_embed(&outcome.first)
    } else {
        queued_embed(&outcome.first, outcome.position)
    };

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::resolve_failure_message;
    use hearth_music::ResolveError;

    #[test]
    fn backend_failures_hide_details() {
        let message = resolve_failure_message(&ResolveError::Backend(anyhow::anyhow!("yt-dlp exited 1")));
        assert!(!message.contains("yt-dlp"));
    }
}
