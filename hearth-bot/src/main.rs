mod config;
mod events;
mod tasks;

use poise::serenity_prelude as serenity;
use tracing::{debug, error, info, warn};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use rustls::crypto::ring::default_provider;
use songbird::SerenityInit;
use sqlx::postgres::PgPoolOptions;

use hearth_core::{Data, DropRegistry, Error, TicketCreationLocks};
use hearth_database::{CacheService, Database, MIGRATOR};
use hearth_music::spotify::SpotifyClient;
use hearth_music::{MusicService, TrackResolver};

use crate::config::BotConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load the .env file
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env().ok();
    let cap_at_info = env_filter.is_none();
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(filter_fn(move |metadata| {
        let target = metadata.target();

        if cap_at_info && *metadata.level() > tracing::Level::INFO {
            return false;
        }

        !(target.starts_with("serenity::gateway::bridge::shard_manager")
            || target.starts_with("serenity::gateway::bridge::shard_runner"))
    }));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    let config = BotConfig::from_env()?;

    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    info!("PostgreSQL connection established.");

    let cache = build_cache(&config).await;
    let db = Database::with_cache(db_pool, cache);

    if config.auto_run_migrations {
        MIGRATOR.run(db.pool()).await?;
        info!("Database migrations applied.");
    } else {
        info!("Auto migrations disabled (set AUTO_RUN_MIGRATIONS=true to run at startup).");
    }

    let http_client = reqwest::Client::new();
    let spotify = SpotifyClient::from_env_optional(http_client.clone());
    if spotify.is_some() {
        info!("Spotify resolution enabled.");
    } else {
        info!("Spotify resolution disabled (missing SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET).");
    }

    let songbird = songbird::Songbird::serenity();
    let music = MusicService::new(songbird.clone(), http_client, TrackResolver::new(spotify));

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    let dev_guild_id = config.dev_guild_id;
    let transcript_dir = config.transcript_dir.clone();
    let ticket_retention_hours = config.ticket_auto_delete_hours;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: hearth_commands::commands(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(handle_event(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(hearth_utils::COMMAND_PREFIX.to_string()),
                mention_as_prefix: false,
                ..Default::default()
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            let db = db.clone();
            let music = music.clone();
            Box::pin(async move {
                info!("Hearth is lit!");

                match dev_guild_id {
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            serenity::GuildId::new(guild_id),
                        )
                        .await?;
                        info!(guild_id, "slash commands registered in guild");
                    }
                    None => {
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await?;
                        info!("slash commands registered globally");
                    }
                }

                events::presence::start(ctx, ready);
                tasks::spawn_ticket_sweeper(ctx.http.clone(), db.clone(), ticket_retention_hours);

                Ok(Data {
                    db,
                    music,
                    drops: DropRegistry::default(),
                    ticket_locks: TicketCreationLocks::default(),
                    transcript_dir,
                })
            })
        })
        .build();

    info!("Hearth is connecting...");

    let mut client = serenity::ClientBuilder::new(config.token, intents)
        .framework(framework)
        .register_songbird_with(songbird)
        .await?;

    client.start().await?;
    Ok(())
}

async fn build_cache(config: &BotConfig) -> CacheService {
    let prefix = config.redis_key_prefix.clone();

    let cache = if config.redis_enabled {
        match config.redis_url.as_deref() {
            Some(redis_url) => match CacheService::redis(redis_url, prefix.clone()) {
                Ok(cache) => {
                    info!(key_prefix = %prefix, "Redis cache enabled.");
                    cache
                }
                Err(err) => {
                    warn!(?err, key_prefix = %prefix, "Failed to initialize Redis cache; continuing with DB-only mode.");
                    CacheService::disabled(prefix)
                }
            },
            None => {
                warn!(key_prefix = %prefix, "REDIS_ENABLED=true but REDIS_URL is missing; continuing with DB-only mode.");
                CacheService::disabled(prefix)
            }
        }
    } else {
        info!("Redis cache disabled (set REDIS_ENABLED=true to enable).");
        CacheService::disabled(prefix)
    };

    if cache.is_redis_enabled() {
        if let Err(err) = cache.ping().await {
            warn!(
                ?err,
                "Redis cache ping failed; cache operations will continue with fallback behavior."
            );
        } else {
            info!("Redis cache health check passed.");
        }
    }

    cache
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(?error, command = %ctx.command().qualified_name, "command error");

            let embed = serenity::CreateEmbed::new()
                .title("Command Error")
                .description("Something went wrong while running this command.")
                .color(hearth_utils::embed::ERROR_EMBED_COLOR);

            let _ = ctx
                .send(poise::CreateReply::default().ephemeral(true).embed(embed))
                .await;
        }
        poise::FrameworkError::ArgumentParse { ctx, input, .. } => {
            let usage = hearth_commands::COMMANDS
                .iter()
                .find(|meta| meta.name == ctx.command().name)
                .map(|meta| meta.usage.to_owned())
                .unwrap_or_else(|| format!("!{}", ctx.command().qualified_name));
            let usage = format!("Usage: `{usage}`");
            let description = if let Some(input) = input {
                format!("Invalid argument: `{}`\n{}", input, usage)
            } else {
                format!("Missing required argument.\n{}", usage)
            };

            let _ = ctx.say(description).await;
        }
        poise::FrameworkError::UnknownCommand { .. } => {
            debug!("unknown command invocation");
        }
        other => {
            error!(?other, "framework error");
        }
    }
}

async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            events::leveling::handle_message_xp(ctx, data, new_message).await;
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            events::welcome::handle_member_join(ctx, data, new_member).await;
        }
        serenity::FullEvent::InteractionCreate {
            interaction: serenity::Interaction::Component(component),
        } => {
            hearth_commands::components::handle_component(ctx, data, component).await;
        }
        serenity::FullEvent::VoiceStateUpdate { old, new } => {
            events::voice::handle_voice_state_update(ctx, data, old.as_ref(), new).await;
        }
        _ => {}
    }

    Ok(())
}
