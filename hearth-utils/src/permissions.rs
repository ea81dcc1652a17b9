use std::collections::HashMap;

use poise::serenity_prelude as serenity;

/// Resolve a member's effective guild permissions from their roles.
pub async fn resolve_user_permissions(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
) -> anyhow::Result<serenity::Permissions> {
    let guild = guild_id.to_partial_guild(http).await?;
    if guild.owner_id == user_id {
        return Ok(serenity::Permissions::all());
    }

    let member = guild_id.member(http, user_id).await?;
    let everyone_role_id = serenity::RoleId::new(guild_id.get());

    let resolved = guild
        .roles
        .values()
        .filter(|role| role.id == everyone_role_id || member.roles.contains(&role.id))
        .fold(serenity::Permissions::empty(), |acc, role| acc | role.permissions);

    Ok(resolved)
}

pub async fn has_user_permission(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    required: serenity::Permissions,
) -> anyhow::Result<bool> {
    let perms = resolve_user_permissions(http, guild_id, user_id).await?;

    Ok(perms.contains(serenity::Permissions::ADMINISTRATOR) || perms.contains(required))
}

/// Highest role position held by a member, `0` for @everyone only.
pub fn highest_role_position(
    roles: &HashMap<serenity::RoleId, serenity::Role>,
    member_roles: &[serenity::RoleId],
) -> u16 {
    member_roles
        .iter()
        .filter_map(|role_id| roles.get(role_id))
        .map(|role| role.position)
        .max()
        .unwrap_or(0)
}

/// Everything needed to decide whether a moderator may act on a target.
#[derive(Clone, Copy, Debug)]
pub struct HierarchySnapshot {
    pub owner_id: serenity::UserId,
    pub actor_id: serenity::UserId,
    pub actor_top_role: u16,
    pub bot_id: serenity::UserId,
    pub bot_top_role: u16,
    pub target_id: serenity::UserId,
    pub target_top_role: u16,
    pub target_is_bot: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetDenial {
    SelfTarget,
    BotSelf,
    BotAccount,
    GuildOwner,
    OutranksActor,
    OutranksBot,
}

impl TargetDenial {
    pub fn message(self, action: &str) -> String {
        match self {
            Self::SelfTarget => format!("You can't {action} yourself."),
            Self::BotSelf => format!("I can't {action} myself."),
            Self::BotAccount => format!("You can't {action} bots or application accounts."),
            Self::GuildOwner => format!("You can't {action} the server owner."),
            Self::OutranksActor => {
                format!("You can't {action} someone whose highest role is equal to or above yours.")
            }
            Self::OutranksBot => {
                format!("I can't {action} someone whose highest role is equal to or above mine.")
            }
        }
    }
}

/// Decide whether the actor may moderate the target under the role hierarchy.
///
/// The guild owner bypasses the actor-side rank check but the bot still needs
/// to outrank the target for Discord to accept the action.
pub fn check_moderation_target(
    snapshot: &HierarchySnapshot,
    reject_bot_accounts: bool,
) -> Result<(), TargetDenial> {
    if snapshot.target_id == snapshot.actor_id {
        return Err(TargetDenial::SelfTarget);
    }
    if snapshot.target_id == snapshot.bot_id {
        return Err(TargetDenial::BotSelf);
    }
    if reject_bot_accounts && snapshot.target_is_bot {
        return Err(TargetDenial::BotAccount);
    }
    if snapshot.target_id == snapshot.owner_id {
        return Err(TargetDenial::GuildOwner);
    }
    if snapshot.actor_id != snapshot.owner_id
        && snapshot.target_top_role >= snapshot.actor_top_role
    {
        return Err(TargetDenial::OutranksActor);
    }
    if snapshot.target_top_role >= snapshot.bot_top_role {
        return Err(TargetDenial::OutranksBot);
    }

    Ok(())
}

/// Load a hierarchy snapshot, or `None` when the target is not a guild member.
pub async fn load_hierarchy_snapshot(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    actor_id: serenity::UserId,
    bot_id: serenity::UserId,
    target: &serenity::User,
) -> anyhow::Result<Option<HierarchySnapshot>> {
    let Ok(target_member) = guild_id.member(http, target.id).await else {
        return Ok(None);
    };

    let guild = guild_id.to_partial_guild(http).await?;
    let actor_member = guild_id.member(http, actor_id).await?;
    let bot_member = guild_id.member(http, bot_id).await?;

    Ok(Some(HierarchySnapshot {
        owner_id: guild.owner_id,
        actor_id,
        actor_top_role: highest_role_position(&guild.roles, &actor_member.roles),
        bot_id,
        bot_top_role: highest_role_position(&guild.roles, &bot_member.roles),
        target_id: target.id,
        target_top_role: highest_role_position(&guild.roles, &target_member.roles),
        target_is_bot: target.bot,
    }))
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use super::{HierarchySnapshot, TargetDenial, check_moderation_target};

    fn snapshot() -> HierarchySnapshot {
        HierarchySnapshot {
            owner_id: serenity::UserId::new(1),
            actor_id: serenity::UserId::new(2),
            actor_top_role: 10,
            bot_id: serenity::UserId::new(3),
            bot_top_role: 20,
            target_id: serenity::UserId::new(4),
            target_top_role: 5,
            target_is_bot: false,
        }
    }

    #[test]
    fn allows_lower_ranked_target() {
        assert_eq!(check_moderation_target(&snapshot(), true), Ok(()));
    }

    #[test]
    fn rejects_self_and_bot() {
        let mut snap = snapshot();
        snap.target_id = snap.actor_id;
        assert_eq!(check_moderation_target(&snap, false), Err(TargetDenial::SelfTarget));

        let mut snap = snapshot();
        snap.target_id = snap.bot_id;
        assert_eq!(check_moderation_target(&snap, false), Err(TargetDenial::BotSelf));
    }

    #[test]
    fn bot_accounts_only_rejected_when_asked() {
        let mut snap = snapshot();
        snap.target_is_bot = true;
        assert_eq!(check_moderation_target(&snap, true), Err(TargetDenial::BotAccount));
        assert_eq!(check_moderation_target(&snap, false), Ok(()));
    }

    #[test]
    fn owner_is_untouchable() {
        let mut snap = snapshot();
        snap.target_id = snap.owner_id;
        snap.target_top_role = 0;
        assert_eq!(check_moderation_target(&snap, false), Err(TargetDenial::GuildOwner));
    }

    #[test]
    fn equal_rank_is_denied() {
        let mut snap = snapshot();
        snap.target_top_role = snap.actor_top_role;
        assert_eq!(check_moderation_target(&snap, false), Err(TargetDenial::OutranksActor));
    }

    #[test]
    fn owner_bypasses_actor_rank_but_not_bot_rank() {
        let mut snap = snapshot();
        snap.actor_id = snap.owner_id;
        snap.actor_top_role = 0;
        snap.target_top_role = 15;
        assert_eq!(check_moderation_target(&snap, false), Ok(()));

        snap.target_top_role = 25;
        assert_eq!(check_moderation_target(&snap, false), Err(TargetDenial::OutranksBot));
    }

    #[test]
    fn denial_messages_name_the_action() {
        assert_eq!(TargetDenial::SelfTarget.message("ban"), "You can't ban yourself.");
        assert!(TargetDenial::OutranksBot.message("kick").contains("kick"));
    }
}
