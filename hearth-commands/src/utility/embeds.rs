use std::time::Duration;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;

/// Roles listed on a `userinfo` card.
pub const MAX_LISTED_ROLES: usize = 10;
pub const AVATAR_SIZE: u32 = 4096;

pub fn unknown_category_message(wanted_category: &str, valid_categories: &[&str]) -> String {
    let valid = valid_categories
        .iter()
        .map(|category| display_category(category))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Unknown category: {}\nValid categories: {}",
        display_category(wanted_category),
        valid
    )
}

pub fn no_commands_message(category: Option<&str>) -> String {
    match category {
        Some(cat) => format!("No commands found in category: {}", display_category(cat)),
        None => "No commands are registered.".to_owned(),
    }
}

pub fn page_out_of_range_message(requested_page: usize, total_pages: usize) -> String {
    format!("Page {requested_page} does not exist. Available pages: 1-{total_pages}.")
}

pub fn grouped_help_description(commands: &[&CommandMeta]) -> String {
    let mut out = String::new();
    let mut current_category: Option<&str> = None;

    for command in commands {
        if current_category != Some(command.category) {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("**{}**\n", display_category(command.category)));
            current_category = Some(command.category);
        }

        out.push_str(&format!("`{}`: {}\n", command.name, command.desc));
    }

    if out.is_empty() {
        out.push_str("No commands available.");
    }

    out.trim_end().to_owned()
}

fn display_category(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

pub fn ping_message(gateway: Duration, round_trip: Duration) -> String {
    let gateway = if gateway.is_zero() {
        "n/a".to_owned()
    } else {
        format!("{}ms", gateway.as_millis())
    };

    format!(
        "Pong! 🏓 Gateway: {gateway} • Round trip: {}ms",
        round_trip.as_millis()
    )
}

/// Role mentions ordered from highest position, capped at [`MAX_LISTED_ROLES`].
pub fn role_mentions(mut roles: Vec<(serenity::RoleId, u16)>) -> String {
    if roles.is_empty() {
        return "None".to_owned();
    }

    roles.sort_by(|left, right| right.1.cmp(&left.1));
    let shown = roles
        .iter()
        .take(MAX_LISTED_ROLES)
        .map(|(id, _)| format!("<@&{}>", id.get()))
        .collect::<Vec<_>>()
        .join(" ");

    match roles.len().saturating_sub(MAX_LISTED_ROLES) {
        0 => shown,
        hidden => format!("{shown} (+{hidden} more)"),
    }
}

/// The same CDN image re-encoded as `extension` at full size.
pub fn avatar_format_url(url: &str, extension: &str) -> String {
    let base = url.split('?').next().unwrap_or(url);
    let stem = match base.rsplit_once('/') {
        Some((dir, file)) => {
            let name = file.split('.').next().unwrap_or(file);
            format!("{dir}/{name}")
        }
        None => base.to_owned(),
    };

    format!("{stem}.{extension}?size={AVATAR_SIZE}")
}

pub fn avatar_download_links(url: &str) -> String {
    ["png", "jpg", "webp"]
        .iter()
        .map(|extension| {
            format!(
                "[{}]({})",
                extension.to_ascii_uppercase(),
                avatar_format_url(url, extension)
            )
        })
        .collect::<Vec<_>>()
        .join(" • ")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use poise::serenity_prelude as serenity;

    use super::{avatar_download_links, avatar_format_url, grouped_help_description, ping_message, role_mentions};
    use crate::CommandMeta;

    #[test]
    fn help_groups_commands_by_category() {
        let ban = CommandMeta {
            name: "ban",
            desc: "Ban a member.",
            category: "moderation",
            usage: "!ban <user>",
        };
        let play = CommandMeta {
            name: "play",
            desc: "Play music.",
            category: "music",
            usage: "!play <query>",
        };

        let text = grouped_help_description(&[&ban, &play]);
        assert_eq!(text, "**Moderation**\n`ban`: Ban a member.\n\n**Music**\n`play`: Play music.");
    }

    #[test]
    fn ping_reports_unknown_gateway_latency() {
        assert_eq!(
            ping_message(Duration::ZERO, Duration::from_millis(120)),
            "Pong! 🏓 Gateway: n/a • Round trip: 120ms"
        );
        assert!(ping_message(Duration::from_millis(42), Duration::ZERO).contains("Gateway: 42ms"));
    }

    #[test]
    fn roles_are_sorted_and_capped() {
        let roles = (1..=12)
            .map(|n| (serenity::RoleId::new(n), n as u16))
            .collect::<Vec<_>>();
        let text = role_mentions(roles);

        assert!(text.starts_with("<@&12> <@&11>"));
        assert!(text.ends_with("(+2 more)"));
        assert_eq!(role_mentions(Vec::new()), "None");
    }

    #[test]
    fn avatar_urls_switch_format() {
        let url = "https://cdn.discordapp.com/avatars/1/abc.webp?size=1024";
        assert_eq!(
            avatar_format_url(url, "png"),
            "https://cdn.discordapp.com/avatars/1/abc.png?size=4096"
        );
        assert!(avatar_download_links(url).starts_with("[PNG](https://cdn.discordapp.com/avatars/1/abc.png?size=4096)"));
    }
}
