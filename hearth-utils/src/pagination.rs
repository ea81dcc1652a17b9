use std::time::Duration;

use poise::serenity_prelude as serenity;

use crate::embed::DEFAULT_EMBED_COLOR;

pub const PAGINATION_TIMEOUT_SECS: u64 = 60 * 3;

/// Number of pages needed for `total_items`, never less than one.
pub fn total_pages(total_items: usize, per_page: usize) -> usize {
    total_items.div_ceil(per_page.max(1)).max(1)
}

/// Half-open item range shown on the 1-based `page`.
pub fn page_window(total_items: usize, per_page: usize, page: usize) -> (usize, usize) {
    let per_page = per_page.max(1);
    let start = (page.max(1) - 1).saturating_mul(per_page).min(total_items);
    let end = (start + per_page).min(total_items);
    (start, end)
}

/// Group rendered lines into page bodies of `per_page` lines each.
pub fn chunk_into_pages(lines: &[String], per_page: usize) -> Vec<String> {
    let pages = total_pages(lines.len(), per_page);
    (1..=pages)
        .map(|page| {
            let (start, end) = page_window(lines.len(), per_page, page);
            lines[start..end].join("\n")
        })
        .collect()
}

struct PageView<'a> {
    title: &'a str,
    pages: &'a [String],
    author_icon_url: Option<&'a str>,
    prev_id: String,
    jump_id: String,
    next_id: String,
}

impl PageView<'_> {
    fn embed(&self, index: usize) -> serenity::CreateEmbed {
        let mut embed = serenity::CreateEmbed::new()
            .color(DEFAULT_EMBED_COLOR)
            .description(self.pages[index].clone());

        if self.pages.len() > 1 {
            embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
                "Page {}/{}",
                index + 1,
                self.pages.len()
            )));
        }

        match self.author_icon_url {
            Some(url) => embed.author(serenity::CreateEmbedAuthor::new(self.title).icon_url(url)),
            None => embed.title(self.title.to_owned()),
        }
    }

    fn buttons(&self, index: usize) -> Vec<serenity::CreateActionRow> {
        vec![serenity::CreateActionRow::Buttons(vec![
            serenity::CreateButton::new(&self.prev_id)
                .label("Prev")
                .disabled(index == 0)
                .style(serenity::ButtonStyle::Secondary),
            serenity::CreateButton::new(&self.jump_id)
                .label("Jump")
                .style(serenity::ButtonStyle::Secondary),
            serenity::CreateButton::new(&self.next_id)
                .label("Next")
                .disabled(index + 1 >= self.pages.len())
                .style(serenity::ButtonStyle::Secondary),
        ])]
    }
}

pub async fn paginate_embed_pages<U, E>(
    ctx: poise::Context<'_, U, E>,
    title: &str,
    pages: &[String],
    start_page: usize,
) -> Result<(), serenity::Error>
where
    U: Send + Sync,
    E: Send + Sync,
{
    paginate_embed_pages_with_icon(ctx, title, pages, start_page, None).await
}

pub async fn paginate_embed_pages_with_icon<U, E>(
    ctx: poise::Context<'_, U, E>,
    title: &str,
    pages: &[String],
    start_page: usize,
    author_icon_url: Option<&str>,
) -> Result<(), serenity::Error>
where
    U: Send + Sync,
    E: Send + Sync,
{
    if pages.is_empty() {
        return Ok(());
    }

    let ctx_id = ctx.id();
    let view = PageView {
        title,
        pages,
        author_icon_url,
        prev_id: format!("{ctx_id}_prev"),
        jump_id: format!("{ctx_id}_jump"),
        next_id: format!("{ctx_id}_next"),
    };
    let mut current = start_page.clamp(1, pages.len()) - 1;

    if pages.len() == 1 {
        ctx.send(poise::CreateReply::default().embed(view.embed(current)))
            .await?;
        return Ok(());
    }

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .embed(view.embed(current))
                .components(view.buttons(current)),
        )
        .await?;

    let message = reply.message().await?;
    let message_id = message.id;
    let channel_id = message.channel_id;
    let jump_modal_id = format!("{ctx_id}_jump_modal");
    let jump_input_id = format!("{ctx_id}_jump_input");

    while let Some(press) = serenity::collector::ComponentInteractionCollector::new(ctx)
        .filter({
            let prefix = ctx_id.to_string();
            let author_id = ctx.author().id;
            move |interaction| {
                interaction.data.custom_id.starts_with(&prefix)
                    && interaction.user.id == author_id
                    && interaction.message.id == message_id
            }
        })
        .timeout(Duration::from_secs(PAGINATION_TIMEOUT_SECS))
        .await
    {
        let custom_id = press.data.custom_id.as_str();

        if custom_id == view.next_id || custom_id == view.prev_id {
            current = if custom_id == view.next_id {
                (current + 1).min(pages.len() - 1)
            } else {
                current.saturating_sub(1)
            };

            press
                .create_response(
                    ctx.http(),
                    serenity::CreateInteractionResponse::UpdateMessage(
                        serenity::CreateInteractionResponseMessage::new()
                            .embed(view.embed(current))
                            .components(view.buttons(current)),
                    ),
                )
                .await?;
            continue;
        }

        if custom_id != view.jump_id {
            continue;
        }

        press
            .create_response(
                ctx.http(),
                serenity::CreateInteractionResponse::Modal(
                    serenity::CreateModal::new(&jump_modal_id, "Jump to Page").components(vec![
                        serenity::CreateActionRow::InputText(
                            serenity::CreateInputText::new(
                                serenity::InputTextStyle::Short,
                                "Page Number",
                                &jump_input_id,
                            )
                            .placeholder(format!("1-{}", pages.len()))
                            .required(true),
                        ),
                    ]),
                ),
            )
            .await?;

        let Some(modal) = serenity::collector::ModalInteractionCollector::new(ctx)
            .author_id(ctx.author().id)
            .channel_id(ctx.channel_id())
            .custom_ids(vec![jump_modal_id.clone()])
            .timeout(Duration::from_secs(PAGINATION_TIMEOUT_SECS))
            .await
        else {
            continue;
        };

        modal
            .create_response(ctx.http(), serenity::CreateInteractionResponse::Acknowledge)
            .await?;

        let submitted = modal
            .data
            .components
            .iter()
            .flat_map(|row| row.components.iter())
            .find_map(|component| match component {
                serenity::ActionRowComponent::InputText(input)
                    if input.custom_id == jump_input_id =>
                {
                    input.value.clone()
                }
                _ => None,
            });

        if let Some(target) = submitted.and_then(|raw| raw.trim().parse::<usize>().ok())
            && (1..=pages.len()).contains(&target)
        {
            current = target - 1;
            channel_id
                .edit_message(
                    ctx.http(),
                    message_id,
                    serenity::EditMessage::new()
                        .embed(view.embed(current))
                        .components(view.buttons(current)),
                )
                .await?;
        }
    }

    let _ = channel_id
        .edit_message(
            ctx.http(),
            message_id,
            serenity::EditMessage::new()
                .embed(view.embed(current))
                .components(vec![]),
        )
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{chunk_into_pages, page_window, total_pages};

    #[test]
    fn page_counts() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 5);
    }

    #[test]
    fn page_windows_clamp_to_items() {
        assert_eq!(page_window(25, 10, 1), (0, 10));
        assert_eq!(page_window(25, 10, 3), (20, 25));
        assert_eq!(page_window(25, 10, 9), (25, 25));
        assert_eq!(page_window(25, 10, 0), (0, 10));
    }

    #[test]
    fn chunks_lines() {
        let lines: Vec<String> = (1..=5).map(|n| n.to_string()).collect();
        assert_eq!(chunk_into_pages(&lines, 2), vec!["1\n2", "3\n4", "5"]);
        assert_eq!(chunk_into_pages(&[], 2), vec![String::new()]);
    }
}
