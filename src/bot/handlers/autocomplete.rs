//! Autocomplete handlers for Discord slash command parameters.
//!
//! This module provides autocomplete functionality for command parameters like
//! lawyer names and practice areas, suggesting valid options as the user types.

use crate::{bot::BotData, core::user, entities::ConsultationStatus, errors::Error};

/// Discord shows at most this many suggestions.
const MAX_SUGGESTIONS: usize = 25;

/// Practice areas offered when requesting a consultation.
pub const CATEGORIES: [&str; 10] = [
    "Civil",
    "Consumer",
    "Corporate",
    "Criminal",
    "Employment",
    "Family",
    "Immigration",
    "Intellectual Property",
    "Property",
    "Tax",
];

/// Keeps the candidates containing `partial` (case-insensitive), sorted.
fn filter_matches<I>(candidates: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<String> = candidates
        .into_iter()
        .filter(|candidate| candidate.to_lowercase().contains(&partial_lower))
        .take(MAX_SUGGESTIONS)
        .collect();
    matching.sort();
    matching
}

/// Suggests usernames of lawyers who are taking requests.
pub async fn autocomplete_lawyer_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(listings) = user::list_available_lawyers(&ctx.data().database).await else {
        return Vec::new();
    };
    filter_matches(listings.into_iter().map(|l| l.user.username), partial)
}

/// Suggests practice areas.
pub async fn autocomplete_category(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    filter_matches(CATEGORIES.iter().map(|&c| c.to_string()), partial)
}

/// Suggests consultation statuses.
pub async fn autocomplete_status(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let statuses = [
        ConsultationStatus::Pending,
        ConsultationStatus::Accepted,
        ConsultationStatus::Rejected,
        ConsultationStatus::Completed,
    ];
    filter_matches(statuses.iter().map(ToString::to_string), partial)
}
