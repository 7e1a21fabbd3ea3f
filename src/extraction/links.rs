//! Network link extraction from the `Réseau` section.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ReportError;
use crate::extraction::values::capture_pair;
use crate::logging::structured::LogContext;
use crate::storage::models::{LinkState, LinkStatus};

/// Heading of the section holding the interface table.
pub const NETWORK_SECTION: &str = "Réseau";

pub const USAGE_UNIT: &str = "ko/s";

lazy_static! {
    static ref WAN_PATTERN: Regex = Regex::new(
        r"(?m)^[ \t]*WAN[ \t]+(Ok|Non connecté)[ \t]+(\d+)[ \t]*(\S+)[ \t]+(\d+)[ \t]*(\S+)[ \t]*\r?$"
    ).unwrap();
}

/// Map a localized link state phrase to its token.
pub fn parse_link_status(phrase: &str) -> Option<LinkStatus> {
    match phrase {
        "Ok" => Some(LinkStatus::Up),
        "Non connecté" => Some(LinkStatus::Down),
        _ => None,
    }
}

/// Extract the WAN link state from the body of the `Réseau` section.
pub fn extract_links(body: &str, ctx: &LogContext) -> Result<Vec<LinkState>, ReportError> {
    let field = "wan_link";
    let mut matches = WAN_PATTERN.captures_iter(body);

    let caps = matches
        .next()
        .ok_or_else(|| ReportError::MissingField(field.to_string()))?;
    if matches.next().is_some() {
        return Err(ReportError::AmbiguousField(field.to_string()));
    }

    let state = caps
        .get(1)
        .and_then(|m| parse_link_status(m.as_str()))
        .ok_or_else(|| ReportError::MissingField(field.to_string()))?;

    let (usage_down, usage_up) = capture_pair(&caps, 2, field, Some(USAGE_UNIT))?.ints(field)?;

    let link = LinkState {
        link: "WAN".to_string(),
        state,
        usage_down,
        usage_up,
    };

    log::debug!(
        "{} LINK_EXTRACTED link={} state={} usage={}/{}",
        ctx,
        link.link,
        link.state.as_str(),
        link.usage_down,
        link.usage_up
    );

    Ok(vec![link])
}
