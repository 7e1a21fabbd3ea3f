//! Line state extraction from the `Adsl` section.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ReportError;
use crate::extraction::values::{capture_pair, RawPair};
use crate::logging::structured::LogContext;
use crate::storage::models::LineState;

/// Heading of the section holding line metrics and the connection log.
pub const ADSL_SECTION: &str = "Adsl";

pub const RATE_UNIT: &str = "kb/s";
pub const NOISE_MARGIN_UNIT: &str = "dB";
pub const ATTENUATION_UNIT: &str = "dB";

// Margins and attenuations are signed: a degraded line can report a
// negative noise margin.
lazy_static! {
    static ref ATM_BW_PATTERN: Regex = Regex::new(
        r"(?m)^[ \t]*Débit ATM[ \t]+([\d.,]+)[ \t]*(\S+)[ \t]+(?:/[ \t]*)?([\d.,]+)[ \t]*(\S+)"
    ).unwrap();

    static ref NOISE_PATTERN: Regex = Regex::new(
        r"(?m)^[ \t]*Marge de bruit[ \t]+(-?[\d.,]+)[ \t]*(\S+)[ \t]+(?:/[ \t]*)?(-?[\d.,]+)[ \t]*(\S+)"
    ).unwrap();

    static ref ATT_PATTERN: Regex = Regex::new(
        r"(?m)^[ \t]*Atténuation[ \t]+(-?[\d.,]+)[ \t]*(\S+)[ \t]+(?:/[ \t]*)?(-?[\d.,]+)[ \t]*(\S+)"
    ).unwrap();

    static ref FEC_PATTERN: Regex = Regex::new(
        r"(?m)^[ \t]*FEC[ \t]+(\d+)[ \t]+(?:/[ \t]*)?(\d+)"
    ).unwrap();

    static ref CRC_PATTERN: Regex = Regex::new(
        r"(?m)^[ \t]*CRC[ \t]+(\d+)[ \t]+(?:/[ \t]*)?(\d+)"
    ).unwrap();

    static ref HEC_PATTERN: Regex = Regex::new(
        r"(?m)^[ \t]*HEC[ \t]+(\d+)[ \t]+(?:/[ \t]*)?(\d+)"
    ).unwrap();
}

fn metric_pair<'a>(
    pattern: &Regex,
    body: &'a str,
    metric: &str,
    unit: Option<&str>,
) -> Result<RawPair<'a>, ReportError> {
    let caps = pattern
        .captures(body)
        .ok_or_else(|| ReportError::MissingField(metric.to_string()))?;
    capture_pair(&caps, 1, metric, unit)
}

/// Extract the line state from the body of the `Adsl` section.
pub fn extract_line_state(body: &str, ctx: &LogContext) -> Result<LineState, ReportError> {
    let (atm_bw_down, atm_bw_up) =
        metric_pair(&ATM_BW_PATTERN, body, "atm_bw", Some(RATE_UNIT))?.ints("atm_bw")?;
    let (noise_margin_down, noise_margin_up) =
        metric_pair(&NOISE_PATTERN, body, "noise_margin", Some(NOISE_MARGIN_UNIT))?
            .floats("noise_margin")?;
    let (att_down, att_up) =
        metric_pair(&ATT_PATTERN, body, "attenuation", Some(ATTENUATION_UNIT))?
            .floats("attenuation")?;
    let (fec_down, fec_up) = metric_pair(&FEC_PATTERN, body, "fec", None)?.ints("fec")?;
    let (crc_down, crc_up) = metric_pair(&CRC_PATTERN, body, "crc", None)?.ints("crc")?;
    let (hec_down, hec_up) = metric_pair(&HEC_PATTERN, body, "hec", None)?.ints("hec")?;

    let state = LineState {
        atm_bw_down,
        atm_bw_up,
        noise_margin_down,
        noise_margin_up,
        att_down,
        att_up,
        fec_down,
        fec_up,
        crc_down,
        crc_up,
        hec_down,
        hec_up,
    };

    log::debug!(
        "{} LINE_STATE_EXTRACTED atm_bw={}/{} noise_margin={}/{} att={}/{}",
        ctx,
        state.atm_bw_down,
        state.atm_bw_up,
        state.noise_margin_down,
        state.noise_margin_up,
        state.att_down,
        state.att_up
    );

    Ok(state)
}
