use crate::domain::model::RateObservation;
use crate::domain::ports::RateExtractor;
use crate::utils::error::{IndicesError, Result};
use crate::utils::html::HtmlDocument;
use crate::utils::locale::{parse_locale_number, parse_slash_date};
use regex::Regex;

/// Reads Banco Nación's "Información al usuario financiero" page.
///
/// The page shows the 30-day nominal annual rate as text like
/// `T.N.A. (30 días) = 36,50%`, preceded somewhere earlier in the page by the
/// date it applies from. The first T.N.A. fragment in document order wins and
/// its date is the nearest `d/m/yyyy` token before it.
pub struct ActivaExtractor {
    tna_pattern: Regex,
    value_pattern: Regex,
    date_pattern: Regex,
}

impl ActivaExtractor {
    pub fn new() -> Self {
        Self {
            tna_pattern: Regex::new(r"T\.N\.A\..*?=\s*[0-9.]*[0-9],[0-9]+%")
                .expect("static T.N.A. pattern"),
            value_pattern: Regex::new(r"=\s*([0-9.]*[0-9],[0-9]+)%").expect("static value pattern"),
            date_pattern: Regex::new(r"(\d{1,2}/\d{1,2}/\d{4})").expect("static date pattern"),
        }
    }
}

impl Default for ActivaExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Monthly percent equivalent of a nominal annual percent (`annual / 365 * 30`).
pub fn monthly_rate_from_annual(annual_percent: f64) -> f64 {
    annual_percent / 365.0 * 30.0
}

/// Daily compounding rate, as a fraction, for a nominal annual percent.
///
/// Uses the linear `monthly / 30` split, not an exact compounding conversion;
/// the published series has always been built this way.
pub fn daily_rate_from_annual(annual_percent: f64) -> f64 {
    monthly_rate_from_annual(annual_percent) / 30.0 / 100.0
}

impl RateExtractor for ActivaExtractor {
    fn extract(&self, document: &str) -> Result<RateObservation> {
        let tokens = HtmlDocument::parse(document).text_tokens();

        let position = tokens
            .iter()
            .position(|token| self.tna_pattern.is_match(token))
            .ok_or_else(|| IndicesError::extraction("pattern not found: T.N.A. (30 días)"))?;

        let percent = self
            .value_pattern
            .captures(&tokens[position])
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| IndicesError::extraction("pattern not found: T.N.A. value"))?;

        let raw_date = tokens[..position]
            .iter()
            .rev()
            .find_map(|token| self.date_pattern.captures(token))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| {
                IndicesError::extraction("associated date not found before the T.N.A. value")
            })?;

        let annual = parse_locale_number(percent)?;
        let effective_date = parse_slash_date(raw_date)?;

        tracing::info!(
            "📈 T.N.A. {}% effective {} (monthly {:.6}%)",
            annual,
            effective_date,
            monthly_rate_from_annual(annual)
        );

        Ok(RateObservation {
            effective_date,
            rate: daily_rate_from_annual(annual),
        })
    }
}
