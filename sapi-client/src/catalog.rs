//! Voice catalog queries: listing by language and lookup by name.

use std::fmt;

use tracing::{debug, warn};

use crate::engine::{SpeechEngine, VoiceToken};
use crate::error::ClientError;

/// One line of `-l` output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct VoiceListing {
    /// Locale tag, followed by ", <region label>" when the description has one.
    pub heading: String,
    pub name: String,
}

impl fmt::Display for VoiceListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.heading, self.name)
    }
}

impl VoiceListing {
    fn from_token<H>(token: &VoiceToken<H>) -> Option<Self> {
        let locale = token.locale()?;
        let heading = match token.region_label() {
            Some(label) => format!("{locale}, {label}"),
            None => locale,
        };
        Some(Self {
            heading,
            name: token.name.clone(),
        })
    }

    fn matches_any(&self, prefixes: &[String]) -> bool {
        let heading = self.heading.to_lowercase();
        prefixes.is_empty()
            || prefixes
                .iter()
                .any(|prefix| heading.starts_with(&prefix.to_lowercase()))
    }
}

/// Installed voices whose locale starts with any of `prefixes`
/// (case-insensitive), or all voices when no prefix is given, sorted by
/// heading then name.
pub fn list_voices<E: SpeechEngine>(
    engine: &E,
    prefixes: &[String],
) -> Result<Vec<VoiceListing>, ClientError> {
    let mut listings: Vec<VoiceListing> = engine
        .voices()?
        .iter()
        .filter_map(|token| {
            let listing = VoiceListing::from_token(token);
            if listing.is_none() {
                warn!("Skipping voice without locale: {} ({})", token.name, token.id);
            }
            listing
        })
        .filter(|listing| listing.matches_any(prefixes))
        .collect();
    listings.sort();
    debug!("Listing {} voices for prefixes {prefixes:?}", listings.len());
    Ok(listings)
}

/// Find a voice by name, ignoring case. "Zira" also finds "Microsoft Zira".
pub fn resolve_voice<E: SpeechEngine>(
    engine: &E,
    name: &str,
) -> Result<VoiceToken<E::Voice>, ClientError> {
    let wanted = name.to_lowercase();
    let abbreviated = format!("microsoft {wanted}");

    engine
        .voices()?
        .into_iter()
        .find(|token| {
            let candidate = token.name.to_lowercase();
            candidate == wanted || candidate == abbreviated
        })
        .inspect(|token| debug!("Resolved voice {name:?} to {}", token.id))
        .ok_or_else(|| ClientError::VoiceNotFound(name.to_string()))
}
