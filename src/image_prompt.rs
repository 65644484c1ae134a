//! Compile a completed elicitation snapshot into the image prompt.

use crate::arcana::ArcanaCard;
use crate::elicitation::Collected;

const STYLE_PREAMBLE: &str = "Stained glass style";
const STYLE_SUFFIX: &str = "mystical, 8k";

/// Total function over any snapshot: every item appears verbatim, so
/// distinct snapshots always compile to distinct prompts.
pub fn compile(card: &ArcanaCard, collected: &Collected) -> String {
    format!(
        "{}, {} tarot motif, {}, colors {}, {}",
        STYLE_PREAMBLE,
        card.name,
        collected.objects.join(", "),
        collected.colors.join(", "),
        STYLE_SUFFIX
    )
}
