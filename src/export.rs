//! One-shot export of the rendered indicator as JSON.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde_json::json;

use crate::monitor::TickOutcome;
use crate::render::RenderedIndicator;

/// Describe an indicator and the tick that produced it.
pub fn indicator_json(indicator: &RenderedIndicator, outcome: &TickOutcome) -> serde_json::Value {
    let outcome = match outcome {
        TickOutcome::Updated { .. } => json!({ "kind": "updated" }),
        TickOutcome::NoData => json!({ "kind": "no_data" }),
        TickOutcome::Failed(err) => json!({ "kind": "failed", "error": err }),
    };

    json!({
        "status_text": indicator.status_text,
        "alert": indicator.alert,
        "bpm": indicator.bpm,
        "placeholder": indicator.is_placeholder(),
        "outcome": outcome,
        "glyph": {
            "size": indicator.glyph.size(),
            "rows": indicator.glyph.hex_rows(),
        },
    })
}

/// Write `indicator` to `path` as pretty-printed JSON.
pub fn export_to_file(path: &Path, indicator: &RenderedIndicator, outcome: &TickOutcome) -> Result<()> {
    let json = serde_json::to_string_pretty(&indicator_json(indicator, outcome))?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
