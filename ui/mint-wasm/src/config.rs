//! Page-supplied configuration.
//!
//! The hosting page may carry
//! `<script type="application/json" id="mint-config">{ ... }</script>`;
//! any field it sets overrides the shipped [`MintConfig`] default.

use anyhow::{Context, Result};
use mint_types::MintConfig;

use crate::dom;

/// Raw JSON of the page's config block, if there is one.
pub fn page_config_source() -> Option<String> {
    dom::by_id(dom::CONFIG_SCRIPT)?.text_content()
}

/// `Ok(None)` when the page carries no override.
pub fn parse(source: Option<&str>) -> Result<Option<MintConfig>> {
    let Some(raw) = source.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    let config = serde_json::from_str(raw).context("mint-config block is not valid JSON")?;
    Ok(Some(config))
}
