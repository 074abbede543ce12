//! Parameter management database operations
//!
//! Load/save tunable heuristic parameters from the settings table.

use anyhow::Result;
use sqlx::SqlitePool;

use super::settings::{get_setting, set_setting};
use crate::models::AssistParameters;

/// Load parameters, using defaults for anything not stored
pub async fn load_assist_parameters(pool: &SqlitePool) -> Result<AssistParameters> {
    let mut params = AssistParameters::default();
    let mut loaded_count = 0;

    macro_rules! load {
        ($key:literal, $field:expr) => {
            if let Some(val) = get_setting(pool, $key).await? {
                $field = val;
                loaded_count += 1;
            }
        };
    }

    let cue = &mut params.cue_detection;
    load!("intro_energy_threshold", cue.intro_energy_threshold);
    load!("intro_scan_fraction", cue.intro_scan_fraction);
    load!("intro_scan_max_segments", cue.intro_scan_max_segments);
    load!("drop_peak_threshold", cue.drop_peak_threshold);
    load!("drop_search_end_fraction", cue.drop_search_end_fraction);
    load!("outro_start_fraction", cue.outro_start_fraction);
    load!("outro_drop_ratio", cue.outro_drop_ratio);

    let suggestions = &mut params.suggestions;
    load!("max_suggestions", suggestions.max_suggestions);
    load!("recent_artist_window", suggestions.recent_artist_window);

    tracing::debug!("Loaded {} assist parameters from database (9 total)", loaded_count);
    Ok(params)
}

/// Save all parameters
pub async fn save_assist_parameters(pool: &SqlitePool, params: &AssistParameters) -> Result<()> {
    tracing::info!("Saving assist parameters to database: {:?}", params);

    let cue = &params.cue_detection;
    set_setting(pool, "intro_energy_threshold", cue.intro_energy_threshold).await?;
    set_setting(pool, "intro_scan_fraction", cue.intro_scan_fraction).await?;
    set_setting(pool, "intro_scan_max_segments", cue.intro_scan_max_segments).await?;
    set_setting(pool, "drop_peak_threshold", cue.drop_peak_threshold).await?;
    set_setting(pool, "drop_search_end_fraction", cue.drop_search_end_fraction).await?;
    set_setting(pool, "outro_start_fraction", cue.outro_start_fraction).await?;
    set_setting(pool, "outro_drop_ratio", cue.outro_drop_ratio).await?;

    let suggestions = &params.suggestions;
    set_setting(pool, "max_suggestions", suggestions.max_suggestions).await?;
    set_setting(pool, "recent_artist_window", suggestions.recent_artist_window).await?;

    Ok(())
}
