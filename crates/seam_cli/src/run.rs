//! Headless playback and trace output

use anyhow::{Context, Result};
use seam_scroll::headless::{scenarios, FrameSample, GestureScript, HeadlessSurface, ScriptError};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::config::SeamConfig;

/// Result of one playback
#[derive(Debug, Serialize)]
pub struct Report {
    pub scenario: String,
    pub description: String,
    pub extent: Option<i32>,
    pub frames: u64,
    pub settled: bool,
    #[serde(rename = "final")]
    pub final_state: FrameSample,
    pub trace: Vec<FrameSample>,
}

/// Resolve a built-in scenario name
pub fn builtin(name: &str) -> Result<GestureScript> {
    scenarios::builtin(name)
        .ok_or_else(|| ScriptError::UnknownScenario(name.to_string()).into())
}

/// Load a JSON gesture script
pub fn load_script(path: &Path) -> Result<GestureScript> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    GestureScript::from_json(&content)
        .with_context(|| format!("Failed to load script {}", path.display()))
}

/// Replay `script` on a fresh headless surface
pub fn play(script: &GestureScript, config: &SeamConfig) -> Result<Report> {
    let geometry = config.surface.unwrap_or_else(|| script.surface_config());
    let mut surface = HeadlessSurface::new(config.scroll, geometry);
    surface.play(script)?;
    surface.run_frames(config.playback.extra_frames);

    let trace = surface.take_trace();
    let final_state = trace
        .last()
        .copied()
        .unwrap_or_else(|| surface.sample(None));
    tracing::info!(
        "'{}' finished at frame {}: container={} content={} list={}",
        script.name,
        final_state.frame,
        final_state.container,
        final_state.content,
        final_state.list
    );

    Ok(Report {
        scenario: script.name.clone(),
        description: script.description.clone(),
        extent: surface.coordinator().scroll_extent(),
        frames: surface.clock().frame(),
        settled: !surface.is_animating(),
        final_state,
        trace,
    })
}

impl Report {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize trace")
    }

    /// Render as a table. Inputs are always shown, animation frames only
    /// every `every` frames.
    pub fn to_text(&self, every: u32) -> String {
        let every = u64::from(every.max(1));
        let mut out = String::new();
        out.push_str(&self.scenario);
        if !self.description.is_empty() {
            out.push_str(&format!(" - {}", self.description));
        }
        out.push('\n');
        out.push_str(&format!(
            "{:>6} {:>7} {:>7} {:>9} {:>7} {:>6} {:>16} {:>11}\n",
            "frame", "ms", "input", "container", "content", "list", "flying", "gesture"
        ));

        for sample in &self.trace {
            if sample.input.is_none() && sample.frame % every != 0 {
                continue;
            }
            out.push_str(&format_sample(sample));
        }

        out.push_str(&format!(
            "extent={} frames={} settled={}\n",
            self.extent
                .map(|e| e.to_string())
                .unwrap_or_else(|| "-".to_string()),
            self.frames,
            self.settled
        ));
        out
    }
}

fn format_sample(sample: &FrameSample) -> String {
    let input = sample
        .input
        .map(|phase| format!("{:?}", phase).to_lowercase())
        .unwrap_or_default();
    format!(
        "{:>6} {:>7} {:>7} {:>9} {:>7} {:>6} {:>16} {:>11}\n",
        sample.frame,
        sample.time_ms,
        input,
        sample.container,
        sample.content,
        sample.list,
        format!("{:?}", sample.flying),
        format!("{:?}", sample.gesture)
    )
}
