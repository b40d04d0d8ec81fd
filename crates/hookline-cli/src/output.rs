//! JSON output formatting

use hookline_core::Hook;
use serde::Serialize;

/// One detected hook in the report, with a precomputed end time
#[derive(Serialize)]
pub struct HookEntry {
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_path: Option<String>,
}

impl HookEntry {
    pub fn new(hook: &Hook, clip_path: Option<String>) -> Self {
        Self {
            start_time: hook.start_time,
            end_time: hook.start_time + hook.duration,
            duration: hook.duration,
            confidence: hook.confidence,
            clip_path,
        }
    }
}

/// Full detection report printed to stdout
#[derive(Serialize)]
pub struct HookReport {
    pub status: &'static str,
    pub input: String,
    pub detections: usize,
    pub hooks: Vec<HookEntry>,
    pub processing_time_seconds: f64,
}

impl HookReport {
    pub fn new(input: String, hooks: Vec<HookEntry>, processing_time_seconds: f64) -> Self {
        Self {
            status: if hooks.is_empty() {
                "no_hooks_found"
            } else {
                "success"
            },
            input,
            detections: hooks.len(),
            hooks,
            processing_time_seconds,
        }
    }
}

/// Print the report as pretty JSON
pub fn print_json_report(report: &HookReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing report: {}", e),
    }
}
