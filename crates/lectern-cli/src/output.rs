//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use lectern_domain::{GenerationRecord, UnitDocument};
use lectern_janitor::JanitorMetrics;
use lectern_store::QuotaStatus;
use lectern_voice::VoiceRecommendation;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const PREVIEW_CHARS: usize = 48;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the version history of an artifact.
    pub fn format_history(&self, records: &[GenerationRecord]) -> Result<String> {
        if self.format == OutputFormat::Json {
            return to_json(&records);
        }
        if records.is_empty() {
            return Ok(self.colorize("No versions found.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["Version", "Active", "Units", "Prompt", "Voices", "Created"]);
        for record in records {
            let active = if record.is_active { "*" } else { "" };
            let voices = record
                .voice_config
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_default();
            builder.push_record([
                record.version.to_string(),
                active.to_string(),
                record.unit_count().to_string(),
                preview(record.prompt.as_deref().unwrap_or("")),
                voices,
                record.created_at.to_string(),
            ]);
        }
        Ok(self.render(builder))
    }

    /// Format a single version with its units.
    pub fn format_record(&self, record: &GenerationRecord) -> Result<String> {
        if self.format == OutputFormat::Json {
            return to_json(record);
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Kind", "Content", "Audio"]);
        for (index, unit) in record.content.iter().enumerate() {
            let audio = record
                .metadata
                .get(&lectern_regen::audio_key(index))
                .map(|handles| handles.split(',').count().to_string())
                .unwrap_or_default();
            builder.push_record([
                index.to_string(),
                unit.kind().as_str().to_string(),
                preview(headline(unit)),
                audio,
            ]);
        }

        let header = format!(
            "Artifact {} version {}{}",
            record.artifact_id,
            record.version,
            if record.is_active { " (active)" } else { "" }
        );
        Ok(format!("{}\n{}", self.colorize(&header, "cyan"), self.render(builder)))
    }

    /// Format a voice recommendation.
    pub fn format_recommendation(&self, recommendation: &VoiceRecommendation) -> Result<String> {
        if self.format == OutputFormat::Json {
            return to_json(recommendation);
        }

        let mut builder = Builder::default();
        builder.push_record(["Role", "Voice"]);
        for (role, voice) in recommendation.voice_map.iter() {
            builder.push_record([role, voice]);
        }

        let header = format!(
            "Scenario: {} (confidence {:.2})",
            recommendation.preset_name, recommendation.confidence
        );
        Ok(format!(
            "{}\n{}\n{}",
            self.colorize(&header, "cyan"),
            recommendation.reasoning,
            self.render(builder)
        ))
    }

    /// Format a user's quota.
    pub fn format_quota(&self, status: &QuotaStatus) -> Result<String> {
        if self.format == OutputFormat::Json {
            return to_json(status);
        }

        let subscription = match status.subscription_expires_at {
            Some(expires) if status.unlimited => format!("active until {}", expires),
            Some(expires) => format!("expired at {}", expires),
            None => "none".to_string(),
        };
        let mut builder = Builder::default();
        builder.push_record(["User", "Free today", "Purchased", "Subscription"]);
        builder.push_record([
            status.user_id.to_string(),
            status.free_remaining.to_string(),
            status.purchased_remaining.to_string(),
            subscription,
        ]);
        Ok(self.render(builder))
    }

    /// Format janitor metrics.
    pub fn format_metrics(&self, metrics: &JanitorMetrics) -> Result<String> {
        if self.format == OutputFormat::Json {
            return to_json(&serde_json::json!({
                "allowances_reset": metrics.allowances_reset,
                "allowances_pending": metrics.allowances_pending,
                "sweep_count": metrics.sweep_count,
                "failed_sweeps": metrics.failed_sweeps,
                "total_runtime_ms": metrics.total_runtime_ms,
            }));
        }
        Ok(metrics.summary())
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Whether output is JSON.
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// The field that identifies a unit at a glance.
fn headline(unit: &UnitDocument) -> &str {
    match unit {
        UnitDocument::Choice(q) => &q.question,
        UnitDocument::FillBlank(q) => &q.sentence,
        UnitDocument::TrueFalse(q) => &q.statement,
        UnitDocument::Reading(p) => &p.title,
        UnitDocument::Listening(q) => &q.question,
        UnitDocument::Essay(e) => &e.title,
    }
}

fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > PREVIEW_CHARS {
        let cut: String = line.chars().take(PREVIEW_CHARS - 1).collect();
        format!("{}…", cut)
    } else {
        line.to_string()
    }
}
