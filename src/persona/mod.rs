//! Persona loading and system prompt rendering
//!
//! The persona is the identity the chatbot adopts: a name, a short
//! biography, a resume parsed from a structured TOML document, and an
//! optional detailed work history. Sources live in a configurable
//! directory (default `me/`). A missing source never fails startup; the
//! service falls back to a generic summary and keeps answering.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::config::Config;

const DEFAULT_NAME: &str = "Jordan Lee";

/// Read-only persona context, loaded once at startup and shared across
/// request handlers.
#[derive(Debug, Clone)]
pub struct Persona {
    pub name: String,
    pub summary: String,
    pub profile: String,
    pub work_history: String,
}

/// Structured resume document: ordered sections of paragraphs.
#[derive(Debug, Deserialize)]
struct ProfileDoc {
    #[serde(default)]
    section: Vec<ProfileSection>,
}

#[derive(Debug, Deserialize)]
struct ProfileSection {
    #[serde(default)]
    heading: Option<String>,
    #[serde(default)]
    paragraphs: Vec<String>,
}

impl Persona {
    pub fn load(config: &Config) -> Self {
        let name = config
            .persona_name
            .clone()
            .unwrap_or_else(|| DEFAULT_NAME.to_string());

        let summary = match &config.persona_summary {
            Some(summary) => summary.clone(),
            None => load_text(&config.persona_dir.join("summary.txt"))
                .unwrap_or_else(|| fallback_summary(&name)),
        };

        let profile = load_profile(&config.persona_dir.join("profile.toml"));
        let work_history =
            load_text(&config.persona_dir.join("work_history.txt")).unwrap_or_default();

        Self {
            name,
            summary,
            profile,
            work_history,
        }
    }

    /// Render the system prompt: persona instructions followed by the
    /// reference documents the model may quote from.
    pub fn system_prompt(&self) -> String {
        let name = &self.name;
        let mut prompt = format!(
            "You are acting as {name}. You are answering questions on {name}'s website, \
particularly questions related to {name}'s career, background, skills and experience. \
Your responsibility is to represent {name} for interactions on the website as faithfully as possible. \
You are given a summary of {name}'s background and resume which you can use to answer questions. \
Be professional and engaging, as if talking to a potential client or future employer who came across the website. \
If you don't know the answer to any question, use your record_unknown_question tool to record the question that you couldn't answer, even if it's about something trivial or unrelated to career. \
If the user is engaging in discussion, try to steer them towards getting in touch via email; ask for their email and record it using your record_user_details tool. \
When recording user details, always include the user's message or a summary of the conversation in the 'notes' parameter so {name} knows what they were interested in."
        );

        prompt.push_str(&format!(
            "\n\n## Summary:\n{}\n\n## Resume:\n{}\n\n",
            self.summary, self.profile
        ));

        if !self.work_history.is_empty() {
            prompt.push_str(&format!(
                "## Detailed Work Experience:\n{}\n\n",
                self.work_history
            ));
        }

        prompt.push_str(&format!(
            "With this context, please chat with the user, always staying in character as {name}."
        ));
        prompt
    }
}

fn fallback_summary(name: &str) -> String {
    format!(
        "{name} is a software engineer. A detailed biography has not been \
published yet; answer questions generally and record anything you cannot \
answer."
    )
}

fn load_text(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => {
            let text = text.trim().to_string();
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "persona source not loaded");
            None
        }
    }
}

/// Parse the structured resume document into plain paragraph text:
/// sections in document order, blank paragraphs skipped.
fn load_profile(path: &Path) -> String {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "resume document not loaded");
            return String::new();
        }
    };

    match toml::from_str::<ProfileDoc>(&raw) {
        Ok(doc) => render_profile(&doc),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "resume document failed to parse");
            String::new()
        }
    }
}

fn render_profile(doc: &ProfileDoc) -> String {
    let mut lines = Vec::new();
    for section in &doc.section {
        if let Some(heading) = &section.heading {
            if !heading.trim().is_empty() {
                lines.push(heading.trim().to_string());
            }
        }
        for paragraph in &section.paragraphs {
            if !paragraph.trim().is_empty() {
                lines.push(paragraph.trim().to_string());
            }
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_config(dir: PathBuf) -> Config {
        Config {
            host: "127.0.0.1".into(),
            port: 0,
            openai_api_key: "test-key".into(),
            openai_base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            temperature: 0.7,
            pushover_token: None,
            pushover_user: None,
            persona_dir: dir,
            persona_name: None,
            persona_summary: None,
            allowed_origins: vec![],
        }
    }

    #[test]
    fn missing_sources_fall_back_without_failing() {
        let config = test_config(PathBuf::from("/nonexistent/persona/dir"));
        let persona = Persona::load(&config);

        assert!(!persona.summary.is_empty());
        assert!(persona.profile.is_empty());
        assert!(persona.work_history.is_empty());
    }

    #[test]
    fn sources_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("summary.txt"), "Runs the platform team.\n").unwrap();
        fs::write(
            dir.path().join("profile.toml"),
            r#"
[[section]]
heading = "Experience"
paragraphs = ["Led the runtime group.", "   ", "Shipped the v2 storage engine."]

[[section]]
paragraphs = ["BSc Computer Science."]
"#,
        )
        .unwrap();
        fs::write(dir.path().join("work_history.txt"), "2019-2024: Acme Corp\n").unwrap();

        let config = test_config(dir.path().to_path_buf());
        let persona = Persona::load(&config);

        assert_eq!(persona.summary, "Runs the platform team.");
        assert_eq!(
            persona.profile,
            "Experience\nLed the runtime group.\nShipped the v2 storage engine.\nBSc Computer Science."
        );
        assert_eq!(persona.work_history, "2019-2024: Acme Corp");
    }

    #[test]
    fn system_prompt_includes_documents_and_tools() {
        let mut config = test_config(PathBuf::from("/nonexistent"));
        config.persona_name = Some("Sam Okafor".into());
        config.persona_summary = Some("Builds distributed systems.".into());

        let persona = Persona::load(&config);
        let prompt = persona.system_prompt();

        assert!(prompt.contains("You are acting as Sam Okafor."));
        assert!(prompt.contains("## Summary:\nBuilds distributed systems."));
        assert!(prompt.contains("record_unknown_question"));
        assert!(prompt.contains("record_user_details"));
        assert!(prompt.ends_with("staying in character as Sam Okafor."));
        // No work history on file, so the section is omitted entirely.
        assert!(!prompt.contains("## Detailed Work Experience:"));
    }

    #[test]
    fn work_history_section_appears_when_present() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("work_history.txt"), "Early startup years.").unwrap();

        let persona = Persona::load(&test_config(dir.path().to_path_buf()));
        let prompt = persona.system_prompt();
        assert!(prompt.contains("## Detailed Work Experience:\nEarly startup years."));
    }
}
