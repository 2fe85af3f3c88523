//! # Persona Prompt Assembly
//!
//! Builds the assistant's system prompt from a statically-typed persona
//! configuration. Every deployment of the service is the same code plus one
//! of these records; the persona file is the only thing that changes
//! between variants. Missing optional sections collapse to nothing instead
//! of placeholder text; a missing persona file is fatal to the enclosing
//! service.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading the persona configuration.
#[derive(Error, Debug)]
pub enum PersonaError {
    #[error("Failed to read persona configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse persona configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

fn default_response_policy() -> String {
    "If unsure, ask the user clarifying questions.".to_string()
}

/// Designer guardrails injected into the system prompt: which designer
/// lines the store actually carries, and how to answer about the rest.
#[derive(Debug, Clone, Deserialize)]
pub struct DesignerGuardrails {
    #[serde(default)]
    pub allowed: Vec<String>,
    #[serde(default)]
    pub denied: Vec<String>,
    #[serde(default = "default_response_policy")]
    pub response_policy: String,
}

impl Default for DesignerGuardrails {
    fn default() -> Self {
        Self {
            allowed: Vec::new(),
            denied: Vec::new(),
            response_policy: default_response_policy(),
        }
    }
}

/// Store-level facts surfaced in the prompt. All optional; absent fields
/// simply do not appear.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StoreProfile {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub appointment_link: Option<String>,
    #[serde(default)]
    pub featured_event: Option<String>,
}

/// The persona configuration for one deployment of the assistant.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonaConfig {
    pub identity: String,
    pub role: String,
    pub tone: String,
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub knowledge_domains: Vec<String>,
    #[serde(default)]
    pub service_principles: Vec<String>,
    #[serde(default)]
    pub style_rules: Vec<String>,
    #[serde(default)]
    pub pricing_guidance: Vec<String>,
    #[serde(default)]
    pub care_guidance: Vec<String>,
    #[serde(default)]
    pub gift_guidance: Vec<String>,
    #[serde(default)]
    pub signature_closers: Vec<String>,
    #[serde(default)]
    pub risk_handling: Vec<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub human_prompt: Option<String>,
    #[serde(default)]
    pub designers: DesignerGuardrails,
    #[serde(default)]
    pub store: StoreProfile,
}

impl PersonaConfig {
    /// Loads and validates the persona file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PersonaError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Renders the full system prompt for the chat model.
    pub fn render_system_prompt(&self) -> String {
        let mut prompt = format!(
            "You are {}, serving as {}.\n\nTone: {}\n",
            self.identity, self.role, self.tone
        );

        if !self.description.is_empty() {
            prompt.push('\n');
            prompt.push_str(&self.description.join("\n"));
            prompt.push('\n');
        }

        push_section(&mut prompt, "Domains of Expertise", &self.knowledge_domains);
        push_section(
            &mut prompt,
            "Customer Service Principles",
            &self.service_principles,
        );
        push_section(&mut prompt, "Style Guide", &self.style_rules);
        push_section(&mut prompt, "Pricing Guidance", &self.pricing_guidance);
        push_section(&mut prompt, "Care & Maintenance", &self.care_guidance);
        push_section(&mut prompt, "Gift Guidance", &self.gift_guidance);
        push_section(&mut prompt, "Closing Style", &self.signature_closers);
        push_section(
            &mut prompt,
            "Risk Detection and Diffusion",
            &self.risk_handling,
        );

        if !self.designers.allowed.is_empty() || !self.designers.denied.is_empty() {
            prompt.push_str("\nDesigner Knowledge Guardrails:\n");
            if !self.designers.allowed.is_empty() {
                prompt.push_str("\nDesigners Carried:\n");
                prompt.push_str(&bullet_list(&self.designers.allowed));
            }
            if !self.designers.denied.is_empty() {
                prompt.push_str("\nDesigners NOT Carried:\n");
                prompt.push_str(&bullet_list(&self.designers.denied));
            }
            prompt.push_str("\nResponse Policy:\n");
            prompt.push_str(&self.designers.response_policy);
            prompt.push('\n');
        }

        let store_lines: Vec<String> = [
            ("Location", &self.store.location),
            ("Website", &self.store.website),
            ("Appointment Link", &self.store.appointment_link),
            ("Featured Event", &self.store.featured_event),
        ]
        .iter()
        .filter_map(|(label, value)| value.as_ref().map(|v| format!("• {label}: {v}")))
        .collect();
        if !store_lines.is_empty() {
            prompt.push_str("\nStore Profile:\n");
            prompt.push_str(&store_lines.join("\n"));
            prompt.push('\n');
        }

        if let Some(tagline) = &self.tagline {
            prompt.push_str(&format!("\nTagline: {tagline}\n"));
        }
        if let Some(human_prompt) = &self.human_prompt {
            prompt.push_str(&format!("\nIMPORTANT INSTRUCTION:\n{human_prompt}\n"));
        }

        prompt
    }
}

fn push_section(prompt: &mut String, title: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    prompt.push_str(&format!("\n{title}:\n"));
    prompt.push_str(&lines.join("\n"));
    prompt.push('\n');
}

fn bullet_list(items: &[String]) -> String {
    let mut sorted: Vec<&String> = items.iter().collect();
    sorted.sort();
    sorted
        .iter()
        .map(|item| format!("• {item}\n"))
        .collect::<Vec<_>>()
        .join("")
}
