//! Tests for the persona schema defaults and system prompt rendering.

use jewelrybox::prompts::PersonaConfig;
use std::fs;
use tempfile::tempdir;

const MINIMAL: &str = r#"{"identity": "Jewel", "role": "the consultant", "tone": "warm"}"#;

#[test]
fn minimal_persona_renders_without_placeholder_sections() {
    let persona: PersonaConfig = serde_json::from_str(MINIMAL).unwrap();
    let prompt = persona.render_system_prompt();

    assert!(prompt.starts_with("You are Jewel, serving as the consultant."));
    assert!(prompt.contains("Tone: warm"));
    // Absent optional sections leave no headings behind.
    assert!(!prompt.contains("Domains of Expertise"));
    assert!(!prompt.contains("Designer Knowledge Guardrails"));
    assert!(!prompt.contains("Tagline:"));
}

#[test]
fn missing_optional_fields_resolve_to_documented_defaults() {
    let persona: PersonaConfig = serde_json::from_str(MINIMAL).unwrap();
    assert_eq!(
        persona.designers.response_policy,
        "If unsure, ask the user clarifying questions."
    );
    assert!(persona.designers.allowed.is_empty());
    assert!(persona.store.location.is_none());
}

#[test]
fn designer_guardrails_render_sorted_bullets() {
    let persona: PersonaConfig = serde_json::from_str(
        r#"{
            "identity": "Jewel",
            "role": "the consultant",
            "tone": "warm",
            "tagline": "Where every stone has a story.",
            "designers": {
                "allowed": ["Roman + Jules", "Benchmark"],
                "denied": ["Cartier"]
            },
            "store": {"website": "https://x.example"}
        }"#,
    )
    .unwrap();
    let prompt = persona.render_system_prompt();

    let benchmark = prompt.find("• Benchmark").unwrap();
    let roman = prompt.find("• Roman + Jules").unwrap();
    assert!(benchmark < roman);
    assert!(prompt.contains("Designers NOT Carried:\n• Cartier"));
    assert!(prompt.contains("• Website: https://x.example"));
    assert!(prompt.contains("Tagline: Where every stone has a story."));
}

#[test]
fn missing_persona_file_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(PersonaConfig::from_file(dir.path().join("persona.json")).is_err());
}

#[test]
fn persona_file_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("persona.json");
    fs::write(&path, MINIMAL).unwrap();
    let persona = PersonaConfig::from_file(&path).unwrap();
    assert_eq!(persona.identity, "Jewel");
}
