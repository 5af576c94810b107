//! `lookup` command: resolve entities and print results.

use crate::error::CommandError;
use crate::state::AppState;
use anyhow::Context;
use sharescope_core::Entity;
use sharescope_lookup::Integration;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Inputs of one `lookup` invocation.
#[derive(Debug, Default)]
pub struct LookupRequest {
    /// Raw values to classify
    pub values: Vec<String>,
    /// JSON file with tagged entities
    pub entities_file: Option<PathBuf>,
    /// Subsite override
    pub subsite: Option<String>,
    /// Exact-match search
    pub exact: bool,
}

pub async fn run(state: &AppState, request: LookupRequest) -> Result<ExitCode, CommandError> {
    let mut options = state.config.integration.clone();
    if let Some(subsite) = request.subsite.clone() {
        options.subsite = subsite;
    }
    options.direct_search = request.exact;

    let errors = Integration::validate_options(&options);
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let entities = collect_entities(&request)?;
    if entities.is_empty() {
        return Err(CommandError::new(
            "INVALID_INPUT",
            "Provide at least one value or --entities file",
        ));
    }

    let results = state.integration.do_lookup(&entities, &options).await?;
    let output = serde_json::to_string_pretty(&results)
        .map_err(|e| CommandError::new("SERIALIZATION_ERROR", e.to_string()))?;
    println!("{output}");

    Ok(ExitCode::SUCCESS)
}

fn collect_entities(request: &LookupRequest) -> anyhow::Result<Vec<Entity>> {
    let mut entities = match &request.entities_file {
        Some(path) => read_entities(path)?,
        None => Vec::new(),
    };

    entities.extend(
        request
            .values
            .iter()
            .filter(|value| !value.trim().is_empty())
            .map(|value| Entity::classify(value)),
    );
    Ok(entities)
}

fn read_entities(path: &Path) -> anyhow::Result<Vec<Entity>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read entities file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("invalid entities JSON in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharescope_core::EntityType;
    use tempfile::TempDir;

    #[test]
    fn test_collect_from_values() {
        let request = LookupRequest {
            values: vec!["8.8.8.8".to_string(), " ".to_string(), "a@b.io".to_string()],
            ..LookupRequest::default()
        };
        let entities = collect_entities(&request).expect("collect");
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].entity_type, EntityType::Ip);
        assert_eq!(entities[1].entity_type, EntityType::Email);
    }

    #[test]
    fn test_collect_from_file_then_values() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("entities.json");
        std::fs::write(
            &path,
            r#"[{"value":"intranet.example","type":"domain","isDomain":true}]"#,
        )
        .expect("write entities");

        let request = LookupRequest {
            values: vec!["report".to_string()],
            entities_file: Some(path),
            ..LookupRequest::default()
        };
        let entities = collect_entities(&request).expect("collect");
        assert_eq!(entities.len(), 2);
        assert!(entities[0].is_domain);
        assert_eq!(entities[1].entity_type, EntityType::String);
    }

    #[test]
    fn test_invalid_entities_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("entities.json");
        std::fs::write(&path, "not json").expect("write entities");

        let err = read_entities(&path).expect_err("invalid JSON");
        assert!(format!("{err:#}").contains("invalid entities JSON"));
    }
}
