// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use yare::parameterized;

fn def(id: u64, path: &str, name: &str) -> PipelineDefinition {
    PipelineDefinition {
        id,
        name: name.to_string(),
        path: path.to_string(),
    }
}

#[test]
fn selector_requires_exactly_one_input() {
    assert_eq!(
        PipelineSelector::from_options(Some("CI".into()), Some(4)),
        Err(SelectorError::Both)
    );
    assert_eq!(
        PipelineSelector::from_options(None, None),
        Err(SelectorError::Neither)
    );
    assert_eq!(
        PipelineSelector::from_options(Some("CI".into()), None),
        Ok(PipelineSelector::Name("CI".into()))
    );
    assert_eq!(
        PipelineSelector::from_options(None, Some(4)),
        Ok(PipelineSelector::Id(4))
    );
}

#[test]
fn blank_pipeline_name_counts_as_absent() {
    assert_eq!(
        PipelineSelector::from_options(Some("  ".into()), None),
        Err(SelectorError::Neither)
    );
}

#[parameterized(
    bare = { "main", "main" },
    qualified = { "refs/heads/main", "main" },
    nested = { "refs/heads/release/1.0", "release/1.0" },
)]
fn branch_normalization(input: &str, expected: &str) {
    assert_eq!(normalize_branch(input), expected);
    assert_eq!(branch_ref(input), format!("refs/heads/{}", expected));
}

#[parameterized(
    bare = { "CI", "\\CI" },
    rooted = { "\\CI", "\\CI" },
    folder = { "Services\\Finance\\CI", "\\Services\\Finance\\CI" },
    forward_slashes = { "/Services/CI/", "\\Services\\CI" },
    doubled = { "\\\\Services\\\\CI", "\\Services\\CI" },
)]
fn pipeline_path_normalization(input: &str, expected: &str) {
    assert_eq!(normalize_pipeline_path(input), expected);
}

#[test]
fn definition_path_collapses_root_folder() {
    assert_eq!(definition_path("\\", "CI"), "\\CI");
    assert_eq!(definition_path("\\Services\\", "CI"), "\\Services\\CI");
}

#[test]
fn index_resolves_by_path_case_insensitively() {
    let index = PipelineIndex::new(vec![
        def(1, "\\", "CI"),
        def(2, "\\Services", "Deploy"),
    ]);
    assert_eq!(index.resolve("\\services\\deploy"), Some(2));
    assert_eq!(index.resolve("ci"), Some(1));
    assert_eq!(index.len(), 2);
}

#[test]
fn index_resolves_unique_bare_name_in_folder() {
    let index = PipelineIndex::new(vec![def(7, "\\Services\\Finance", "Nightly")]);
    assert_eq!(index.resolve("Nightly"), Some(7));
}

#[test]
fn index_rejects_ambiguous_bare_name() {
    let index = PipelineIndex::new(vec![
        def(1, "\\A", "Nightly"),
        def(2, "\\B", "Nightly"),
    ]);
    assert_eq!(index.resolve("Nightly"), None);
    assert_eq!(index.resolve("\\B\\Nightly"), Some(2));
}

#[test]
fn index_keeps_first_of_duplicate_paths() {
    let index = PipelineIndex::new(vec![def(1, "\\", "CI"), def(2, "\\", "ci")]);
    assert_eq!(index.resolve("\\CI"), Some(1));
}

#[test]
fn definition_url_uses_base_url() {
    let scope = PipelineScope::new("contoso", "payments");
    assert_eq!(
        scope.definition_url("https://dev.azure.com/", 42),
        "https://dev.azure.com/contoso/payments/_build/definition?definitionId=42"
    );
}

#[test]
fn binding_settings_preserve_triggers_verbatim() {
    let triggers = json!([{ "triggerType": "continuousIntegration", "branchFilters": ["+main"] }]);
    let binding = PipelineBinding::from_parts(
        PipelineRepository {
            repo_name: "payments".into(),
            repo_id: Some("abc".into()),
            default_branch: "refs/heads/main".into(),
            clean: Some("true".into()),
            checkout_submodules: None,
        },
        Some(triggers.clone()),
    );
    let settings = binding.settings();
    assert_eq!(settings.triggers, Some(triggers));
    assert_eq!(settings.checkout_submodules, None);
    assert_eq!(binding.branch_ref(), "refs/heads/main");
}

#[test]
fn build_status_finished_only_with_result() {
    assert!(!BuildStatus::default().is_finished());
    assert!(!BuildStatus {
        result: Some(String::new()),
        ..Default::default()
    }
    .is_finished());
    assert!(BuildStatus {
        result: Some("succeeded".into()),
        ..Default::default()
    }
    .is_finished());
}
