//! `requirement` stage: prompt in, requirement record out

use chrono::Utc;
use tcgen_clients::Collaborators;
use tcgen_utils::error::{LedgerError, StageError};
use tcgen_utils::ids;
use tcgen_utils::types::Requirement;
use tracing::{info, warn};

pub struct RequirementInput {
    pub prompt: String,
    pub source_repo: Option<String>,
}

fn build_prompt(prompt: &str) -> String {
    format!(
        "Rewrite the following request as a single, testable software requirement statement.\n\
         \n\
         Request: {prompt}\n\
         \n\
         Respond with the requirement text only."
    )
}

/// Create a new requirement. Every invocation mints a fresh `req_id`; this
/// stage is intentionally not idempotent.
pub async fn run(
    collab: &Collaborators,
    input: RequirementInput,
) -> Result<Requirement, StageError> {
    let generated = collab.generator.generate(&build_prompt(&input.prompt)).await?;

    let requirement_text = if generated.trim().is_empty() {
        // Success-shaped but empty output: fall back to the prompt itself
        // so the pipeline can still advance.
        warn!("generator returned empty requirement text, using the prompt verbatim");
        input.prompt.clone()
    } else {
        generated.trim().to_string()
    };

    let requirement = Requirement {
        req_id: ids::new_req_id(),
        prompt: input.prompt,
        requirement_text,
        source_repo: input.source_repo,
        created_at: Utc::now(),
    };

    let row = serde_json::to_value(&requirement).map_err(LedgerError::from)?;
    collab.ledger.insert("requirements", vec![row]).await?;

    info!(req_id = %requirement.req_id, "requirement recorded");
    Ok(requirement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tcgen_clients::memory::{MemoryLedger, MemoryStore, MemoryTicketing, StaticGenerator};

    fn collab(generator: StaticGenerator) -> (Arc<MemoryLedger>, Collaborators) {
        let ledger = Arc::new(MemoryLedger::new());
        let c = Collaborators::new(
            Arc::new(generator),
            ledger.clone(),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryTicketing::new()),
        );
        (ledger, c)
    }

    #[tokio::test]
    async fn mints_req_id_and_persists_row() {
        let (ledger, collab) = collab(StaticGenerator::new(["The pump shall alarm."]));
        let requirement = run(
            &collab,
            RequirementInput {
                prompt: "alarm on deviation".to_string(),
                source_repo: Some("repo-a".to_string()),
            },
        )
        .await
        .unwrap();

        assert!(tcgen_utils::ids::REQ_ID_RE.is_match(&requirement.req_id));
        assert_eq!(requirement.requirement_text, "The pump shall alarm.");

        let rows = ledger.rows("requirements").await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["req_id"], requirement.req_id.as_str());
    }

    #[tokio::test]
    async fn empty_generation_echoes_prompt() {
        let (_ledger, collab) = collab(StaticGenerator::new(Vec::<String>::new()));
        let requirement = run(
            &collab,
            RequirementInput {
                prompt: "alarm on deviation".to_string(),
                source_repo: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(requirement.requirement_text, "alarm on deviation");
    }

    #[tokio::test]
    async fn generator_failure_surfaces() {
        let (ledger, collab) = collab(StaticGenerator::failing());
        let err = run(
            &collab,
            RequirementInput {
                prompt: "p".to_string(),
                source_repo: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StageError::Generator(_)));
        assert_eq!(ledger.total_rows().await, 0);
    }

    #[tokio::test]
    async fn two_invocations_create_distinct_requirements() {
        let (ledger, collab) = collab(StaticGenerator::new(["a", "b"]));
        let first = run(
            &collab,
            RequirementInput {
                prompt: "p".to_string(),
                source_repo: None,
            },
        )
        .await
        .unwrap();
        let second = run(
            &collab,
            RequirementInput {
                prompt: "p".to_string(),
                source_repo: None,
            },
        )
        .await
        .unwrap();

        assert_ne!(first.req_id, second.req_id);
        assert_eq!(ledger.rows("requirements").await.len(), 2);
    }
}
