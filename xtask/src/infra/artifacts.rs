//! Synthesized artifact files (Functional Core).

use todosearch_core::stack::Stack;

use super::error::Result;

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: &'static str,
    pub contents: String,
}

/// Every file `synth` writes, in a fixed order.
pub fn synth_artifacts(stack: &Stack) -> Result<Vec<Artifact>> {
    Ok(vec![
        Artifact {
            file_name: "template.json",
            contents: stack.to_template()?,
        },
        Artifact {
            file_name: "pipeline-role-policy.json",
            contents: stack.role.policy.to_json()?,
        },
        Artifact {
            file_name: "pipeline-role-trust.json",
            contents: serde_json::to_string_pretty(&stack.role.assume_role_policy())?,
        },
        Artifact {
            file_name: "pipeline.yaml",
            contents: stack.pipeline_body.clone(),
        },
        Artifact {
            file_name: "schema.graphql",
            contents: stack.graphql_schema.clone(),
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use todosearch_core::stack::{build_stack, StackInputs};

    fn stack() -> Stack {
        build_stack(&StackInputs::todo(
            "todoapp",
            "us-east-1",
            "123456789012",
            "todoapp-exports",
        ))
        .unwrap()
    }

    #[test]
    fn test_artifact_names() {
        let names: Vec<_> = synth_artifacts(&stack())
            .unwrap()
            .iter()
            .map(|a| a.file_name)
            .collect();
        assert_eq!(
            names,
            vec![
                "template.json",
                "pipeline-role-policy.json",
                "pipeline-role-trust.json",
                "pipeline.yaml",
                "schema.graphql"
            ]
        );
    }

    #[test]
    fn test_synth_is_reproducible() {
        assert_eq!(
            synth_artifacts(&stack()).unwrap(),
            synth_artifacts(&stack()).unwrap()
        );
    }

    #[test]
    fn test_policy_artifact_parses() {
        let artifacts = synth_artifacts(&stack()).unwrap();
        let policy: serde_json::Value = serde_json::from_str(&artifacts[1].contents).unwrap();
        assert_eq!(policy["Version"], "2012-10-17");
        assert_eq!(policy["Statement"].as_array().unwrap().len(), 5);
    }
}
