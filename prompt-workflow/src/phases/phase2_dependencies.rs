//! Phase 2: dependency context.

use serde_json::Value;
use std::collections::BTreeSet;

use crate::analysis::{Analysis, Dependency, DependencyType};
use crate::phases::base_context;
use crate::templates::Context;

pub const NAME: &str = "Dependencies";

fn dependency_lines<'a>(deps: impl Iterator<Item = &'a Dependency>) -> String {
    deps.map(|d| format!("- {} {} ({})", d.name, d.version, d.source.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Context for dependency templates, or `None` when no manifest declared any
pub fn build_context(analysis: &Analysis) -> Option<Context> {
    let deps = analysis.dependencies.as_ref().filter(|d| !d.is_empty())?;
    let mut context = base_context(analysis);

    let of_type = move |t: DependencyType| deps.iter().filter(move |d| d.dep_type == t);

    context.insert("dependency_count".to_string(), Value::from(deps.len()));
    context.insert(
        "dependency_list".to_string(),
        Value::String(dependency_lines(deps.iter())),
    );

    let groups = [
        ("runtime", DependencyType::Runtime, "runtime_dependencies"),
        ("dev", DependencyType::Development, "development_dependencies"),
        ("build", DependencyType::Build, "build_dependencies"),
    ];
    for (prefix, dep_type, list_key) in groups {
        let count = of_type(dep_type).count();
        context.insert(format!("{}_dependency_count", prefix), Value::from(count));
        if count > 0 {
            context.insert(
                list_key.to_string(),
                Value::String(dependency_lines(of_type(dep_type))),
            );
        }
    }

    let manifests: BTreeSet<String> = deps
        .iter()
        .map(|d| d.source.display().to_string())
        .collect();
    context.insert(
        "manifests".to_string(),
        Value::String(manifests.into_iter().collect::<Vec<_>>().join(", ")),
    );

    Some(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn dep(name: &str, dep_type: DependencyType, source: &str) -> Dependency {
        Dependency {
            name: name.to_string(),
            version: "1.0".to_string(),
            dep_type,
            source: PathBuf::from(source),
        }
    }

    #[test]
    fn test_groups_and_manifests() {
        let analysis = Analysis::new("/repo").with_dependencies(vec![
            dep("serde", DependencyType::Runtime, "Cargo.toml"),
            dep("tempfile", DependencyType::Development, "Cargo.toml"),
            dep("react", DependencyType::Runtime, "web/package.json"),
        ]);
        let context = build_context(&analysis).unwrap();

        assert_eq!(context["dependency_count"], 3);
        assert_eq!(context["runtime_dependency_count"], 2);
        assert_eq!(context["dev_dependency_count"], 1);
        assert_eq!(context["build_dependency_count"], 0);
        assert_eq!(context["manifests"], "Cargo.toml, web/package.json");
        assert_eq!(
            context["development_dependencies"],
            "- tempfile 1.0 (Cargo.toml)"
        );
        assert!(!context.contains_key("build_dependencies"));
    }

    #[test]
    fn test_empty_dependencies_have_no_context() {
        assert!(build_context(&Analysis::new("/repo").with_dependencies(vec![])).is_none());
        assert!(build_context(&Analysis::new("/repo")).is_none());
    }
}
