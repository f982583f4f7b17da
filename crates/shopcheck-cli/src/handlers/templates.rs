//! `templates` command handlers

use crate::commands::{CheckArgs, FormatArg, ListArgs, RegistrySource, ShowArgs};
use crate::error::{CliError, CliResult};
use crate::output::Reporter;
use serde::Serialize;
use shopcheck::{TemplateKind, TemplateRegistry};
use std::collections::BTreeMap;
use std::path::Path;

/// One row of `templates list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateEntry {
    /// Registry name
    pub name: String,
    /// Configured template name
    pub template_name: String,
}

/// Builtins (unless disabled) with the optional registry file merged on top
pub fn load_registry(source: &RegistrySource) -> CliResult<TemplateRegistry> {
    if source.no_builtins && source.registry.is_none() {
        return Err(CliError::invalid_argument(
            "--no-builtins needs --registry <FILE>, otherwise there is nothing to load",
        ));
    }
    let mut registry = if source.no_builtins {
        TemplateRegistry::new()
    } else {
        TemplateRegistry::with_builtins()
    };
    if let Some(path) = &source.registry {
        let _ = registry.merge_file(path)?;
    }
    Ok(registry)
}

/// Registered entries by kind, optionally restricted to one kind
pub fn list_entries(
    registry: &TemplateRegistry,
    kind: Option<TemplateKind>,
) -> CliResult<BTreeMap<TemplateKind, Vec<TemplateEntry>>> {
    let kinds = kind.map_or_else(|| TemplateKind::ALL.to_vec(), |k| vec![k]);
    let mut entries = BTreeMap::new();
    for kind in kinds {
        let mut rows = Vec::new();
        for name in registry.available_templates(kind) {
            let config = registry.template_config(kind, name)?;
            rows.push(TemplateEntry {
                name: name.to_string(),
                template_name: config.base().template_name.clone(),
            });
        }
        let _ = entries.insert(kind, rows);
    }
    Ok(entries)
}

/// Render `templates list` output
pub fn render_list(
    entries: &BTreeMap<TemplateKind, Vec<TemplateEntry>>,
    format: FormatArg,
) -> CliResult<String> {
    Ok(match format {
        FormatArg::Json => serde_json::to_string_pretty(entries)?,
        FormatArg::Yaml => serde_yaml_ng::to_string(entries).map_err(shopcheck::TemplateError::from)?,
        FormatArg::Text => {
            let mut out = String::new();
            for (kind, rows) in entries {
                out.push_str(&format!("{kind} templates ({})\n", rows.len()));
                let width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0);
                for row in rows {
                    out.push_str(&format!("  {:<width$}  {}\n", row.name, row.template_name));
                }
            }
            out
        }
    })
}

/// Render one config
pub fn render_show(registry: &TemplateRegistry, args: &ShowArgs) -> CliResult<String> {
    let config = registry.template_config(args.kind.into(), &args.name)?;
    Ok(match args.format {
        FormatArg::Json => config.to_json()?,
        FormatArg::Yaml | FormatArg::Text => config.to_yaml()?,
    })
}

/// Load and validate a registry file, returning a one-line summary
pub fn check_file(path: &Path) -> CliResult<String> {
    let registry = TemplateRegistry::load_file(path)?;
    let counts: Vec<String> = TemplateKind::ALL
        .iter()
        .map(|&kind| format!("{kind}: {}", registry.available_templates(kind).len()))
        .collect();
    Ok(format!(
        "{}: {} templates valid ({})",
        path.display(),
        registry.len(),
        counts.join(", ")
    ))
}

/// Execute `templates list`
pub fn execute_list(reporter: &Reporter, args: &ListArgs) -> CliResult<()> {
    let registry = load_registry(&args.source)?;
    let entries = list_entries(&registry, args.kind.map(Into::into))?;
    let rendered = render_list(&entries, args.format)?;
    reporter.line(rendered.trim_end());
    Ok(())
}

/// Execute `templates show`
pub fn execute_show(reporter: &Reporter, args: &ShowArgs) -> CliResult<()> {
    let registry = load_registry(&args.source)?;
    reporter.line(render_show(&registry, args)?.trim_end());
    Ok(())
}

/// Execute `templates check`
pub fn execute_check(reporter: &Reporter, args: &CheckArgs) -> CliResult<()> {
    let summary = check_file(&args.file)?;
    reporter.success(&summary);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::KindArg;
    use std::fs;
    use tempfile::TempDir;

    const EXTRA: &str = r##"
modals:
  cart:
    template_name: cart-modal
    modal_selector: "#cartModal"
"##;

    fn write(dir: &TempDir, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn test_builtins_by_default() {
            let registry = load_registry(&RegistrySource::default()).unwrap();
            assert_eq!(registry.len(), 6);
        }

        #[test]
        fn test_file_merged_over_builtins() {
            let dir = TempDir::new().unwrap();
            let source = RegistrySource {
                registry: Some(write(&dir, "extra.yaml", EXTRA)),
                no_builtins: false,
            };
            let registry = load_registry(&source).unwrap();
            assert_eq!(registry.len(), 7);
        }

        #[test]
        fn test_no_builtins() {
            let dir = TempDir::new().unwrap();
            let source = RegistrySource {
                registry: Some(write(&dir, "extra.yaml", EXTRA)),
                no_builtins: true,
            };
            let registry = load_registry(&source).unwrap();
            assert_eq!(registry.available_templates(TemplateKind::Modal), vec!["cart"]);
            assert_eq!(registry.len(), 1);
        }

        #[test]
        fn test_no_builtins_without_file() {
            let source = RegistrySource {
                registry: None,
                no_builtins: true,
            };
            let err = load_registry(&source).unwrap_err();
            assert!(matches!(err, CliError::InvalidArgument { .. }));
        }
    }

    mod render_tests {
        use super::*;

        #[test]
        fn test_text_list() {
            let registry = TemplateRegistry::with_builtins();
            let entries = list_entries(&registry, Some(TemplateKind::Form)).unwrap();
            let text = render_list(&entries, FormatArg::Text).unwrap();
            assert!(text.starts_with("form templates (3)\n"));
            assert!(text.contains("  signup          signup-form\n"));
            assert!(!text.contains("modal"));
        }

        #[test]
        fn test_json_list() {
            let registry = TemplateRegistry::with_builtins();
            let entries = list_entries(&registry, None).unwrap();
            let json: serde_json::Value =
                serde_json::from_str(&render_list(&entries, FormatArg::Json).unwrap()).unwrap();
            assert_eq!(json["list"][0]["name"], "products");
            assert_eq!(json["modal"].as_array().unwrap().len(), 2);
        }

        #[test]
        fn test_show_json() {
            let registry = TemplateRegistry::with_builtins();
            let args = ShowArgs {
                kind: KindArg::Modal,
                name: "alert".to_string(),
                format: FormatArg::Json,
                source: RegistrySource::default(),
            };
            let json: serde_json::Value =
                serde_json::from_str(&render_show(&registry, &args).unwrap()).unwrap();
            assert_eq!(json["template_name"], "alert-modal");
        }

        #[test]
        fn test_show_missing() {
            let registry = TemplateRegistry::with_builtins();
            let args = ShowArgs {
                kind: KindArg::List,
                name: "orders".to_string(),
                format: FormatArg::Yaml,
                source: RegistrySource::default(),
            };
            let err = render_show(&registry, &args).unwrap_err();
            assert!(err.to_string().contains("Available templates: products"));
        }
    }

    mod check_tests {
        use super::*;

        #[test]
        fn test_check_valid() {
            let dir = TempDir::new().unwrap();
            let summary = check_file(&write(&dir, "ok.yaml", EXTRA)).unwrap();
            assert!(summary.contains("1 templates valid"));
            assert!(summary.contains("modal: 1"));
        }

        #[test]
        fn test_check_rejects_unknown_field_type() {
            let dir = TempDir::new().unwrap();
            let bad = r##"
forms:
  broken:
    template_name: broken-form
    submit_button: "#go"
    fields:
      - { name: when, selector: "#when", type: datepicker }
"##;
            assert!(check_file(&write(&dir, "bad.yaml", bad)).is_err());
        }
    }
}
