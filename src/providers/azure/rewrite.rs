use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SnapshotError};

/// One substitution applied to a serialized definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RewriteRule {
    pub from: String,
    #[serde(default)]
    pub to: String,
    /// Treat `from` as a regular expression instead of a literal.
    #[serde(default)]
    pub pattern: bool,
}

impl RewriteRule {
    pub fn literal(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            pattern: false,
        }
    }

    /// Parses `FROM=TO` as given on the command line. Splits on the first `=`.
    pub fn parse_cli(value: &str) -> std::result::Result<Self, String> {
        let (from, to) = value
            .split_once('=')
            .ok_or_else(|| format!("expected FROM=TO, got '{value}'"))?;

        if from.is_empty() {
            return Err("the FROM side of a replacement cannot be empty".to_string());
        }

        Ok(Self::literal(from, to))
    }
}

enum Step {
    Literal { from: String, to: String },
    Pattern { regex: Regex, to: String },
}

/// Text-level rewriter for definition documents.
///
/// Rules run in order over the raw serialized text, so every occurrence is
/// replaced, including ones outside the fields they were written for.
pub struct Rewriter {
    steps: Vec<Step>,
}

impl Rewriter {
    pub fn new(rules: &[RewriteRule]) -> Result<Self> {
        let mut steps = Vec::with_capacity(rules.len());

        for rule in rules {
            if rule.from.is_empty() {
                debug!("Ignoring rewrite rule with empty source");
                continue;
            }

            let step = if rule.pattern {
                Step::Pattern {
                    regex: Regex::new(&rule.from).map_err(SnapshotError::from)?,
                    to: rule.to.clone(),
                }
            } else {
                Step::Literal {
                    from: rule.from.clone(),
                    to: rule.to.clone(),
                }
            };
            steps.push(step);
        }

        Ok(Self { steps })
    }

    pub fn apply(&self, text: &str) -> String {
        self.steps
            .iter()
            .fold(text.to_owned(), |current, step| match step {
                Step::Literal { from, to } => current.replace(from.as_str(), to),
                Step::Pattern { regex, to } => regex.replace_all(&current, to.as_str()).into_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT_FRAGMENT: &str =
        "https://contoso.visualstudio.com/_apis/projects/7f6695b5-d23e-4e0e-91eb-567124a01d80";

    #[test]
    fn test_rewrites_name_and_strips_project_fragment() {
        let input = format!(
            r#"{{"name":"testken-ASP.NET Core-CI","project":{{"url":"{PROJECT_FRAGMENT}"}},"queue":"default"}}"#
        );
        let rewriter = Rewriter::new(&[
            RewriteRule::literal("testken-ASP.NET Core-CI", "newpipeline"),
            RewriteRule::literal(PROJECT_FRAGMENT, ""),
        ])
        .unwrap();

        assert_eq!(
            rewriter.apply(&input),
            r#"{"name":"newpipeline","project":{"url":""},"queue":"default"}"#
        );
    }

    #[test]
    fn test_coincidental_matches_are_rewritten_too() {
        let input = r#"{"name":"ci","description":"copy of ci pipeline"}"#;
        let rewriter = Rewriter::new(&[RewriteRule::literal("ci", "newpipeline")]).unwrap();

        assert_eq!(
            rewriter.apply(input),
            r#"{"name":"newpipeline","description":"copy of newpipeline pipeline"}"#
        );
    }

    #[test]
    fn test_pattern_rules() {
        let rewriter = Rewriter::new(&[RewriteRule {
            from: r"https://[a-z]+\.visualstudio\.com/[0-9a-f-]{36}/_apis/".to_string(),
            to: String::new(),
            pattern: true,
        }])
        .unwrap();

        let input = r#""url":"https://contoso.visualstudio.com/7f6695b5-d23e-4e0e-91eb-567124a01d80/_apis/build""#;
        assert_eq!(rewriter.apply(input), r#""url":"build""#);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let result = Rewriter::new(&[RewriteRule {
            from: "(".to_string(),
            to: String::new(),
            pattern: true,
        }]);

        assert!(matches!(result, Err(SnapshotError::InvalidPattern(_))));
    }

    #[test]
    fn test_empty_source_rules_are_ignored() {
        let rewriter = Rewriter::new(&[RewriteRule::literal("", "x")]).unwrap();
        assert_eq!(rewriter.apply("abc"), "abc");
    }

    #[test]
    fn test_rules_apply_in_order() {
        let rewriter = Rewriter::new(&[
            RewriteRule::literal("a", "b"),
            RewriteRule::literal("b", "c"),
        ])
        .unwrap();

        assert_eq!(rewriter.apply("ab"), "cc");
    }

    #[test]
    fn test_parse_cli() {
        assert_eq!(
            RewriteRule::parse_cli("old=new=er").unwrap(),
            RewriteRule::literal("old", "new=er")
        );
        assert_eq!(
            RewriteRule::parse_cli("strip=").unwrap(),
            RewriteRule::literal("strip", "")
        );
        assert!(RewriteRule::parse_cli("no-separator").is_err());
        assert!(RewriteRule::parse_cli("=x").is_err());
    }
}
