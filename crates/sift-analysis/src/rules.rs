//! Rule descriptors for reported findings.

use sift_core::types::collections::FxHashMap;
use sift_core::types::findings::{Finding, Severity, Span};

/// Descriptor of one diagnostic rule.
#[derive(Debug, Clone)]
pub struct RuleDescriptor {
    pub id: String,
    /// Message template with positional `{0}`, `{1}` placeholders.
    pub title: String,
    pub severity: Severity,
    pub cwe: Option<u32>,
}

/// Lookup from rule id to descriptor. Read-only during analysis.
#[derive(Debug, Default)]
pub struct RuleCatalog {
    rules: FxHashMap<String, RuleDescriptor>,
}

impl RuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog covering every rule the built-in behavior table and
    /// extensions reference.
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        for (id, title, cwe) in DEFAULT_RULES {
            catalog.register(RuleDescriptor {
                id: (*id).to_string(),
                title: (*title).to_string(),
                severity: Severity::Warning,
                cwe: Some(*cwe),
            });
        }
        catalog
    }

    pub fn register(&mut self, descriptor: RuleDescriptor) {
        self.rules.insert(descriptor.id.clone(), descriptor);
    }

    pub fn get(&self, id: &str) -> Option<&RuleDescriptor> {
        self.rules.get(id)
    }

    /// Build a finding for `rule_id`. Unregistered ids fall back to a
    /// warning-severity descriptor whose message is the id itself.
    pub fn finding(&self, rule_id: &str, file: &str, span: Span, args: &[&str]) -> Finding {
        match self.rules.get(rule_id) {
            Some(descriptor) => Finding {
                rule_id: descriptor.id.clone(),
                file: file.to_string(),
                span,
                message: render_template(&descriptor.title, args),
                severity: descriptor.severity,
                cwe: descriptor.cwe,
            },
            None => Finding {
                rule_id: rule_id.to_string(),
                file: file.to_string(),
                span,
                message: rule_id.to_string(),
                severity: Severity::Warning,
                cwe: None,
            },
        }
    }
}

/// Substitute positional `{N}` placeholders.
fn render_template(template: &str, args: &[&str]) -> String {
    let mut message = template.to_string();
    for (index, arg) in args.iter().enumerate() {
        message = message.replace(&format!("{{{index}}}"), arg);
    }
    message
}

const DEFAULT_RULES: &[(&str, &str, u32)] = &[
    ("SCS0001", "Potential command injection with user-controlled input", 78),
    ("SCS0002", "Potential SQL injection with user-controlled query text", 89),
    ("SCS0003", "Potential XPath injection with user-controlled input", 643),
    ("SCS0008", "The cookie is missing the Secure flag", 614),
    ("SCS0009", "The cookie is missing the HttpOnly flag", 1004),
    ("SCS0015", "Hardcoded password detected", 259),
    ("SCS0018", "Potential path traversal with user-controlled file path", 22),
    ("SCS0025", "Potential SQL injection in ODBC command text", 89),
    ("SCS0026", "Potential SQL injection in OLE DB command text", 89),
    ("SCS0027", "Potential open redirect with user-controlled URL", 601),
    ("SCS0029", "Potential XSS: unencoded value written to the response", 79),
    ("SCS0031", "Potential LDAP injection with user-controlled filter", 90),
    ("SCS0032", "The RequiredLength property of PasswordValidator should be at least {0}", 521),
    ("SCS0033", "Less than {0} properties set on the PasswordValidator instance", 521),
    ("SCS0034", "The {0} property must be set on the PasswordValidator instance", 521),
    ("SCS0035", "Potential SQL injection in Entity Framework raw query", 89),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_substitution() {
        assert_eq!(render_template("need {0} of {1}", &["3", "4"]), "need 3 of 4");
        assert_eq!(render_template("no placeholders", &["x"]), "no placeholders");
    }

    #[test]
    fn unknown_rule_falls_back() {
        let catalog = RuleCatalog::with_defaults();
        let finding = catalog.finding("CUSTOM01", "a.cs", Span::point(1, 0), &[]);
        assert_eq!(finding.rule_id, "CUSTOM01");
        assert_eq!(finding.message, "CUSTOM01");
        assert_eq!(finding.severity, Severity::Warning);
    }

    #[test]
    fn defaults_cover_behavior_rules() {
        let catalog = RuleCatalog::with_defaults();
        for id in ["SCS0001", "SCS0002", "SCS0015", "SCS0026", "SCS0032"] {
            assert!(catalog.get(id).is_some(), "{id} missing");
        }
        assert_eq!(catalog.get("SCS0002").unwrap().cwe, Some(89));
    }
}
