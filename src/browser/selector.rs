//! Element selectors and their in-page JavaScript.

use std::fmt;

/// How to find an element on the page.
///
/// Rendered with `Display` in the `kind=value` form used in logs, e.g.
/// `id=okta-signin-submit` or `role=menuitem[name="Run"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    Id(String),
    XPath(String),
    Css(String),
    /// ARIA role plus accessible name; `exact` compares the whole name
    /// case-sensitively, otherwise a case-insensitive substring match.
    Role {
        role: String,
        name: String,
        exact: bool,
    },
}

impl Selector {
    pub fn id(id: impl Into<String>) -> Self {
        Selector::Id(id.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Selector::XPath(expr.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Selector::Css(selector.into())
    }

    pub fn role(role: impl Into<String>, name: impl Into<String>, exact: bool) -> Self {
        Selector::Role {
            role: role.into(),
            name: name.into(),
            exact,
        }
    }

    /// JavaScript expression evaluating to the first matching element, or null.
    pub fn to_js(&self) -> String {
        match self {
            Selector::Id(id) => format!("document.getElementById({})", js_str(id)),
            Selector::Css(css) => format!("document.querySelector({})", js_str(css)),
            Selector::XPath(expr) => format!(
                "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                js_str(expr)
            ),
            Selector::Role { role, name, exact } => {
                format!(
                    "({})({}, {}, {})",
                    ROLE_LOOKUP_JS,
                    js_str(role),
                    js_str(name),
                    exact
                )
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Id(id) => write!(f, "id={}", id),
            Selector::XPath(expr) => write!(f, "xpath={}", expr),
            Selector::Css(css) => write!(f, "css={}", css),
            Selector::Role { role, name, exact } => {
                let flag = if *exact { "" } else { "i" };
                write!(f, "role={}[name={}{}]", role, js_str(name), flag)
            }
        }
    }
}

/// Quote `value` as a JavaScript string literal.
pub(crate) fn js_str(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

/// Quote `value` as an XPath 1.0 string literal. XPath has no escapes, so a
/// value containing both quote kinds is split into a `concat()`.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }

    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// Explicit `role` attributes first, then the common implicit roles. Visible
/// matches win over hidden ones.
const ROLE_LOOKUP_JS: &str = r##"function(role, name, exact) {
    const implicit = {
        button: "button, input[type=button], input[type=submit], input[type=reset]",
        link: "a[href]",
        heading: "h1, h2, h3, h4, h5, h6",
        textbox: "input:not([type]), input[type=text], input[type=email], input[type=password], textarea",
        checkbox: "input[type=checkbox]",
        menuitem: "",
        row: "tr",
        cell: "td"
    };
    let query = "[role=\"" + role + "\"]";
    if (implicit[role]) {
        query += ", " + implicit[role];
    }
    const normalize = s => (s || "").replace(/\s+/g, " ").trim();
    const accessibleName = el => {
        const label = el.getAttribute("aria-label");
        if (label) return normalize(label);
        const labelledBy = el.getAttribute("aria-labelledby");
        if (labelledBy) {
            const text = labelledBy.split(/\s+/)
                .map(id => document.getElementById(id))
                .filter(n => n)
                .map(n => n.textContent)
                .join(" ");
            if (normalize(text)) return normalize(text);
        }
        if (el.tagName === "INPUT") return normalize(el.value || el.getAttribute("title"));
        return normalize(el.innerText || el.textContent || el.getAttribute("title"));
    };
    const matches = el => {
        const n = accessibleName(el);
        return exact ? n === name : n.toLowerCase().includes(name.toLowerCase());
    };
    const isShown = el => {
        const rect = el.getBoundingClientRect();
        return rect.width > 0 && rect.height > 0;
    };
    const found = Array.from(document.querySelectorAll(query)).filter(matches);
    return found.find(isShown) || found[0] || null;
}"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        assert_eq!(Selector::id("okta-signin-submit").to_string(), "id=okta-signin-submit");
        assert_eq!(
            Selector::xpath("//h1[contains(.,'Processes')]").to_string(),
            "xpath=//h1[contains(.,'Processes')]"
        );
        assert_eq!(
            Selector::role("menuitem", "Run", true).to_string(),
            "role=menuitem[name=\"Run\"]"
        );
        assert_eq!(
            Selector::role("button", "run", false).to_string(),
            "role=button[name=\"run\"i]"
        );
    }

    #[test]
    fn test_js_quoting() {
        let js = Selector::xpath("//a[contains(.,\"x\")]").to_js();
        assert!(js.starts_with("document.evaluate(\"//a[contains(.,\\\"x\\\")]\""));

        let js = Selector::id("it's").to_js();
        assert_eq!(js, "document.getElementById(\"it's\")");
    }

    #[test]
    fn test_role_js_passes_arguments() {
        let js = Selector::role("menuitem", "Run", true).to_js();
        assert!(js.ends_with("(\"menuitem\", \"Run\", true)"));
    }

    #[test]
    fn test_xpath_literal() {
        assert_eq!(xpath_literal("Demo"), "'Demo'");
        assert_eq!(xpath_literal("Bob's run"), "\"Bob's run\"");
        assert_eq!(
            xpath_literal("say \"hi\" it's"),
            "concat('say \"hi\" it', \"'\", 's')"
        );
    }
}
