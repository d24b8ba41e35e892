//! Textual patches applied to the generated client source.
//!
//! The generator offers no structural hook, so every rule is a text rewrite.
//! Rules that find nothing leave the text untouched and report zero
//! applications; upstream renames show up as warnings, not failures.

use std::fmt;

use tracing::{debug, warn};

/// Import redirected to a local shim.
pub const ZODIOS_CORE_MODULE: &str = "@zodios/core";
/// Local module replacing [`ZODIOS_CORE_MODULE`].
pub const ZODIOS_SHIM_MODULE: &str = "./zodios-shim";
/// Generated schemas the live API returns extra fields for.
pub const PASSTHROUGH_SCHEMAS: [&str; 2] = ["microsoft_graph_plannerTask", "microsoft_graph_todoTask"];
/// Endpoint property holding the possible error responses.
pub const ERRORS_PROPERTY: &str = "errors";

const STRICT_CALL: &str = ".strict()";
const PASSTHROUGH_CALL: &str = ".passthrough()";

/// A single textual rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// `from "<from>"` → `from "<to>"` (either quote style).
    RedirectImport { from: String, to: String },
    /// Trailing `.strict()` of `const <schema> = ...;` → `.passthrough()`.
    Passthrough { schema: String },
    /// Remove every `<property>: [ ... ]` array literal, with its trailing comma.
    StripArrayProperty { property: String },
}

impl fmt::Display for Rewrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RedirectImport { from, to } => write!(f, "redirect import {} -> {}", from, to),
            Self::Passthrough { schema } => write!(f, "passthrough {}", schema),
            Self::StripArrayProperty { property } => write!(f, "strip {} arrays", property),
        }
    }
}

impl Rewrite {
    /// Apply to `text`, returning the new text and the number of edits.
    pub fn apply(&self, text: &str) -> (String, usize) {
        match self {
            Self::RedirectImport { from, to } => redirect_import(text, from, to),
            Self::Passthrough { schema } => relax_strict(text, schema),
            Self::StripArrayProperty { property } => strip_array_property(text, property),
        }
    }
}

/// How often a rule matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleReport {
    pub rule: String,
    pub applied: usize,
}

/// Ordered list of rewrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSet {
    rules: Vec<Rewrite>,
}

impl Default for PatchSet {
    /// The patches the generated Graph client needs.
    fn default() -> Self {
        let mut rules = vec![Rewrite::RedirectImport {
            from: ZODIOS_CORE_MODULE.to_string(),
            to: ZODIOS_SHIM_MODULE.to_string(),
        }];
        rules.extend(PASSTHROUGH_SCHEMAS.iter().map(|schema| Rewrite::Passthrough {
            schema: schema.to_string(),
        }));
        rules.push(Rewrite::StripArrayProperty {
            property: ERRORS_PROPERTY.to_string(),
        });
        Self { rules }
    }
}

impl PatchSet {
    pub fn new(rules: Vec<Rewrite>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rewrite] {
        &self.rules
    }

    /// Apply every rule in order.
    pub fn apply(&self, source: &str) -> (String, Vec<RuleReport>) {
        let mut text = source.to_string();
        let mut reports = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            let (patched, applied) = rule.apply(&text);
            if applied == 0 {
                warn!(rule = %rule, "Patch rule matched nothing, text left unchanged");
            } else {
                debug!(rule = %rule, applied, "Applied patch rule");
                text = patched;
            }
            reports.push(RuleReport {
                rule: rule.to_string(),
                applied,
            });
        }
        (text, reports)
    }
}

fn redirect_import(text: &str, from: &str, to: &str) -> (String, usize) {
    let mut out = text.to_string();
    let mut count = 0;
    for quote in ['"', '\''] {
        let needle = format!("from {quote}{from}{quote}");
        let hits = out.matches(needle.as_str()).count();
        if hits > 0 {
            out = out.replace(needle.as_str(), &format!("from {quote}{to}{quote}"));
            count += hits;
        }
    }
    (out, count)
}

fn relax_strict(text: &str, schema: &str) -> (String, usize) {
    let needle = format!("const {}", schema);
    let mut from = 0;
    while let Some(offset) = text[from..].find(&needle) {
        let start = from + offset;
        let after = start + needle.len();
        let bounded_before = start == 0 || !is_ident_byte(text.as_bytes()[start - 1]);
        let bounded_after = text[after..]
            .chars()
            .next()
            .is_some_and(|c| c.is_whitespace() || c == '=' || c == ':');
        if !(bounded_before && bounded_after) {
            from = after;
            continue;
        }

        let end = scan_code(text, after, |_, b, depth| b == b';' && depth == 0).unwrap_or(text.len());
        let statement = text[start..end].trim_end();
        return match statement.strip_suffix(STRICT_CALL) {
            Some(head) => {
                let cut = start + head.len();
                let mut out = String::with_capacity(text.len() + PASSTHROUGH_CALL.len());
                out.push_str(&text[..cut]);
                out.push_str(PASSTHROUGH_CALL);
                out.push_str(&text[cut + STRICT_CALL.len()..]);
                (out, 1)
            }
            None => (text.to_string(), 0),
        };
    }
    (text.to_string(), 0)
}

fn strip_array_property(text: &str, property: &str) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut count = 0;

    while let Some((key_start, bracket)) = next_array_property(text, cursor, property) {
        let Some(close) = scan_code(text, bracket, |_, b, depth| depth == 0 && b == b']') else {
            break;
        };

        let mut start = key_start;
        let mut end = close + 1;
        let rest = &text[end..];
        let spaces = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        if text[end + spaces..].starts_with(',') {
            end += spaces + 1;
        }

        // Drop the whole line when the property was alone on it.
        let line_start = text[..start].rfind('\n').map_or(0, |p| p + 1).max(cursor);
        let tail = &text[end..];
        let line_rest = tail.find('\n').unwrap_or(tail.len());
        if text[line_start..start].trim().is_empty() && tail[..line_rest].trim().is_empty() {
            start = line_start;
            end += line_rest;
            if text[end..].starts_with('\n') {
                end += 1;
            }
        } else {
            let rest = &text[end..];
            end += rest.len() - rest.trim_start_matches([' ', '\t']).len();
        }

        out.push_str(&text[cursor..start]);
        cursor = end;
        count += 1;
    }

    out.push_str(&text[cursor..]);
    (out, count)
}

/// Next `<property>:` outside string literals that is followed by `[`.
/// Returns the property start and the bracket position.
fn next_array_property(text: &str, from: usize, property: &str) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let first = *property.as_bytes().first()?;
    let mut bracket = None;
    let start = scan_code(text, from, |i, b, _| {
        if b != first || !text[i..].starts_with(property) {
            return false;
        }
        if i > 0 && is_ident_byte(bytes[i - 1]) {
            return false;
        }
        let rest = text[i + property.len()..].trim_start();
        let Some(value) = rest.strip_prefix(':') else {
            return false;
        };
        let value = value.trim_start();
        if value.starts_with('[') {
            bracket = Some(text.len() - value.len());
            true
        } else {
            false
        }
    })?;
    bracket.map(|b| (start, b))
}

/// Walk `text` from `from`, skipping string literals and tracking bracket
/// depth. `stop` sees each byte outside strings with the depth after it.
fn scan_code(
    text: &str,
    from: usize,
    mut stop: impl FnMut(usize, u8, i32) -> bool,
) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'"' | b'\'' | b'`' => quote = Some(b),
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            _ => {}
        }
        if quote.is_none() && stop(i, b, depth) {
            return Some(i);
        }
        i += 1;
    }
    None
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERATED: &str = r#"import { makeApi, Zodios, type ZodiosOptions } from "@zodios/core";
import { z } from "zod";

const microsoft_graph_plannerTask = z
  .object({
    id: z.string(),
    details: z.object({ description: z.string() }).strict().optional(),
  })
  .strict();
const microsoft_graph_plannerTaskDetails = z.object({ id: z.string() }).strict();
const microsoft_graph_todoTask = z
  .object({ id: z.string(), title: z.string().describe("Title; may contain ] or [") })
  .strict();

const endpoints = makeApi([
  {
    method: "get",
    path: "/planner/tasks/:plannerTask_id",
    response: microsoft_graph_plannerTask,
    errors: [
      {
        status: 404,
        description: `Not found [see docs]`,
        schema: z.void(),
      },
    ],
  },
  {
    method: "get",
    path: "/me/todo/lists",
    description: "errors: [ is not a property here",
    response: z.object({ value: z.array(z.unknown()) }).passthrough(),
    errors: [{ status: 400, description: "Bad request", schema: z.void() }],
  },
]);
"#;

    #[test]
    fn test_default_patch_set_on_generated_client() {
        let (patched, reports) = PatchSet::default().apply(GENERATED);

        assert!(patched.contains(r#"from "./zodios-shim";"#));
        assert!(!patched.contains("@zodios/core"));

        assert!(patched.contains("  })\n  .passthrough();\nconst microsoft_graph_plannerTaskDetails"));
        assert!(patched.contains(".strict().optional()"));
        assert!(patched.contains("const microsoft_graph_plannerTaskDetails = z.object({ id: z.string() }).strict();"));
        assert!(patched.contains("or [\") })\n  .passthrough();"));

        assert!(!patched.contains("errors: [\n"));
        assert!(!patched.contains("errors: [{"));
        assert!(patched.contains("\"errors: [ is not a property here\""));
        assert!(patched.contains("    response: microsoft_graph_plannerTask,\n  },"));
        assert!(patched.contains(".passthrough(),\n  },\n]);"));

        let counts: Vec<usize> = reports.iter().map(|r| r.applied).collect();
        assert_eq!(counts, vec![1, 1, 1, 2]);
    }

    #[test]
    fn test_missing_patterns_leave_text_unchanged() {
        let source = "import { z } from \"zod\";\nexport const api = z.object({}).strict();\n";
        let (patched, reports) = PatchSet::default().apply(source);
        assert_eq!(patched, source);
        assert_eq!(reports.len(), 4);
        assert!(reports.iter().all(|r| r.applied == 0));
    }

    #[test]
    fn test_renamed_schema_is_a_noop() {
        let source = "const microsoft_graph_plannerTaskV2 = z.object({}).strict();\n";
        let rule = Rewrite::Passthrough {
            schema: "microsoft_graph_plannerTask".to_string(),
        };
        assert_eq!(rule.apply(source), (source.to_string(), 0));
    }

    #[test]
    fn test_passthrough_requires_trailing_strict() {
        let source = "const microsoft_graph_todoTask = z.object({ a: z.string().strict() }).describe(\"x\");\n";
        let rule = Rewrite::Passthrough {
            schema: "microsoft_graph_todoTask".to_string(),
        };
        assert_eq!(rule.apply(source).1, 0);
    }

    #[test]
    fn test_redirect_single_quoted_import() {
        let rule = Rewrite::RedirectImport {
            from: ZODIOS_CORE_MODULE.to_string(),
            to: ZODIOS_SHIM_MODULE.to_string(),
        };
        let (patched, count) = rule.apply("import { Zodios } from '@zodios/core';\n");
        assert_eq!(count, 1);
        assert_eq!(patched, "import { Zodios } from './zodios-shim';\n");
    }

    #[test]
    fn test_strip_inline_errors_keeps_siblings() {
        let rule = Rewrite::StripArrayProperty {
            property: "errors".to_string(),
        };
        let (patched, count) =
            rule.apply("{ alias: \"a\", errors: [{ status: 404 }], response: b }");
        assert_eq!(count, 1);
        assert_eq!(patched, "{ alias: \"a\", response: b }");
    }

    #[test]
    fn test_strip_ignores_longer_identifiers() {
        let rule = Rewrite::StripArrayProperty {
            property: "errors".to_string(),
        };
        let source = "{ validation_errors: [1], errors2: [2] }";
        assert_eq!(rule.apply(source), (source.to_string(), 0));
    }

    #[test]
    fn test_unbalanced_array_is_left_alone() {
        let rule = Rewrite::StripArrayProperty {
            property: "errors".to_string(),
        };
        let source = "{ errors: [ { status: 404 }\n";
        assert_eq!(rule.apply(source), (source.to_string(), 0));
    }

    #[test]
    fn test_rule_display() {
        assert_eq!(
            Rewrite::Passthrough {
                schema: "microsoft_graph_todoTask".to_string()
            }
            .to_string(),
            "passthrough microsoft_graph_todoTask"
        );
    }
}
