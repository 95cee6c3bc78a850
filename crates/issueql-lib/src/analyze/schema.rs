//! Built-in qualifier schema: qualifier name -> accepted value domain.
//!
//! A domain is either a fixed enumeration (an ordered list of permitted
//! value sets, one set per qualifier overload) or a semantic value type
//! validated structurally. Entries here are seeded once and never removed;
//! user variables live in the [`SymbolTable`](super::SymbolTable) instead.

use std::sync::OnceLock;

use chrono::NaiveDate;
use indexmap::IndexMap;

/// Semantic value domains with no closed literal set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Integer, comparison (`>5`) or range (`1..10`, `*..5`).
    Number,
    /// ISO date, `*`, comparison or range over those.
    Date,
    Username,
    Label,
    Repository,
    Orgname,
    Teamname,
    Milestone,
    ProjectBoard,
    Language,
    BaseBranch,
    HeadBranch,
}

impl ValueType {
    /// Structural validation of a raw value literal.
    pub fn validate(&self, text: &str) -> Result<(), String> {
        match self {
            ValueType::Number => validate_comparable(text, &is_integer, "a number"),
            ValueType::Date => validate_comparable(text, &is_date, "an ISO date (YYYY-MM-DD)"),
            _ => {
                if text.trim().is_empty() {
                    Err("value must not be empty".to_string())
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Validates `atom`, `>atom`, `>=atom`, `<atom`, `<=atom`, `a..b` where each
/// range endpoint may be `*`.
fn validate_comparable(
    text: &str,
    is_atom: &dyn Fn(&str) -> bool,
    expected: &str,
) -> Result<(), String> {
    let fail = || Err(format!("expected {expected}, a comparison, or a range"));

    for op in [">=", "<=", ">", "<"] {
        if let Some(rest) = text.strip_prefix(op) {
            return if is_atom(rest) { Ok(()) } else { fail() };
        }
    }

    if let Some((lo, hi)) = text.split_once("..") {
        let endpoint_ok = |s: &str| s == "*" || is_atom(s);
        return if endpoint_ok(lo) && endpoint_ok(hi) {
            Ok(())
        } else {
            fail()
        };
    }

    if is_atom(text) { Ok(()) } else { fail() }
}

fn is_integer(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn is_date(s: &str) -> bool {
    s == "*" || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Value domain of one qualifier.
#[derive(Debug, Clone, Copy)]
pub enum ValueInfo {
    /// Ordered list of permitted value sets; a literal must be a member of
    /// one of them.
    Enumeration(&'static [&'static [&'static str]]),
    Semantic(ValueType),
}

#[derive(Debug, Clone, Copy)]
pub struct QualifierInfo {
    pub value: ValueInfo,
    /// Only meaningful on pull requests; use without a `type:pr` restriction
    /// draws a warning rather than an error.
    pub pr_only: bool,
}

/// Sort fields the search API understands.
pub const SORT_FIELDS: &[&str] = &["created", "updated", "comments", "reactions", "interactions"];

/// Splits `field-order` at the trailing order suffix, if present.
/// `created-desc` -> `("created", Some("desc"))`, `created` -> `("created", None)`.
pub fn split_sort(text: &str) -> (&str, Option<&str>) {
    if let Some(field) = text.strip_suffix("-asc") {
        return (field, Some("asc"));
    }
    if let Some(field) = text.strip_suffix("-desc") {
        return (field, Some("desc"));
    }
    (text, None)
}

/// Schema of all built-in qualifiers.
pub struct Schema {
    qualifiers: IndexMap<&'static str, QualifierInfo>,
}

impl Schema {
    /// The process-wide built-in schema. Seeded once, never mutated.
    pub fn builtin() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(Schema::build)
    }

    pub fn get(&self, name: &str) -> Option<&QualifierInfo> {
        self.qualifiers.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.qualifiers.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.qualifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.qualifiers.is_empty()
    }

    fn build() -> Schema {
        use ValueType::*;

        let mut qualifiers = IndexMap::new();
        let mut enums = |name, sets: &'static [&'static [&'static str]], pr_only| {
            qualifiers.insert(
                name,
                QualifierInfo {
                    value: ValueInfo::Enumeration(sets),
                    pr_only,
                },
            );
        };

        enums("type", &[&["issue", "pr"]], false);
        enums("state", &[&["open", "closed"]], false);
        enums(
            "is",
            &[
                &["open", "closed"],
                &["issue", "pr"],
                &["merged", "unmerged"],
                &["public", "private"],
                &["locked", "unlocked"],
                &["draft"],
            ],
            false,
        );
        enums("in", &[&["title", "body", "comments"]], false);
        enums("reason", &[&["completed", "not planned"]], false);
        enums("linked", &[&["issue", "pr"]], false);
        enums("no", &[&["label", "milestone", "assignee", "project"]], false);
        enums("archived", &[&["true", "false"]], false);
        enums("draft", &[&["true", "false"]], true);
        enums(
            "review",
            &[&["none", "required", "approved", "changes_requested"]],
            true,
        );
        enums("status", &[&["pending", "success", "failure"]], true);

        let mut semantic = |name, value_type, pr_only| {
            qualifiers.insert(
                name,
                QualifierInfo {
                    value: ValueInfo::Semantic(value_type),
                    pr_only,
                },
            );
        };

        semantic("author", Username, false);
        semantic("assignee", Username, false);
        semantic("mentions", Username, false);
        semantic("commenter", Username, false);
        semantic("involves", Username, false);
        semantic("user", Username, false);
        semantic("reviewed-by", Username, true);
        semantic("review-requested", Username, true);
        semantic("team", Teamname, false);
        semantic("team-review-requested", Teamname, true);
        semantic("org", Orgname, false);
        semantic("repo", Repository, false);
        semantic("label", Label, false);
        semantic("milestone", Milestone, false);
        semantic("project", ProjectBoard, false);
        semantic("language", Language, false);
        semantic("base", BaseBranch, true);
        semantic("head", HeadBranch, true);
        semantic("comments", Number, false);
        semantic("interactions", Number, false);
        semantic("reactions", Number, false);
        semantic("created", Date, false);
        semantic("updated", Date, false);
        semantic("closed", Date, false);
        semantic("merged", Date, true);

        Schema { qualifiers }
    }
}
