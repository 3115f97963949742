//! Query augmentation
//!
//! Takes a compiled (or literal) query string and applies, in this exact
//! order:
//!
//! 1. connector-name substitution for the full-text placeholder,
//! 2. permission-filter insertion,
//! 3. sort bindings and the ORDER BY clause,
//! 4. OFFSET/LIMIT from the computed pagination window.
//!
//! Permission-clause insertion-point discovery is string-pattern based (the
//! query text format is externally fixed) and isolated in
//! [`insert_permission_filter`] so the strategy can be replaced without
//! touching callers.

use crate::args::PermissionMode;
use crate::paginate::Window;
use crate::sorter::{SortDirection, Sorter};
use casegraph_vocab::{acl, query as qvocab, text};
use once_cell::sync::Lazy;
use regex::Regex;

/// Marker line optionally naming the instance variable:
/// `# permission-filter ?case`
static PERMISSION_MARKER: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        r"(?m)^[ \t]*{}(?:[ \t]+\?([A-Za-z_][A-Za-z0-9_]*))?[ \t]*$",
        regex::escape(qvocab::PERMISSION_MARKER)
    );
    Regex::new(&pattern).expect("permission marker pattern")
});

static OFFSET_CLAUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"OFFSET (\d+)").expect("offset pattern"));

static LIMIT_CLAUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"LIMIT (\d+)").expect("limit pattern"));

/// Principal facts the permission filter needs
#[derive(Debug, Clone, Copy)]
pub struct PermissionFilter<'a> {
    pub mode: PermissionMode,
    /// Privileged principals bypass the filter entirely
    pub privileged: bool,
    /// Current-user identifier, substituted literally into the clause
    pub user_id: &'a str,
}

/// How the permission step resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    /// Caller requested no permission filtering
    NotRequested,
    /// The query already carries an explicit permission predicate
    AlreadyPresent,
    /// Privileged principal, filter omitted by design
    Bypassed,
    /// Filter clause was inserted
    Inserted,
    /// No insertion point found; query returned unmodified (degraded mode,
    /// logged at error level)
    InsertionFailed,
}

/// An augmented query plus the permission-step outcome
#[derive(Debug, Clone)]
pub struct Augmented {
    pub query: String,
    pub permission: PermissionOutcome,
}

/// Applies post-compilation clauses to a query string
pub struct QueryAugmenter {
    connector: String,
    sort_pushdown: bool,
}

impl QueryAugmenter {
    /// `connector` is the configured full-text connector identifier;
    /// `sort_pushdown` chooses server-side ORDER BY over mapper sorting.
    pub fn new(connector: impl Into<String>, sort_pushdown: bool) -> Self {
        Self {
            connector: connector.into(),
            sort_pushdown,
        }
    }

    pub fn sort_pushdown(&self) -> bool {
        self.sort_pushdown
    }

    /// Apply all augmentation steps in order
    pub fn augment(
        &self,
        query: &str,
        filter: &PermissionFilter<'_>,
        sorters: &[Sorter],
        window: Window,
        page_size: u64,
    ) -> Augmented {
        let query = query.replace(text::CONNECTOR_PLACEHOLDER, &self.connector);
        let (mut query, permission) = insert_permission_filter(&query, filter);

        // Sort bindings are always emitted so the mapper can find the sort
        // key under the generated variable; the ORDER BY itself only when
        // the store performs the sort.
        for sorter in sorters {
            let pattern = format!(
                "OPTIONAL {{ ?{} <{}> ?{} . }}\n",
                qvocab::INSTANCE_VAR,
                sorter.field,
                sorter.sort_var()
            );
            query = insert_before_last_close(&query, &pattern).unwrap_or(query);
        }
        if self.sort_pushdown && !sorters.is_empty() {
            let clauses: Vec<String> = sorters
                .iter()
                .map(|s| {
                    let dir = match s.direction {
                        SortDirection::Ascending => "ASC",
                        SortDirection::Descending => "DESC",
                    };
                    format!("{}(?{})", dir, s.sort_var())
                })
                .collect();
            query = format!("{}ORDER BY {}\n", query, clauses.join(" "));
        }

        query = format!("{}OFFSET {}\n", query, window.store_offset);
        if let Some(limit) = window.fetch_limit(page_size) {
            query = format!("{}LIMIT {}\n", query, limit);
        }

        Augmented { query, permission }
    }

    /// Augmentation for wrapped (count / group-by) queries: connector and
    /// permission only, no sort or paging clauses
    pub fn augment_core(&self, query: &str, filter: &PermissionFilter<'_>) -> Augmented {
        let query = query.replace(text::CONNECTOR_PLACEHOLDER, &self.connector);
        let (query, permission) = insert_permission_filter(&query, filter);
        Augmented { query, permission }
    }
}

/// Insert the permission-filter clause into a query
///
/// Skips when filtering was not requested, the query already carries a
/// permission predicate, or the principal is privileged. The insertion
/// point is the marker line when present (its captured variable wins over
/// the canonical subject variable), otherwise the position before the last
/// closing block delimiter. With neither, the query is returned unmodified
/// and the condition logged at error level.
pub fn insert_permission_filter(
    query: &str,
    filter: &PermissionFilter<'_>,
) -> (String, PermissionOutcome) {
    let predicate = match filter.mode {
        PermissionMode::None => return (query.to_string(), PermissionOutcome::NotRequested),
        PermissionMode::Read => acl::READ_ACCESS,
        PermissionMode::Write => acl::WRITE_ACCESS,
    };
    if query.contains(acl::READ_ACCESS) || query.contains(acl::WRITE_ACCESS) {
        return (query.to_string(), PermissionOutcome::AlreadyPresent);
    }
    if filter.privileged {
        return (query.to_string(), PermissionOutcome::Bypassed);
    }

    if let Some(captures) = PERMISSION_MARKER.captures(query) {
        let var = captures
            .get(1)
            .map(|m| m.as_str())
            .unwrap_or(qvocab::INSTANCE_VAR);
        let clause = permission_clause(var, predicate, filter.user_id);
        // NoExpand: the clause is literal text, not a replacement template.
        let replaced = PERMISSION_MARKER.replace(query, regex::NoExpand(&clause));
        return (replaced.into_owned(), PermissionOutcome::Inserted);
    }

    let clause = permission_clause(qvocab::INSTANCE_VAR, predicate, filter.user_id);
    match insert_before_last_close(query, &format!("{clause}\n")) {
        Some(inserted) => (inserted, PermissionOutcome::Inserted),
        None => {
            tracing::error!(
                user = filter.user_id,
                "no insertion point for permission filter; query left unfiltered"
            );
            (query.to_string(), PermissionOutcome::InsertionFailed)
        }
    }
}

fn permission_clause(var: &str, predicate: &str, user_id: &str) -> String {
    format!("?{} <{}> \"{}\" .", var, predicate, user_id.replace('"', ""))
}

/// Insert a fragment immediately before the last `}` of the query
fn insert_before_last_close(query: &str, fragment: &str) -> Option<String> {
    let pos = query.rfind('}')?;
    let mut out = String::with_capacity(query.len() + fragment.len());
    out.push_str(&query[..pos]);
    out.push_str(fragment);
    out.push_str(&query[pos..]);
    Some(out)
}

/// Parse the OFFSET and LIMIT values back out of an augmented query
pub fn parse_offset_limit(query: &str) -> (Option<u64>, Option<u64>) {
    let offset = OFFSET_CLAUSE
        .captures(query)
        .and_then(|c| c[1].parse().ok());
    let limit = LIMIT_CLAUSE.captures(query).and_then(|c| c[1].parse().ok());
    (offset, limit)
}
