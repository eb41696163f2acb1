//! Visibility scope applied to every product and category read.
//!
//! Repositories never filter on `status` or `deleted_at` by themselves; each
//! read takes a [`Visibility`] and splices its predicate into the `WHERE`
//! clause. Callers that need to reach inactive or trashed rows say so
//! explicitly.

/// Which rows a read may return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    /// Active, non-trashed rows.
    #[default]
    Active,
    /// Active and inactive rows, still excluding trashed ones.
    IncludeInactive,
    /// Every row regardless of status or trash marker.
    WithTrashed,
    /// Trashed rows only, any status.
    OnlyTrashed,
}

impl Visibility {
    /// Pick the listing scope from the `include_inactive` query flag.
    pub fn from_include_inactive(include_inactive: bool) -> Self {
        if include_inactive {
            Visibility::IncludeInactive
        } else {
            Visibility::Active
        }
    }

    /// SQL predicate for rows of the table aliased as `alias`.
    pub fn predicate(self, alias: &str) -> String {
        match self {
            Visibility::Active => {
                format!("{alias}.status = 'active' AND {alias}.deleted_at IS NULL")
            }
            Visibility::IncludeInactive => format!("{alias}.deleted_at IS NULL"),
            Visibility::WithTrashed => "TRUE".to_string(),
            Visibility::OnlyTrashed => format!("{alias}.deleted_at IS NOT NULL"),
        }
    }

    /// Ordering used by listings under this scope: trash bins show the most
    /// recently deleted first, everything else the newest first.
    pub fn order_by(self, alias: &str) -> String {
        match self {
            Visibility::OnlyTrashed => format!("{alias}.deleted_at DESC, {alias}.id DESC"),
            _ => format!("{alias}.created_at DESC, {alias}.id DESC"),
        }
    }
}
