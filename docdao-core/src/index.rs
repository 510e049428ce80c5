//! Index declarations applied per collection.

use crate::dsl::SortDirection;

/// Declarative description of one collection index: an ordered key list
/// plus the options the server understands.
///
/// Descriptors are declared statically on an access object and applied
/// idempotently - re-applying an unchanged descriptor creates nothing new.
///
/// # Example
///
/// ```ignore
/// use docdao_core::{dsl::SortDirection, index::IndexDescriptor};
///
/// let by_email = IndexDescriptor::on("email", SortDirection::Asc)
///     .unique()
///     .named("users_by_email");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDescriptor {
    keys: Vec<(String, SortDirection)>,
    unique: bool,
    sparse: bool,
    background: bool,
    name: Option<String>,
}

impl IndexDescriptor {
    /// Starts a descriptor with its first key.
    pub fn on(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            keys: vec![(field.into(), direction)],
            unique: false,
            sparse: false,
            background: false,
            name: None,
        }
    }

    /// Appends another key to the ordering.
    pub fn and(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.keys.push((field.into(), direction));
        self
    }

    /// Makes the index enforce uniqueness.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Skips documents missing the indexed fields.
    pub fn sparse(mut self) -> Self {
        self.sparse = true;
        self
    }

    /// Requests background construction on the server.
    pub fn background(mut self) -> Self {
        self.background = true;
        self
    }

    /// Overrides the server-generated index name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The key ordering, in declaration order.
    pub fn keys(&self) -> &[(String, SortDirection)] {
        &self.keys
    }

    /// Whether the index enforces uniqueness.
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Whether documents missing the indexed fields are skipped.
    pub fn is_sparse(&self) -> bool {
        self.sparse
    }

    /// Whether background construction is requested.
    pub fn is_background(&self) -> bool {
        self.background
    }

    /// The explicit index name, if one was set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_accumulate_in_declaration_order() {
        let descriptor = IndexDescriptor::on("last", SortDirection::Asc)
            .and("first", SortDirection::Asc)
            .and("joined", SortDirection::Desc);

        let fields: Vec<_> = descriptor
            .keys()
            .iter()
            .map(|(field, _)| field.as_str())
            .collect();
        assert_eq!(fields, vec!["last", "first", "joined"]);
    }

    #[test]
    fn options_default_off() {
        let plain = IndexDescriptor::on("email", SortDirection::Asc);
        assert!(!plain.is_unique());
        assert!(!plain.is_sparse());
        assert!(!plain.is_background());
        assert_eq!(plain.name(), None);

        let tuned = plain.unique().sparse().background().named("by_email");
        assert!(tuned.is_unique());
        assert!(tuned.is_sparse());
        assert!(tuned.is_background());
        assert_eq!(tuned.name(), Some("by_email"));
    }
}
