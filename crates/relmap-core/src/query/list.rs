//! List query parameters.

/// Default page size of a list query.
pub const DEFAULT_LIMIT: u64 = 100;

/// Parameters of a `list` call.
///
/// Builder methods consume and return the value, so a query is never shared
/// half-built between callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Filter strings, `name<op>value`.
    pub filters: Vec<String>,
    /// Names of relation properties to embed.
    pub expands: Vec<String>,
    /// Maximum number of objects.
    pub limit: u64,
    /// Objects to skip.
    pub offset: u64,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            expands: Vec::new(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl ListQuery {
    /// First page, no filters, no expands.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }

    /// Add several filters.
    pub fn with_filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.extend(filters.into_iter().map(Into::into));
        self
    }

    /// Add an expand.
    pub fn with_expand(mut self, expand: impl Into<String>) -> Self {
        self.expands.push(expand.into());
        self
    }

    /// Add several expands.
    pub fn with_expands<I, S>(mut self, expands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expands.extend(expands.into_iter().map(Into::into));
        self
    }

    /// Set the page size.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Set the number of objects to skip.
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let query = ListQuery::new();
        assert_eq!(query.limit, 100);
        assert_eq!(query.offset, 0);
        assert!(query.filters.is_empty());
        assert!(query.expands.is_empty());
    }

    #[test]
    fn test_builder() {
        let query = ListQuery::new()
            .with_filter("age>=18")
            .with_filters(["name=Ann"])
            .with_expands(vec!["pets".to_string()])
            .with_limit(10)
            .with_offset(5);

        assert_eq!(query.filters, vec!["age>=18", "name=Ann"]);
        assert_eq!(query.expands, vec!["pets"]);
        assert_eq!(query.limit, 10);
        assert_eq!(query.offset, 5);
    }
}
