/// Filter arguments for object listings; unset fields are omitted on the wire
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListFilter {
    /// Only keys starting with this prefix
    pub prefix: Option<String>,
    /// Continue after this key
    pub marker: Option<String>,
    /// Group keys sharing a prefix up to this delimiter into common prefixes
    pub delimiter: Option<String>,
    /// Upper bound on returned entries; zero means server default
    pub max_count: usize,
}

impl ListFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn with_max_count(mut self, max_count: usize) -> Self {
        self.max_count = max_count;
        self
    }

    /// Query parameters for the filter, skipping unset and empty values
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        let fields = [
            ("prefix", &self.prefix),
            ("marker", &self.marker),
            ("delimiter", &self.delimiter),
        ];
        for (name, value) in fields {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                query.push((name.to_string(), value.to_string()));
            }
        }
        if self.max_count > 0 {
            query.push(("max-keys".to_string(), self.max_count.to_string()));
        }
        query
    }
}
