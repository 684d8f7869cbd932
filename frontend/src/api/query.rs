/// A PostgREST request target: the table plus its query-string parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    table: &'static str,
    params: Vec<(String, String)>,
}

impl Query {
    pub fn table(table: &'static str) -> Self {
        Query { table, params: Vec::new() }
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".to_string(), columns.to_string()));
        self
    }

    pub fn eq(mut self, column: &str, value: impl std::fmt::Display) -> Self {
        self.params.push((column.to_string(), format!("eq.{}", value)));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.params.push(("order".to_string(), format!("{}.{}", column, direction)));
        self
    }

    pub fn on_conflict(mut self, column: &str) -> Self {
        self.params.push(("on_conflict".to_string(), column.to_string()));
        self
    }

    pub fn table_name(&self) -> &'static str {
        self.table
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
