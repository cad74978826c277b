/*
 * Secondary-resource lookup: given the query that is currently open in the
 * editor, which datasource does it belong to? The answer feeds the
 * cross-reference expansion signal of datasource nodes.
 */
use super::models::{DatasourceId, Query, QueryId};
use std::collections::HashMap;

pub trait QueryLookupOperations {
    fn parent_datasource_id(&self, query_id: &QueryId) -> Option<DatasourceId>;
}

#[derive(Debug, Default)]
pub struct QueryRegistry {
    queries: HashMap<QueryId, Query>,
}

impl QueryRegistry {
    pub fn new(queries: impl IntoIterator<Item = Query>) -> Self {
        QueryRegistry {
            queries: queries.into_iter().map(|q| (q.id.clone(), q)).collect(),
        }
    }

    pub fn get(&self, query_id: &QueryId) -> Option<&Query> {
        self.queries.get(query_id)
    }
}

impl QueryLookupOperations for QueryRegistry {
    fn parent_datasource_id(&self, query_id: &QueryId) -> Option<DatasourceId> {
        self.queries.get(query_id).map(|q| q.datasource_id.clone())
    }
}
