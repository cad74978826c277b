/*
 * Editor routes and id extraction from the current navigation location.
 *
 * The navigation subsystem itself is external; the explorer only needs to build
 * the datasource editor URL for the "switch datasource" click, and to read which
 * datasource or query is currently open. Locations look like
 *   /applications/{application_id}/pages/{page_id}/edit/datasource/{datasource_id}
 *   /applications/{application_id}/pages/{page_id}/edit/queries/{query_id}
 * Query strings and fragments are ignored.
 */
use super::models::{DatasourceId, QueryId};

const APPLICATIONS_SEGMENT: &str = "applications";
const PAGES_SEGMENT: &str = "pages";
const EDIT_SEGMENT: &str = "edit";
const DATASOURCE_SEGMENT: &str = "datasource";
const QUERIES_SEGMENT: &str = "queries";

pub fn datasource_editor_url(
    application_id: &str,
    page_id: &str,
    datasource_id: &DatasourceId,
) -> String {
    format!(
        "/{APPLICATIONS_SEGMENT}/{application_id}/{PAGES_SEGMENT}/{page_id}/{EDIT_SEGMENT}/{DATASOURCE_SEGMENT}/{datasource_id}"
    )
}

pub fn query_editor_url(application_id: &str, page_id: &str, query_id: &QueryId) -> String {
    format!(
        "/{APPLICATIONS_SEGMENT}/{application_id}/{PAGES_SEGMENT}/{page_id}/{EDIT_SEGMENT}/{QUERIES_SEGMENT}/{query_id}"
    )
}

// Splits a location into its non-empty path segments, dropping `?query` and `#fragment`.
fn path_segments(location: &str) -> Vec<&str> {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/*
 * The application and page the editor is currently showing. Both are needed to
 * build a new editor URL for a clicked datasource.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerRouteParams {
    pub application_id: String,
    pub page_id: String,
}

impl ExplorerRouteParams {
    pub fn from_path(location: &str) -> Option<Self> {
        match path_segments(location).as_slice() {
            [APPLICATIONS_SEGMENT, application_id, PAGES_SEGMENT, page_id, ..] => {
                Some(ExplorerRouteParams {
                    application_id: application_id.to_string(),
                    page_id: page_id.to_string(),
                })
            }
            _ => None,
        }
    }
}

/*
 * Read-only view of the current route for the two resource kinds the explorer
 * cares about. Absence of a parseable id is not an error.
 */
pub trait LocationResolverOperations {
    fn datasource_id(&self) -> Option<DatasourceId>;
    fn query_id(&self) -> Option<QueryId>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteLocationResolver {
    location: String,
}

impl RouteLocationResolver {
    pub fn new(location: impl Into<String>) -> Self {
        RouteLocationResolver {
            location: location.into(),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    // The id following `/edit/{kind}/` in an editor route.
    fn editor_resource_id(&self, kind: &str) -> Option<String> {
        match path_segments(&self.location).as_slice() {
            [APPLICATIONS_SEGMENT, _, PAGES_SEGMENT, _, EDIT_SEGMENT, segment_kind, id, ..]
                if *segment_kind == kind =>
            {
                Some(id.to_string())
            }
            _ => None,
        }
    }
}

impl LocationResolverOperations for RouteLocationResolver {
    fn datasource_id(&self) -> Option<DatasourceId> {
        self.editor_resource_id(DATASOURCE_SEGMENT)
            .map(|id| DatasourceId::from(id.as_str()))
    }

    fn query_id(&self) -> Option<QueryId> {
        self.editor_resource_id(QUERIES_SEGMENT).map(|id| QueryId::from(id.as_str()))
    }
}
