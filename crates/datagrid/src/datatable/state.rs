use contracts::datatable::{FilterExpr, FilterParseError};
use std::collections::BTreeMap;

pub const SORT_PARAM: &str = "sort";
pub const PAGE_PARAM: &str = "page";
pub const PAGE_SIZE_PARAM: &str = "page_size";

/// What page of data to request: sort key, page, page size and filters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListState {
    /// Empty, or a field name optionally prefixed with `-` for descending
    pub sort: String,
    /// 1-based
    pub page: u32,
    pub page_size: u32,
    /// Field name -> `operator:value`
    pub filters: BTreeMap<String, String>,
}

impl ListState {
    pub fn new(page_size: u32) -> Self {
        Self {
            sort: String::new(),
            page: 1,
            page_size: page_size.max(1),
            filters: BTreeMap::new(),
        }
    }

    /// Sort field without the direction prefix, `None` when unsorted
    pub fn sort_field(&self) -> Option<&str> {
        let field = self.sort.strip_prefix('-').unwrap_or(&self.sort);
        (!field.is_empty()).then_some(field)
    }

    pub fn sort_descending(&self) -> bool {
        self.sort.starts_with('-')
    }

    /// Parameters of the list request and the URL, as a flat map. Filters
    /// named like a reserved parameter are left out, as in the URL.
    pub fn to_params(&self) -> BTreeMap<String, String> {
        let mut params: BTreeMap<String, String> = self
            .filters
            .iter()
            .filter(|(k, _)| !is_reserved_param(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        params.insert(SORT_PARAM.to_string(), self.sort.clone());
        params.insert(PAGE_PARAM.to_string(), self.page.to_string());
        params.insert(PAGE_SIZE_PARAM.to_string(), self.page_size.to_string());
        params
    }

    /// Request parameters in wire order: `sort`, `page`, `page_size`, filters
    pub fn to_ordered_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            (SORT_PARAM.to_string(), self.sort.clone()),
            (PAGE_PARAM.to_string(), self.page.to_string()),
            (PAGE_SIZE_PARAM.to_string(), self.page_size.to_string()),
        ];
        params.extend(
            self.filters
                .iter()
                .filter(|(k, _)| !is_reserved_param(k))
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        params
    }

    /// Typed view of one filter
    pub fn filter_expr(&self, field: &str) -> Option<Result<FilterExpr, FilterParseError>> {
        self.filters.get(field).map(|raw| FilterExpr::parse(raw))
    }
}

pub fn is_reserved_param(key: &str) -> bool {
    matches!(key, SORT_PARAM | PAGE_PARAM | PAGE_SIZE_PARAM)
}

/// Wire map of typed filters
pub fn filters_from_exprs<I, K>(exprs: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, FilterExpr)>,
    K: Into<String>,
{
    exprs
        .into_iter()
        .map(|(field, expr)| (field.into(), expr.to_wire()))
        .collect()
}
