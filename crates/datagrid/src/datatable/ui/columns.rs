use serde::Deserialize;

use crate::datatable::source::ListDataSource;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ColumnWidth {
    /// Pixels
    Px(u32),
    /// Any CSS length, used verbatim
    Css(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Table column definition
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Column {
    /// Record field shown in the column; also the sort key
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub width: Option<ColumnWidth>,
    #[serde(default = "default_true")]
    pub sortable: bool,
    /// Visibility when the user has not chosen one
    #[serde(default = "default_true")]
    pub visible: bool,
}

fn default_true() -> bool {
    true
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            width: None,
            sortable: true,
            visible: true,
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn width(mut self, width: ColumnWidth) -> Self {
        self.width = Some(width);
        self
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Explicit title, or the name with `_` as spaces and each word capitalized
    pub fn title(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }
        self.name
            .replace('_', " ")
            .split(' ')
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn width_css(&self) -> String {
        match &self.width {
            Some(ColumnWidth::Px(px)) => format!("{px}px"),
            Some(ColumnWidth::Css(css)) => css.clone(),
            None => "auto".to_string(),
        }
    }

    pub fn sort_direction(&self, sort: &str) -> Option<SortDirection> {
        if sort == self.name {
            Some(SortDirection::Ascending)
        } else if sort.strip_prefix('-') == Some(self.name.as_str()) {
            Some(SortDirection::Descending)
        } else {
            None
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Sort key after a click on `column`'s header: ascending, unless the column
/// is already sorted ascending
pub fn toggle_sort(column: &str, current_sort: &str) -> String {
    if current_sort == column {
        format!("-{column}")
    } else {
        column.to_string()
    }
}

/// Header arrow for `column`
pub fn sort_indicator(column: &Column, sort: &str) -> &'static str {
    match column.sort_direction(sort) {
        Some(SortDirection::Ascending) => " ▲",
        Some(SortDirection::Descending) => " ▼",
        None if column.sortable => " ⇅",
        None => "",
    }
}

/// CSS class of a header cell
pub fn sort_class(column: &Column, sort: &str) -> &'static str {
    match column.sort_direction(sort) {
        Some(SortDirection::Ascending) => "asc",
        Some(SortDirection::Descending) => "desc",
        None => "",
    }
}

/// Registers default visibility of `columns` with the source
pub fn register_columns<T>(source: &ListDataSource<T>, columns: &[Column]) {
    source.register_columns(columns.iter().map(|c| (c.name.as_str(), c.visible)));
}

pub fn visible_columns<'a, T>(source: &ListDataSource<T>, columns: &'a [Column]) -> Vec<&'a Column> {
    columns
        .iter()
        .filter(|c| source.is_column_visible(&c.name))
        .collect()
}

/// Header click handler
pub async fn sort_by_column<T>(source: &ListDataSource<T>, column: &Column) -> bool {
    if !column.sortable || source.is_loading() {
        return false;
    }
    let sort = toggle_sort(&column.name, &source.state().sort);
    source.set_sort(sort).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatable::config::ListOptions;
    use crate::datatable::testing::{metadata, MemoryEnvironment, ScriptedTransport};
    use futures::executor::block_on;
    use serde_json::Value;
    use std::rc::Rc;

    #[test]
    fn test_title() {
        assert_eq!(Column::new("first_name").title(), "First Name");
        assert_eq!(Column::new("iD").title(), "Id");
        assert_eq!(Column::new("x").titled("Custom").title(), "Custom");
    }

    #[test]
    fn test_width_css() {
        assert_eq!(Column::new("a").width_css(), "auto");
        assert_eq!(Column::new("a").width(ColumnWidth::Px(120)).width_css(), "120px");
        assert_eq!(
            Column::new("a")
                .width(ColumnWidth::Css("20%".into()))
                .width_css(),
            "20%"
        );
    }

    #[test]
    fn test_deserialize() {
        let cols: Vec<Column> = serde_json::from_str(
            r#"[{"name": "id", "width": 60, "sortable": false}, {"name": "email", "visible": false, "width": "30%"}]"#,
        )
        .unwrap();
        assert_eq!(cols[0].width, Some(ColumnWidth::Px(60)));
        assert!(!cols[0].sortable);
        assert!(cols[0].visible);
        assert!(!cols[1].visible);
        assert_eq!(cols[1].width_css(), "30%");
    }

    #[test]
    fn test_toggle_sort() {
        assert_eq!(toggle_sort("name", ""), "name");
        assert_eq!(toggle_sort("name", "name"), "-name");
        assert_eq!(toggle_sort("name", "-name"), "name");
        assert_eq!(toggle_sort("name", "email"), "name");
    }

    #[test]
    fn test_indicators() {
        let col = Column::new("name");
        assert_eq!(sort_indicator(&col, "name"), " ▲");
        assert_eq!(sort_indicator(&col, "-name"), " ▼");
        assert_eq!(sort_indicator(&col, "-names"), " ⇅");
        assert_eq!(sort_indicator(&col.clone().unsortable(), ""), "");
        assert_eq!(sort_class(&col, "-name"), "desc");
        assert_eq!(sort_class(&col, ""), "");
    }

    #[test]
    fn test_sort_by_column_and_visibility() {
        let env = Rc::new(MemoryEnvironment::default());
        let transport = Rc::new(ScriptedTransport::<Value>::default());
        let source = ListDataSource::new(
            ListOptions::new("t", "/api/t"),
            env.clone(),
            transport.clone(),
        );
        let columns = vec![Column::new("name"), Column::new("secret").hidden().unsortable()];
        register_columns(&source, &columns);
        let visible: Vec<&str> = visible_columns(&source, &columns)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(visible, vec!["name"]);

        transport.respond_ok(metadata(1, 1, 1), vec![]);
        block_on(source.load());

        transport.respond_ok(metadata(1, 1, 1), vec![]);
        assert!(block_on(sort_by_column(&source, &columns[0])));
        assert_eq!(source.state().sort, "name");

        transport.respond_ok(metadata(1, 1, 1), vec![]);
        assert!(block_on(sort_by_column(&source, &columns[0])));
        assert_eq!(source.state().sort, "-name");

        assert!(!block_on(sort_by_column(&source, &columns[1])));
    }
}
