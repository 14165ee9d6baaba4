use contracts::datatable::ListMetadata;

use crate::datatable::source::ListDataSource;

pub const DEFAULT_PAGE_SIZES: [u32; 3] = [10, 30, 100];

/// Paginator settings. Several paginators may show the same source; only the
/// primary one offers the page size menu by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    pub page_sizes: Vec<u32>,
    pub is_primary: bool,
    pub show_settings: bool,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::primary()
    }
}

impl Paginator {
    pub fn primary() -> Self {
        Self {
            page_sizes: DEFAULT_PAGE_SIZES.to_vec(),
            is_primary: true,
            show_settings: true,
        }
    }

    pub fn secondary() -> Self {
        Self {
            is_primary: false,
            show_settings: false,
            ..Self::primary()
        }
    }

    pub fn with_page_sizes(mut self, sizes: Vec<u32>) -> Self {
        self.page_sizes = sizes;
        self
    }

    pub fn with_settings(mut self, show: bool) -> Self {
        self.show_settings = show;
        self
    }

    pub fn is_current_page_size(&self, size: u32, current: u32) -> bool {
        size == current
    }
}

/// Page links are only shown for more than one page
pub fn should_paginate(metadata: &ListMetadata) -> bool {
    metadata.pages_total > 1
}

pub fn next_page(current: u32, metadata: &ListMetadata) -> u32 {
    current.saturating_add(1).min(metadata.pages_total.max(1))
}

pub fn prev_page(current: u32) -> u32 {
    current.saturating_sub(1).max(1)
}

pub async fn go_to_next<T>(source: &ListDataSource<T>) -> bool {
    let Some(meta) = source.metadata() else {
        return false;
    };
    source.set_page(next_page(source.state().page, &meta)).await
}

pub async fn go_to_prev<T>(source: &ListDataSource<T>) -> bool {
    source.set_page(prev_page(source.state().page)).await
}

pub async fn go_to_last<T>(source: &ListDataSource<T>) -> bool {
    let Some(meta) = source.metadata() else {
        return false;
    };
    source.set_page(meta.pages_total.max(1)).await
}
