//! ListState <-> URL query string and browser history.

use super::env::{EnvError, EnvironmentPort, HistoryMode};
use super::state::{ListState, PAGE_PARAM, PAGE_SIZE_PARAM, SORT_PARAM};

/// Splits a query string into decoded `(key, value)` pairs.
///
/// Pairs without `=` or with an empty key are skipped. Anything that does not
/// percent-decode to UTF-8 is kept as written.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (decode_component(key), decode_component(value)))
        .collect()
}

fn decode_component(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            log::debug!("keeping undecodable query component {raw:?}: {e}");
            raw.to_string()
        }
    }
}

/// Applies a query string onto `current`.
///
/// `sort`, `page` and `page_size` are typed; every other key becomes a filter,
/// replacing the current filters. Absent `sort`/`page` keep their current
/// values, a `page` that is not a positive integer becomes 1, and an unusable
/// `page_size` is ignored.
pub fn decode_from_location(query: &str, current: &ListState) -> ListState {
    let mut state = current.clone();
    state.filters.clear();

    for (key, value) in parse_query(query) {
        match key.as_str() {
            SORT_PARAM => state.sort = value,
            PAGE_PARAM => {
                state.page = match value.trim().parse::<u32>() {
                    Ok(page) if page >= 1 => page,
                    _ => {
                        log::warn!("invalid page {value:?} in location, using 1");
                        1
                    }
                }
            }
            PAGE_SIZE_PARAM => match value.trim().parse::<u32>() {
                Ok(size) if size >= 1 => state.page_size = size,
                _ => log::warn!("ignoring invalid page_size {value:?} in location"),
            },
            _ => {
                state.filters.insert(key, value);
            }
        }
    }
    state
}

/// Serializes `state` as a query string (no leading `?`)
pub fn encode_to_location(state: &ListState) -> String {
    state
        .to_ordered_params()
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Writes `state` to the location.
///
/// With `replace` the current history entry is overwritten. Otherwise a new
/// entry is pushed, unless the location already shows this exact state.
/// Returns whether the location was written.
pub fn push_or_replace_history(
    env: &dyn EnvironmentPort,
    state: &ListState,
    replace: bool,
) -> Result<bool, EnvError> {
    let query = encode_to_location(state);
    let mode = if replace {
        HistoryMode::Replace
    } else {
        let current = env.read_location();
        if current.trim_start_matches('?') == query {
            return Ok(false);
        }
        HistoryMode::Push
    };
    env.write_location(&query, &state.to_params(), mode)?;
    Ok(true)
}
