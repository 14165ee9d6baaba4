//! Счётчик записей: "1,234", ">1,234" or "~1,234".

use contracts::datatable::ListMetadata;

/// Вставляет разделитель каждые 3 цифры с конца
pub fn group_thousands(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(separator);
        }
        result.push(c);
    }
    result
}

/// Object count for display.
///
/// Before the last page an inexact count gets a prefix: `>` when the server
/// stopped counting, `~` when it estimated.
pub fn count_label(metadata: &ListMetadata) -> String {
    let count = group_thousands(metadata.number_of_objects, ',');
    if metadata.has_later_pages() {
        if metadata.limited_number_of_objects {
            return format!(">{count}");
        }
        if metadata.approximated_number_of_objects {
            return format!("~{count}");
        }
    }
    count
}
