/// Longest keyword the search engine accepts in a single field.
pub(crate) const MAX_FIELD_LENGTH: usize = 32766;
/// Longest document id.
pub(crate) const MAX_ID_SIZE: usize = 512;

pub(crate) fn truncate_field(field: &str) -> String {
    truncate_to(field, MAX_FIELD_LENGTH)
}

pub(crate) fn truncate_fields(fields: Vec<String>) -> Vec<String> {
    fields.iter().map(|field| truncate_field(field)).collect()
}

// Cuts on a char boundary so the result stays valid UTF-8
pub(crate) fn truncate_to(field: &str, max_len: usize) -> String {
    if field.len() <= max_len {
        return field.to_string();
    }
    let mut end = max_len;
    while !field.is_char_boundary(end) {
        end -= 1;
    }
    field[..end].to_string()
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

pub(crate) fn is_zero_u64(value: &u64) -> bool {
    *value == 0
}

pub(crate) fn is_zero_f64(value: &f64) -> bool {
    *value == 0.0
}
