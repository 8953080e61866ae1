use alertdeck_api_structs::dtos::FieldErrors;
use validator::ValidationErrors;

/// Inline messages for the fields that failed validation, keyed by the name
/// the field has in the submitted form
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errors)| {
            let message = errors.iter().find_map(|e| e.message.as_ref())?;
            Some((form_field_name(field), message.to_string()))
        })
        .collect()
}

fn form_field_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            name.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            name.push(c);
        }
    }
    name
}
