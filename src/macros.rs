/// Pull the next comma-separated field out of `$fields`.
/// Returns `LexError::MalformedPayload($name)` from the enclosing function if
/// the payload ended early, or if `$check` rejects the field.
macro_rules! expect_field {
    ($fields:expr, $name:expr) => {
        match $fields.next() {
            Some(field) => field,
            None => return Err(LexError::MalformedPayload($name)),
        }
    };
    ($fields:expr, $name:expr, $check:expr) => {{
        let field = expect_field!($fields, $name);
        if !$check(field) {
            return Err(LexError::MalformedPayload($name));
        }
        field
    }};
}

/// Like `expect_field!`, but an empty field yields `None`.
macro_rules! accept_field {
    ($fields:expr, $name:expr, $check:expr) => {{
        let field = expect_field!($fields, $name);
        if field.is_empty() {
            None
        } else if $check(field) {
            Some(field)
        } else {
            return Err(LexError::MalformedPayload($name));
        }
    }};
}
