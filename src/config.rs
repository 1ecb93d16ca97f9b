use std::env;

use crate::validation::IsbnPolicy;

/// Returns the value of the named environment variable if it exists or panics.
pub fn get_variable(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("must define {} environment variable", name))
}

/// Reads `BACKEND_ISBN_POLICY`, falling back to the pattern check when
/// it's unset. Panics on any other value.
pub fn get_isbn_policy() -> IsbnPolicy {
    match env::var("BACKEND_ISBN_POLICY") {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|e| panic!("parse BACKEND_ISBN_POLICY: {}", e)),
        Err(_) => IsbnPolicy::default(),
    }
}
