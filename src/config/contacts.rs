//! Contact details for exports, loaded from environment variables.
//!
//! The document header lists the author's e-mail and phone, the salary sheet
//! ends with the site engineer's name and phone. Both are set in `.env`:
//! `AUTHOR_EMAIL`, `AUTHOR_PHONE`, `ENGINEER_NAME` and `ENGINEER_PHONE`.
//! Unset variables become empty strings.

use crate::render::{Contact, Engineer};

fn contact_from(lookup: impl Fn(&str) -> Option<String>) -> Contact {
    Contact {
        email: lookup("AUTHOR_EMAIL").unwrap_or_default(),
        phone: lookup("AUTHOR_PHONE").unwrap_or_default(),
    }
}

fn engineer_from(lookup: impl Fn(&str) -> Option<String>) -> Engineer {
    Engineer {
        full_name: lookup("ENGINEER_NAME").unwrap_or_default(),
        phone: lookup("ENGINEER_PHONE").unwrap_or_default(),
    }
}

/// Author contact printed in the document header.
#[must_use]
pub fn get_contact() -> Contact {
    contact_from(|key| std::env::var(key).ok())
}

/// Engineer signing the salary sheet.
#[must_use]
pub fn get_engineer() -> Engineer {
    engineer_from(|key| std::env::var(key).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_contact_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("AUTHOR_EMAIL", "estimator@example.com"),
            ("ENGINEER_NAME", "Петров П. П."),
            ("ENGINEER_PHONE", "+7 978 000 00 00"),
        ]
        .into_iter()
        .collect();
        let lookup = |key: &str| vars.get(key).map(ToString::to_string);

        let contact = contact_from(lookup);
        assert_eq!(contact.email, "estimator@example.com");
        assert_eq!(contact.phone, "");

        let engineer = engineer_from(lookup);
        assert_eq!(engineer.full_name, "Петров П. П.");
        assert_eq!(engineer.phone, "+7 978 000 00 00");
    }
}
