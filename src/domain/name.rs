/// Normalizes a practitioner name so it carries the "Dr. " prefix exactly
/// once. Idempotent after the first application.
pub fn add_dr_prefix(name: &str) -> String {
    let trimmed = name.trim();
    let lower = trimmed.to_lowercase();
    if lower.starts_with("dr.") {
        trimmed.to_string()
    } else if lower.starts_with("dr ") {
        // "dr " is ASCII, so the byte offset is safe.
        format!("Dr. {}", &trimmed[3..])
    } else {
        format!("Dr. {trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepends_prefix_to_bare_name() {
        assert_eq!(add_dr_prefix("Smith"), "Dr. Smith");
    }

    #[test]
    fn keeps_existing_dotted_prefix() {
        assert_eq!(add_dr_prefix("Dr. Smith"), "Dr. Smith");
        assert_eq!(add_dr_prefix("dr. smith"), "dr. smith");
        assert_eq!(add_dr_prefix("DR. SMITH"), "DR. SMITH");
    }

    #[test]
    fn rewrites_undotted_prefix() {
        assert_eq!(add_dr_prefix("Dr Smith"), "Dr. Smith");
        assert_eq!(add_dr_prefix("dr Smith"), "Dr. Smith");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(add_dr_prefix("  Smith  "), "Dr. Smith");
    }

    #[test]
    fn idempotent() {
        for input in ["Smith", "dr Smith", "Dr. Smith", "  dR WhO  "] {
            let once = add_dr_prefix(input);
            assert_eq!(add_dr_prefix(&once), once);
        }
    }
}
