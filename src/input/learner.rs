use derive_more::Display;

/// The learner's full name as typed into the declaration.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("{}", _0)]
pub struct LearnerName(String);

impl LearnerName {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replaces every run of characters outside of `[A-Za-z0-9_]` with a
    /// single `_`, so the name can be used in a file name.
    #[must_use]
    pub fn sanitized(&self) -> String {
        let mut result = String::with_capacity(self.0.len());
        let mut in_run = false;

        for c in self.0.chars() {
            if c.is_ascii_alphanumeric() || c == '_' {
                result.push(c);
                in_run = false;
            } else if !in_run {
                result.push('_');
                in_run = true;
            }
        }

        result
    }

    /// The name of the generated document, e.g. `Timesheet_w1_Jane_Doe.docx`.
    #[must_use]
    pub fn file_name(&self, week: u32) -> String {
        format!("Timesheet_w{}_{}.docx", week, self.sanitized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_sanitized() {
        assert_eq!(LearnerName::new("O'Brien Smith!").sanitized(), "O_Brien_Smith_");
        assert_eq!(LearnerName::new("Jane  -  Doe").sanitized(), "Jane_Doe");
        assert_eq!(LearnerName::new("snake_case").sanitized(), "snake_case");
        assert_eq!(LearnerName::new("Zoë").sanitized(), "Zo_");
    }

    #[test]
    fn test_sanitized_is_file_name_safe() {
        let name = LearnerName::new("  a/b\\c:d*e?f\"g<h>i|j  ");
        assert!(name
            .sanitized()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            LearnerName::new("O'Brien Smith!").file_name(3),
            "Timesheet_w3_O_Brien_Smith_.docx"
        );
    }
}
