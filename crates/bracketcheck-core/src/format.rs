//! Verdict rendering for the two output variants.

use std::fmt;

/// Which executable's output format is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputVariant {
    /// `True` / `False`
    PartOne,
    /// `{index}:{true|false}`
    PartTwo,
}

impl OutputVariant {
    /// Render one verdict. `index` is the 1-based data line number.
    pub fn render(self, index: usize, verdict: bool) -> String {
        match self {
            Self::PartOne => (if verdict { "True" } else { "False" }).to_string(),
            Self::PartTwo => format!("{index}:{verdict}"),
        }
    }
}

impl fmt::Display for OutputVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PartOne => write!(f, "partone"),
            Self::PartTwo => write!(f, "parttwo"),
        }
    }
}

/// Parse a rendered `parttwo` line back into `(index, verdict)`.
pub fn parse_indexed(line: &str) -> Option<(usize, bool)> {
    let (index, verdict) = line.trim_end_matches(['\r', '\n']).split_once(':')?;
    let index = index.parse().ok()?;
    let verdict = match verdict {
        "true" => true,
        "false" => false,
        _ => return None,
    };
    Some((index, verdict))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn partone_is_capitalized() {
        assert_eq!(OutputVariant::PartOne.render(1, true), "True");
        assert_eq!(OutputVariant::PartOne.render(7, false), "False");
    }

    #[test]
    fn parttwo_carries_index() {
        assert_eq!(OutputVariant::PartTwo.render(1, true), "1:true");
        assert_eq!(OutputVariant::PartTwo.render(12, false), "12:false");
    }

    #[test]
    fn parse_rendered_parttwo_line() {
        let line = OutputVariant::PartTwo.render(42, false);
        assert_eq!(parse_indexed(&line), Some((42, false)));
        assert_eq!(parse_indexed("3:true\n"), Some((3, true)));
    }

    #[test]
    fn parse_rejects_other_text() {
        assert_eq!(parse_indexed("True"), None);
        assert_eq!(parse_indexed("1:True"), None);
        assert_eq!(parse_indexed("x:true"), None);
        assert_eq!(parse_indexed("-1:false"), None);
    }
}
