use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mood {
    Confident,
    Shy,
    Bored,
    Happy,
    Frustrated,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Self::Confident,
        Self::Shy,
        Self::Bored,
        Self::Happy,
        Self::Frustrated,
    ];

    pub fn keyword(&self) -> &'static str {
        match *self {
            Self::Confident => "confident",
            Self::Shy => "shy",
            Self::Bored => "bored",
            Self::Happy => "happy",
            Self::Frustrated => "frustrated",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Confident => "Confident",
            Self::Shy => "Shy",
            Self::Bored => "Bored",
            Self::Happy => "Happy",
            Self::Frustrated => "Frustrated",
        }
    }

    pub fn field_name(&self) -> &'static str {
        match *self {
            Self::Confident => "Mannerism Confident",
            Self::Shy => "Mannerism Shy",
            Self::Bored => "Mannerism Bored",
            Self::Happy => "Mannerism Happy",
            Self::Frustrated => "Mannerism Frustrated",
        }
    }

    /// Maps a free-form mannerism category ("When Confident", "SHY moments")
    /// to a mood by case-insensitive keyword containment.
    pub fn classify(category: &str) -> Option<Self> {
        let lowered = category.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|mood| lowered.contains(mood.keyword()))
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Mood;

    #[test]
    fn classifies_by_case_insensitive_substring() {
        assert_eq!(Mood::classify("When Confident"), Some(Mood::Confident));
        assert_eq!(Mood::classify("SHY"), Some(Mood::Shy));
        assert_eq!(Mood::classify("bored stiff"), Some(Mood::Bored));
        assert_eq!(Mood::classify("Frustrated or Angry"), Some(Mood::Frustrated));
    }

    #[test]
    fn unrecognized_category_is_unmapped() {
        assert_eq!(Mood::classify("When Terrified"), None);
        assert_eq!(Mood::classify(""), None);
    }
}
