use serde::{Deserialize, Serialize};

/// A keyword as the caller spelled it, plus its lower-cased needle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    original: String,
    needle: String,
}

impl Keyword {
    /// The empty keyword is a substring of everything, so it matches every file that can be read.
    pub fn new(text: impl Into<String>) -> Self {
        let original = text.into();
        let needle = original.to_lowercase();
        Self { original, needle }
    }

    /// The spelling used as the key in results
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Checks the keyword against content that is already lower-cased.
    pub fn is_found_in(&self, lowered: &str) -> bool {
        lowered.contains(&self.needle)
    }
}

/// The immutable set of keywords for one run.
///
/// Exact duplicate spellings collapse to one entry; the first occurrence keeps its place.
/// Spellings that differ only in case ("Error", "error") stay separate keys.
///
/// Serializes as the list of original spellings; deserializing rebuilds the needles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct KeywordSet {
    keywords: Vec<Keyword>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Vec::<Keyword>::new();
        for text in keywords {
            let keyword = Keyword::new(text);
            if !set.iter().any(|k| k.original == keyword.original) {
                set.push(keyword);
            }
        }
        Self { keywords: set }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keyword> {
        self.keywords.iter()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Keywords whose needle occurs in `lowered`.
    pub fn found_in<'a>(&'a self, lowered: &'a str) -> impl Iterator<Item = &'a Keyword> + 'a {
        self.keywords.iter().filter(move |k| k.is_found_in(lowered))
    }
}

impl From<Vec<String>> for KeywordSet {
    fn from(keywords: Vec<String>) -> Self {
        Self::new(keywords)
    }
}

impl From<KeywordSet> for Vec<String> {
    fn from(set: KeywordSet) -> Self {
        set.keywords.into_iter().map(|k| k.original).collect()
    }
}
