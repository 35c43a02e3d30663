use include_dir::{include_dir, Dir};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

static LANG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lang");

/// Name of the vocabulary used when none is configured.
pub const DEFAULT_VOCABULARY: &str = "english";

/// A fixed, ordered list of words the test draws from.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Vocabulary {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl Vocabulary {
    /// Load one of the vocabularies embedded in the binary.
    pub fn builtin(name: &str) -> Result<Self> {
        let file_name = format!("{name}.json");
        let file = LANG_DIR
            .get_file(&file_name)
            .ok_or_else(|| Error::UnknownVocabulary(name.to_string()))?;

        let contents = file
            .contents_utf8()
            .ok_or_else(|| Error::UnknownVocabulary(name.to_string()))?;

        Self::from_json(contents, &file_name)
    }

    /// Load a user supplied vocabulary.
    ///
    /// `.json` files use the same layout as the embedded lists. Anything else
    /// is read as plain text with words separated by whitespace.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let origin = path.display().to_string();
        if path.extension().is_some_and(|ext| ext == "json") {
            return Self::from_json(&contents, &origin);
        }

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or(origin);

        Self::from_words(name, contents.split_whitespace().map(str::to_lowercase))
    }

    pub fn from_words<I>(name: impl Into<String>, words: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let name = name.into();
        let words: Vec<String> = words.into_iter().filter(|w| !w.is_empty()).collect();
        if words.is_empty() {
            return Err(Error::EmptyVocabulary(name));
        }

        Ok(Self {
            size: words.len() as u32,
            name,
            words,
        })
    }

    fn from_json(contents: &str, origin: &str) -> Result<Self> {
        let lang: Vocabulary = serde_json::from_str(contents).map_err(|source| Error::Json {
            origin: origin.to_string(),
            source,
        })?;

        // Whitespace inside an entry splits it into separate words.
        Self::from_words(
            lang.name,
            lang.words
                .iter()
                .flat_map(|w| w.split_whitespace())
                .map(str::to_string),
        )
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(suffix: &str) -> NamedTempFile {
        tempfile::Builder::new().suffix(suffix).tempfile().unwrap()
    }

    #[test]
    fn test_builtin_english() {
        let vocab = Vocabulary::builtin(DEFAULT_VOCABULARY).unwrap();

        assert_eq!(vocab.name, "english");
        assert_eq!(vocab.size as usize, vocab.len());
        assert_eq!(vocab.words[0], "the");
        assert!(vocab.words.contains(&"mystery".to_string()));
        assert!(vocab
            .words
            .iter()
            .all(|w| w.chars().all(|c| c.is_ascii_lowercase())));
    }

    #[test]
    fn test_builtin_unknown() {
        assert_matches!(
            Vocabulary::builtin("klingon"),
            Err(Error::UnknownVocabulary(name)) if name == "klingon"
        );
    }

    #[test]
    fn test_from_plain_text_file() {
        let mut file = temp_file(".txt");
        writeln!(file, "Alpha beta\n  gamma\n\ndelta").unwrap();

        let vocab = Vocabulary::from_path(file.path()).unwrap();

        assert_eq!(vocab.words, vec!["alpha", "beta", "gamma", "delta"]);
        assert_eq!(vocab.size, 4);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = temp_file(".json");
        write!(
            file,
            r#"{{ "name": "tiny", "size": 2, "words": ["one", "two"] }}"#
        )
        .unwrap();

        let vocab = Vocabulary::from_path(file.path()).unwrap();

        assert_eq!(vocab.name, "tiny");
        assert_eq!(vocab.words, vec!["one", "two"]);
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let file = temp_file(".txt");

        assert_matches!(
            Vocabulary::from_path(file.path()),
            Err(Error::EmptyVocabulary(_))
        );
    }

    #[test]
    fn test_bad_json_is_rejected() {
        let mut file = temp_file(".json");
        write!(file, "not json").unwrap();

        assert_matches!(Vocabulary::from_path(file.path()), Err(Error::Json { .. }));
    }

    #[test]
    fn test_missing_file() {
        assert_matches!(
            Vocabulary::from_path("/definitely/not/here.txt"),
            Err(Error::Read { .. })
        );
    }
}
