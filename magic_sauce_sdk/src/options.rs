//! Query parameters for the prediction endpoints.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Keys accepted in the prediction query string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionKey {
    Source,
    Traits,
    Interpretations,
    Contributors,
}

impl OptionKey {
    pub const ALL: [OptionKey; 4] = [
        OptionKey::Source,
        OptionKey::Traits,
        OptionKey::Interpretations,
        OptionKey::Contributors,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OptionKey::Source => "source",
            OptionKey::Traits => "traits",
            OptionKey::Interpretations => "interpretations",
            OptionKey::Contributors => "contributors",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == key)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Provenance of the text submitted to `/text`.
///
/// The API calibrates its models per source. Serialized with the upper case
/// tags the API expects (e.g., `"STATUS_UPDATE"`).
pub enum Source {
    Website,
    Email,
    Brochure,
    StatusUpdate,
    Tweet,
    Cv,
    Other,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Website => "WEBSITE",
            Source::Email => "EMAIL",
            Source::Brochure => "BROCHURE",
            Source::StatusUpdate => "STATUS_UPDATE",
            Source::Tweet => "TWEET",
            Source::Cv => "CV",
            Source::Other => "OTHER",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Source> for String {
    fn from(source: Source) -> Self {
        source.as_str().to_string()
    }
}

/// Validated option set for one prediction call.
///
/// Build it with [`PredictionOptions::text`] or [`PredictionOptions::like_ids`];
/// the set cannot be modified afterwards.
///
/// ```
/// use magic_sauce_sdk::options::{OptionKey, PredictionOptions, Source};
///
/// let options = PredictionOptions::text(Source::Tweet, &["BIG5", "Age"], false);
/// assert_eq!(options.get(OptionKey::Traits), Some("BIG5,Age"));
/// assert_eq!(options.get(OptionKey::Interpretations), Some("false"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PredictionOptions {
    values: BTreeMap<OptionKey, String>,
}

impl PredictionOptions {
    /// Options for `/text`. `source` is required; the API defines the valid
    /// tags (see [`Source`]) but any string is passed through as-is.
    pub fn text<S: AsRef<str>>(
        source: impl Into<String>,
        traits: &[S],
        interpretations: bool,
    ) -> Self {
        let mut values = BTreeMap::new();
        values.insert(OptionKey::Source, source.into());
        insert_traits(&mut values, traits);
        values.insert(OptionKey::Interpretations, interpretations.to_string());
        Self { values }
    }

    /// Options for `/like_ids`. Never carries a `source`.
    pub fn like_ids<S: AsRef<str>>(traits: &[S], interpretations: bool, contributors: bool) -> Self {
        let mut values = BTreeMap::new();
        insert_traits(&mut values, traits);
        values.insert(OptionKey::Interpretations, interpretations.to_string());
        values.insert(OptionKey::Contributors, contributors.to_string());
        Self { values }
    }

    /// Parse an encoded query string. Unknown keys are dropped; a repeated
    /// key keeps its last value.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let values = form_urlencoded::parse(query.as_bytes())
            .filter_map(|(key, value)| OptionKey::parse(&key).map(|key| (key, value.into_owned())))
            .collect();
        Self { values }
    }

    pub fn get(&self, key: OptionKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    pub fn contains(&self, key: OptionKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OptionKey, &str)> {
        self.values.iter().map(|(key, value)| (*key, value.as_str()))
    }

    /// Form-url-encoded representation, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.iter() {
            serializer.append_pair(key.as_str(), value);
        }
        serializer.finish()
    }
}

fn insert_traits<S: AsRef<str>>(values: &mut BTreeMap<OptionKey, String>, traits: &[S]) {
    if traits.is_empty() {
        return;
    }
    let joined = traits
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",");
    values.insert(OptionKey::Traits, joined);
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_TRAITS: [&str; 0] = [];

    #[test]
    fn text_options_always_carry_source_and_interpretations() {
        let options = PredictionOptions::text(Source::Other, &NO_TRAITS, false);
        assert_eq!(options.get(OptionKey::Source), Some("OTHER"));
        assert_eq!(options.get(OptionKey::Interpretations), Some("false"));
        assert!(!options.contains(OptionKey::Traits));
        assert!(!options.contains(OptionKey::Contributors));
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn text_options_accept_custom_source() {
        let options = PredictionOptions::text("PODCAST", &["BIG5"], true);
        assert_eq!(options.get(OptionKey::Source), Some("PODCAST"));
        assert_eq!(options.get(OptionKey::Interpretations), Some("true"));
    }

    #[test]
    fn like_ids_options_never_carry_source() {
        let options = PredictionOptions::like_ids(&["Age", "Gender"], true, false);
        assert!(!options.contains(OptionKey::Source));
        assert_eq!(options.get(OptionKey::Traits), Some("Age,Gender"));
        assert_eq!(options.get(OptionKey::Interpretations), Some("true"));
        assert_eq!(options.get(OptionKey::Contributors), Some("false"));
    }

    #[test]
    fn traits_key_present_only_when_list_is_non_empty() {
        let cases: Vec<Vec<String>> = vec![
            vec![],
            vec!["BIG5".to_string()],
            vec!["BIG5_Openness".to_string(), "Satisfaction_Life".to_string()],
        ];
        for traits in cases {
            let text = PredictionOptions::text(Source::Email, &traits, false);
            let likes = PredictionOptions::like_ids(&traits, false, false);
            for options in [text, likes] {
                assert_eq!(options.contains(OptionKey::Traits), !traits.is_empty());
                if !traits.is_empty() {
                    assert_eq!(options.get(OptionKey::Traits), Some(traits.join(",").as_str()));
                }
            }
        }
    }

    #[test]
    fn query_string_round_trips_key_set() {
        let original = PredictionOptions::text(Source::StatusUpdate, &["BIG5", "Age"], true);
        let query = original.to_query_string();
        assert!(query.contains("traits=BIG5%2CAge"));

        let parsed = PredictionOptions::from_query(&query);
        assert_eq!(parsed, original);

        let likes = PredictionOptions::like_ids(&NO_TRAITS, false, true);
        let parsed = PredictionOptions::from_query(&format!("?{}", likes.to_query_string()));
        assert_eq!(parsed, likes);
    }

    #[test]
    fn from_query_ignores_unknown_keys() {
        let parsed = PredictionOptions::from_query("source=CV&debug=1&interpretations=false");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.get(OptionKey::Source), Some("CV"));
    }

    #[test]
    fn source_tags_match_api() {
        assert_eq!(Source::StatusUpdate.as_str(), "STATUS_UPDATE");
        assert_eq!(Source::Cv.to_string(), "CV");
        assert_eq!(
            serde_json::to_value(Source::StatusUpdate).unwrap(),
            serde_json::json!("STATUS_UPDATE")
        );
        assert_eq!(String::from(Source::Website), "WEBSITE");
    }
}
