//! Insurer detection by name frequency.

use std::path::Path;

use tracing::debug;

use crate::pdf::{self, TextSource};

/// Company id -> lower-case name variants searched in the document text.
const COMPANY_NAMES: &[(&str, &[&str])] = &[
    ("ak", &["ak sigorta", "ak insurance", "ak sig"]),
    ("allianz", &["allianz", "allianz sigorta"]),
    ("anadolu", &["anadolu sigorta", "anadolu sig"]),
    ("ankara", &["ankara sigorta", "ankara sig"]),
    ("axa", &["axa", "axa sigorta"]),
    ("doga", &["doğa sigorta", "doga sigorta"]),
    ("gulf", &["gulf sigorta", "gulf sig", "gig sigorta", "gig sig"]),
    ("hdi", &["hdi sigorta", "hdi sig"]),
    ("mapfre", &["mapfre", "mapfre sigorta"]),
    ("mg", &["mg sigorta", "mg sig", "magdeburger sigorta", "magdeburger"]),
    ("neova", &["neova sigorta", "neova sig"]),
    ("orient", &["orient sigorta", "orient sig"]),
    ("Quick", &["quick sigorta", "quick sig"]),
    ("ray", &["ray sigorta", "ray sig"]),
    ("sompo", &["sompo sigorta", "sompo sig"]),
    ("turkiye", &["türkiye sigorta", "turkiye sigorta"]),
    ("turkiyekatilim", &["türkiye katılım", "turkiye katilim"]),
    ("turknippon", &["türk nippon", "turk nippon"]),
    ("unico", &["unico sigorta", "unico sig"]),
    ("zurich", &["zurich", "zurich sigorta"]),
];

/// Guesses which insurer issued a document.
#[derive(Debug, Clone)]
pub struct CompanyDetector {
    companies: Vec<(String, Vec<String>)>,
}

impl Default for CompanyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CompanyDetector {
    /// Detector over the built-in insurer table.
    pub fn new() -> Self {
        Self::with_companies(COMPANY_NAMES.iter().map(|(id, names)| (*id, names.iter().copied())))
    }

    /// Detector over a custom table; order breaks ties.
    pub fn with_companies<'a, I, N>(companies: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, N)>,
        N: IntoIterator<Item = &'a str>,
    {
        let companies = companies
            .into_iter()
            .map(|(id, names)| {
                (
                    id.to_string(),
                    names.into_iter().map(str::to_lowercase).collect(),
                )
            })
            .collect();
        Self { companies }
    }

    /// Occurrence count per company, in table order.
    pub fn scores(&self, text: &str) -> Vec<(&str, usize)> {
        let text = text.to_lowercase();
        self.companies
            .iter()
            .map(|(id, names)| {
                let count = names.iter().map(|name| text.matches(name.as_str()).count()).sum();
                (id.as_str(), count)
            })
            .collect()
    }

    /// The company whose names occur most often, `None` when none occur.
    /// Ties go to the earlier company in the table.
    pub fn detect(&self, text: &str) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (id, count) in self.scores(text) {
            if count > 0 && best.is_none_or(|(_, top)| count > top) {
                best = Some((id, count));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Read a document through `source` and detect its company.
    pub fn detect_document<S: TextSource + ?Sized>(
        &self,
        source: &S,
        path: &Path,
    ) -> pdf::Result<Option<&str>> {
        let text = source.get_text(path)?;
        let detected = self.detect(&text);
        debug!("Detected {:?} for {}", detected, path.display());
        Ok(detected)
    }
}

/// Company id implied by a corpus directory name: `ak_E` -> `ak`.
pub fn company_from_dir_name(dir_name: &str) -> &str {
    dir_name.split("_E").next().unwrap_or(dir_name)
}
