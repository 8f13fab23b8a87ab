//! # Listing model and CSV rendering.
//!
//! A [`Listing`] is one business record as extracted from a results page.
//! Records decode straight out of the JSON the extraction query returns.
//!
//! ## Phone bucketing
//! French mobile numbers start with `06` or `07`; everything else is
//! treated as a landline. The CSV renders each bucket comma-joined so a
//! record with several numbers stays on one line.

use serde::Deserialize;

/// CSV header line, written once before any data line.
pub const CSV_HEADER: &str = "Nom;Siren;Site Web;Adresse;Télephones mobiles;\
                              Téléphones fixes;Requête effectuée (ou);Requête effectuée (quoi)";

/// Flavor of a directory record.
///
/// Enriched ("pro") records carry a registration id; standard records do
/// not, and their id renders as `-`.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    /// Enriched record with a registration id.
    PagePro,
    /// Plain record.
    #[default]
    Standard,
}

/// One business record extracted from a results page.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listing {
    /// Record flavor.
    #[serde(default)]
    pub kind: ListingKind,
    /// Business name.
    pub name: String,
    /// Registration id, `-` when the record carries none.
    #[serde(default = "missing_siret")]
    pub siret: String,
    /// Website, empty when the record carries none.
    #[serde(default)]
    pub site: String,
    /// Phone numbers, digits only.
    #[serde(default)]
    pub tels: Vec<String>,
    /// Postal address, newlines flattened to spaces.
    #[serde(default)]
    pub adresse: String,
}

fn missing_siret() -> String {
    "-".to_string()
}

impl Listing {
    /// Whether `tel` is a French mobile number.
    pub fn is_mobile(tel: &str) -> bool {
        tel.starts_with("06") || tel.starts_with("07")
    }

    /// The record's mobile numbers.
    pub fn mobiles(&self) -> Vec<&str> {
        self.tels
            .iter()
            .map(String::as_str)
            .filter(|t| Self::is_mobile(t))
            .collect()
    }

    /// The record's landline numbers.
    pub fn landlines(&self) -> Vec<&str> {
        self.tels
            .iter()
            .map(String::as_str)
            .filter(|t| !Self::is_mobile(t))
            .collect()
    }

    /// Renders the record as one CSV line, tagged with the search that
    /// produced it.
    ///
    /// Field order matches [`CSV_HEADER`]: name, registration id, website,
    /// address, mobiles, landlines, department, term.
    pub fn csv_line(&self, department: u32, term: &str) -> String {
        format!(
            "{};{};{};{};{};{};{};{}",
            self.name,
            self.siret,
            self.site,
            self.adresse,
            self.mobiles().join(","),
            self.landlines().join(","),
            department,
            term
        )
    }
}
