use crate::cell::CellAddress;
use crate::format::Unit;

/// Sheet receiving the simulation parameters.
pub const INPUT_SHEET: &str = "feuil1";
/// Sheet brought to the front after a form submission.
pub const SYNTHESIS_SHEET: &str = "synthese";

/// One simulation parameter and the cell it lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputField {
    pub label: &'static str,
    pub address: CellAddress,
    pub unit: Unit,
    pub required: bool,
}

const fn field(label: &'static str, row: u32, col: u32, unit: Unit, required: bool) -> InputField {
    InputField {
        label,
        address: CellAddress::new(row, col),
        unit,
        required,
    }
}

/// The parameters shown in the input summary, in display order.
pub const INPUT_FIELDS: [InputField; 13] = [
    field("Prix d'acquisition", 4, 3, Unit::Euro, true), // C4
    field("Travaux", 51, 2, Unit::Euro, false), // B51
    field("TF + charges loc.", 25, 2, Unit::Euro, false), // B25
    field("Assurance", 26, 2, Unit::Euro, false), // B26
    field("Loyer mensuel", 1, 3, Unit::Euro, true), // C1
    field("Emprunt", 39, 2, Unit::Euro, false), // B39
    field("Durée emprunt", 40, 2, Unit::Years, false), // B40
    field("Taux emprunt", 43, 2, Unit::Percent, false), // B43
    field("TMI perso./physique", 6, 3, Unit::Percent, false), // C6
    field("Prix de cession", 47, 2, Unit::Euro, false), // B47
    field("Durée détention", 3, 3, Unit::Years, true), // C3
    field("Prél. prix de cession", 2, 3, Unit::YesNo, false), // C2
    field("CGA", 3, 6, Unit::YesNo, false), // F3
];

/// Form layout: section title and the labels it groups.
pub const FORM_SECTIONS: [(&str, &[&str]); 4] = [
    (
        "Informations sur le bien",
        &["Prix d'acquisition", "Travaux", "TF + charges loc.", "Assurance"],
    ),
    (
        "Revenus et financement",
        &["Loyer mensuel", "Emprunt", "Durée emprunt", "Taux emprunt"],
    ),
    (
        "Paramètres fiscaux",
        &["TMI perso./physique", "Prix de cession", "Durée détention"],
    ),
    ("Options avancées", &["Prél. prix de cession", "CGA"]),
];

/// Finds a field by label (case-insensitive) or by cell address (`c4`).
pub fn find_field(key: &str) -> Option<&'static InputField> {
    let key = key.trim();
    if let Some(address) = CellAddress::parse(key) {
        if let Some(f) = field_by_address(address) {
            return Some(f);
        }
    }
    INPUT_FIELDS
        .iter()
        .find(|f| f.label.to_lowercase() == key.to_lowercase())
}

pub fn field_by_address(address: CellAddress) -> Option<&'static InputField> {
    INPUT_FIELDS.iter().find(|f| f.address == address)
}
