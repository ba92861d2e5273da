//! Vocabulary tables for the filter recognizers.
//!
//! All entries are stored folded (lower-case, accent-stripped) because the
//! extractor and the inventory loader both match against folded text.

use predio_core::types::PropertyType;

/// Neighborhoods recognized in queries, Bogotá and Medellín coverage.
pub static NEIGHBORHOODS: &[&str] = &[
    "chapinero",
    "usaquen",
    "chico",
    "cedritos",
    "salitre",
    "poblado",
    "laureles",
    "envigado",
    "sabaneta",
    "belen",
    "estadio",
    "itagui",
    "caldas",
    "estrella",
    "robledo",
    "santa barbara",
    "rosales",
    "teusaquillo",
    "suba",
    "bosa",
    "kennedy",
    "candelaria",
    "fontibon",
];

/// Amenity synonym → canonical token. Multi-word synonyms come first so the
/// alternation regex built from this table prefers them.
pub static AMENITY_SYNONYMS: &[(&str, &str)] = &[
    ("parque infantil", "playground"),
    ("parqueadero", "parking"),
    ("playground", "playground"),
    ("vigilancia", "security"),
    ("seguridad", "security"),
    ("porteria", "security"),
    ("gimnasio", "gym"),
    ("ascensor", "elevator"),
    ("piscina", "pool"),
    ("parking", "parking"),
    ("terraza", "terrace"),
    ("balcon", "balcony"),
    ("jardin", "garden"),
    ("garaje", "parking"),
    ("asador", "bbq"),
    ("gym", "gym"),
    ("bbq", "bbq"),
];

/// Property-type synonyms, longest variants first.
pub static PROPERTY_TYPE_SYNONYMS: &[(&str, PropertyType)] = &[
    ("apartaestudios", PropertyType::Apartment),
    ("apartaestudio", PropertyType::Apartment),
    ("apartamentos", PropertyType::Apartment),
    ("apartamento", PropertyType::Apartment),
    ("aptos", PropertyType::Apartment),
    ("apto", PropertyType::Apartment),
    ("casas", PropertyType::House),
    ("casa", PropertyType::House),
];

/// Room and measure nouns. A numeral directly followed by one of these is a
/// count or an area, never a price.
pub static UNIT_NOUNS: &[&str] = &[
    "habitaciones",
    "habitacion",
    "hab",
    "alcobas",
    "alcoba",
    "cuartos",
    "cuarto",
    "recamaras",
    "recamara",
    "dormitorios",
    "dormitorio",
    "banos",
    "bano",
    "metros cuadrados",
    "metros",
    "mts",
    "m2",
    "m²",
];

/// Canonical token for an amenity label, if the label names one.
///
/// Matches by containment so inventory strings like "seguridad 24h" still
/// map to `security`.
pub fn canonical_amenity(folded_label: &str) -> Option<&'static str> {
    AMENITY_SYNONYMS
        .iter()
        .find(|(synonym, _)| folded_label.contains(synonym))
        .map(|(_, canonical)| *canonical)
}
