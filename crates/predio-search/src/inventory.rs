//! Read-once property catalog with startup validation.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use tracing::{info, warn};

use predio_core::error::{PredioError, Result};
use predio_core::text::fold;
use predio_core::types::{Property, PropertyType};
use predio_extract::lexicon;

/// The property inventory, loaded once and immutable afterwards.
///
/// Listings keep file order; id lookup goes through a position map. All
/// validation happens at construction, so a catalog that exists is a catalog
/// the ranking layer can trust without per-request checks.
#[derive(Debug, Clone)]
pub struct PropertyCatalog {
    properties: Vec<Property>,
    positions: HashMap<String, usize>,
}

impl PropertyCatalog {
    /// Build a catalog from parsed records, normalizing and validating them.
    ///
    /// `location` is folded and amenity labels are mapped to their canonical
    /// tokens, so file data compares equal to what the extractor produces.
    /// Rejects empty ids, duplicate ids, empty titles, and embeddings of
    /// inconsistent dimension. Records may ship without an embedding; those
    /// are backfilled by the caller before indexing.
    pub fn from_properties(mut properties: Vec<Property>) -> Result<Self> {
        for property in properties.iter_mut() {
            property.location = fold(&property.location);
            property.amenities = property
                .amenities
                .iter()
                .map(|label| {
                    let folded = fold(label);
                    match lexicon::canonical_amenity(&folded) {
                        Some(canonical) => canonical.to_string(),
                        None => folded,
                    }
                })
                .collect();
        }

        let mut positions = HashMap::with_capacity(properties.len());
        let mut dimensions: Option<usize> = None;

        for (row, property) in properties.iter().enumerate() {
            if property.id.trim().is_empty() {
                return Err(PredioError::Inventory(format!("record {} has an empty id", row)));
            }
            if property.title.trim().is_empty() {
                return Err(PredioError::Inventory(format!(
                    "property '{}' has an empty title",
                    property.id
                )));
            }
            if positions.insert(property.id.clone(), row).is_some() {
                return Err(PredioError::Inventory(format!(
                    "duplicate property id '{}'",
                    property.id
                )));
            }
            if !property.embedding.is_empty() {
                match dimensions {
                    None => dimensions = Some(property.embedding.len()),
                    Some(expected) if expected != property.embedding.len() => {
                        return Err(PredioError::Inventory(format!(
                            "property '{}' embedding has {} dimensions, expected {}",
                            property.id,
                            property.embedding.len(),
                            expected
                        )));
                    }
                    Some(_) => {}
                }
            }
        }

        info!(count = properties.len(), "Property catalog loaded");
        Ok(Self { properties, positions })
    }

    /// Load the catalog from a JSON file holding an array of records.
    ///
    /// A missing file falls back to the built-in sample listings. A file
    /// that exists but fails to read, parse, or validate is fatal.
    pub fn load_json(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Inventory file {} not found, using built-in sample listings",
                path.display()
            );
            return Self::from_properties(Self::sample());
        }
        let content = std::fs::read_to_string(path)?;
        let properties: Vec<Property> = serde_json::from_str(&content)?;
        Self::from_properties(properties)
    }

    /// Built-in sample listings so the binary runs without a data file.
    ///
    /// Shipped without embeddings; the application backfills them through
    /// its embedding backend at startup.
    pub fn sample() -> Vec<Property> {
        vec![
            Property {
                id: "prop1".to_string(),
                title: "Apartamento en Chapinero".to_string(),
                price: 450_000_000,
                bedrooms: 2,
                bathrooms: 2,
                area: 75,
                location: "chapinero".to_string(),
                property_type: PropertyType::Apartment,
                amenities: BTreeSet::from([
                    "gym".to_string(),
                    "pool".to_string(),
                    "security".to_string(),
                ]),
                description: "Hermoso apartamento en Chapinero con vista a la ciudad".to_string(),
                url: "https://example.com/propiedades/prop1".to_string(),
                embedding: Vec::new(),
            },
            Property {
                id: "prop2".to_string(),
                title: "Casa en Usaquén".to_string(),
                price: 950_000_000,
                bedrooms: 3,
                bathrooms: 3,
                area: 150,
                location: "usaquen".to_string(),
                property_type: PropertyType::House,
                amenities: BTreeSet::from([
                    "garden".to_string(),
                    "parking".to_string(),
                    "security".to_string(),
                ]),
                description: "Amplia casa con jardín en zona exclusiva de Usaquén".to_string(),
                url: "https://example.com/propiedades/prop2".to_string(),
                embedding: Vec::new(),
            },
        ]
    }

    /// Look up a listing by id.
    pub fn get(&self, id: &str) -> Option<&Property> {
        self.positions.get(id).map(|&row| &self.properties[row])
    }

    /// All listings in load order.
    pub fn all(&self) -> &[Property] {
        &self.properties
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn make_property(id: &str) -> Property {
        Property {
            id: id.to_string(),
            title: format!("Listing {}", id),
            price: 300_000_000,
            bedrooms: 2,
            bathrooms: 1,
            area: 60,
            location: "chapinero".to_string(),
            property_type: PropertyType::Apartment,
            amenities: BTreeSet::new(),
            description: String::new(),
            url: String::new(),
            embedding: Vec::new(),
        }
    }

    // ---- validation ----

    #[test]
    fn test_from_properties_valid() {
        let catalog =
            PropertyCatalog::from_properties(vec![make_property("a"), make_property("b")])
                .unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_empty_id_rejected() {
        let mut property = make_property("a");
        property.id = "  ".to_string();
        let result = PropertyCatalog::from_properties(vec![property]);
        assert!(matches!(result, Err(PredioError::Inventory(_))));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result =
            PropertyCatalog::from_properties(vec![make_property("a"), make_property("a")]);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("duplicate property id 'a'"));
    }

    #[test]
    fn test_empty_title_rejected() {
        let mut property = make_property("a");
        property.title = String::new();
        let result = PropertyCatalog::from_properties(vec![property]);
        assert!(matches!(result, Err(PredioError::Inventory(_))));
    }

    #[test]
    fn test_inconsistent_embedding_dimensions_rejected() {
        let mut first = make_property("a");
        first.embedding = vec![0.1, 0.2, 0.3];
        let mut second = make_property("b");
        second.embedding = vec![0.1, 0.2];
        let result = PropertyCatalog::from_properties(vec![first, second]);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("expected 3"));
    }

    #[test]
    fn test_missing_embeddings_allowed() {
        let mut first = make_property("a");
        first.embedding = vec![0.1, 0.2, 0.3];
        let second = make_property("b");
        let catalog = PropertyCatalog::from_properties(vec![first, second]).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_empty_catalog_allowed() {
        let catalog = PropertyCatalog::from_properties(Vec::new()).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_location_folded_at_load() {
        let mut property = make_property("a");
        property.location = "Usaquén".to_string();
        let catalog = PropertyCatalog::from_properties(vec![property]).unwrap();
        assert_eq!(catalog.get("a").unwrap().location, "usaquen");
    }

    #[test]
    fn test_amenities_canonicalized_at_load() {
        let mut property = make_property("a");
        property.amenities =
            BTreeSet::from(["Piscina".to_string(), "seguridad 24h".to_string()]);
        let catalog = PropertyCatalog::from_properties(vec![property]).unwrap();
        let amenities = &catalog.get("a").unwrap().amenities;
        assert_eq!(
            *amenities,
            BTreeSet::from(["pool".to_string(), "security".to_string()])
        );
    }

    #[test]
    fn test_unknown_amenity_kept_folded() {
        let mut property = make_property("a");
        property.amenities = BTreeSet::from(["Chimenea".to_string()]);
        let catalog = PropertyCatalog::from_properties(vec![property]).unwrap();
        assert!(catalog.get("a").unwrap().amenities.contains("chimenea"));
    }

    // ---- file loading ----

    #[test]
    fn test_load_json_missing_file_falls_back_to_sample() {
        let catalog = PropertyCatalog::load_json(Path::new("/nonexistent/listings.json")).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("prop1").is_some());
        assert!(catalog.get("prop2").is_some());
    }

    #[test]
    fn test_load_json_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"[{
                "id": "p1",
                "title": "Apartamento en Suba",
                "price": 280000000,
                "bedrooms": 3,
                "bathrooms": 2,
                "area": 68,
                "location": "suba",
                "property_type": "apartment",
                "amenities": ["parking"]
            }]"#,
        )
        .unwrap();

        let catalog = PropertyCatalog::load_json(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        let property = catalog.get("p1").unwrap();
        assert_eq!(property.bedrooms, 3);
        assert!(property.amenities.contains("parking"));
    }

    #[test]
    fn test_load_json_malformed_file_is_fatal() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not json at all").unwrap();
        let result = PropertyCatalog::load_json(file.path());
        assert!(matches!(result, Err(PredioError::Serialization(_))));
    }

    #[test]
    fn test_load_json_invalid_records_are_fatal() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"[
                {"id": "p1", "title": "Uno", "price": 1, "bedrooms": 1, "bathrooms": 1,
                 "area": 30, "location": "suba", "property_type": "apartment"},
                {"id": "p1", "title": "Dos", "price": 2, "bedrooms": 1, "bathrooms": 1,
                 "area": 30, "location": "suba", "property_type": "apartment"}
            ]"#,
        )
        .unwrap();
        let result = PropertyCatalog::load_json(file.path());
        assert!(matches!(result, Err(PredioError::Inventory(_))));
    }

    // ---- lookup ----

    #[test]
    fn test_get_by_id() {
        let catalog =
            PropertyCatalog::from_properties(vec![make_property("a"), make_property("b")])
                .unwrap();
        assert_eq!(catalog.get("b").unwrap().id, "b");
        assert!(catalog.get("zzz").is_none());
    }

    #[test]
    fn test_all_preserves_load_order() {
        let catalog = PropertyCatalog::from_properties(vec![
            make_property("c"),
            make_property("a"),
            make_property("b"),
        ])
        .unwrap();
        let ids: Vec<&str> = catalog.all().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_sample_listings_are_valid() {
        let catalog = PropertyCatalog::from_properties(PropertyCatalog::sample()).unwrap();
        let apartment = catalog.get("prop1").unwrap();
        assert_eq!(apartment.property_type, PropertyType::Apartment);
        assert_eq!(apartment.location, "chapinero");
        assert!(apartment.amenities.contains("pool"));
        let house = catalog.get("prop2").unwrap();
        assert_eq!(house.property_type, PropertyType::House);
        assert_eq!(house.price, 950_000_000);
    }
}
