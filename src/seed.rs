//! Demo dataset: eight suspect files and the network linking them

use crate::graph::{GraphResult, GraphStore, Label, NodeId, PropertyMap, PropertyValue};
use crate::store::{MemoryDocumentStore, StoreResult};
use serde_json::{json, Value};
use tracing::info;

/// Name field of suspect records
pub const NAME_FIELD: &str = "familyName";

/// Fields covered by the text index
pub const TEXT_FIELDS: [&str; 2] = ["biography", "crimes"];

/// `(givenName, familyName)` of each suspect, in record order
const PEOPLE: [(&str, &str); 8] = [
    ("Amine", "CHARRO"),
    ("Hassan", "EL-FASSI"),
    ("Karim", "DAOUDI"),
    ("Sofia", "BENALI"),
    ("Miguel", "RODRIGUEZ"),
    ("Yassine", "JEBBOUR"),
    ("Said", "OUALI"),
    ("Rachid", "TALEB"),
];

/// `(from, relationship, to)` by given name
const LINKS: [(&str, &str, &str); 9] = [
    ("Amine", "DIRECTS", "Hassan"),
    ("Amine", "DIRECTS", "Karim"),
    ("Amine", "DIRECTS", "Yassine"),
    ("Hassan", "DIRECTS", "Said"),
    ("Hassan", "DIRECTS", "Rachid"),
    ("Amine", "KNOWS", "Sofia"),
    ("Sofia", "KNOWS", "Miguel"),
    ("Miguel", "SUPPLIES", "Amine"),
    ("Yassine", "KNOWS", "Sofia"),
];

pub fn suspect_records() -> Vec<Value> {
    vec![
        json!({
            "familyName": "CHARRO",
            "givenName": "Amine",
            "address": "123 Rue de la République",
            "crimes": ["Burglary", "Drug trafficking", "Money laundering"],
            "biography": "Presumed head of the Charro clan. Known for using shell companies to launder drug money. Very suspicious.",
            "description": "Dragon tattoo on the left arm"
        }),
        json!({
            "familyName": "EL-FASSI",
            "givenName": "Hassan",
            "address": "45 Boulevard Mohammed V",
            "crimes": ["Receiving stolen goods", "Complicity"],
            "biography": "Amine's right-hand man. Runs logistics and transport. Former truck driver.",
            "description": "Scar on the right cheek"
        }),
        json!({
            "familyName": "DAOUDI",
            "givenName": "Karim",
            "address": "Casablanca, Anfa",
            "crimes": ["Cybercrime", "Forgery"],
            "biography": "Computer expert. Built the network's encrypted communication systems. Hacker known as 'K-Ghost'.",
            "description": "Always wears dark glasses"
        }),
        json!({
            "familyName": "BENALI",
            "givenName": "Sofia",
            "address": "Tanger, Zone Franche",
            "crimes": ["Smuggling", "Corruption"],
            "biography": "Runs import-export at the port of Tangier. Moves illicit goods through containers.",
            "description": "Red hair, very elegant"
        }),
        json!({
            "familyName": "RODRIGUEZ",
            "givenName": "Miguel",
            "address": "Marrakech, Palmeraie",
            "crimes": ["Arms trafficking", "Criminal association"],
            "biography": "Link to South American cartels. Supplies heavy weapons to the network. Dangerous and armed.",
            "description": "Speaks with a strong Spanish accent"
        }),
        json!({
            "familyName": "JEBBOUR",
            "givenName": "Yassine",
            "address": "Fès, Medina",
            "crimes": ["Money laundering", "Tax fraud"],
            "biography": "The network's accountant. Turns dirty money into real estate investments. Outwardly a respectable notable.",
            "description": "Always in a suit and tie"
        }),
        json!({
            "familyName": "OUALI",
            "givenName": "Said",
            "address": "Casablanca, Sidi Bernoussi",
            "crimes": ["Bag snatching", "Drug dealing"],
            "biography": "Low-level member of the network. Does the dirty work on the ground. Reports directly to Hassan.",
            "description": "Backwards cap, scar on the eyebrow"
        }),
        json!({
            "familyName": "TALEB",
            "givenName": "Rachid",
            "address": "Casablanca, Hay Mohammadi",
            "crimes": ["Illicit transport", "Lookout"],
            "biography": "Driver for fast deliveries. Knows the city's shortcuts well. Unreliable.",
            "description": "Walks with a slight limp"
        }),
    ]
}

/// The people graph: one `Person` per suspect plus their relationships
pub fn people_graph() -> GraphResult<GraphStore> {
    let mut store = GraphStore::new();
    let ids: Vec<(&str, NodeId)> = PEOPLE
        .iter()
        .map(|&(given, family)| {
            let mut properties = PropertyMap::new();
            properties.insert("givenName".to_string(), PropertyValue::from(given));
            properties.insert("familyName".to_string(), PropertyValue::from(family));
            (given, store.create_node_with_properties(vec![Label::new("Person")], properties))
        })
        .collect();

    let lookup = |name: &str| ids.iter().find(|(given, _)| *given == name).map(|(_, id)| *id);
    for (from, rel, to) in LINKS {
        if let (Some(source), Some(target)) = (lookup(from), lookup(to)) {
            store.create_edge(source, target, rel)?;
        }
    }
    Ok(store)
}

pub async fn load_documents(store: &MemoryDocumentStore) -> StoreResult<usize> {
    let inserted = store.insert_many(suspect_records()).await?;
    info!(inserted, "seeded suspect records");
    Ok(inserted)
}
