use uuid::Uuid;

/// The fixed catalog of collection types. Every dataset document carries
/// exactly these top-level keys, each holding an ordered array of records.
pub const COLLECTIONS: &[&str] = &[
    "systemShortcuts",
    "leaderShortcuts",
    "raycastShortcuts",
    "apps",
    "systemGroups",
    "leaderGroups",
    "raycastGroups",
    "appsLibrary",
];

pub fn is_known_collection(name: &str) -> bool {
    COLLECTIONS.contains(&name)
}

/// Produce a fresh record identifier for a collection. The prefix keeps ids
/// recognizable in exports; the random suffix carries the uniqueness. Callers
/// must still re-check against the live collection and regenerate on the
/// (astronomically rare) collision.
pub fn new_identifier(collection: &str) -> String {
    let prefix = collection.replace("Shortcuts", "").replace("Library", "");
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_eight_collections() {
        assert_eq!(COLLECTIONS.len(), 8);
        assert!(is_known_collection("leaderShortcuts"));
        assert!(is_known_collection("appsLibrary"));
        assert!(!is_known_collection("shortcuts"));
        assert!(!is_known_collection("groups"));
        assert!(!is_known_collection(""));
    }

    #[test]
    fn identifiers_are_prefixed_and_unique() {
        let a = new_identifier("leaderShortcuts");
        let b = new_identifier("leaderShortcuts");
        assert!(a.starts_with("leader_"));
        assert_ne!(a, b);

        assert!(new_identifier("appsLibrary").starts_with("apps_"));
        assert!(new_identifier("systemGroups").starts_with("systemGroups_"));
    }
}
