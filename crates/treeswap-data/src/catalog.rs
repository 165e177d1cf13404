//! Loading the part and upgrade catalogs from a game directory.

use std::path::Path;

use treeswap_core::tags::{PartCatalog, UpgradeCatalog};

use crate::loader::{
    DataLoadError, deserialize_list, ensure_unique_names, find_data_file, require_data_file,
};
use crate::schema::{PartData, UpgradeData};

/// Load `parts.{ron,toml,json}`. The file is required.
pub fn load_parts(dir: &Path) -> Result<PartCatalog, DataLoadError> {
    let path = require_data_file(dir, "parts")?;
    let data: Vec<PartData> = deserialize_list(&path, "parts")?;

    ensure_unique_names(&data, |p| p.name.as_str(), &path)?;
    let catalog: PartCatalog = data.into_iter().map(PartData::into_part).collect();
    tracing::debug!(path = %path.display(), parts = catalog.len(), "loaded part catalog");
    Ok(catalog)
}

/// Load `upgrades.{ron,toml,json}`. A missing file is an empty catalog.
pub fn load_upgrades(dir: &Path) -> Result<UpgradeCatalog, DataLoadError> {
    let Some(path) = find_data_file(dir, "upgrades")? else {
        tracing::debug!(dir = %dir.display(), "no upgrade catalog, using an empty one");
        return Ok(UpgradeCatalog::new());
    };
    let data: Vec<UpgradeData> = deserialize_list(&path, "upgrades")?;

    ensure_unique_names(&data, |u| u.name.as_str(), &path)?;
    let catalog: UpgradeCatalog = data.into_iter().map(UpgradeData::into_upgrade).collect();
    tracing::debug!(path = %path.display(), upgrades = catalog.len(), "loaded upgrade catalog");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use treeswap_core::id::TechId;
    use treeswap_core::tags::TagStore;

    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "treeswap_catalog_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_parts_and_optional_upgrades() {
        let dir = make_test_dir("both");
        fs::write(
            dir.join("parts.ron"),
            r#"[(name: "A", tech_required: "root"), (name: "B", tech_required: "root", synthetic: true)]"#,
        )
        .unwrap();

        let parts = load_parts(&dir).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts.read("A"), Some(&TechId::from("root")));
        assert!(parts.get("B").unwrap().declared_tech_required.is_none());

        let upgrades = load_upgrades(&dir).unwrap();
        assert!(upgrades.is_empty());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_parts_file_is_an_error() {
        let dir = make_test_dir("missing");
        assert!(matches!(
            load_parts(&dir),
            Err(DataLoadError::MissingRequired { .. })
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn duplicate_part_names_rejected() {
        let dir = make_test_dir("dup");
        fs::write(
            dir.join("parts.json"),
            r#"[{"name": "A", "tech_required": "root"}, {"name": "A", "tech_required": "x"}]"#,
        )
        .unwrap();
        assert!(matches!(
            load_parts(&dir),
            Err(DataLoadError::DuplicateName { ref name, .. }) if name == "A"
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn upgrades_from_toml() {
        let dir = make_test_dir("upgrades");
        fs::write(
            dir.join("upgrades.toml"),
            r#"
[[upgrades]]
name = "engine.Upgrade1"
tech_required = "propulsion"
"#,
        )
        .unwrap();
        let upgrades = load_upgrades(&dir).unwrap();
        assert_eq!(upgrades.read("engine.Upgrade1"), Some(&TechId::from("propulsion")));
        let _ = fs::remove_dir_all(&dir);
    }
}
