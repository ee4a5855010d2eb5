use std::path::PathBuf;

use ballistics::models::{Base, DragFunction, Projectile};
use ballistics::records::{FindError, LoadError, RecordLocator, Registry, YamlDirectory};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

fn locator() -> RecordLocator<YamlDirectory> {
    let registry = Registry::scan(data_dir()).expect("data directory should scan");
    RecordLocator::new(registry, YamlDirectory::new(data_dir()))
}

#[test]
fn scan_registers_projectile_sources() {
    let registry = Registry::scan(data_dir()).unwrap();
    assert_eq!(registry.sources("projectiles").unwrap(), ["223", "308", "6_5"]);
}

#[test]
fn all_builtin_projectiles_construct() {
    let all = Projectile::find(&locator(), None).unwrap();
    assert_eq!(all.len(), 7);
    for (id, projectile) in &all {
        assert!(!projectile.ballistic_coefficient().is_empty(), "{} has no BC", id);
        let params = projectile.params();
        assert_eq!(params.drag_number, params.drag_function.number());
        assert_eq!(params.ballistic_coefficient, projectile.bc());
    }
}

#[test]
fn boat_tail_prefers_g7() {
    let smk = Projectile::find_by_id(&locator(), Some("308"), "sierra_smk_168").unwrap();
    assert_eq!(smk.base(), Some(Base::Boat));
    assert_eq!(smk.drag_function(), DragFunction::G7);
    assert_eq!(smk.bc(), 0.218);
    assert_eq!(smk.params().drag_number, 7);
}

#[test]
fn flat_base_and_extra_fields() {
    let m80 = Projectile::find_by_id(&locator(), None, "m80_ball_147").unwrap();
    assert_eq!(m80.base(), Some(Base::Flat));
    assert_eq!(m80.drag_function(), DragFunction::G1);
    assert_eq!(m80.extra().get("jacket").and_then(|v| v.as_str()), Some("gilding metal"));
}

#[test]
fn numeric_intended_is_stringified() {
    let smk = Projectile::find_by_id(&locator(), Some("223"), "sierra_smk_77").unwrap();
    assert_eq!(smk.intended(), Some("300"));
}

#[test]
fn g7_only_projectile_uses_g7() {
    let berger = Projectile::find_by_id(&locator(), None, "berger_hybrid_140").unwrap();
    assert_eq!(berger.g1(), None);
    assert_eq!(berger.drag_function(), DragFunction::G7);
}

#[test]
fn filter_by_base() {
    let flats = locator()
        .find_all_where(None, |p: &Projectile| p.base() == Some(Base::Flat))
        .unwrap();
    let mut ids: Vec<_> = flats.keys().cloned().collect();
    ids.sort();
    assert_eq!(ids, ["hornady_vmax_55", "m80_ball_147"]);
}

#[test]
fn unknown_file_and_id() {
    let err = Projectile::find(&locator(), Some("300_blk")).unwrap_err();
    assert!(matches!(err, FindError::Load(LoadError::UnknownSource { .. })));

    let err = Projectile::find_by_id(&locator(), Some("308"), "berger_hybrid_140").unwrap_err();
    assert!(matches!(err, FindError::NotFound { .. }));
}
