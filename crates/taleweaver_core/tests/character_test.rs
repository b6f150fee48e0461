use taleweaver_core::{Character, Gender, parse_traits};

#[test]
fn descriptor_with_three_parts() {
    let c = Character::from_descriptor("Alex | Male | brave, curious ,").unwrap();
    assert_eq!(c.name, "Alex");
    assert_eq!(c.gender, Gender::Male);
    assert_eq!(c.traits, vec!["brave", "curious"]);
}

#[test]
fn descriptor_with_gender_only() {
    let c = Character::from_descriptor("Sam|female").unwrap();
    assert_eq!(c.gender, Gender::Female);
    assert!(c.traits.is_empty());
}

#[test]
fn descriptor_second_part_is_traits_when_not_a_gender() {
    let c = Character::from_descriptor("Pip|shy, clever").unwrap();
    assert_eq!(c.gender, Gender::NonBinary);
    assert_eq!(c.traits, vec!["shy", "clever"]);
}

#[test]
fn descriptor_unknown_gender_defaults_to_non_binary() {
    let c = Character::from_descriptor("Zed|robot|loyal").unwrap();
    assert_eq!(c.gender, Gender::NonBinary);
    assert_eq!(c.traits, vec!["loyal"]);
}

#[test]
fn descriptor_without_name_is_rejected() {
    assert!(Character::from_descriptor(" |male|brave").is_err());
    assert!(Character::from_descriptor("").is_err());
}

#[test]
fn gender_serializes_kebab_case() {
    let json = serde_json::to_value(Gender::NonBinary).unwrap();
    assert_eq!(json, "non-binary");
    let parsed: Gender = serde_json::from_value(serde_json::json!("female")).unwrap();
    assert_eq!(parsed, Gender::Female);
}

#[test]
fn traits_drop_blanks() {
    assert_eq!(parse_traits(" a, ,b,"), vec!["a", "b"]);
    assert!(parse_traits("").is_empty());
}

#[test]
fn cache_key_is_lowercase() {
    let c = Character::new("  Captain Hook ", Gender::Male);
    assert_eq!(c.cache_key(), "captain hook");
}
