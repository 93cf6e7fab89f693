use crate::tag::Tag;

#[test]
fn test_parse_machine_tag() {
    let tag = Tag::parse("machine-42").expect("should parse");
    assert_eq!(tag, Tag::Machine("42".to_string()));
    assert_eq!(tag.kind(), "machine");
    assert_eq!(tag.human_id(), "42");
    assert_eq!(tag.to_string(), "machine-42");
}

#[test]
fn test_parse_unit_and_user_tags() {
    assert_eq!(Tag::parse("unit-wordpress/0").expect("should parse"), Tag::Unit("wordpress/0".to_string()));
    assert_eq!(Tag::parse("user-admin").expect("should parse"), Tag::User("admin".to_string()));
}

#[test]
fn test_parse_rejects_unknown_prefix() {
    for bad in ["service-web", "machin-1", "MACHINE-1", "42", ""] {
        let err = Tag::parse(bad).expect_err("should reject");
        assert!(matches!(err, crate::Error::MalformedTag(_)), "unexpected error for {bad:?}: {err:?}");
    }
}

#[test]
fn test_parse_rejects_empty_id() {
    let err = Tag::parse("machine-").expect_err("should reject");
    assert!(matches!(err, crate::Error::MalformedTag(_)));
}

#[test]
fn test_not_found_message_uses_human_id() {
    let tag = Tag::parse("machine-42").expect("should parse");
    assert_eq!(tag.not_found().to_string(), "machine 42 not found");
}

#[test]
fn test_roundtrip_display_parse() {
    for raw in ["machine-0", "unit-mysql/1", "user-bob"] {
        let tag = Tag::parse(raw).expect("should parse");
        assert_eq!(tag.to_string(), raw);
        assert_eq!(Tag::parse(&tag.to_string()).expect("should reparse"), tag);
    }
}
