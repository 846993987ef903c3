use realm_diff_json_pointer::{format_json_pointer, parse_index, parse_json_pointer};

#[test]
fn root_and_single_slash() {
    assert_eq!(parse_json_pointer("").unwrap(), Vec::<String>::new());
    assert_eq!(parse_json_pointer("/").unwrap(), vec![String::new()]);
    assert_eq!(format_json_pointer(&[]), "");
    assert_eq!(format_json_pointer(&[String::new()]), "/");
}

#[test]
fn realm_paths_survive_formatting() {
    let cases = [
        "/clients/0b5c-11/redirectUris",
        "/roles/client/realm-management/r~1x",
        "/groups/g~0tilde/name",
        "/defaultDefaultClientScopes",
    ];
    for pointer in cases {
        let path = parse_json_pointer(pointer).unwrap();
        assert_eq!(format_json_pointer(&path), pointer, "pointer {pointer}");
    }
}

#[test]
fn escaped_steps_are_unescaped() {
    let path = parse_json_pointer("/roles/client/a~1b/c~0d").unwrap();
    assert_eq!(path, vec!["roles", "client", "a/b", "c~d"]);
}

#[test]
fn index_parsing_rejects_non_canonical_numbers() {
    assert_eq!(parse_index("3"), Some(3));
    for bad in ["", "-1", "+1", "01", "1.0", "x", "-"] {
        assert_eq!(parse_index(bad), None, "step {bad:?}");
    }
}
