use isa_operand::*;

fn s(v: &[&str]) -> Vec<String> {
    v.iter().map(|f| f.to_string()).collect()
}

// ── Canonical form ───────────────────────────────────────────

#[test]
fn canonicalize_none() {
    let t = canonicalize(&FlagSpec::None).unwrap();
    assert_eq!(t, FlagTriple::default());
    assert!(t.is_empty());
}

#[test]
fn canonicalize_single_flag() {
    let t = canonicalize(&FlagSpec::from("IsInteger")).unwrap();
    assert_eq!(t.uncond, s(&["IsInteger"]));
    assert!(t.src.is_empty());
    assert!(t.dest.is_empty());
}

#[test]
fn canonicalize_flat_list() {
    let t = canonicalize(&FlagSpec::from(vec!["IsLoad", "IsMemRef"])).unwrap();
    assert_eq!(t.uncond, s(&["IsLoad", "IsMemRef"]));
    assert!(t.src.is_empty());
    assert!(t.dest.is_empty());
}

#[test]
fn canonicalize_mixed_triple() {
    let spec = FlagSpec::Tuple(vec![
        FlagSet::One("IsControl".into()),
        FlagSet::List(vec![]),
        FlagSet::List(s(&["IsCondCtrl", "IsDirect"])),
    ]);
    let t = canonicalize(&spec).unwrap();
    assert_eq!(t.uncond, s(&["IsControl"]));
    assert!(t.src.is_empty());
    assert_eq!(t.dest, s(&["IsCondCtrl", "IsDirect"]));
}

#[test]
fn canonicalize_rejects_wrong_arity() {
    let spec = FlagSpec::Tuple(vec![
        FlagSet::One("IsA".into()),
        FlagSet::One("IsB".into()),
    ]);
    let err = canonicalize(&spec).unwrap_err();
    assert!(matches!(err, OperandError::MalformedFlagSpec { .. }));
}

#[test]
fn canonicalize_empty_shapes_as_absent() {
    for spec in [
        FlagSpec::One(String::new()),
        FlagSpec::Tuple(vec![]),
        FlagSpec::List(vec![]),
    ] {
        assert_eq!(canonicalize(&spec).unwrap(), FlagTriple::default());
    }
}

#[test]
fn canonicalize_rejects_bad_names() {
    for bad in [" ", "Is Load", "1st", "a-b"] {
        let err = canonicalize(&FlagSpec::One(bad.into())).unwrap_err();
        assert!(
            matches!(err, OperandError::MalformedFlagSpec { .. }),
            "accepted {bad:?}"
        );
    }
}

// ── Role resolution ──────────────────────────────────────────

#[test]
fn resolve_keeps_order_and_duplicates() {
    let t = FlagTriple {
        uncond: s(&["IsA"]),
        src: s(&["IsB", "IsA"]),
        dest: s(&["IsC"]),
    };
    assert_eq!(t.resolve(true, true), s(&["IsA", "IsB", "IsA", "IsC"]));
    assert_eq!(t.resolve(true, false), s(&["IsA", "IsB", "IsA"]));
    assert_eq!(t.resolve(false, true), s(&["IsA", "IsC"]));
    assert_eq!(t.resolve(false, false), s(&["IsA"]));
}

// ── Text form ────────────────────────────────────────────────

#[test]
fn parse_absent() {
    assert_eq!("".parse::<FlagSpec>().unwrap(), FlagSpec::None);
    assert_eq!("None".parse::<FlagSpec>().unwrap(), FlagSpec::None);
    let empty: FlagSpec = "()".parse().unwrap();
    assert_eq!(empty, FlagSpec::Tuple(vec![]));
    assert!(canonicalize(&empty).unwrap().is_empty());
}

#[test]
fn parse_bare_and_list() {
    assert_eq!(
        "IsInteger".parse::<FlagSpec>().unwrap(),
        FlagSpec::One("IsInteger".into())
    );
    assert_eq!(
        "[IsLoad, IsMemRef]".parse::<FlagSpec>().unwrap(),
        FlagSpec::List(s(&["IsLoad", "IsMemRef"]))
    );
    assert_eq!("[]".parse::<FlagSpec>().unwrap(), FlagSpec::List(vec![]));
}

#[test]
fn parse_triple() {
    let spec: FlagSpec =
        "(IsControl, [], [IsCondCtrl, IsDirect])".parse().unwrap();
    assert_eq!(
        spec,
        FlagSpec::Tuple(vec![
            FlagSet::One("IsControl".into()),
            FlagSet::List(vec![]),
            FlagSet::List(s(&["IsCondCtrl", "IsDirect"])),
        ])
    );
    assert_eq!(spec.to_string(), "(IsControl, [], [IsCondCtrl, IsDirect])");
}

#[test]
fn parse_malformed() {
    for bad in [
        "(IsA, IsB)",
        "(IsA, [IsB, IsC)",
        "[IsA, [IsB]]",
        "[IsA,",
        "[IsA,, IsB]",
        "(IsA, (IsB), IsC)",
        "Is A",
    ] {
        let err = bad.parse::<FlagSpec>().unwrap_err();
        assert!(
            matches!(err, OperandError::MalformedFlagSpec { .. }),
            "accepted {bad:?}"
        );
    }
}
