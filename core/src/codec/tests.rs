use super::*;
use crate::test_util::{nested_arrays, sample_database, scalar, tempdir};
use crate::{DefineEntry, TypeDatabase, TypeKind, TypeNode};

fn record_len(node: &TypeNode) -> usize {
    // Two terminators, five u32 fields, one i64.
    node.member_name.len() + node.type_name.len() + 2 + 5 * 4 + 8
}

#[test]
fn exact_layout() {
    let types = [scalar("Int", "x", 4)];
    let defines = [DefineEntry::new("A", "1")];
    let mut expected = Vec::new();
    expected.extend_from_slice(&[0xEE, 0xFF, 0xC0, 0x23, 1, 0, 0, 0]);
    expected.extend_from_slice(b"x\0Int\0");
    expected.extend_from_slice(&[0, 0, 0, 0, 4, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0]);
    expected.extend_from_slice(&[0; 8]);
    expected.extend_from_slice(&[0, 0, 0, 0]);
    expected.extend_from_slice(&[0x84, 0x19, 0x02, 0x12, 1, 0, 0, 0]);
    expected.extend_from_slice(b"A\x001\0");
    assert_eq!(encode(&types, &defines).unwrap(), expected);
}

#[test]
fn const_value_is_little_endian_i64() {
    let types = [scalar("Int", "NEG", 4).constant(-2)];
    let bytes = encode(&types, &[]).unwrap();
    // magic + count + "NEG\0" + "Int\0" + kind/size/align/flag
    let at = 8 + 4 + 4 + 16;
    assert_eq!(bytes[at - 4..at], [1, 0, 0, 0]);
    assert_eq!(bytes[at..at + 8], (-2i64).to_le_bytes());
}

#[test]
fn round_trip() {
    let db = sample_database();
    let bytes = encode(&db.types, &db.defines).unwrap();
    assert_eq!(decode(&bytes), Ok(db));
}

#[test]
fn round_trip_empty() {
    let bytes = encode(&[], &[]).unwrap();
    assert_eq!(bytes.len(), 16);
    assert_eq!(decode(&bytes), Ok(TypeDatabase::default()));
}

#[test]
fn round_trip_deeply_nested() {
    let db = TypeDatabase {
        types: vec![nested_arrays(1000), scalar("Int", "after", 4)],
        defines: Vec::new(),
    };
    let bytes = encode(&db.types, &db.defines).unwrap();
    assert_eq!(decode(&bytes), Ok(db));
}

#[test]
fn chain_deeper_than_the_call_stack() {
    const DEPTH: u32 = 200_000;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&TYPE_MAGIC.to_le_bytes());
    bytes.extend_from_slice(&1u32.to_le_bytes());
    for level in 0..=DEPTH {
        bytes.extend_from_slice(b"\0a\0");
        for field in [TypeKind::Array as u32, 4, 4, 0, 0, 0] {
            bytes.extend_from_slice(&field.to_le_bytes());
        }
        // Every record but the innermost has a single child.
        bytes.extend_from_slice(&u32::from(level < DEPTH).to_le_bytes());
    }
    bytes.extend_from_slice(&DEFINE_MAGIC.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    // Everything, teardown included, runs on a thread with a small stack.
    std::thread::Builder::new()
        .stack_size(2 << 20)
        .spawn(move || {
            let db = decode(&bytes).unwrap();
            assert_eq!(db.record_count(), DEPTH as usize + 1);
            let copy = db.clone();
            assert!(copy == db);
            assert_eq!(encode(&copy.types, &copy.defines).unwrap(), bytes);
            drop(copy);
            drop(db);
        })
        .unwrap()
        .join()
        .unwrap();
}

/// The type section is exactly the pre-order concatenation of every record, with no per-level
/// framing besides each node's child count.
#[test]
fn records_are_preorder_without_framing() {
    let db = sample_database();
    let bytes = encode(&db.types, &[]).unwrap();
    fn subtree_bytes(node: &TypeNode) -> usize {
        record_len(node) + node.children.iter().map(subtree_bytes).sum::<usize>()
    }
    let types_len: usize = db.types.iter().map(subtree_bytes).sum();
    assert_eq!(bytes.len(), 8 + types_len + 8);

    // The struct is the second root, and its two members follow it directly.
    let struct_offset = 8 + record_len(&db.types[0]);
    let point = &db.types[1];
    let member_offset = struct_offset + record_len(point);
    assert_eq!(
        &bytes[member_offset..member_offset + 2],
        b"x\0",
        "first member record must follow its parent"
    );
    let count_offset = member_offset - 4;
    assert_eq!(bytes[count_offset..member_offset], [2, 0, 0, 0]);
}

#[test]
fn child_count_too_large_is_rejected() {
    let types = [TypeNode::new("struct s", TypeKind::Struct).child(scalar("Int", "a", 4))];
    let mut bytes = encode(&types, &[]).unwrap();
    let count_offset = 8 + record_len(&types[0]) - 4;
    bytes[count_offset] = 2;
    // The define magic is consumed as the start of a second child record.
    assert!(decode(&bytes).is_err());
}

#[test]
fn child_count_too_small_is_rejected() {
    let types = [TypeNode::new("struct s", TypeKind::Struct)
        .child(scalar("Int", "a", 4))
        .child(scalar("Int", "b", 4))];
    let mut bytes = encode(&types, &[]).unwrap();
    let count_offset = 8 + record_len(&types[0]) - 4;
    bytes[count_offset] = 1;
    let define_offset = 8 + record_len(&types[0]) + record_len(&types[0].children[0]);
    assert_eq!(
        decode(&bytes),
        Err(DecodeError::BadMagic {
            section: Section::Defines,
            offset: define_offset,
            expected: DEFINE_MAGIC,
            found: u32::from_le_bytes(*b"b\0In"),
        })
    );
}

#[test]
fn bad_type_magic() {
    let mut bytes = encode(&[], &[]).unwrap();
    bytes[0] = 0;
    assert_eq!(
        decode(&bytes),
        Err(DecodeError::BadMagic {
            section: Section::Types,
            offset: 0,
            expected: TYPE_MAGIC,
            found: 0x23C0_FF00,
        })
    );
}

#[test]
fn bad_define_magic() {
    let mut bytes = encode(&[], &[]).unwrap();
    bytes[8..12].copy_from_slice(&TYPE_MAGIC.to_le_bytes());
    assert!(matches!(
        decode(&bytes),
        Err(DecodeError::BadMagic {
            section: Section::Defines,
            offset: 8,
            ..
        })
    ));
}

#[test]
fn every_truncation_fails() {
    let db = sample_database();
    let bytes = encode(&db.types, &db.defines).unwrap();
    for len in 0..bytes.len() {
        assert!(decode(&bytes[..len]).is_err(), "prefix of {len} bytes decoded");
    }
}

#[test]
fn truncation_reports_offset() {
    let bytes = encode(&[scalar("Int", "x", 4)], &[]).unwrap();
    // Cut inside the size field of the first record.
    let cut = 8 + 2 + 4 + 4 + 2;
    assert_eq!(
        decode(&bytes[..cut]),
        Err(DecodeError::Truncated {
            field: "type size",
            offset: 8 + 2 + 4 + 4,
        })
    );
}

#[test]
fn unterminated_string() {
    let mut bytes = encode(&[], &[DefineEntry::new("A", "1")]).unwrap();
    bytes.pop();
    assert_eq!(
        decode(&bytes),
        Err(DecodeError::UnterminatedString {
            field: "define literal",
            offset: 18,
        })
    );
}

#[test]
fn invalid_utf8() {
    let mut bytes = encode(&[], &[DefineEntry::new("A", "1")]).unwrap();
    bytes[16] = 0xff;
    assert_eq!(
        decode(&bytes),
        Err(DecodeError::InvalidUtf8 {
            field: "define identifier",
            offset: 16,
        })
    );
}

#[test]
fn unknown_kind() {
    let mut bytes = encode(&[scalar("Int", "x", 4)], &[]).unwrap();
    bytes[8 + 6] = 5;
    assert_eq!(
        decode(&bytes),
        Err(DecodeError::UnknownKind {
            offset: 8,
            value: 5
        })
    );
}

#[test]
fn invalid_const_flag() {
    let mut bytes = encode(&[scalar("Int", "x", 4)], &[]).unwrap();
    bytes[8 + 6 + 12] = 2;
    assert_eq!(
        decode(&bytes),
        Err(DecodeError::InvalidConstFlag {
            offset: 8,
            value: 2
        })
    );
}

#[test]
fn trailing_bytes() {
    let mut bytes = encode(&[], &[]).unwrap();
    bytes.extend_from_slice(&[0, 0]);
    assert_eq!(
        decode(&bytes),
        Err(DecodeError::TrailingBytes {
            offset: 16,
            count: 2
        })
    );
}

#[test]
fn interior_nul_is_rejected() {
    let defines = [DefineEntry::new("A", "1\02")];
    assert!(matches!(
        encode(&[], &defines),
        Err(EncodeError::InteriorNul {
            field: "define literal",
            ..
        })
    ));
}

#[test]
fn materialize_and_load() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("type_db.bin");
    let db = sample_database();
    db.materialize(&path)?;
    assert_eq!(std::fs::read(&path)?, encode(&db.types, &db.defines)?);
    assert_eq!(TypeDatabase::load(&path)?, db);
    Ok(())
}
